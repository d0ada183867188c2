use time::Date;

use crate::core::time::{parse_date, primitive_now_utc};
use crate::db::models::{AttendanceRecord, Student};
use crate::db::types::AttendanceStatus;
use crate::services::LedgerError;
use crate::store::RecordStore;

/// One roster entry of the day view: the status is `None` when no record
/// exists for that date, which is distinct from every enumerated status and
/// must not be read as absent.
#[derive(Debug, Clone)]
pub(crate) struct DayEntry {
    pub(crate) student: Student,
    pub(crate) status: Option<AttendanceStatus>,
}

/// Upserts the unique record for (student, date). Repeating the call with the
/// same arguments leaves a single record; only `marked_at` moves forward.
pub(crate) async fn mark_attendance(
    store: &dyn RecordStore,
    student_id: &str,
    date: &str,
    status: AttendanceStatus,
    marker_id: &str,
) -> Result<AttendanceRecord, LedgerError> {
    let date = parse_date_param(date)?;

    if store.get_student(student_id).await?.is_none() {
        return Err(LedgerError::NotFound(format!("student {student_id} not found")));
    }

    let record = AttendanceRecord {
        student_id: student_id.to_string(),
        date,
        status,
        marked_by: marker_id.to_string(),
        marked_at: primitive_now_utc(),
    };
    store.put_attendance(record.clone()).await?;

    metrics::counter!("attendance_marks_total", "status" => status.as_str()).increment(1);
    tracing::info!(
        student_id = %record.student_id,
        date = %record.date,
        status = status.as_str(),
        marked_by = %record.marked_by,
        "attendance marked"
    );

    Ok(record)
}

/// Day view across the whole roster, including students with no record.
pub(crate) async fn attendance_for_date(
    store: &dyn RecordStore,
    date: &str,
) -> Result<Vec<DayEntry>, LedgerError> {
    let date = parse_date_param(date)?;

    let roster = store.list_students().await?;
    let records = store.scan_attendance_by_date(date).await?;

    let entries = roster
        .into_iter()
        .map(|student| {
            let status = records
                .iter()
                .find(|record| record.student_id == student.id)
                .map(|record| record.status);
            DayEntry { student, status }
        })
        .collect();

    Ok(entries)
}

/// Records for one student with date in `[start, end]`, both bounds inclusive,
/// ordered by date. Empty when none exist.
pub(crate) async fn attendance_in_range(
    store: &dyn RecordStore,
    student_id: &str,
    start: &str,
    end: &str,
) -> Result<Vec<AttendanceRecord>, LedgerError> {
    let start = parse_date_param(start)?;
    let end = parse_date_param(end)?;
    if start > end {
        return Err(LedgerError::Validation(format!(
            "start_date {start} is after end_date {end}"
        )));
    }

    if store.get_student(student_id).await?.is_none() {
        return Err(LedgerError::NotFound(format!("student {student_id} not found")));
    }

    Ok(store.scan_attendance_range(student_id, start, end).await?)
}

fn parse_date_param(value: &str) -> Result<Date, LedgerError> {
    parse_date(value)
        .map_err(|_| LedgerError::Validation(format!("invalid calendar date: {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    async fn store_with_student(id: &str, name: &str) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .upsert_student(Student { id: id.to_string(), full_name: name.to_string() })
            .await
            .expect("seed student");
        store
    }

    #[tokio::test]
    async fn mark_then_read_back_returns_same_status() {
        let store = store_with_student("s1", "Ada Lovelace").await;

        mark_attendance(&store, "s1", "2024-01-01", AttendanceStatus::Late, "t1")
            .await
            .expect("mark");

        let day = attendance_for_date(&store, "2024-01-01").await.expect("day view");
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].status, Some(AttendanceStatus::Late));
    }

    #[tokio::test]
    async fn marking_twice_keeps_a_single_record() {
        let store = store_with_student("s1", "Ada Lovelace").await;

        for _ in 0..2 {
            mark_attendance(&store, "s1", "2024-01-01", AttendanceStatus::Present, "t1")
                .await
                .expect("mark");
        }

        let records =
            attendance_in_range(&store, "s1", "2024-01-01", "2024-01-01").await.expect("range");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, AttendanceStatus::Present);
    }

    #[tokio::test]
    async fn later_write_replaces_earlier_status() {
        let store = store_with_student("s1", "Ada Lovelace").await;

        mark_attendance(&store, "s1", "2024-01-01", AttendanceStatus::Absent, "t1")
            .await
            .expect("first mark");
        mark_attendance(&store, "s1", "2024-01-01", AttendanceStatus::Present, "t2")
            .await
            .expect("second mark");

        let records =
            attendance_in_range(&store, "s1", "2024-01-01", "2024-01-01").await.expect("range");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, AttendanceStatus::Present);
        assert_eq!(records[0].marked_by, "t2");
    }

    #[tokio::test]
    async fn invalid_date_is_rejected_before_any_write() {
        let store = store_with_student("s1", "Ada Lovelace").await;

        let err = mark_attendance(&store, "s1", "2024-02-30", AttendanceStatus::Present, "t1")
            .await
            .expect_err("invalid date");
        assert!(matches!(err, LedgerError::Validation(_)));

        let day = attendance_for_date(&store, "2024-02-29").await.expect("day view");
        assert_eq!(day[0].status, None);
    }

    #[tokio::test]
    async fn unknown_student_is_not_found() {
        let store = store_with_student("s1", "Ada Lovelace").await;

        let err = mark_attendance(&store, "ghost", "2024-01-01", AttendanceStatus::Present, "t1")
            .await
            .expect_err("unknown student");
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[tokio::test]
    async fn missing_record_is_distinct_from_absent() {
        let store = store_with_student("s1", "Ada Lovelace").await;
        store
            .upsert_student(Student { id: "s2".to_string(), full_name: "Blaise Pascal".to_string() })
            .await
            .expect("seed student");

        mark_attendance(&store, "s2", "2024-01-01", AttendanceStatus::Absent, "t1")
            .await
            .expect("mark");

        let day = attendance_for_date(&store, "2024-01-01").await.expect("day view");
        let ada = day.iter().find(|entry| entry.student.id == "s1").expect("ada");
        let blaise = day.iter().find(|entry| entry.student.id == "s2").expect("blaise");
        assert_eq!(ada.status, None);
        assert_eq!(blaise.status, Some(AttendanceStatus::Absent));
    }

    #[tokio::test]
    async fn inverted_range_is_a_validation_error() {
        let store = store_with_student("s1", "Ada Lovelace").await;

        let err = attendance_in_range(&store, "s1", "2024-02-01", "2024-01-01")
            .await
            .expect_err("inverted range");
        assert!(matches!(err, LedgerError::Validation(_)));
    }
}
