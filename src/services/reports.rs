use std::cmp::Ordering;

use serde::Deserialize;
use time::{Date, Duration, Month};

use crate::core::time::parse_date;
use crate::db::models::Assignment;
use crate::services::aggregate::{self, DailyStats};
use crate::services::LedgerError;
use crate::store::RecordStore;

/// Named report window, resolved against a single reference date so one
/// report stays internally consistent even while the wall clock advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ReportPeriod {
    Week,
    Month,
    Year,
}

impl ReportPeriod {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            ReportPeriod::Week => "week",
            ReportPeriod::Month => "month",
            ReportPeriod::Year => "year",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct StudentAttendanceRow {
    pub(crate) student_id: String,
    pub(crate) full_name: String,
    pub(crate) stats: DailyStats,
    pub(crate) total: u32,
    pub(crate) percentage: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct AttendanceReport {
    pub(crate) period: ReportPeriod,
    pub(crate) start_date: Date,
    pub(crate) end_date: Date,
    pub(crate) rows: Vec<StudentAttendanceRow>,
}

#[derive(Debug, Clone)]
pub(crate) struct AssignmentReport {
    pub(crate) assignment: Assignment,
    pub(crate) submitted_count: usize,
    pub(crate) total_students: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct DailySummary {
    pub(crate) date: Date,
    pub(crate) stats: DailyStats,
    pub(crate) present_rate: f64,
}

/// Resolves `[today - period, today]`, inclusive on both ends. Pure in its
/// inputs; callers resolve it once per report.
pub(crate) fn resolve_period(period: ReportPeriod, today: Date) -> (Date, Date) {
    let start = match period {
        ReportPeriod::Week => today.checked_sub(Duration::days(7)).unwrap_or(Date::MIN),
        ReportPeriod::Month => shift_back_months(today, 1),
        ReportPeriod::Year => shift_back_months(today, 12),
    };
    (start, today)
}

// Calendar-month arithmetic; the day of month clamps to the shorter target
// month (e.g. Mar 31 - 1mo = Feb 28/29).
fn shift_back_months(date: Date, months: i32) -> Date {
    let total = date.year() * 12 + i32::from(u8::from(date.month())) - 1 - months;
    let year = total.div_euclid(12);
    let month = Month::try_from((total.rem_euclid(12) + 1) as u8).unwrap_or(Month::January);
    let day = date.day().min(month.length(year));
    Date::from_calendar_date(year, month, day).unwrap_or(date)
}

/// Per-student attendance totals over the period for the whole roster.
/// Students with no records in the window still appear, at 0%. Rows are
/// sorted by percentage descending; ties keep roster order.
pub(crate) async fn build_attendance_report(
    store: &dyn RecordStore,
    period: ReportPeriod,
    today: Date,
) -> Result<AttendanceReport, LedgerError> {
    let (start_date, end_date) = resolve_period(period, today);

    let roster = store.list_students().await?;
    let records = store.scan_attendance_between(start_date, end_date).await?;

    let mut rows: Vec<StudentAttendanceRow> = roster
        .into_iter()
        .map(|student| {
            let own: Vec<_> = records
                .iter()
                .filter(|record| record.student_id == student.id)
                .cloned()
                .collect();
            let stats = aggregate::daily_stats(&own);
            StudentAttendanceRow {
                student_id: student.id,
                full_name: student.full_name,
                stats,
                total: stats.total(),
                percentage: aggregate::student_percentage(&own),
            }
        })
        .collect();

    rows.sort_by(|a, b| b.percentage.partial_cmp(&a.percentage).unwrap_or(Ordering::Equal));

    Ok(AttendanceReport { period, start_date, end_date, rows })
}

/// Completion rate for one assignment against the full roster.
pub(crate) async fn build_assignment_report(
    store: &dyn RecordStore,
    assignment_id: &str,
) -> Result<AssignmentReport, LedgerError> {
    let assignment = store
        .get_assignment(assignment_id)
        .await?
        .ok_or_else(|| LedgerError::NotFound(format!("assignment {assignment_id} not found")))?;

    let roster = store.list_students().await?;
    let progress = store.scan_progress_by_assignment(assignment_id).await?;
    let (submitted_count, total_students) = aggregate::assignment_completion(&progress, &roster);

    Ok(AssignmentReport { assignment, submitted_count, total_students })
}

/// Daily class counts for the dashboard cards.
pub(crate) async fn daily_summary(
    store: &dyn RecordStore,
    date: &str,
) -> Result<DailySummary, LedgerError> {
    let date = parse_date(date)
        .map_err(|_| LedgerError::Validation(format!("invalid calendar date: {date:?}")))?;

    let records = store.scan_attendance_by_date(date).await?;
    let stats = aggregate::daily_stats(&records);
    let present_rate = aggregate::student_percentage(&records);

    Ok(DailySummary { date, stats, present_rate })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::primitive_now_utc;
    use crate::db::models::{AttendanceRecord, Student};
    use crate::db::types::AttendanceStatus;
    use crate::store::memory::MemoryStore;
    use crate::store::RecordStore;
    use time::macros::date;

    #[test]
    fn week_window_is_seven_days_back() {
        let (start, end) = resolve_period(ReportPeriod::Week, date!(2024 - 03 - 15));
        assert_eq!(start, date!(2024 - 03 - 08));
        assert_eq!(end, date!(2024 - 03 - 15));
    }

    #[test]
    fn month_window_clamps_to_shorter_months() {
        let (start, _) = resolve_period(ReportPeriod::Month, date!(2024 - 03 - 31));
        assert_eq!(start, date!(2024 - 02 - 29));

        let (start, _) = resolve_period(ReportPeriod::Month, date!(2023 - 03 - 31));
        assert_eq!(start, date!(2023 - 02 - 28));
    }

    #[test]
    fn month_window_borrows_across_the_year_boundary() {
        let (start, _) = resolve_period(ReportPeriod::Month, date!(2024 - 01 - 15));
        assert_eq!(start, date!(2023 - 12 - 15));
    }

    #[test]
    fn year_window_handles_leap_day() {
        let (start, _) = resolve_period(ReportPeriod::Year, date!(2024 - 02 - 29));
        assert_eq!(start, date!(2023 - 02 - 28));
    }

    async fn seed_student(store: &MemoryStore, id: &str, name: &str) {
        store
            .upsert_student(Student { id: id.to_string(), full_name: name.to_string() })
            .await
            .expect("seed student");
    }

    async fn seed_mark(store: &MemoryStore, student_id: &str, day: Date, status: AttendanceStatus) {
        store
            .put_attendance(AttendanceRecord {
                student_id: student_id.to_string(),
                date: day,
                status,
                marked_by: "t1".to_string(),
                marked_at: primitive_now_utc(),
            })
            .await
            .expect("seed mark");
    }

    #[tokio::test]
    async fn report_includes_students_with_zero_records() {
        let store = MemoryStore::new();
        seed_student(&store, "s1", "Ada Lovelace").await;
        seed_student(&store, "s2", "Blaise Pascal").await;
        seed_student(&store, "s3", "Carl Gauss").await;
        seed_mark(&store, "s1", date!(2024 - 03 - 14), AttendanceStatus::Present).await;
        seed_mark(&store, "s2", date!(2024 - 03 - 14), AttendanceStatus::Absent).await;

        let report = build_attendance_report(&store, ReportPeriod::Week, date!(2024 - 03 - 15))
            .await
            .expect("report");

        assert_eq!(report.rows.len(), 3);
        let carl = report.rows.iter().find(|row| row.student_id == "s3").expect("carl");
        assert_eq!(carl.total, 0);
        assert_eq!(carl.percentage, 0.0);
    }

    #[tokio::test]
    async fn rows_sort_descending_with_stable_ties() {
        let store = MemoryStore::new();
        seed_student(&store, "s1", "Ada Lovelace").await;
        seed_student(&store, "s2", "Blaise Pascal").await;
        seed_student(&store, "s3", "Carl Gauss").await;
        // Ada 50%, Blaise 100%, Carl 50%: ties keep roster order (Ada first).
        seed_mark(&store, "s1", date!(2024 - 03 - 11), AttendanceStatus::Present).await;
        seed_mark(&store, "s1", date!(2024 - 03 - 12), AttendanceStatus::Absent).await;
        seed_mark(&store, "s2", date!(2024 - 03 - 11), AttendanceStatus::Present).await;
        seed_mark(&store, "s3", date!(2024 - 03 - 11), AttendanceStatus::Present).await;
        seed_mark(&store, "s3", date!(2024 - 03 - 12), AttendanceStatus::Late).await;

        let report = build_attendance_report(&store, ReportPeriod::Week, date!(2024 - 03 - 15))
            .await
            .expect("report");

        let order: Vec<&str> = report.rows.iter().map(|row| row.student_id.as_str()).collect();
        assert_eq!(order, vec!["s2", "s1", "s3"]);
    }

    #[tokio::test]
    async fn report_window_excludes_records_outside_the_period() {
        let store = MemoryStore::new();
        seed_student(&store, "s1", "Ada Lovelace").await;
        seed_mark(&store, "s1", date!(2024 - 03 - 01), AttendanceStatus::Absent).await;
        seed_mark(&store, "s1", date!(2024 - 03 - 14), AttendanceStatus::Present).await;

        let report = build_attendance_report(&store, ReportPeriod::Week, date!(2024 - 03 - 15))
            .await
            .expect("report");

        assert_eq!(report.rows[0].total, 1);
        assert_eq!(report.rows[0].percentage, 100.0);
    }

    #[tokio::test]
    async fn daily_summary_reduces_the_day() {
        let store = MemoryStore::new();
        seed_student(&store, "s1", "Ada Lovelace").await;
        seed_student(&store, "s2", "Blaise Pascal").await;
        seed_mark(&store, "s1", date!(2024 - 03 - 14), AttendanceStatus::Present).await;
        seed_mark(&store, "s2", date!(2024 - 03 - 14), AttendanceStatus::Late).await;

        let summary = daily_summary(&store, "2024-03-14").await.expect("summary");
        assert_eq!(summary.stats, DailyStats { present: 1, absent: 0, late: 1 });
        assert_eq!(summary.present_rate, 50.0);
    }

    #[tokio::test]
    async fn daily_summary_of_an_unmarked_day_is_all_zero() {
        let store = MemoryStore::new();
        let summary = daily_summary(&store, "2024-03-14").await.expect("summary");
        assert_eq!(summary.stats.total(), 0);
        assert_eq!(summary.present_rate, 0.0);
    }
}
