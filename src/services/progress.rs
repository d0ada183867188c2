use crate::core::time::primitive_now_utc;
use crate::db::models::{Assignment, AssignmentProgress, Student};
use crate::db::types::ProgressStatus;
use crate::services::LedgerError;
use crate::store::{CasOutcome, RecordStore};

/// Moves the (assignment, student) key from `pending` to `submitted`.
///
/// The pending guard and the write go through one compare-and-write, so two
/// racing submissions cannot both succeed; the loser gets a conflict and the
/// stored record is untouched.
pub(crate) async fn submit_assignment(
    store: &dyn RecordStore,
    assignment_id: &str,
    student_id: &str,
) -> Result<AssignmentProgress, LedgerError> {
    require_assignment(store, assignment_id).await?;
    require_student(store, student_id).await?;

    let record = AssignmentProgress {
        assignment_id: assignment_id.to_string(),
        student_id: student_id.to_string(),
        status: ProgressStatus::Submitted,
        marks: None,
        teacher_viewed: false,
        submitted_at: Some(primitive_now_utc()),
        updated_at: primitive_now_utc(),
    };

    match store.compare_and_put_progress(ProgressStatus::Pending, record.clone()).await? {
        CasOutcome::Applied => {
            metrics::counter!("assignment_submissions_total").increment(1);
            tracing::info!(
                assignment_id = %assignment_id,
                student_id = %student_id,
                status = record.status.as_str(),
                "assignment submitted"
            );
            Ok(record)
        }
        CasOutcome::PreconditionFailed => Err(LedgerError::Conflict(format!(
            "assignment {assignment_id} already submitted by student {student_id}"
        ))),
    }
}

/// Moves a `submitted` key to the terminal `graded` state and stores marks.
/// Marks are validated against the assignment's `max_marks` before any write.
pub(crate) async fn grade_assignment(
    store: &dyn RecordStore,
    assignment_id: &str,
    student_id: &str,
    marks: i32,
    grader_id: &str,
) -> Result<AssignmentProgress, LedgerError> {
    let assignment = require_assignment(store, assignment_id).await?;
    require_student(store, student_id).await?;

    if marks < 0 || marks > assignment.max_marks {
        return Err(LedgerError::Validation(format!(
            "marks {marks} outside 0..={} for assignment {assignment_id}",
            assignment.max_marks
        )));
    }

    let current = progress(store, assignment_id, student_id).await?;
    match current.status {
        ProgressStatus::Submitted => {}
        ProgressStatus::Pending => {
            return Err(LedgerError::Conflict(format!(
                "assignment {assignment_id} not yet submitted by student {student_id}"
            )));
        }
        ProgressStatus::Graded => {
            return Err(LedgerError::Conflict(format!(
                "assignment {assignment_id} already graded for student {student_id}"
            )));
        }
    }

    let record = AssignmentProgress {
        assignment_id: assignment_id.to_string(),
        student_id: student_id.to_string(),
        status: ProgressStatus::Graded,
        marks: Some(marks),
        teacher_viewed: true,
        submitted_at: current.submitted_at,
        updated_at: primitive_now_utc(),
    };

    match store.compare_and_put_progress(ProgressStatus::Submitted, record.clone()).await? {
        CasOutcome::Applied => {
            metrics::counter!("assignment_grades_total").increment(1);
            tracing::info!(
                assignment_id = %assignment_id,
                student_id = %student_id,
                status = record.status.as_str(),
                marks,
                graded_by = %grader_id,
                "assignment graded"
            );
            Ok(record)
        }
        // The record moved between the read and the write; the caller must
        // re-read before retrying.
        CasOutcome::PreconditionFailed => Err(LedgerError::Conflict(format!(
            "assignment {assignment_id} changed state concurrently for student {student_id}"
        ))),
    }
}

/// Flags the record as seen by the teacher without touching its status.
/// Requires an existing record; the implicit pending default has nothing to
/// flag.
pub(crate) async fn mark_viewed(
    store: &dyn RecordStore,
    assignment_id: &str,
    student_id: &str,
) -> Result<(), LedgerError> {
    require_assignment(store, assignment_id).await?;
    require_student(store, student_id).await?;

    let updated = store.set_progress_viewed(assignment_id, student_id, primitive_now_utc()).await?;
    if !updated {
        return Err(LedgerError::NotFound(format!(
            "no progress record for assignment {assignment_id} and student {student_id}"
        )));
    }
    Ok(())
}

/// The stored record, or the implicit pending default when none exists.
pub(crate) async fn progress(
    store: &dyn RecordStore,
    assignment_id: &str,
    student_id: &str,
) -> Result<AssignmentProgress, LedgerError> {
    require_assignment(store, assignment_id).await?;
    require_student(store, student_id).await?;

    let record = store.get_progress(assignment_id, student_id).await?;
    Ok(record
        .unwrap_or_else(|| AssignmentProgress::pending(assignment_id, student_id, primitive_now_utc())))
}

/// Teacher view: every roster student with their (possibly implicit) state.
pub(crate) async fn progress_for_assignment(
    store: &dyn RecordStore,
    assignment_id: &str,
) -> Result<Vec<(Student, AssignmentProgress)>, LedgerError> {
    require_assignment(store, assignment_id).await?;

    let roster = store.list_students().await?;
    let records = store.scan_progress_by_assignment(assignment_id).await?;
    let now = primitive_now_utc();

    let entries = roster
        .into_iter()
        .map(|student| {
            let record = records
                .iter()
                .find(|record| record.student_id == student.id)
                .cloned()
                .unwrap_or_else(|| AssignmentProgress::pending(assignment_id, &student.id, now));
            (student, record)
        })
        .collect();

    Ok(entries)
}

async fn require_assignment(
    store: &dyn RecordStore,
    assignment_id: &str,
) -> Result<Assignment, LedgerError> {
    store
        .get_assignment(assignment_id)
        .await?
        .ok_or_else(|| LedgerError::NotFound(format!("assignment {assignment_id} not found")))
}

async fn require_student(store: &dyn RecordStore, student_id: &str) -> Result<Student, LedgerError> {
    store
        .get_student(student_id)
        .await?
        .ok_or_else(|| LedgerError::NotFound(format!("student {student_id} not found")))
}
