use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, PrimitiveDateTime};

use crate::db::types::{AttendanceStatus, ProgressStatus};

/// Roster entry. Owned by the identity collaborator; the core never mutates it
/// outside of seeding.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Student {
    pub(crate) id: String,
    pub(crate) full_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Assignment {
    pub(crate) id: String,
    pub(crate) subject_id: String,
    pub(crate) title: String,
    pub(crate) max_marks: i32,
    pub(crate) due_date: Option<Date>,
    pub(crate) created_at: PrimitiveDateTime,
}

/// Latest attendance fact for a (student, date) key. A later write for the same
/// key replaces this record; prior statuses are not retained.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct AttendanceRecord {
    pub(crate) student_id: String,
    pub(crate) date: Date,
    pub(crate) status: AttendanceStatus,
    pub(crate) marked_by: String,
    pub(crate) marked_at: PrimitiveDateTime,
}

/// Latest submission/grading state for an (assignment, student) key.
/// `marks` is populated only once the record is graded.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct AssignmentProgress {
    pub(crate) assignment_id: String,
    pub(crate) student_id: String,
    pub(crate) status: ProgressStatus,
    pub(crate) marks: Option<i32>,
    pub(crate) teacher_viewed: bool,
    pub(crate) submitted_at: Option<PrimitiveDateTime>,
    pub(crate) updated_at: PrimitiveDateTime,
}

impl AssignmentProgress {
    /// The implicit record the ledger reports when no row exists for the key.
    pub(crate) fn pending(assignment_id: &str, student_id: &str, now: PrimitiveDateTime) -> Self {
        Self {
            assignment_id: assignment_id.to_string(),
            student_id: student_id.to_string(),
            status: ProgressStatus::Pending,
            marks: None,
            teacher_viewed: false,
            submitted_at: None,
            updated_at: now,
        }
    }
}
