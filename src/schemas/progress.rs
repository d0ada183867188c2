use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{AssignmentProgress, Student};
use crate::db::types::ProgressStatus;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct GradeRequest {
    #[validate(range(min = 0))]
    pub(crate) marks: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProgressResponse {
    pub(crate) assignment_id: String,
    pub(crate) student_id: String,
    pub(crate) status: ProgressStatus,
    pub(crate) marks: Option<i32>,
    pub(crate) teacher_viewed: bool,
    pub(crate) submitted_at: Option<String>,
    pub(crate) updated_at: String,
}

impl From<AssignmentProgress> for ProgressResponse {
    fn from(record: AssignmentProgress) -> Self {
        Self {
            assignment_id: record.assignment_id,
            student_id: record.student_id,
            status: record.status,
            marks: record.marks,
            teacher_viewed: record.teacher_viewed,
            submitted_at: record.submitted_at.map(format_primitive),
            updated_at: format_primitive(record.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AssignmentProgressRow {
    pub(crate) student_id: String,
    pub(crate) full_name: String,
    pub(crate) status: ProgressStatus,
    pub(crate) marks: Option<i32>,
    pub(crate) teacher_viewed: bool,
    pub(crate) submitted_at: Option<String>,
}

impl From<(Student, AssignmentProgress)> for AssignmentProgressRow {
    fn from((student, record): (Student, AssignmentProgress)) -> Self {
        Self {
            student_id: student.id,
            full_name: student.full_name,
            status: record.status,
            marks: record.marks,
            teacher_viewed: record.teacher_viewed,
            submitted_at: record.submitted_at.map(format_primitive),
        }
    }
}
