use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "attendancestatus", rename_all = "lowercase")]
pub(crate) enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
        }
    }
}

/// Submission lifecycle: `Pending -> Submitted -> Graded`, no transition back.
/// A missing progress record is equivalent to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "progressstatus", rename_all = "lowercase")]
pub(crate) enum ProgressStatus {
    Pending,
    Submitted,
    Graded,
}

impl ProgressStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            ProgressStatus::Pending => "pending",
            ProgressStatus::Submitted => "submitted",
            ProgressStatus::Graded => "graded",
        }
    }
}
