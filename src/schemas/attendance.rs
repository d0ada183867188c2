use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::{format_date, format_primitive};
use crate::db::models::AttendanceRecord;
use crate::db::types::AttendanceStatus;
use crate::services::attendance::DayEntry;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct MarkAttendanceRequest {
    #[validate(length(min = 1, max = 64))]
    pub(crate) student_id: String,
    /// Calendar date in `YYYY-MM-DD` form.
    pub(crate) date: String,
    pub(crate) status: AttendanceStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RangeQuery {
    pub(crate) start_date: String,
    pub(crate) end_date: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttendanceRecordResponse {
    pub(crate) student_id: String,
    pub(crate) date: String,
    pub(crate) status: AttendanceStatus,
    pub(crate) marked_by: String,
    pub(crate) marked_at: String,
}

impl From<AttendanceRecord> for AttendanceRecordResponse {
    fn from(record: AttendanceRecord) -> Self {
        Self {
            student_id: record.student_id,
            date: format_date(record.date),
            status: record.status,
            marked_by: record.marked_by,
            marked_at: format_primitive(record.marked_at),
        }
    }
}

/// Roster row of the day view. `status` is null when no record exists for the
/// date, which is not the same as absent.
#[derive(Debug, Serialize)]
pub(crate) struct DayEntryResponse {
    pub(crate) student_id: String,
    pub(crate) full_name: String,
    pub(crate) status: Option<AttendanceStatus>,
}

impl From<DayEntry> for DayEntryResponse {
    fn from(entry: DayEntry) -> Self {
        Self {
            student_id: entry.student.id,
            full_name: entry.student.full_name,
            status: entry.status,
        }
    }
}
