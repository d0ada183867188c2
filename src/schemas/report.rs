use serde::{Deserialize, Serialize};

use crate::core::time::format_date;
use crate::services::reports::{
    AssignmentReport, AttendanceReport, DailySummary, ReportPeriod, StudentAttendanceRow,
};

#[derive(Debug, Deserialize)]
pub(crate) struct AttendanceReportQuery {
    pub(crate) period: ReportPeriod,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DailySummaryQuery {
    pub(crate) date: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentReportRowResponse {
    pub(crate) student_id: String,
    pub(crate) full_name: String,
    pub(crate) present: u32,
    pub(crate) absent: u32,
    pub(crate) late: u32,
    pub(crate) total: u32,
    pub(crate) percentage: f64,
}

impl From<StudentAttendanceRow> for StudentReportRowResponse {
    fn from(row: StudentAttendanceRow) -> Self {
        Self {
            student_id: row.student_id,
            full_name: row.full_name,
            present: row.stats.present,
            absent: row.stats.absent,
            late: row.stats.late,
            total: row.total,
            percentage: row.percentage,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AttendanceReportResponse {
    pub(crate) period: &'static str,
    pub(crate) start_date: String,
    pub(crate) end_date: String,
    pub(crate) students: Vec<StudentReportRowResponse>,
}

impl From<AttendanceReport> for AttendanceReportResponse {
    fn from(report: AttendanceReport) -> Self {
        Self {
            period: report.period.as_str(),
            start_date: format_date(report.start_date),
            end_date: format_date(report.end_date),
            students: report.rows.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AssignmentReportResponse {
    pub(crate) assignment_id: String,
    pub(crate) title: String,
    pub(crate) max_marks: i32,
    pub(crate) submitted_count: usize,
    pub(crate) total_students: usize,
}

impl From<AssignmentReport> for AssignmentReportResponse {
    fn from(report: AssignmentReport) -> Self {
        Self {
            assignment_id: report.assignment.id,
            title: report.assignment.title,
            max_marks: report.assignment.max_marks,
            submitted_count: report.submitted_count,
            total_students: report.total_students,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct DailySummaryResponse {
    pub(crate) date: String,
    pub(crate) present: u32,
    pub(crate) absent: u32,
    pub(crate) late: u32,
    pub(crate) total_marked: u32,
    pub(crate) present_rate: f64,
}

impl From<DailySummary> for DailySummaryResponse {
    fn from(summary: DailySummary) -> Self {
        Self {
            date: format_date(summary.date),
            present: summary.stats.present,
            absent: summary.stats.absent,
            late: summary.stats.late,
            total_marked: summary.stats.total(),
            present_rate: summary.present_rate,
        }
    }
}
