//! Pure reductions over ledger query results. No I/O, no hidden state:
//! every function is deterministic in its inputs.

use serde::Serialize;

use crate::db::models::{AssignmentProgress, AttendanceRecord, Student};
use crate::db::types::{AttendanceStatus, ProgressStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub(crate) struct DailyStats {
    pub(crate) present: u32,
    pub(crate) absent: u32,
    pub(crate) late: u32,
}

impl DailyStats {
    pub(crate) fn total(&self) -> u32 {
        self.present + self.absent + self.late
    }
}

pub(crate) fn daily_stats(records: &[AttendanceRecord]) -> DailyStats {
    let mut stats = DailyStats::default();
    for record in records {
        match record.status {
            AttendanceStatus::Present => stats.present += 1,
            AttendanceStatus::Absent => stats.absent += 1,
            AttendanceStatus::Late => stats.late += 1,
        }
    }
    stats
}

/// `present / total * 100`; zero (never a division error) when there are no
/// records. Late counts toward the denominator but not the numerator.
pub(crate) fn student_percentage(records: &[AttendanceRecord]) -> f64 {
    let stats = daily_stats(records);
    let total = stats.total();
    if total == 0 {
        return 0.0;
    }
    f64::from(stats.present) / f64::from(total) * 100.0
}

/// Counts roster students whose record is submitted or graded, against the
/// full roster as denominator. Students with no record count toward the
/// denominator only.
pub(crate) fn assignment_completion(
    progress: &[AssignmentProgress],
    roster: &[Student],
) -> (usize, usize) {
    let submitted = roster
        .iter()
        .filter(|student| {
            progress.iter().any(|record| {
                record.student_id == student.id
                    && matches!(record.status, ProgressStatus::Submitted | ProgressStatus::Graded)
            })
        })
        .count();
    (submitted, roster.len())
}
