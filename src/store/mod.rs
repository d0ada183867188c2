pub(crate) mod memory;
pub(crate) mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use time::Date;

use crate::db::models::{Assignment, AssignmentProgress, AttendanceRecord, Student};
use crate::db::types::ProgressStatus;

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result of a compare-and-write against a progress key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CasOutcome {
    Applied,
    /// The stored status did not match the expected one; nothing was written.
    PreconditionFailed,
}

/// Persistence contract for the two ledgers and the read-side catalog.
///
/// Writes to a single key are serialized by the backend: `put_attendance` is a
/// last-write-wins upsert, and `compare_and_put_progress` applies its guard and
/// write as one atomic unit. Readers never observe a partially written record.
#[async_trait]
pub(crate) trait RecordStore: Send + Sync {
    async fn health(&self) -> Result<(), StoreError>;

    // Catalog. Students and assignments are owned by external collaborators;
    // the upserts exist for bootstrap/seeding only.
    async fn list_students(&self) -> Result<Vec<Student>, StoreError>;
    async fn get_student(&self, id: &str) -> Result<Option<Student>, StoreError>;
    async fn upsert_student(&self, student: Student) -> Result<(), StoreError>;
    async fn get_assignment(&self, id: &str) -> Result<Option<Assignment>, StoreError>;
    async fn upsert_assignment(&self, assignment: Assignment) -> Result<(), StoreError>;

    // Attendance ledger: at most one record per (student_id, date).
    async fn put_attendance(&self, record: AttendanceRecord) -> Result<(), StoreError>;
    async fn scan_attendance_by_date(
        &self,
        date: Date,
    ) -> Result<Vec<AttendanceRecord>, StoreError>;
    /// Records for one student with `date` in `[start, end]`, ordered by date.
    async fn scan_attendance_range(
        &self,
        student_id: &str,
        start: Date,
        end: Date,
    ) -> Result<Vec<AttendanceRecord>, StoreError>;
    /// Records for all students with `date` in `[start, end]`.
    async fn scan_attendance_between(
        &self,
        start: Date,
        end: Date,
    ) -> Result<Vec<AttendanceRecord>, StoreError>;

    // Progress ledger: at most one record per (assignment_id, student_id).
    async fn get_progress(
        &self,
        assignment_id: &str,
        student_id: &str,
    ) -> Result<Option<AssignmentProgress>, StoreError>;
    async fn scan_progress_by_assignment(
        &self,
        assignment_id: &str,
    ) -> Result<Vec<AssignmentProgress>, StoreError>;
    /// Writes `record` only while the stored status for its key equals
    /// `expected`. `ProgressStatus::Pending` also matches a missing record,
    /// mirroring the "no record means pending" rule.
    async fn compare_and_put_progress(
        &self,
        expected: ProgressStatus,
        record: AssignmentProgress,
    ) -> Result<CasOutcome, StoreError>;
    /// Flags an existing record as viewed by the teacher. Returns `false` when
    /// no record exists for the key.
    async fn set_progress_viewed(
        &self,
        assignment_id: &str,
        student_id: &str,
        now: time::PrimitiveDateTime,
    ) -> Result<bool, StoreError>;
}
