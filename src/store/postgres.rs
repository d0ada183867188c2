use async_trait::async_trait;
use sqlx::PgPool;
use time::{Date, PrimitiveDateTime};

use crate::db::models::{Assignment, AssignmentProgress, AttendanceRecord, Student};
use crate::db::types::ProgressStatus;
use crate::store::{CasOutcome, RecordStore, StoreError};

const ATTENDANCE_COLUMNS: &str = "student_id, date, status, marked_by, marked_at";
const PROGRESS_COLUMNS: &str =
    "assignment_id, student_id, status, marks, teacher_viewed, submitted_at, updated_at";
const ASSIGNMENT_COLUMNS: &str = "id, subject_id, title, max_marks, due_date, created_at";

/// Production adapter. Per-key atomicity comes from single-statement
/// conditional upserts, so the guard and the write commit together.
pub(crate) struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PostgresStore {
    async fn health(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_students(&self) -> Result<Vec<Student>, StoreError> {
        let students = sqlx::query_as::<_, Student>(
            "SELECT id, full_name FROM students ORDER BY full_name, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(students)
    }

    async fn get_student(&self, id: &str) -> Result<Option<Student>, StoreError> {
        let student =
            sqlx::query_as::<_, Student>("SELECT id, full_name FROM students WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(student)
    }

    async fn upsert_student(&self, student: Student) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO students (id, full_name) VALUES ($1, $2)
             ON CONFLICT (id) DO UPDATE SET full_name = excluded.full_name",
        )
        .bind(&student.id)
        .bind(&student.full_name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_assignment(&self, id: &str) -> Result<Option<Assignment>, StoreError> {
        let assignment = sqlx::query_as::<_, Assignment>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(assignment)
    }

    async fn upsert_assignment(&self, assignment: Assignment) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO assignments (id, subject_id, title, max_marks, due_date, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (id) DO UPDATE SET
               subject_id = excluded.subject_id,
               title = excluded.title,
               max_marks = excluded.max_marks,
               due_date = excluded.due_date",
        )
        .bind(&assignment.id)
        .bind(&assignment.subject_id)
        .bind(&assignment.title)
        .bind(assignment.max_marks)
        .bind(assignment.due_date)
        .bind(assignment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn put_attendance(&self, record: AttendanceRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO attendance_records (student_id, date, status, marked_by, marked_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (student_id, date) DO UPDATE SET
               status = excluded.status,
               marked_by = excluded.marked_by,
               marked_at = excluded.marked_at",
        )
        .bind(&record.student_id)
        .bind(record.date)
        .bind(record.status)
        .bind(&record.marked_by)
        .bind(record.marked_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn scan_attendance_by_date(
        &self,
        date: Date,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let records = sqlx::query_as::<_, AttendanceRecord>(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance_records WHERE date = $1"
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn scan_attendance_range(
        &self,
        student_id: &str,
        start: Date,
        end: Date,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let records = sqlx::query_as::<_, AttendanceRecord>(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance_records
             WHERE student_id = $1 AND date >= $2 AND date <= $3
             ORDER BY date"
        ))
        .bind(student_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn scan_attendance_between(
        &self,
        start: Date,
        end: Date,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let records = sqlx::query_as::<_, AttendanceRecord>(&format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance_records
             WHERE date >= $1 AND date <= $2
             ORDER BY student_id, date"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn get_progress(
        &self,
        assignment_id: &str,
        student_id: &str,
    ) -> Result<Option<AssignmentProgress>, StoreError> {
        let record = sqlx::query_as::<_, AssignmentProgress>(&format!(
            "SELECT {PROGRESS_COLUMNS} FROM assignment_progress
             WHERE assignment_id = $1 AND student_id = $2"
        ))
        .bind(assignment_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn scan_progress_by_assignment(
        &self,
        assignment_id: &str,
    ) -> Result<Vec<AssignmentProgress>, StoreError> {
        let records = sqlx::query_as::<_, AssignmentProgress>(&format!(
            "SELECT {PROGRESS_COLUMNS} FROM assignment_progress WHERE assignment_id = $1"
        ))
        .bind(assignment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn compare_and_put_progress(
        &self,
        expected: ProgressStatus,
        record: AssignmentProgress,
    ) -> Result<CasOutcome, StoreError> {
        // Pending also matches a missing row, so the guard for pending keys is
        // expressed on the upsert's conflict arm.
        let result = if expected == ProgressStatus::Pending {
            sqlx::query(
                "INSERT INTO assignment_progress
                   (assignment_id, student_id, status, marks, teacher_viewed, submitted_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 ON CONFLICT (assignment_id, student_id) DO UPDATE SET
                   status = excluded.status,
                   marks = excluded.marks,
                   teacher_viewed = excluded.teacher_viewed,
                   submitted_at = excluded.submitted_at,
                   updated_at = excluded.updated_at
                 WHERE assignment_progress.status = 'pending'",
            )
            .bind(&record.assignment_id)
            .bind(&record.student_id)
            .bind(record.status)
            .bind(record.marks)
            .bind(record.teacher_viewed)
            .bind(record.submitted_at)
            .bind(record.updated_at)
            .execute(&self.pool)
            .await?
        } else {
            sqlx::query(
                "UPDATE assignment_progress SET
                   status = $3,
                   marks = $4,
                   teacher_viewed = $5,
                   submitted_at = $6,
                   updated_at = $7
                 WHERE assignment_id = $1 AND student_id = $2 AND status = $8",
            )
            .bind(&record.assignment_id)
            .bind(&record.student_id)
            .bind(record.status)
            .bind(record.marks)
            .bind(record.teacher_viewed)
            .bind(record.submitted_at)
            .bind(record.updated_at)
            .bind(expected)
            .execute(&self.pool)
            .await?
        };

        if result.rows_affected() == 1 {
            Ok(CasOutcome::Applied)
        } else {
            Ok(CasOutcome::PreconditionFailed)
        }
    }

    async fn set_progress_viewed(
        &self,
        assignment_id: &str,
        student_id: &str,
        now: PrimitiveDateTime,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE assignment_progress SET teacher_viewed = TRUE, updated_at = $3
             WHERE assignment_id = $1 AND student_id = $2",
        )
        .bind(assignment_id)
        .bind(student_id)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
