use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use time::{Date, PrimitiveDateTime};

use crate::db::models::{Assignment, AssignmentProgress, AttendanceRecord, Student};
use crate::db::types::ProgressStatus;
use crate::store::{CasOutcome, RecordStore, StoreError};

/// In-memory adapter. Backs the test harness and the ephemeral dev backend;
/// each record family sits behind its own mutex so the CAS guard and write
/// apply under one lock.
#[derive(Default)]
pub(crate) struct MemoryStore {
    students: Mutex<BTreeMap<String, Student>>,
    assignments: Mutex<HashMap<String, Assignment>>,
    attendance: Mutex<BTreeMap<(String, Date), AttendanceRecord>>,
    progress: Mutex<HashMap<(String, String), AssignmentProgress>>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn health(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_students(&self) -> Result<Vec<Student>, StoreError> {
        let students = self.students.lock().expect("students lock");
        let mut roster: Vec<Student> = students.values().cloned().collect();
        // Roster order is full_name ascending with id as tiebreak.
        roster.sort_by(|a, b| a.full_name.cmp(&b.full_name).then_with(|| a.id.cmp(&b.id)));
        Ok(roster)
    }

    async fn get_student(&self, id: &str) -> Result<Option<Student>, StoreError> {
        let students = self.students.lock().expect("students lock");
        Ok(students.get(id).cloned())
    }

    async fn upsert_student(&self, student: Student) -> Result<(), StoreError> {
        let mut students = self.students.lock().expect("students lock");
        students.insert(student.id.clone(), student);
        Ok(())
    }

    async fn get_assignment(&self, id: &str) -> Result<Option<Assignment>, StoreError> {
        let assignments = self.assignments.lock().expect("assignments lock");
        Ok(assignments.get(id).cloned())
    }

    async fn upsert_assignment(&self, assignment: Assignment) -> Result<(), StoreError> {
        let mut assignments = self.assignments.lock().expect("assignments lock");
        assignments.insert(assignment.id.clone(), assignment);
        Ok(())
    }

    async fn put_attendance(&self, record: AttendanceRecord) -> Result<(), StoreError> {
        let mut attendance = self.attendance.lock().expect("attendance lock");
        attendance.insert((record.student_id.clone(), record.date), record);
        Ok(())
    }

    async fn scan_attendance_by_date(
        &self,
        date: Date,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let attendance = self.attendance.lock().expect("attendance lock");
        Ok(attendance.values().filter(|record| record.date == date).cloned().collect())
    }

    async fn scan_attendance_range(
        &self,
        student_id: &str,
        start: Date,
        end: Date,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let attendance = self.attendance.lock().expect("attendance lock");
        let lower = (student_id.to_string(), start);
        let upper = (student_id.to_string(), end);
        Ok(attendance.range(lower..=upper).map(|(_, record)| record.clone()).collect())
    }

    async fn scan_attendance_between(
        &self,
        start: Date,
        end: Date,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let attendance = self.attendance.lock().expect("attendance lock");
        Ok(attendance
            .values()
            .filter(|record| record.date >= start && record.date <= end)
            .cloned()
            .collect())
    }

    async fn get_progress(
        &self,
        assignment_id: &str,
        student_id: &str,
    ) -> Result<Option<AssignmentProgress>, StoreError> {
        let progress = self.progress.lock().expect("progress lock");
        Ok(progress.get(&(assignment_id.to_string(), student_id.to_string())).cloned())
    }

    async fn scan_progress_by_assignment(
        &self,
        assignment_id: &str,
    ) -> Result<Vec<AssignmentProgress>, StoreError> {
        let progress = self.progress.lock().expect("progress lock");
        Ok(progress
            .values()
            .filter(|record| record.assignment_id == assignment_id)
            .cloned()
            .collect())
    }

    async fn compare_and_put_progress(
        &self,
        expected: ProgressStatus,
        record: AssignmentProgress,
    ) -> Result<CasOutcome, StoreError> {
        let mut progress = self.progress.lock().expect("progress lock");
        let key = (record.assignment_id.clone(), record.student_id.clone());

        let current = progress.get(&key).map(|existing| existing.status);
        let matches = match current {
            Some(status) => status == expected,
            None => expected == ProgressStatus::Pending,
        };

        if !matches {
            return Ok(CasOutcome::PreconditionFailed);
        }

        progress.insert(key, record);
        Ok(CasOutcome::Applied)
    }

    async fn set_progress_viewed(
        &self,
        assignment_id: &str,
        student_id: &str,
        now: PrimitiveDateTime,
    ) -> Result<bool, StoreError> {
        let mut progress = self.progress.lock().expect("progress lock");
        let key = (assignment_id.to_string(), student_id.to_string());
        match progress.get_mut(&key) {
            Some(record) => {
                record.teacher_viewed = true;
                record.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
