//! In-process record store, optionally seeded from a JSON fixture file.

use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::RecordStore;
use crate::core::models::{
    AssignmentRecord, SubmissionRecord, SubmissionStatus, UserProfile, UserRole,
};
use crate::errors::StoreError;

/// On-disk layout accepted by [`InMemoryStore::from_json_file`].
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RecordDocument {
    #[serde(default)]
    pub users: Vec<UserProfile>,
    #[serde(default)]
    pub assignments: Vec<AssignmentRecord>,
    #[serde(default)]
    pub submissions: Vec<SubmissionRecord>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<RecordDocument>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_document(document: RecordDocument) -> Self {
        Self {
            records: RwLock::new(document),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid record document.
    pub fn from_json_file(path: &Path) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path)?;
        let document: RecordDocument = serde_json::from_str(&raw)?;
        info!(
            "Loaded {} users, {} assignments, {} submissions from {}",
            document.users.len(),
            document.assignments.len(),
            document.submissions.len(),
            path.display()
        );
        Ok(Self::from_document(document))
    }

    /// # Errors
    ///
    /// Returns an error if the store lock has been poisoned.
    pub fn insert_user(&self, user: UserProfile) -> Result<(), StoreError> {
        self.write()?.users.push(user);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the store lock has been poisoned.
    pub fn insert_assignment(&self, assignment: AssignmentRecord) -> Result<(), StoreError> {
        self.write()?.assignments.push(assignment);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the store lock has been poisoned.
    pub fn insert_submission(&self, submission: SubmissionRecord) -> Result<(), StoreError> {
        self.write()?.submissions.push(submission);
        Ok(())
    }

    /// Records a grade and marks the submission graded. Returns `false` when
    /// no submission has the given id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock has been poisoned.
    pub fn grade_submission(
        &self,
        submission_id: &str,
        grade: f64,
        feedback: Option<String>,
    ) -> Result<bool, StoreError> {
        let mut records = self.write()?;
        let Some(submission) = records
            .submissions
            .iter_mut()
            .find(|s| s.id == submission_id)
        else {
            return Ok(false);
        };
        submission.grade = Some(grade);
        submission.feedback = feedback;
        submission.status = SubmissionStatus::Graded;
        Ok(true)
    }

    /// # Errors
    ///
    /// Returns an error if the store lock has been poisoned.
    pub fn all_students(&self) -> Result<Vec<UserProfile>, StoreError> {
        Ok(self
            .read()?
            .users
            .iter()
            .filter(|u| u.role == UserRole::Student)
            .cloned()
            .collect())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, RecordDocument>, StoreError> {
        self.records
            .read()
            .map_err(|e| StoreError::Unavailable(format!("store lock poisoned: {e}")))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, RecordDocument>, StoreError> {
        self.records
            .write()
            .map_err(|e| StoreError::Unavailable(format!("store lock poisoned: {e}")))
    }
}

fn newest_first(mut submissions: Vec<SubmissionRecord>) -> Vec<SubmissionRecord> {
    // Stable sort; undated submissions go last.
    submissions.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    submissions
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn all_assignments(&self) -> Result<Vec<AssignmentRecord>, StoreError> {
        let mut assignments = self.read()?.assignments.clone();
        assignments.sort_by_key(|a| a.due_date);
        Ok(assignments)
    }

    async fn submissions_for_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<SubmissionRecord>, StoreError> {
        let matching = self
            .read()?
            .submissions
            .iter()
            .filter(|s| s.student_id == student_id)
            .cloned()
            .collect();
        Ok(newest_first(matching))
    }

    async fn submissions_for_assignment(
        &self,
        assignment_id: &str,
    ) -> Result<Vec<SubmissionRecord>, StoreError> {
        let matching = self
            .read()?
            .submissions
            .iter()
            .filter(|s| s.assignment_id == assignment_id)
            .cloned()
            .collect();
        Ok(newest_first(matching))
    }

    async fn user_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.read()?.users.iter().find(|u| u.id == user_id).cloned())
    }
}
