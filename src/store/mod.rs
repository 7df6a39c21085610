//! Read access to the portal's user, assignment and submission records.

pub mod memory;

use async_trait::async_trait;

use crate::core::models::{AssignmentRecord, SubmissionRecord, UserProfile};
use crate::errors::StoreError;

pub use memory::InMemoryStore;

/// Queries the assistant issues against the portal's document store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every assignment, ordered by due date (earliest first).
    async fn all_assignments(&self) -> Result<Vec<AssignmentRecord>, StoreError>;

    /// A student's submissions, newest first.
    async fn submissions_for_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<SubmissionRecord>, StoreError>;

    /// Submissions made against one assignment, newest first.
    async fn submissions_for_assignment(
        &self,
        assignment_id: &str,
    ) -> Result<Vec<SubmissionRecord>, StoreError>;

    async fn user_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError>;
}
