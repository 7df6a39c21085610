//! Gathers the records a user is allowed to see into a [`ContextSnapshot`].

use std::sync::Arc;

use tracing::{info, warn};

use crate::core::models::{ContextSnapshot, UserRole};
use crate::store::RecordStore;

/// How much of the requested context was actually retrieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Complete,
    /// Some queries failed; the snapshot holds what the others returned.
    Partial { failures: Vec<String> },
    /// No query succeeded; the snapshot is empty.
    Failed { failures: Vec<String> },
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub snapshot: ContextSnapshot,
    pub status: FetchStatus,
}

impl FetchOutcome {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == FetchStatus::Complete
    }
}

pub struct ContextFetcher {
    store: Arc<dyn RecordStore>,
}

impl ContextFetcher {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Fetches the snapshot for `subject_id`. Failed queries are logged and
    /// reported in the outcome's status; they are never retried.
    pub async fn fetch(&self, subject_id: &str, role: UserRole) -> FetchOutcome {
        let mut snapshot = ContextSnapshot::empty(subject_id, role);
        let mut failures = Vec::new();
        let mut succeeded = 0usize;

        match self.store.all_assignments().await {
            Ok(assignments) => {
                snapshot.assignments = assignments;
                succeeded += 1;
            }
            Err(e) => {
                warn!("Failed to load assignments for {}: {}", subject_id, e);
                failures.push(format!("assignments: {e}"));
            }
        }

        match role {
            UserRole::Student => match self.store.submissions_for_student(subject_id).await {
                Ok(submissions) => {
                    snapshot.submissions = submissions;
                    succeeded += 1;
                }
                Err(e) => {
                    warn!("Failed to load submissions for student {}: {}", subject_id, e);
                    failures.push(format!("submissions for student {subject_id}: {e}"));
                }
            },
            UserRole::Teacher => {
                snapshot
                    .assignments
                    .retain(|a| a.created_by == subject_id);

                // One query per assignment, in assignment order.
                for assignment in &snapshot.assignments {
                    match self.store.submissions_for_assignment(&assignment.id).await {
                        Ok(submissions) => {
                            snapshot.submissions.extend(submissions);
                            succeeded += 1;
                        }
                        Err(e) => {
                            warn!(
                                "Failed to load submissions for assignment {}: {}",
                                assignment.id, e
                            );
                            failures.push(format!(
                                "submissions for assignment {}: {e}",
                                assignment.id
                            ));
                        }
                    }
                }
            }
        }

        let status = if failures.is_empty() {
            FetchStatus::Complete
        } else if succeeded == 0 {
            FetchStatus::Failed { failures }
        } else {
            FetchStatus::Partial { failures }
        };

        info!(
            "Fetched {} context for {}: {} assignments, {} submissions ({:?})",
            role,
            subject_id,
            snapshot.assignments.len(),
            snapshot.submissions.len(),
            status
        );

        FetchOutcome { snapshot, status }
    }
}
