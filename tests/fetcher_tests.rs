use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use portal_assistant::StoreError;
use portal_assistant::context::{ContextFetcher, FetchStatus};
use portal_assistant::core::models::{
    AssignmentRecord, SubmissionRecord, SubmissionStatus, UserProfile, UserRole,
};
use portal_assistant::store::RecordStore;

/// Store double that records every query and can fail selected ones.
#[derive(Default)]
struct ScriptedStore {
    assignments: Vec<AssignmentRecord>,
    submissions: Vec<SubmissionRecord>,
    fail_assignments: bool,
    fail_assignment_ids: Vec<String>,
    fail_students: bool,
    calls: Mutex<Vec<String>>,
}

impl ScriptedStore {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for ScriptedStore {
    async fn all_assignments(&self) -> Result<Vec<AssignmentRecord>, StoreError> {
        self.calls.lock().unwrap().push("assignments".to_string());
        if self.fail_assignments {
            return Err(StoreError::Unavailable("assignments offline".to_string()));
        }
        Ok(self.assignments.clone())
    }

    async fn submissions_for_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<SubmissionRecord>, StoreError> {
        self.calls.lock().unwrap().push(format!("student:{student_id}"));
        if self.fail_students {
            return Err(StoreError::Unavailable("submissions offline".to_string()));
        }
        Ok(self
            .submissions
            .iter()
            .filter(|s| s.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn submissions_for_assignment(
        &self,
        assignment_id: &str,
    ) -> Result<Vec<SubmissionRecord>, StoreError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("assignment:{assignment_id}"));
        if self.fail_assignment_ids.iter().any(|id| id == assignment_id) {
            return Err(StoreError::Unavailable(format!("{assignment_id} offline")));
        }
        Ok(self
            .submissions
            .iter()
            .filter(|s| s.assignment_id == assignment_id)
            .cloned()
            .collect())
    }

    async fn user_profile(&self, _user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(None)
    }
}

fn assignment(id: &str, created_by: &str) -> AssignmentRecord {
    AssignmentRecord {
        id: id.to_string(),
        title: format!("Title {id}"),
        description: String::new(),
        due_date: NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap(),
        total_points: 100,
        requirements: Vec::new(),
        created_by: created_by.to_string(),
    }
}

fn submission(id: &str, student: &str, assignment: &str) -> SubmissionRecord {
    SubmissionRecord {
        id: id.to_string(),
        student_id: student.to_string(),
        assignment_id: assignment.to_string(),
        content: String::new(),
        submitted_at: None,
        status: SubmissionStatus::Submitted,
        grade: None,
        feedback: None,
    }
}

fn sample_store() -> ScriptedStore {
    ScriptedStore {
        assignments: vec![
            assignment("a1", "t1"),
            assignment("a2", "t2"),
            assignment("a3", "t1"),
            assignment("a4", "t1"),
        ],
        submissions: vec![
            submission("s1", "stu1", "a3"),
            submission("s2", "stu1", "a1"),
            submission("s3", "stu2", "a1"),
            submission("s4", "stu2", "a2"),
        ],
        ..ScriptedStore::default()
    }
}

#[tokio::test]
async fn test_teacher_fetch_queries_once_per_owned_assignment() {
    let store = Arc::new(sample_store());
    let fetcher = ContextFetcher::new(store.clone());

    let outcome = fetcher.fetch("t1", UserRole::Teacher).await;

    assert_eq!(
        store.calls(),
        vec!["assignments", "assignment:a1", "assignment:a3", "assignment:a4"]
    );
    assert_eq!(outcome.status, FetchStatus::Complete);

    let ids: Vec<&str> = outcome
        .snapshot
        .assignments
        .iter()
        .map(|a| a.id.as_str())
        .collect();
    assert_eq!(ids, vec!["a1", "a3", "a4"]);

    // Aggregated per assignment, in assignment order.
    let subs: Vec<&str> = outcome
        .snapshot
        .submissions
        .iter()
        .map(|s| s.id.as_str())
        .collect();
    assert_eq!(subs, vec!["s2", "s3", "s1"]);
}

#[tokio::test]
async fn test_student_fetch_scopes_submissions() {
    let store = Arc::new(sample_store());
    let fetcher = ContextFetcher::new(store.clone());

    let outcome = fetcher.fetch("stu2", UserRole::Student).await;

    assert_eq!(store.calls(), vec!["assignments", "student:stu2"]);
    assert!(outcome.is_complete());
    assert_eq!(outcome.snapshot.assignments.len(), 4);
    assert!(
        outcome
            .snapshot
            .submissions
            .iter()
            .all(|s| s.student_id == "stu2")
    );
    assert_eq!(outcome.snapshot.role, UserRole::Student);
    assert_eq!(outcome.snapshot.subject_id, "stu2");
}

#[tokio::test]
async fn test_partial_failure_keeps_gathered_records() {
    let store = Arc::new(ScriptedStore {
        fail_assignment_ids: vec!["a3".to_string()],
        ..sample_store()
    });
    let fetcher = ContextFetcher::new(store.clone());

    let outcome = fetcher.fetch("t1", UserRole::Teacher).await;

    // The failed query is not retried and later ones still run.
    assert_eq!(
        store.calls(),
        vec!["assignments", "assignment:a1", "assignment:a3", "assignment:a4"]
    );
    match &outcome.status {
        FetchStatus::Partial { failures } => {
            assert_eq!(failures.len(), 1);
            assert!(failures[0].contains("a3"));
        }
        other => panic!("Expected Partial, got: {other:?}"),
    }
    assert_eq!(outcome.snapshot.submissions.len(), 2);
}

#[tokio::test]
async fn test_total_failure_yields_empty_snapshot() {
    let store = Arc::new(ScriptedStore {
        fail_assignments: true,
        fail_students: true,
        ..sample_store()
    });
    let fetcher = ContextFetcher::new(store);

    let outcome = fetcher.fetch("stu1", UserRole::Student).await;

    match &outcome.status {
        FetchStatus::Failed { failures } => assert_eq!(failures.len(), 2),
        other => panic!("Expected Failed, got: {other:?}"),
    }
    assert!(outcome.snapshot.assignments.is_empty());
    assert!(outcome.snapshot.submissions.is_empty());
}

#[tokio::test]
async fn test_teacher_with_no_assignments_list_is_failed() {
    let store = Arc::new(ScriptedStore {
        fail_assignments: true,
        ..sample_store()
    });
    let fetcher = ContextFetcher::new(store.clone());

    let outcome = fetcher.fetch("t1", UserRole::Teacher).await;

    assert_eq!(store.calls(), vec!["assignments"]);
    assert!(matches!(outcome.status, FetchStatus::Failed { .. }));
}
