//! Renders a [`ContextSnapshot`] as the plain-text block appended to the
//! assistant's system prompt.

use std::fmt::Write as _;

use crate::core::config::DEFAULT_CONTEXT_CHARS;
use crate::core::models::{AssignmentRecord, ContextSnapshot, SubmissionRecord, UserRole};

pub const TRUNCATION_MARKER: &str = "\n[context truncated]\n";

#[must_use]
pub fn summarize(snapshot: &ContextSnapshot) -> String {
    summarize_with_limit(snapshot, DEFAULT_CONTEXT_CHARS)
}

/// Like [`summarize`], capping the output at `max_chars` characters.
/// Truncated output ends with [`TRUNCATION_MARKER`], counted in the cap; a cap
/// too small to hold the marker cuts the text without it.
#[must_use]
pub fn summarize_with_limit(snapshot: &ContextSnapshot, max_chars: usize) -> String {
    let full = match snapshot.role {
        UserRole::Student => student_context(snapshot),
        UserRole::Teacher => teacher_context(snapshot),
    };
    truncate_chars(full, max_chars)
}

fn truncate_chars(text: String, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text;
    }
    let marker_chars = TRUNCATION_MARKER.chars().count();
    if max_chars <= marker_chars {
        return text.chars().take(max_chars).collect();
    }
    let mut out: String = text.chars().take(max_chars - marker_chars).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

fn find_assignment<'a>(
    assignments: &'a [AssignmentRecord],
    id: &str,
) -> Option<&'a AssignmentRecord> {
    assignments.iter().find(|a| a.id == id)
}

fn student_context(snapshot: &ContextSnapshot) -> String {
    let mut out = String::from("\n[STUDENT CONTEXT]\n");

    let pending = snapshot
        .assignments
        .iter()
        .filter(|a| {
            !snapshot
                .submissions
                .iter()
                .any(|s| s.assignment_id == a.id)
        })
        .count();

    let submitted: Vec<String> = snapshot
        .submissions
        .iter()
        .map(|s| {
            let assignment = find_assignment(&snapshot.assignments, &s.assignment_id);
            let title = assignment.map_or("Unknown", |a| a.title.as_str());
            let grade = match (s.grade, assignment) {
                (Some(grade), Some(a)) => format!("{grade}/{}", a.total_points),
                (Some(grade), None) => format!("{grade}/?"),
                (None, _) => "Pending".to_string(),
            };
            format!("- {title} (Grade: {grade})")
        })
        .collect();

    let _ = writeln!(out, "Pending Assignments: {pending}");
    if !submitted.is_empty() {
        let _ = writeln!(out, "Submitted/Graded: {}", submitted.join(", "));
    }
    out
}

fn teacher_context(snapshot: &ContextSnapshot) -> String {
    let mut out = String::from("\n[TEACHER CONTEXT]\n");

    let owned: Vec<&AssignmentRecord> = snapshot
        .assignments
        .iter()
        .filter(|a| a.created_by == snapshot.subject_id)
        .collect();
    let pending_grading = snapshot
        .submissions
        .iter()
        .filter(|s| !s.is_graded())
        .count();

    let _ = writeln!(out, "Total Assignments Created: {}", owned.len());
    let _ = writeln!(out, "Total Submissions: {}", snapshot.submissions.len());
    let _ = writeln!(out, "Pending Grading: {pending_grading}");

    if !owned.is_empty() {
        out.push_str("\nAssignments:\n");
        for assignment in &owned {
            let (total, graded) = counts_for(&snapshot.submissions, &assignment.id);
            let _ = writeln!(
                out,
                "- \"{}\" (ID: {}): {total} submissions, {graded} graded",
                assignment.title, assignment.id
            );
        }
    }

    if !snapshot.submissions.is_empty() {
        out.push_str("\nSubmissions Summary:\n");
        let mut seen: Vec<&str> = Vec::new();
        for submission in &snapshot.submissions {
            if !seen.contains(&submission.assignment_id.as_str()) {
                seen.push(&submission.assignment_id);
            }
        }
        for assignment_id in seen {
            let title = owned
                .iter()
                .find(|a| a.id == assignment_id)
                .map_or("Unknown", |a| a.title.as_str());
            let (total, graded) = counts_for(&snapshot.submissions, assignment_id);
            let _ = writeln!(
                out,
                "- \"{title}\": {total} submissions ({graded} graded, {} pending)",
                total - graded
            );
        }
    }

    out
}

fn counts_for(submissions: &[SubmissionRecord], assignment_id: &str) -> (usize, usize) {
    submissions
        .iter()
        .filter(|s| s.assignment_id == assignment_id)
        .fold((0, 0), |(total, graded), s| {
            (total + 1, graded + usize::from(s.is_graded()))
        })
}
