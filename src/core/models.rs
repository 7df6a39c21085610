use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Teacher,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Student => write!(f, "student"),
            UserRole::Teacher => write!(f, "teacher"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(UserRole::Student),
            "teacher" => Ok(UserRole::Teacher),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "deserialize_due_date")]
    pub due_date: NaiveDateTime,
    pub total_points: u32,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub created_by: String,
}

/// Parses a due date written as `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM` (what a
/// `datetime-local` input produces) or `YYYY-MM-DDTHH:MM:SS`. A bare date
/// means midnight.
///
/// # Errors
///
/// Returns a message naming the value when none of the formats match.
pub fn parse_due_date(raw: &str) -> Result<NaiveDateTime, String> {
    let raw = raw.trim();
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(parsed);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.and_time(chrono::NaiveTime::MIN))
        .map_err(|_| format!("invalid due date: {raw}"))
}

fn deserialize_due_date<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_due_date(&raw).map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Submitted,
    Graded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: String,
    pub student_id: String,
    pub assignment_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    pub status: SubmissionStatus,
    #[serde(default)]
    pub grade: Option<f64>,
    #[serde(default)]
    pub feedback: Option<String>,
}

impl SubmissionRecord {
    #[must_use]
    pub fn is_graded(&self) -> bool {
        self.status == SubmissionStatus::Graded
    }
}

/// Point-in-time bundle of records used to build the assistant's context.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSnapshot {
    pub assignments: Vec<AssignmentRecord>,
    pub submissions: Vec<SubmissionRecord>,
    pub role: UserRole,
    pub subject_id: String,
}

impl ContextSnapshot {
    pub fn empty(subject_id: impl Into<String>, role: UserRole) -> Self {
        Self {
            assignments: Vec::new(),
            submissions: Vec::new(),
            role,
            subject_id: subject_id.into(),
        }
    }
}
