use thiserror::Error;

/// Maximum number of response-body characters kept on a transport error.
pub const MAX_ERROR_BODY_CHARS: usize = 200;

/// Failures surfaced by [`crate::ChatbotService::send_message`].
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("OpenAI API key is not configured: {0}")]
    Configuration(String),

    #[error("Failed to read OpenAI response (status {}): {body}", display_status(.status))]
    Transport { status: Option<u16>, body: String },

    #[error("OpenAI API error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("A reply is already in progress")]
    Busy,
}

fn display_status(status: &Option<u16>) -> String {
    status.map_or_else(|| "none".to_string(), |s| s.to_string())
}

/// Structured tag for a [`ChatError`], used to pick user-facing guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transport,
    Upstream,
    Busy,
}

impl ChatError {
    pub fn transport(status: Option<u16>, body: &str) -> Self {
        ChatError::Transport {
            status,
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChatError::Configuration(_) => ErrorKind::Configuration,
            ChatError::Transport { .. } => ErrorKind::Transport,
            ChatError::Upstream { .. } => ErrorKind::Upstream,
            ChatError::Busy => ErrorKind::Busy,
        }
    }

    /// Message suitable for showing to the person chatting.
    #[must_use]
    pub fn user_hint(&self) -> String {
        let advice = match self.kind() {
            ErrorKind::Configuration => {
                "Please configure the OpenAI API key in the environment variables."
            }
            ErrorKind::Upstream => "There was an issue with the AI service. Please try again.",
            ErrorKind::Transport => "Please try again.",
            ErrorKind::Busy => "Please wait for the current reply to finish.",
        };
        format!("Sorry, I encountered an error. {advice}")
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(error: reqwest::Error) -> Self {
        ChatError::transport(error.status().map(|s| s.as_u16()), &error.to_string())
    }
}

/// Failures reported by a [`crate::store::RecordStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to read record file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse records: {0}")]
    Parse(#[from] serde_json::Error),
}
