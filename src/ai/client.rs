//! Chat-completion API client
//!
//! Wire types for the `/v1/chat/completions` endpoint, the transport seam the
//! chatbot sends through, and classification of replies into [`ChatError`]s.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::conversation::ChatTurn;
use crate::errors::ChatError;

/// Returned when the provider answers successfully but without any text.
pub const FALLBACK_REPLY: &str = "I could not generate a response.";

#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4 + 1
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatTurn>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

/// Raw status and body of a completion call, before interpretation.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Sends one completion request and hands back whatever the server replied.
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ChatError::Transport`] when no reply could be obtained.
    async fn post(
        &self,
        endpoint: &Url,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<HttpReply, ChatError>;
}

/// [`CompletionTransport`] over HTTPS using `reqwest`.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, ChatError> {
        let client = Client::builder().build().map_err(|e| {
            ChatError::transport(None, &format!("Failed to build HTTP client: {e}"))
        })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl CompletionTransport for HttpTransport {
    async fn post(
        &self,
        endpoint: &Url,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<HttpReply, ChatError> {
        let response = self
            .client
            .post(endpoint.clone())
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            ChatError::transport(Some(status), &format!("Failed to read response body: {e}"))
        })?;

        Ok(HttpReply { status, body })
    }
}

/// Interprets a completion reply.
///
/// # Errors
///
/// [`ChatError::Transport`] if the body is not a completion payload,
/// [`ChatError::Upstream`] if the status is not a success.
pub fn parse_completion(reply: &HttpReply) -> Result<String, ChatError> {
    let parsed: CompletionResponse = serde_json::from_str(&reply.body)
        .map_err(|_| ChatError::transport(Some(reply.status), &reply.body))?;

    if !(200..300).contains(&reply.status) {
        let message = parsed
            .error
            .and_then(|e| e.message)
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(ChatError::Upstream {
            status: reply.status,
            message,
        });
    }

    let text = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| FALLBACK_REPLY.to_string());

    Ok(text)
}
