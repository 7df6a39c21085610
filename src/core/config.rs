use std::env;
use std::str::FromStr;

use url::Url;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MAX_TOKENS: u32 = 200;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TOP_P: f32 = 0.9;
/// Six turns, i.e. three user/assistant exchanges.
pub const DEFAULT_HISTORY_LIMIT: usize = 6;
pub const DEFAULT_CONTEXT_CHARS: usize = 4000;
pub const MAX_HISTORY_LIMIT: usize = 100;

#[derive(Clone)]
pub struct AppConfig {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub completion_endpoint: Url,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub history_limit: usize,
    pub max_context_chars: usize,
}

// Keeps the credential out of logs.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "***"))
            .field("openai_model", &self.openai_model)
            .field("completion_endpoint", &self.completion_endpoint.as_str())
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("history_limit", &self.history_limit)
            .field("max_context_chars", &self.max_context_chars)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_model: DEFAULT_MODEL.to_string(),
            completion_endpoint: Url::parse(DEFAULT_ENDPOINT)
                .unwrap_or_else(|_| unreachable!("default endpoint is a valid URL")),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            history_limit: DEFAULT_HISTORY_LIMIT,
            max_context_chars: DEFAULT_CONTEXT_CHARS,
        }
    }
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns the offending variable name when a value cannot be parsed.
    /// A missing `OPENAI_API_KEY` is not an error here; it is reported when
    /// a message is sent.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// # Errors
    ///
    /// Same as [`AppConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let openai_api_key = lookup("OPENAI_API_KEY").and_then(normalize_api_key);

        let openai_model = lookup("OPENAI_MODEL")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(defaults.openai_model);

        let completion_endpoint = match lookup("OPENAI_API_ENDPOINT") {
            Some(raw) => {
                Url::parse(raw.trim()).map_err(|e| format!("OPENAI_API_ENDPOINT: {e}"))?
            }
            None => defaults.completion_endpoint,
        };

        let history_limit = parse_var(&lookup, "ASSISTANT_HISTORY_LIMIT", defaults.history_limit)?;
        if !(1..=MAX_HISTORY_LIMIT).contains(&history_limit) {
            return Err(format!(
                "ASSISTANT_HISTORY_LIMIT: must be between 1 and {MAX_HISTORY_LIMIT}"
            ));
        }

        Ok(Self {
            openai_api_key,
            openai_model,
            completion_endpoint,
            max_tokens: parse_var(&lookup, "ASSISTANT_MAX_TOKENS", defaults.max_tokens)?,
            temperature: parse_var(&lookup, "ASSISTANT_TEMPERATURE", defaults.temperature)?,
            top_p: parse_var(&lookup, "ASSISTANT_TOP_P", defaults.top_p)?,
            history_limit,
            max_context_chars: parse_var(
                &lookup,
                "ASSISTANT_CONTEXT_CHARS",
                defaults.max_context_chars,
            )?,
        })
    }

    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = normalize_api_key(key.into());
        self
    }
}

fn normalize_api_key(raw: String) -> Option<String> {
    let key = raw.trim();
    (!key.is_empty()).then(|| key.to_string())
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, String>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e| format!("{key}: {e}")),
        None => Ok(default),
    }
}
