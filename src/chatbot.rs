//! The assistant session: bounded history plus one completion call per message.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{error, info};

use crate::ai::client::{CompletionRequest, CompletionTransport, parse_completion};
use crate::ai::estimate_tokens;
use crate::ai::prompt_builder::{build_messages, build_system_prompt};
use crate::context::summarizer::summarize_with_limit;
use crate::conversation::{ChatTurn, Conversation};
use crate::core::config::AppConfig;
use crate::core::models::ContextSnapshot;
use crate::errors::ChatError;

/// Marks the service busy for as long as it is alive.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, ChatError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ChatError::Busy)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One chat session. Either idle or awaiting a single reply; a second
/// [`send_message`](Self::send_message) while a reply is pending fails with
/// [`ChatError::Busy`].
pub struct ChatbotService {
    config: AppConfig,
    transport: Arc<dyn CompletionTransport>,
    conversation: Mutex<Conversation>,
    in_flight: AtomicBool,
}

impl ChatbotService {
    pub fn new(config: AppConfig, transport: Arc<dyn CompletionTransport>) -> Self {
        let conversation = Conversation::new(config.history_limit);
        Self {
            config,
            transport,
            conversation: Mutex::new(conversation),
            in_flight: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Sends `user_text` with the given context and returns the assistant's reply.
    ///
    /// The user turn stays in the history even when the call fails.
    ///
    /// # Errors
    ///
    /// [`ChatError::Configuration`] without an API key (no request is made),
    /// [`ChatError::Busy`] while another reply is pending, and
    /// [`ChatError::Transport`] / [`ChatError::Upstream`] for failed calls.
    pub async fn send_message(
        &self,
        user_text: &str,
        snapshot: &ContextSnapshot,
        max_tokens: u32,
    ) -> Result<String, ChatError> {
        let Some(api_key) = self.config.openai_api_key.as_deref() else {
            return Err(ChatError::Configuration(
                "Please set the OPENAI_API_KEY environment variable.".to_string(),
            ));
        };

        let _in_flight = InFlight::acquire(&self.in_flight)?;

        let history = {
            let mut conversation = self.lock_conversation();
            conversation.append(ChatTurn::user(user_text));
            conversation.snapshot()
        };

        let context = summarize_with_limit(snapshot, self.config.max_context_chars);
        let system_prompt = build_system_prompt(&context);

        #[cfg(feature = "debug-logs")]
        info!("Using system prompt:\n{}", system_prompt);

        let request = CompletionRequest {
            model: self.config.openai_model.clone(),
            messages: build_messages(system_prompt, history),
            max_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
        };

        let estimated_input_tokens = request
            .messages
            .iter()
            .map(|m| estimate_tokens(&m.content))
            .sum::<usize>();
        info!(
            "Sending {} messages for {} {} (estimated {} input tokens, max {} output)",
            request.messages.len(),
            snapshot.role,
            snapshot.subject_id,
            estimated_input_tokens,
            max_tokens
        );

        let result = match self
            .transport
            .post(&self.config.completion_endpoint, api_key, &request)
            .await
        {
            Ok(reply) => parse_completion(&reply),
            Err(e) => Err(e),
        };

        match result {
            Ok(text) => {
                self.lock_conversation()
                    .append(ChatTurn::assistant(text.clone()));
                Ok(text)
            }
            Err(e) => {
                error!("Error sending message to chatbot: {}", e);
                Err(e)
            }
        }
    }

    /// [`send_message`](Self::send_message) with the configured token cap.
    ///
    /// # Errors
    ///
    /// Same as [`send_message`](Self::send_message).
    pub async fn send(
        &self,
        user_text: &str,
        snapshot: &ContextSnapshot,
    ) -> Result<String, ChatError> {
        self.send_message(user_text, snapshot, self.config.max_tokens)
            .await
    }

    pub fn clear_history(&self) {
        self.lock_conversation().clear();
    }

    #[must_use]
    pub fn history(&self) -> Vec<ChatTurn> {
        self.lock_conversation().snapshot()
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    // History stays usable after a panic elsewhere; every mutation leaves it
    // within bound.
    fn lock_conversation(&self) -> MutexGuard<'_, Conversation> {
        self.conversation
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
