/// Portal Assistant - the chat helper of the Assignment Portal.
///
/// Teachers and students ask questions about their assignments and
/// submissions; the assistant answers using a hosted chat-completion model
/// primed with a summary of the records that user is allowed to see.
///
/// # Architecture
///
/// - [`store`]: read queries against the portal's records
/// - [`context`]: role-scoped fetching and summarization of those records
/// - [`conversation`]: the bounded window of recent turns
/// - [`ai`]: completion request/response types and the HTTP transport
/// - [`chatbot`]: the session tying them together
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use portal_assistant::ai::HttpTransport;
/// use portal_assistant::context::ContextFetcher;
/// use portal_assistant::core::config::AppConfig;
/// use portal_assistant::core::models::UserRole;
/// use portal_assistant::store::InMemoryStore;
/// use portal_assistant::ChatbotService;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     portal_assistant::setup_logging();
///
///     let config = AppConfig::from_env()?;
///     let store = InMemoryStore::from_json_file(std::path::Path::new("portal.json"))?;
///     let fetcher = ContextFetcher::new(Arc::new(store));
///     let outcome = fetcher.fetch("student-1", UserRole::Student).await;
///
///     let chatbot = ChatbotService::new(config, Arc::new(HttpTransport::new()?));
///     match chatbot.send("What is due next?", &outcome.snapshot).await {
///         Ok(reply) => println!("{reply}"),
///         Err(e) => println!("{}", e.user_hint()),
///     }
///     Ok(())
/// }
/// ```
pub mod ai;
pub mod chatbot;
pub mod context;
pub mod conversation;
pub mod core;
pub mod errors;
pub mod store;

pub use chatbot::ChatbotService;
pub use conversation::{ChatTurn, Conversation, TurnRole};
pub use errors::{ChatError, ErrorKind, StoreError};

/// Configure structured JSON logging, filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; later calls leave the first subscriber in place.
///
/// # Example
///
/// ```
/// portal_assistant::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
