//! Role-scoped context assembly for the assistant.

pub mod fetcher;
pub mod summarizer;

pub use fetcher::{ContextFetcher, FetchOutcome, FetchStatus};
pub use summarizer::{summarize, summarize_with_limit};
