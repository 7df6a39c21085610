//! All AI/LLM functionality

pub mod client;
pub mod prompt_builder;

// Re-export main types for convenience
pub use client::{
    CompletionRequest, CompletionTransport, HttpReply, HttpTransport, estimate_tokens,
    parse_completion,
};
