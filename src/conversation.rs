//! Bounded conversation history.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::config::DEFAULT_HISTORY_LIMIT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
    System,
}

/// One message in a conversation, in the shape the completion API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::System,
            content: content.into(),
        }
    }
}

/// Sliding window over the most recent turns. Never holds more than
/// `limit` entries.
#[derive(Debug, Clone)]
pub struct Conversation {
    turns: VecDeque<ChatTurn>,
    limit: usize,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl Conversation {
    /// A `limit` of zero is raised to one.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            turns: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    pub fn append(&mut self, turn: ChatTurn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.limit {
            self.turns.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<ChatTurn> {
        self.turns.iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }
}
