//! Conversation types: speakers, turns, and the shared conversation log

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::llm_types::{Message, Role};

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// End-user message
    User,
    /// Agent reply
    Agent,
}

impl Speaker {
    /// Role tag used when the turn appears in a completion transcript
    pub fn as_role(&self) -> Role {
        match self {
            Speaker::User => Role::User,
            Speaker::Agent => Role::Assistant,
        }
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Speaker::User => write!(f, "User"),
            Speaker::Agent => write!(f, "Agent"),
        }
    }
}

/// A single turn in the conversation. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Who spoke
    pub speaker: Speaker,
    /// What was said
    pub text: String,
    /// When the turn occurred
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a new turn
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a user turn
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Speaker::User, text)
    }

    /// Create an agent turn
    pub fn agent(text: impl Into<String>) -> Self {
        Self::new(Speaker::Agent, text)
    }

    /// Get word count
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Append-only conversation log.
///
/// The full history is retained for display. Only a windowed view of the most
/// recent turns is handed to the completion backend, via
/// [`recent_transcript`](Self::recent_transcript). Turns are never mutated or
/// removed individually.
///
/// Interior locking makes a shared reference safe across handlers; appends
/// take `&self`.
pub struct ConversationContext {
    turns: RwLock<Vec<Turn>>,
}

impl ConversationContext {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self {
            turns: RwLock::new(Vec::new()),
        }
    }

    /// Append a turn to the log
    pub fn append(&self, turn: Turn) {
        self.turns.write().push(turn);
    }

    /// Total number of turns recorded
    pub fn turn_count(&self) -> usize {
        self.turns.read().len()
    }

    /// Whether any turn has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.turns.read().is_empty()
    }

    /// Full history, oldest first, for display
    pub fn history(&self) -> Vec<Turn> {
        self.turns.read().clone()
    }

    /// The last `k` turns, oldest first, as role-tagged messages.
    ///
    /// This is the bounded view sent to the completion backend; the stored
    /// history itself is never truncated.
    pub fn recent_transcript(&self, k: usize) -> Vec<Message> {
        let turns = self.turns.read();
        let start = turns.len().saturating_sub(k);
        turns[start..]
            .iter()
            .map(|t| Message::new(t.speaker.as_role(), t.text.clone()))
            .collect()
    }
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self::new()
    }
}
