//! Core types for the chat agent
//!
//! This crate provides the foundational types used across all other crates:
//! - Conversation types (speakers, turns, the shared conversation log)
//! - Role-tagged message types for completion transcripts

pub mod conversation;
pub mod llm_types;

pub use conversation::{ConversationContext, Speaker, Turn};
pub use llm_types::{Message, Role};
