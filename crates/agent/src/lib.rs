//! Chat agent orchestration
//!
//! Glues the leaf crates together: the [`Router`] takes one user message,
//! classifies it, drives the price client, translator or completion backend
//! as required, and maintains the shared conversation log.

pub mod router;

pub use router::{Router, LANGUAGE_CHANGE_REPLY};
