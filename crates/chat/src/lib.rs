//! Conversation orchestration for Delphi.
//!
//! One [`ContextAssembler`] per conversation: it owns the two context
//! windows, accumulates the user-message history used as the retrieval
//! query, renders the prompt template, and invokes the model provider
//! exactly once per turn.

pub mod assembler;
pub mod mock;

pub use assembler::{ContextAssembler, SessionId};
