//! AI assistant bridge.
//!
//! Forwards staff questions, together with a fixed radiology instruction, to an
//! external text-completion service and keeps the resulting conversation as an
//! explicit session object.

/// Completion service seam and the Gemini implementation
pub mod client;
/// Session store shared by HTTP handlers
pub mod registry;
/// Transcript, greeting and reset rules
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{CompletionClient, GeminiClient};
pub use registry::{AskOutcome, DEFAULT_MAX_SESSIONS, SessionRegistry};
pub use session::{AssistantContext, AssistantSession, Role, Turn, sop_question};
