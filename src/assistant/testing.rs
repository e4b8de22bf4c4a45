//! Scripted completion client for tests.

use super::client::CompletionClient;
use crate::errors::{Error, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// Replies with a fixed answer (or a fixed failure), optionally after a delay,
/// and records every call.
pub struct ScriptedClient {
    answer: Option<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedClient {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers only after `delay` has passed.
    pub fn answering_after(answer: &str, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::answering(answer)
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: None,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(system_instruction, question)` pairs received so far.
    #[allow(clippy::unwrap_used)]
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    #[allow(clippy::unwrap_used)]
    async fn complete(&self, system_instruction: &str, question: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system_instruction.to_string(), question.to_string()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answer.clone().ok_or_else(|| Error::Completion {
            message: "scripted failure".to_string(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}
