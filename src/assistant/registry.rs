//! Process-wide store of assistant sessions for the HTTP layer.
//!
//! The lock is never held across a call to the completion service: a question
//! is recorded, the lock released, the service awaited, and the answer recorded
//! under a fresh lock. Two questions on the same session therefore run
//! independently, each appending its own answer when it arrives. An answer
//! whose session was reset in the meantime is dropped.
//!
//! The store holds at most `capacity` sessions. Opening one more evicts the
//! session that was used least recently.

use super::client::CompletionClient;
use super::session::{
    AssistantContext, AssistantSession, SYSTEM_INSTRUCTION, Turn, answer_text,
};
use crate::errors::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Sessions kept when no capacity is configured.
pub const DEFAULT_MAX_SESSIONS: usize = 256;

/// Result of one ask: the answer turn and the transcript after it was
/// recorded. `answer` is absent for blank questions and for answers dropped
/// because the session was reset while the service was working.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AskOutcome {
    pub answer: Option<Turn>,
    pub transcript: Vec<Turn>,
}

struct Slot {
    session: AssistantSession,
    last_used: u64,
}

#[derive(Default)]
struct Slots {
    entries: HashMap<Uuid, Slot>,
    clock: u64,
}

impl Slots {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Looks a session up and marks it as just used.
    fn touch(&mut self, id: Uuid) -> Result<&mut AssistantSession> {
        let now = self.tick();
        let slot = self
            .entries
            .get_mut(&id)
            .ok_or(Error::SessionNotFound { id })?;
        slot.last_used = now;
        Ok(&mut slot.session)
    }

    /// Inserts a session, first evicting the least recently used one when
    /// `capacity` is reached. Returns the evicted id.
    fn insert(&mut self, id: Uuid, session: AssistantSession, capacity: usize) -> Option<Uuid> {
        let evicted = if self.entries.len() >= capacity {
            self.entries
                .iter()
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(oldest, _)| *oldest)
        } else {
            None
        };
        if let Some(oldest) = evicted {
            self.entries.remove(&oldest);
        }
        let now = self.tick();
        self.entries.insert(
            id,
            Slot {
                session,
                last_used: now,
            },
        );
        evicted
    }
}

#[derive(Clone)]
pub struct SessionRegistry {
    client: Arc<dyn CompletionClient>,
    slots: Arc<Mutex<Slots>>,
    capacity: usize,
}

impl SessionRegistry {
    #[must_use]
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self::with_capacity(client, DEFAULT_MAX_SESSIONS)
    }

    /// Registry keeping at most `capacity` sessions (at least one).
    #[must_use]
    pub fn with_capacity(client: Arc<dyn CompletionClient>, capacity: usize) -> Self {
        Self {
            client,
            slots: Arc::new(Mutex::new(Slots::default())),
            capacity: capacity.max(1),
        }
    }

    /// Opens a session for `context` and returns its id and greeting transcript.
    pub async fn open(&self, context: AssistantContext) -> (Uuid, Vec<Turn>) {
        let id = Uuid::new_v4();
        let session = AssistantSession::open(context);
        let transcript = session.transcript().to_vec();
        let evicted = self.slots.lock().await.insert(id, session, self.capacity);
        if let Some(oldest) = evicted {
            debug!("Evicted assistant session {}", oldest);
        }
        info!("Opened assistant session {}", id);
        (id, transcript)
    }

    pub async fn transcript(&self, id: Uuid) -> Result<Vec<Turn>> {
        let mut slots = self.slots.lock().await;
        Ok(slots.touch(id)?.transcript().to_vec())
    }

    /// Resets the session to `context`, leaving only the new greeting.
    pub async fn reset(&self, id: Uuid, context: AssistantContext) -> Result<Vec<Turn>> {
        let mut slots = self.slots.lock().await;
        let session = slots.touch(id)?;
        session.reset(context);
        debug!("Reset assistant session {} to {:?}", id, session.context());
        Ok(session.transcript().to_vec())
    }

    /// Asks `question` within session `id`.
    ///
    /// # Errors
    /// Only `Error::SessionNotFound`; service failures become the canned
    /// apology turn.
    #[instrument(skip(self, question))]
    pub async fn ask(&self, id: Uuid, question: &str) -> Result<AskOutcome> {
        let asked_in = {
            let mut slots = self.slots.lock().await;
            let session = slots.touch(id)?;
            if !session.push_question(question) {
                return Ok(AskOutcome {
                    answer: None,
                    transcript: session.transcript().to_vec(),
                });
            }
            session.generation()
        };

        let outcome = self.client.complete(SYSTEM_INSTRUCTION, question).await;
        let answer = Turn::ai(answer_text(outcome));

        let mut slots = self.slots.lock().await;
        let session = slots.touch(id)?;
        let recorded = session.record_answer(asked_in, answer.clone());
        if !recorded {
            debug!("Dropped answer for session {} reset while it was pending", id);
        }
        Ok(AskOutcome {
            answer: recorded.then_some(answer),
            transcript: session.transcript().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::assistant::session::{FAILURE_ANSWER, Role};
    use crate::assistant::testing::ScriptedClient;
    use std::time::Duration;

    #[tokio::test]
    async fn test_open_and_ask() -> Result<()> {
        let client = Arc::new(ScriptedClient::answering("建議 TI-RADS 4 穿刺"));
        let registry = SessionRegistry::new(Arc::clone(&client) as Arc<dyn CompletionClient>);
        let (id, greeting) = registry
            .open(AssistantContext::Device("US".to_string()))
            .await;
        assert_eq!(greeting.len(), 1);

        let outcome = registry.ask(id, "甲狀腺結節怎麼處理？").await?;
        assert_eq!(outcome.answer, Some(Turn::ai("建議 TI-RADS 4 穿刺")));
        assert_eq!(outcome.transcript.len(), 3);
        assert_eq!(outcome.transcript[1], Turn::user("甲狀腺結節怎麼處理？"));
        assert_eq!(registry.transcript(id).await?, outcome.transcript);
        assert_eq!(
            client.calls(),
            vec![(SYSTEM_INSTRUCTION.to_string(), "甲狀腺結節怎麼處理？".to_string())]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let registry = SessionRegistry::new(Arc::new(ScriptedClient::answering("x")));
        let id = Uuid::new_v4();
        assert!(matches!(
            registry.ask(id, "q").await,
            Err(Error::SessionNotFound { .. })
        ));
        assert!(matches!(
            registry.transcript(id).await,
            Err(Error::SessionNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_failure_recorded_not_raised() -> Result<()> {
        let registry = SessionRegistry::new(Arc::new(ScriptedClient::failing()));
        let (id, _) = registry.open(AssistantContext::General).await;

        let outcome = registry.ask(id, "CT 顯影劑流速？").await?;
        let answer = outcome.answer.unwrap();
        assert_eq!(answer.role, Role::Ai);
        assert_eq!(answer.content, FAILURE_ANSWER);

        Ok(())
    }

    #[tokio::test]
    async fn test_reset_and_blank_question() -> Result<()> {
        let client = Arc::new(ScriptedClient::answering("ok"));
        let registry = SessionRegistry::new(Arc::clone(&client) as Arc<dyn CompletionClient>);
        let (id, _) = registry.open(AssistantContext::General).await;
        registry.ask(id, "first").await?;

        let transcript = registry
            .reset(id, AssistantContext::Device("BMD".to_string()))
            .await?;
        assert_eq!(transcript.len(), 1);

        let outcome = registry.ask(id, "  ").await?;
        assert!(outcome.answer.is_none());
        assert_eq!(outcome.transcript.len(), 1);
        assert_eq!(client.calls().len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_answer_pending_across_reset_is_dropped() -> Result<()> {
        let registry = SessionRegistry::new(Arc::new(ScriptedClient::answering_after(
            "CT 顯影劑注意事項",
            Duration::from_millis(200),
        )));
        let (id, _) = registry
            .open(AssistantContext::Device("CT".to_string()))
            .await;

        let pending = tokio::spawn({
            let registry = registry.clone();
            async move { registry.ask(id, "CT contrast?").await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        let after_reset = registry
            .reset(id, AssistantContext::Device("MG".to_string()))
            .await?;

        let outcome = pending.await.unwrap()?;
        assert!(outcome.answer.is_none());

        let transcript = registry.transcript(id).await?;
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript, after_reset);
        assert!(transcript[0].content.contains("乳房攝影"));

        Ok(())
    }

    #[tokio::test]
    async fn test_least_recently_used_session_evicted() -> Result<()> {
        let registry =
            SessionRegistry::with_capacity(Arc::new(ScriptedClient::answering("ok")), 2);
        let (first, _) = registry.open(AssistantContext::General).await;
        let (second, _) = registry.open(AssistantContext::General).await;
        registry.transcript(first).await?;

        let (third, _) = registry.open(AssistantContext::General).await;

        assert!(matches!(
            registry.transcript(second).await,
            Err(Error::SessionNotFound { .. })
        ));
        assert!(registry.transcript(first).await.is_ok());
        assert!(registry.transcript(third).await.is_ok());

        Ok(())
    }
}
