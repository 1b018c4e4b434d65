//! SessionDispatcher: routes each turn to onboarding or to question answering.
//!
//! Flow for one turn:
//! 1. Reject a missing session key
//! 2. Lock the session for the whole turn (serializes same-key turns)
//! 3. Incomplete session → onboarding machine; the message is never retrieved
//!    against or sent to the inference provider
//! 4. Complete session → retrieve top-k chunks → answer composer

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::model::{Reply, Turn};
use super::store::{InMemorySessionStore, SessionStore};
use crate::answer::AnswerComposer;
use crate::config::AssistConfig;
use crate::error::TurnError;
use crate::knowledge::{ContentStore, LexicalRetriever, Retriever};
use crate::llm::LlmProvider;
use crate::onboarding::{Field, OnboardingMachine, OnboardingStage, ValidatorRegistry};

/// A reply plus the stage the session was left in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub reply: Reply,
    pub stage: OnboardingStage,
}

/// Read-only view of a session. Field names only, never values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub stage: OnboardingStage,
    pub collected_fields: Vec<Field>,
}

pub struct SessionDispatcher {
    sessions: Arc<dyn SessionStore>,
    machine: OnboardingMachine,
    retriever: Arc<dyn Retriever>,
    composer: AnswerComposer,
    content: Arc<ContentStore>,
    retrieval_k: usize,
}

impl SessionDispatcher {
    /// Standard wiring: in-memory sessions, default validators, lexical
    /// retrieval, and a composer that uses `llm` when one is configured.
    pub fn new(
        config: &AssistConfig,
        content: Arc<ContentStore>,
        llm: Option<Arc<dyn LlmProvider>>,
    ) -> Self {
        let machine = OnboardingMachine::new(
            ValidatorRegistry::default_validators(),
            config.organization.clone(),
        )
        .with_escalation_after(config.reprompt_escalation_after);

        Self {
            sessions: Arc::new(InMemorySessionStore::new()),
            machine,
            retriever: Arc::new(LexicalRetriever::new()),
            composer: AnswerComposer::from_config(llm, config),
            content,
            retrieval_k: config.retrieval_k,
        }
    }

    pub fn with_session_store(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn with_retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = retriever;
        self
    }

    pub fn with_composer(mut self, composer: AnswerComposer) -> Self {
        self.composer = composer;
        self
    }

    pub fn sessions(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.sessions)
    }

    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    /// Handle one turn and return the reply.
    pub async fn handle(&self, turn: Turn) -> Result<Reply, TurnError> {
        self.respond(turn).await.map(|outcome| outcome.reply)
    }

    /// Handle one turn, also reporting the stage the session ends in.
    pub async fn respond(&self, turn: Turn) -> Result<TurnOutcome, TurnError> {
        let key = turn.session_key.trim();
        if key.is_empty() {
            return Err(TurnError::MissingSessionKey);
        }
        let message = turn.raw_message.trim();

        let handle = self.sessions.get_or_create(key).await;
        let mut session = handle.lock().await;
        session.touch();

        if !session.is_complete() {
            let text = self.machine.step(&mut session, message);
            debug!(session = %key, stage = %session.stage, "Onboarding turn handled");
            return Ok(TurnOutcome {
                reply: Reply::onboarding(text),
                stage: session.stage,
            });
        }

        let retrieved = self
            .retriever
            .search(message, self.content.all(), self.retrieval_k);
        debug!(session = %key, retrieved = retrieved.len(), "Retrieved chunks");

        let reply = self.composer.answer(message, &retrieved).await;
        Ok(TurnOutcome {
            reply,
            stage: session.stage,
        })
    }

    /// Current stage and collected field names for `key`, if the session exists.
    pub async fn session_status(&self, key: &str) -> Option<SessionStatus> {
        let handle = self.sessions.get(key.trim()).await?;
        let session = handle.lock().await;
        Some(SessionStatus {
            stage: session.stage,
            collected_fields: session.collected_fields(),
        })
    }
}
