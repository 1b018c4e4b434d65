//! Answer strategies.
//!
//! The composer tries strategies in order and takes the first success. The
//! lexical fallback sits outside the fallible list: it cannot fail, so the
//! chain always produces a reply.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::prompts::{NO_INFO_REPLY, SYSTEM_DIRECTIVE, build_user_prompt, truncate_chars};
use crate::error::{AnswerError, LlmError};
use crate::knowledge::Chunk;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};
use crate::safety::LeakDetector;
use crate::session::model::Reply;

/// What a strategy answers from.
#[derive(Debug, Clone, Copy)]
pub struct AnswerContext<'a> {
    pub query: &'a str,
    /// Retrieved chunks, best first.
    pub chunks: &'a [Chunk],
}

/// One way of answering a query.
#[async_trait]
pub trait AnswerStrategy: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &str;

    async fn attempt(&self, ctx: AnswerContext<'_>) -> Result<Reply, AnswerError>;
}

/// Asks the inference provider to answer from the retrieved chunks.
pub struct GenerativeStrategy {
    llm: Arc<dyn LlmProvider>,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
    leak_detector: LeakDetector,
}

impl GenerativeStrategy {
    pub fn new(llm: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self {
            llm,
            temperature: 0.1,
            max_tokens: 256,
            timeout,
            leak_detector: LeakDetector::new(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// The request sent to the provider for `ctx`.
    pub fn build_request(&self, ctx: AnswerContext<'_>) -> CompletionRequest {
        let query = self.leak_detector.scrub(ctx.query);
        CompletionRequest::new(vec![
            ChatMessage::system(SYSTEM_DIRECTIVE),
            ChatMessage::user(build_user_prompt(&query, ctx.chunks)),
        ])
        .with_temperature(self.temperature)
        .with_max_tokens(self.max_tokens)
    }
}

#[async_trait]
impl AnswerStrategy for GenerativeStrategy {
    fn name(&self) -> &str {
        "generative"
    }

    async fn attempt(&self, ctx: AnswerContext<'_>) -> Result<Reply, AnswerError> {
        // No grounding, no call.
        if ctx.chunks.is_empty() {
            return Err(AnswerError::NoGrounding);
        }

        let request = self.build_request(ctx);
        let response = match tokio::time::timeout(self.timeout, self.llm.complete(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                return Err(LlmError::Timeout {
                    provider: self.llm.model_name().to_string(),
                    timeout: self.timeout,
                }
                .into());
            }
        };

        let text = response.content.trim();
        if text.is_empty() {
            return Err(AnswerError::EmptyOutput);
        }

        debug!(
            model = self.llm.model_name(),
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "Generated grounded answer"
        );
        Ok(Reply::online(text))
    }
}

/// Serves the best retrieved chunk verbatim, marked as offline.
#[derive(Debug, Clone, Copy)]
pub struct LexicalFallback {
    max_chars: usize,
}

impl LexicalFallback {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Never fails: with no chunk it returns the fixed no-information reply.
    pub fn answer(&self, ctx: AnswerContext<'_>) -> Reply {
        match ctx.chunks.first() {
            Some(top) if !top.text.trim().is_empty() => Reply::offline(format!(
                "Here is what I found in my records: {}",
                truncate_chars(top.text.trim(), self.max_chars)
            )),
            _ => Reply::offline(NO_INFO_REPLY),
        }
    }
}

impl Default for LexicalFallback {
    fn default() -> Self {
        Self::new(400)
    }
}

/// Log a failed strategy without echoing the query.
pub(crate) fn log_strategy_failure(strategy: &str, error: &AnswerError) {
    match error {
        AnswerError::NoGrounding => debug!(strategy, "Strategy skipped: no grounding"),
        other => warn!(strategy, error = %other, "Answer strategy failed, falling back"),
    }
}
