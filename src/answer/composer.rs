//! AnswerComposer: runs the strategy chain for a grounded query.

use std::sync::Arc;

use tracing::info;

use super::strategy::{
    AnswerContext, AnswerStrategy, GenerativeStrategy, LexicalFallback, log_strategy_failure,
};
use crate::config::AssistConfig;
use crate::knowledge::Chunk;
use crate::llm::LlmProvider;
use crate::session::model::Reply;

/// Ordered answer strategies with an infallible tail.
pub struct AnswerComposer {
    strategies: Vec<Arc<dyn AnswerStrategy>>,
    fallback: LexicalFallback,
}

impl AnswerComposer {
    pub fn new(strategies: Vec<Arc<dyn AnswerStrategy>>, fallback: LexicalFallback) -> Self {
        Self {
            strategies,
            fallback,
        }
    }

    /// Standard chain: generative (when a provider is configured), then the
    /// lexical fallback.
    pub fn from_config(llm: Option<Arc<dyn LlmProvider>>, config: &AssistConfig) -> Self {
        let strategies: Vec<Arc<dyn AnswerStrategy>> = match llm {
            Some(llm) => {
                let generative: Arc<dyn AnswerStrategy> = Arc::new(
                    GenerativeStrategy::new(llm, config.inference_timeout)
                        .with_temperature(config.temperature)
                        .with_max_tokens(config.max_tokens),
                );
                vec![generative]
            }
            None => Vec::new(),
        };
        Self::new(strategies, LexicalFallback::new(config.fallback_max_chars))
    }

    /// Offline only.
    pub fn offline(config: &AssistConfig) -> Self {
        Self::from_config(None, config)
    }

    /// Answer `query` from `retrieved` (best first). Always returns a reply.
    pub async fn answer(&self, query: &str, retrieved: &[Chunk]) -> Reply {
        let ctx = AnswerContext {
            query,
            chunks: retrieved,
        };

        for strategy in &self.strategies {
            match strategy.attempt(ctx).await {
                Ok(reply) => {
                    info!(strategy = strategy.name(), mode = %reply.mode, "Answered query");
                    return reply;
                }
                Err(e) => log_strategy_failure(strategy.name(), &e),
            }
        }

        let reply = self.fallback.answer(ctx);
        info!(strategy = "lexical_fallback", mode = %reply.mode, "Answered query");
        reply
    }
}
