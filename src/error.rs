//! Error types for the onboarding assistant.

use std::time::Duration;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} timed out after {timeout:?}")]
    Timeout { provider: String, timeout: Duration },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

/// Content store errors.
///
/// These never escape `ContentStore::load`; they are logged and the store
/// degrades to zero chunks.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("Knowledge file not found: {0}")]
    NotFound(String),

    #[error("Failed to parse knowledge file {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("Loading knowledge file {path} timed out after {timeout:?}")]
    Timeout { path: String, timeout: Duration },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why an answer strategy declined or failed.
///
/// Always recovered by the next strategy in the chain.
#[derive(Debug, thiserror::Error)]
pub enum AnswerError {
    #[error("No retrieved content to ground an answer")]
    NoGrounding,

    #[error("Inference failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Inference returned an empty answer")]
    EmptyOutput,
}

/// Errors returned to the caller of a chat turn.
///
/// Only malformed transport input is a hard failure; everything else
/// produces a reply.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("Missing session identifier")]
    MissingSessionKey,
}
