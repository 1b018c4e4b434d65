//! Grounded answers: prompt building and inference with an offline fallback.

pub mod composer;
pub mod prompts;
pub mod strategy;

pub use composer::AnswerComposer;
pub use strategy::{AnswerContext, AnswerStrategy, GenerativeStrategy, LexicalFallback};
