//! Onboard Assist: onboarding chat assistant with grounded answers.

pub mod answer;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod llm;
pub mod onboarding;
pub mod safety;
pub mod session;
