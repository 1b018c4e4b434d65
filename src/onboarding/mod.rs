//! Onboarding: collects a visitor's name, email and phone number.
//!
//! Each reply is checked by a local validator before it is stored. Nothing
//! typed during onboarding is passed to retrieval or to the inference
//! provider; the session dispatcher only hands a turn to the answer pipeline
//! once the session is complete.

pub mod machine;
pub mod prompts;
pub mod state;
pub mod validate;

pub use machine::OnboardingMachine;
pub use state::{Field, OnboardingStage, Session};
pub use validate::{FieldValidator, Rejection, ValidatorRegistry};
