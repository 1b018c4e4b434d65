//! OnboardingMachine: validates the visitor's reply for the current stage
//! and advances the session.
//!
//! Raw messages handled here never leave this module: the value is either
//! stored in the session or dropped.

use secrecy::ExposeSecret;
use tracing::{debug, info, warn};

use super::prompts::{advance_prompt, reprompt, stage_prompt};
use super::state::{Field, OnboardingStage, Session};
use super::validate::ValidatorRegistry;

/// Drives the NeedName → NeedEmail → NeedPhone → Complete flow.
pub struct OnboardingMachine {
    validators: ValidatorRegistry,
    organization: String,
    escalate_after: u32,
}

impl OnboardingMachine {
    pub fn new(validators: ValidatorRegistry, organization: impl Into<String>) -> Self {
        Self {
            validators,
            organization: organization.into(),
            escalate_after: 3,
        }
    }

    /// Failures on one stage before re-prompts include an example.
    pub fn with_escalation_after(mut self, attempts: u32) -> Self {
        self.escalate_after = attempts;
        self
    }

    /// Process one onboarding turn and return the reply text.
    ///
    /// An empty message re-emits the current stage's prompt. A complete
    /// session is left untouched.
    pub fn step(&self, session: &mut Session, message: &str) -> String {
        let Some(field) = session.stage.field() else {
            return stage_prompt(OnboardingStage::Complete, &self.organization);
        };

        if message.trim().is_empty() {
            return stage_prompt(session.stage, &self.organization);
        }

        match self.validators.validate(field, message) {
            Ok(value) => {
                let from = session.stage;
                match session.record_and_advance(value) {
                    Ok(next) => {
                        info!(from = %from, to = %next, "Onboarding stage advanced");
                        let name = (field == Field::Name)
                            .then(|| session.collected.get(&Field::Name))
                            .flatten()
                            .map(|n| n.expose_secret().to_string());
                        advance_prompt(next, name.as_deref())
                    }
                    Err(e) => {
                        warn!("Failed to advance onboarding stage: {}", e);
                        stage_prompt(session.stage, &self.organization)
                    }
                }
            }
            Err(rejection) => {
                session.record_failure();
                let escalate =
                    self.escalate_after > 0 && session.failed_attempts >= self.escalate_after;
                debug!(
                    stage = %session.stage,
                    reason = %rejection,
                    attempts = session.failed_attempts,
                    "Onboarding value rejected"
                );
                reprompt(field, rejection, escalate)
            }
        }
    }
}
