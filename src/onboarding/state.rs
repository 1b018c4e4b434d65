//! Onboarding state machine: tracks which field the visitor still owes us.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// A piece of contact information collected during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Email,
    Phone,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
        };
        write!(f, "{s}")
    }
}

/// The stages of onboarding.
///
/// Progresses linearly: NeedName → NeedEmail → NeedPhone → Complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStage {
    #[default]
    NeedName,
    NeedEmail,
    NeedPhone,
    Complete,
}

impl OnboardingStage {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: OnboardingStage) -> bool {
        use OnboardingStage::*;
        matches!(
            (self, target),
            (NeedName, NeedEmail) | (NeedEmail, NeedPhone) | (NeedPhone, Complete)
        )
    }

    /// Whether onboarding is done.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Get the next stage in the linear progression, if any.
    pub fn next(&self) -> Option<OnboardingStage> {
        use OnboardingStage::*;
        match self {
            NeedName => Some(NeedEmail),
            NeedEmail => Some(NeedPhone),
            NeedPhone => Some(Complete),
            Complete => None,
        }
    }

    /// The field this stage collects.
    pub fn field(&self) -> Option<Field> {
        match self {
            Self::NeedName => Some(Field::Name),
            Self::NeedEmail => Some(Field::Email),
            Self::NeedPhone => Some(Field::Phone),
            Self::Complete => None,
        }
    }
}

impl std::fmt::Display for OnboardingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NeedName => "need_name",
            Self::NeedEmail => "need_email",
            Self::NeedPhone => "need_phone",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

/// Per-visitor onboarding state.
///
/// Collected values are secrets: they are redacted in `Debug` output and
/// only readable through `ExposeSecret`.
#[derive(Debug)]
pub struct Session {
    pub stage: OnboardingStage,
    pub collected: BTreeMap<Field, SecretString>,
    /// The field currently being asked for; `None` once complete.
    pub pending_field: Option<Field>,
    /// Consecutive validation failures on the current stage.
    pub failed_attempts: u32,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl Default for Session {
    fn default() -> Self {
        let now = Utc::now();
        let stage = OnboardingStage::default();
        Self {
            stage,
            collected: BTreeMap::new(),
            pending_field: stage.field(),
            failed_attempts: 0,
            created_at: now,
            last_seen: now,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_complete(&self) -> bool {
        self.stage.is_terminal()
    }

    /// Store a validated value and move to the next stage.
    ///
    /// Only the onboarding machine calls this, after the stage's validator
    /// accepted `value`. Returns an error if already at the terminal stage.
    pub(crate) fn record_and_advance(
        &mut self,
        value: String,
    ) -> Result<OnboardingStage, String> {
        let field = self
            .stage
            .field()
            .ok_or_else(|| "Already at terminal stage".to_string())?;
        let next = self
            .stage
            .next()
            .ok_or_else(|| "Already at terminal stage".to_string())?;
        if !self.stage.can_transition_to(next) {
            return Err(format!("Cannot transition from {} to {}", self.stage, next));
        }
        self.collected.insert(field, SecretString::from(value));
        self.stage = next;
        self.pending_field = next.field();
        self.failed_attempts = 0;
        Ok(next)
    }

    pub(crate) fn record_failure(&mut self) {
        self.failed_attempts = self.failed_attempts.saturating_add(1);
    }

    pub fn touch(&mut self) {
        self.last_seen = Utc::now();
    }

    /// Names of the fields collected so far, never their values.
    pub fn collected_fields(&self) -> Vec<Field> {
        self.collected.keys().copied().collect()
    }
}
