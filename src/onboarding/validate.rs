//! Local field validators.
//!
//! Each validator is a pure predicate over the raw message: it either returns
//! the normalized value to store or a `Rejection` explaining what was wrong.
//! Validators are looked up by `Field`, so the state machine never needs to
//! know how a particular field is checked.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::state::Field;
use crate::safety::LeakDetector;

/// Longest name we accept.
const MAX_NAME_CHARS: usize = 100;
/// Accepted digit count for phone numbers after separators are stripped.
const PHONE_DIGITS: std::ops::RangeInclusive<usize> = 7..=15;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9._%+\-]+@(?:[a-z0-9\-]+\.)+[a-z0-9\-]+$").expect("valid email regex")
});

/// Why a value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Empty,
    TooLong,
    LooksLikeEmail,
    LooksLikePhone,
    LooksLikeQuestion,
    BadEmailFormat,
    BadPhoneCharacters,
    BadPhoneLength,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Empty => "empty value",
            Self::TooLong => "value too long",
            Self::LooksLikeEmail => "looks like an email address",
            Self::LooksLikePhone => "looks like a phone number",
            Self::LooksLikeQuestion => "looks like a question",
            Self::BadEmailFormat => "not a valid email address",
            Self::BadPhoneCharacters => "phone number contains non-digit characters",
            Self::BadPhoneLength => "phone number has the wrong number of digits",
        };
        write!(f, "{s}")
    }
}

/// Checks one field's raw input.
pub trait FieldValidator: Send + Sync {
    /// Return the value to store, or why it was rejected.
    fn validate(&self, raw: &str) -> Result<String, Rejection>;
}

/// Name: any non-empty text that isn't an email, phone number or question.
#[derive(Debug, Default, Clone, Copy)]
pub struct NameValidator;

impl FieldValidator for NameValidator {
    fn validate(&self, raw: &str) -> Result<String, Rejection> {
        let name = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if name.is_empty() {
            return Err(Rejection::Empty);
        }
        if name.chars().count() > MAX_NAME_CHARS {
            return Err(Rejection::TooLong);
        }
        if name.contains('?') {
            return Err(Rejection::LooksLikeQuestion);
        }
        // Contact data anywhere in the text, not just as the whole value.
        let detector = LeakDetector::new();
        if detector.contains_email(&name) {
            return Err(Rejection::LooksLikeEmail);
        }
        if detector.contains_phone(&name) {
            return Err(Rejection::LooksLikePhone);
        }
        Ok(name)
    }
}

/// Email: `local@domain.tld`, exactly one `@`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmailValidator;

impl FieldValidator for EmailValidator {
    fn validate(&self, raw: &str) -> Result<String, Rejection> {
        let email = raw.trim();
        if email.is_empty() {
            return Err(Rejection::Empty);
        }
        if !EMAIL.is_match(email) {
            return Err(Rejection::BadEmailFormat);
        }
        Ok(email.to_string())
    }
}

/// Phone: 7–15 digits once spaces, hyphens, parentheses and a leading `+`
/// are removed. The stored value keeps the `+` and drops the separators.
#[derive(Debug, Default, Clone, Copy)]
pub struct PhoneValidator;

impl FieldValidator for PhoneValidator {
    fn validate(&self, raw: &str) -> Result<String, Rejection> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Rejection::Empty);
        }
        let (plus, rest) = match trimmed.strip_prefix('+') {
            Some(rest) => ("+", rest),
            None => ("", trimmed),
        };
        let digits: String = rest
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
            .collect();
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(Rejection::BadPhoneCharacters);
        }
        if !PHONE_DIGITS.contains(&digits.len()) {
            return Err(Rejection::BadPhoneLength);
        }
        Ok(format!("{plus}{digits}"))
    }
}

/// Validators keyed by the field they check.
pub struct ValidatorRegistry {
    validators: HashMap<Field, Box<dyn FieldValidator>>,
}

impl ValidatorRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            validators: HashMap::new(),
        }
    }

    /// Registry with the name, email and phone validators.
    pub fn default_validators() -> Self {
        Self::empty()
            .with(Field::Name, NameValidator)
            .with(Field::Email, EmailValidator)
            .with(Field::Phone, PhoneValidator)
    }

    /// Register (or replace) the validator for `field`.
    pub fn with(mut self, field: Field, validator: impl FieldValidator + 'static) -> Self {
        self.validators.insert(field, Box::new(validator));
        self
    }

    /// Validate `raw` as `field`.
    ///
    /// A field with no registered validator rejects everything, so nothing
    /// unchecked is ever stored.
    pub fn validate(&self, field: Field, raw: &str) -> Result<String, Rejection> {
        match self.validators.get(&field) {
            Some(validator) => validator.validate(raw),
            None => {
                tracing::warn!(field = %field, "No validator registered for field");
                Err(Rejection::Empty)
            }
        }
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::default_validators()
    }
}
