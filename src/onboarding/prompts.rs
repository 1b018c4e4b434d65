//! Visitor-facing onboarding messages.

use super::state::{Field, OnboardingStage};
use super::validate::Rejection;

/// Prompt for the current stage, used on session initialization.
pub fn stage_prompt(stage: OnboardingStage, organization: &str) -> String {
    match stage {
        OnboardingStage::NeedName => {
            format!("Welcome to {organization}! To get started, may I have your name?")
        }
        OnboardingStage::NeedEmail => "What is your email address?".to_string(),
        OnboardingStage::NeedPhone => {
            "What is a good phone number to reach you?".to_string()
        }
        OnboardingStage::Complete => completion_message(),
    }
}

/// Reply after a field was accepted and the session moved to `next`.
///
/// `name` is only set when the accepted field was the visitor's name, so we
/// can greet them by it.
pub fn advance_prompt(next: OnboardingStage, name: Option<&str>) -> String {
    match (next, name) {
        (OnboardingStage::NeedEmail, Some(name)) => {
            format!("Nice to meet you, {name}. What is your email address?")
        }
        (OnboardingStage::NeedPhone, _) => {
            "Got it. Finally, what is a good phone number to reach you?".to_string()
        }
        (OnboardingStage::Complete, _) => completion_message(),
        (stage, _) => stage_prompt(stage, ""),
    }
}

/// Shown once all three fields are collected.
pub fn completion_message() -> String {
    "All set! You're fully onboarded. Feel free to ask me anything about our services."
        .to_string()
}

/// Re-prompt after a rejected value.
///
/// After `escalate` consecutive failures the message includes an example of
/// the expected format.
pub fn reprompt(field: Field, rejection: Rejection, escalate: bool) -> String {
    let base = match (field, rejection) {
        (Field::Name, Rejection::LooksLikeQuestion) => {
            "I'll be happy to answer questions once we've finished setting up. \
             First, may I have your name?"
        }
        (Field::Name, Rejection::LooksLikeEmail | Rejection::LooksLikePhone) => {
            "That looks like contact details rather than a name. \
             We'll get to those next. What should I call you?"
        }
        (Field::Name, Rejection::TooLong) => {
            "That's a bit long for a name. Could you share just the name you'd like me to use?"
        }
        (Field::Name, _) => "I didn't catch your name. Could you tell me what to call you?",
        (Field::Email, _) => {
            "That doesn't look like a valid email address. Could you please try again?"
        }
        (Field::Phone, Rejection::BadPhoneLength) => {
            "Please enter a valid phone number with 7 to 15 digits."
        }
        (Field::Phone, _) => {
            "Please enter a valid phone number (digits, spaces, hyphens, parentheses and a leading + are fine)."
        }
    };

    if !escalate {
        return base.to_string();
    }

    let example = match field {
        Field::Name => "For example: Jane Doe",
        Field::Email => "For example: jane.doe@example.com",
        Field::Phone => "For example: +1 (555) 123-4567",
    };
    format!("{base} {example}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_names_the_organization() {
        let prompt = stage_prompt(OnboardingStage::NeedName, "Acme Advisory");
        assert!(prompt.contains("Acme Advisory"));
        assert!(prompt.to_lowercase().contains("name"));
    }

    #[test]
    fn advance_greets_by_name() {
        let prompt = advance_prompt(OnboardingStage::NeedEmail, Some("Alice"));
        assert_eq!(prompt, "Nice to meet you, Alice. What is your email address?");
    }

    #[test]
    fn advance_to_complete_acknowledges() {
        let prompt = advance_prompt(OnboardingStage::Complete, None);
        assert!(prompt.contains("fully onboarded"));
    }

    #[test]
    fn email_reprompt_mentions_email() {
        let prompt = reprompt(Field::Email, Rejection::BadEmailFormat, false);
        assert!(prompt.contains("doesn't look like a valid email"));
    }

    #[test]
    fn phone_reprompt_mentions_phone() {
        let prompt = reprompt(Field::Phone, Rejection::BadPhoneCharacters, false);
        assert!(prompt.contains("valid phone number"));
    }

    #[test]
    fn escalated_reprompt_adds_example() {
        let plain = reprompt(Field::Email, Rejection::BadEmailFormat, false);
        let escalated = reprompt(Field::Email, Rejection::BadEmailFormat, true);
        assert!(escalated.starts_with(&plain));
        assert!(escalated.contains("jane.doe@example.com"));
    }
}
