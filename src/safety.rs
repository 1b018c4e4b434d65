//! Safety layer: keeps contact details out of inference requests.
//!
//! Onboarding values never reach the answer path in the first place. The
//! `LeakDetector` covers the other direction: a visitor who types an email
//! address or phone number into a question still must not have it forwarded
//! to the external provider.

use std::sync::LazyLock;

use regex::Regex;

/// Replacement text for scrubbed spans.
pub const REDACTED: &str = "[redacted]";

static EMAIL_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[a-z0-9._%+\-]+@[a-z0-9\-]+(?:\.[a-z0-9\-]+)+").expect("valid email regex")
});

// Seven or more digits, optionally separated by spaces, dots, hyphens or parentheses.
static PHONE_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+?\(?\d(?:[\s().\-]*\d){6,}").expect("valid phone regex")
});

/// Scrubs email- and phone-shaped substrings.
#[derive(Debug, Default, Clone, Copy)]
pub struct LeakDetector;

impl LeakDetector {
    /// Create a new leak detector.
    pub fn new() -> Self {
        Self
    }

    /// Whether `content` contains anything that looks like contact data.
    pub fn contains_pii(&self, content: &str) -> bool {
        self.contains_email(content) || self.contains_phone(content)
    }

    /// Whether an email-shaped span appears anywhere in `content`.
    pub fn contains_email(&self, content: &str) -> bool {
        EMAIL_LIKE.is_match(content)
    }

    /// Whether a run of seven or more digits appears anywhere in `content`.
    pub fn contains_phone(&self, content: &str) -> bool {
        PHONE_LIKE.is_match(content)
    }

    /// Replace contact data in `content` with `[redacted]`.
    pub fn scrub(&self, content: &str) -> String {
        let without_email = EMAIL_LIKE.replace_all(content, REDACTED);
        PHONE_LIKE.replace_all(&without_email, REDACTED).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrubs_email() {
        let detector = LeakDetector::new();
        assert_eq!(
            detector.scrub("mail me at jane.doe@example.com please"),
            "mail me at [redacted] please"
        );
    }

    #[test]
    fn scrubs_formatted_phone() {
        let detector = LeakDetector::new();
        assert_eq!(
            detector.scrub("call +1 (555) 123-4567 tomorrow"),
            "call [redacted] tomorrow"
        );
    }

    #[test]
    fn leaves_ordinary_text_alone() {
        let detector = LeakDetector::new();
        let text = "What services do you offer in 2024?";
        assert_eq!(detector.scrub(text), text);
        assert!(!detector.contains_pii(text));
    }

    #[test]
    fn detects_pii() {
        let detector = LeakDetector::new();
        assert!(detector.contains_pii("a@b.co"));
        assert!(detector.contains_pii("5551234567"));
    }

    #[test]
    fn finds_contact_data_inside_sentences() {
        let detector = LeakDetector::new();
        assert!(detector.contains_email("Name:alice@x.com."));
        assert!(!detector.contains_phone("Name:alice@x.com."));
        assert!(detector.contains_phone("my number is 555 123 4567"));
        assert!(!detector.contains_email("my number is 555 123 4567"));
    }
}
