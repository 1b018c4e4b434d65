//! Turn and reply types.

use serde::{Deserialize, Serialize};

/// Prefix carried by every reply produced without the inference provider.
pub const OFFLINE_MARKER: &str = "[Offline Mode]";

/// One inbound chat turn.
#[derive(Debug, Clone)]
pub struct Turn {
    pub session_key: String,
    /// Empty on the first turn of a session.
    pub raw_message: String,
}

impl Turn {
    pub fn new(session_key: impl Into<String>, raw_message: impl Into<String>) -> Self {
        Self {
            session_key: session_key.into(),
            raw_message: raw_message.into(),
        }
    }
}

/// Which path produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyMode {
    /// Generated by the inference provider from retrieved content.
    Online,
    /// Served from retrieved content without the inference provider.
    Offline,
    /// Part of the onboarding conversation.
    Onboarding,
}

impl std::fmt::Display for ReplyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Offline => write!(f, "offline"),
            Self::Onboarding => write!(f, "onboarding"),
        }
    }
}

/// Reply to a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub mode: ReplyMode,
}

impl Reply {
    pub fn online(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode: ReplyMode::Online,
        }
    }

    /// An offline reply; `text` is prefixed with the offline marker.
    pub fn offline(text: impl AsRef<str>) -> Self {
        Self {
            text: format!("{OFFLINE_MARKER} {}", text.as_ref()),
            mode: ReplyMode::Offline,
        }
    }

    pub fn onboarding(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode: ReplyMode::Onboarding,
        }
    }
}
