//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Assistant configuration.
#[derive(Debug, Clone)]
pub struct AssistConfig {
    /// Maximum chunks returned by the retriever per query.
    pub retrieval_k: usize,
    /// How long to wait on the inference provider before falling back.
    pub inference_timeout: Duration,
    /// Sampling temperature passed to the inference provider.
    pub temperature: f32,
    /// Token cap for generated answers.
    pub max_tokens: u32,
    /// Maximum characters of a chunk served in offline mode.
    pub fallback_max_chars: usize,
    /// Pages longer than this are split into several chunks at load time.
    pub chunk_max_chars: usize,
    /// Path to the crawled knowledge file.
    pub knowledge_path: PathBuf,
    /// Upper bound on reading the knowledge file.
    pub store_load_timeout: Duration,
    /// Sessions idle for longer than this are pruned.
    pub session_ttl: Duration,
    /// Consecutive validation failures before the re-prompt includes an example.
    pub reprompt_escalation_after: u32,
    /// Organization named in the welcome message.
    pub organization: String,
    /// HTTP listen port.
    pub port: u16,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            retrieval_k: 3,
            inference_timeout: Duration::from_secs(5),
            temperature: 0.1,
            max_tokens: 256,
            fallback_max_chars: 400,
            chunk_max_chars: 1000,
            knowledge_path: PathBuf::from("knowledge.json"),
            store_load_timeout: Duration::from_secs(5),
            session_ttl: Duration::from_secs(3600), // 1 hour
            reprompt_escalation_after: 3,
            organization: "Occams Advisory".to_string(),
            port: 8000,
        }
    }
}

impl AssistConfig {
    /// Build configuration from `ASSIST_*` environment variables.
    ///
    /// Unset or unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            retrieval_k: env_parse("ASSIST_RETRIEVAL_K").unwrap_or(defaults.retrieval_k),
            inference_timeout: env_parse("ASSIST_INFERENCE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.inference_timeout),
            temperature: env_parse("ASSIST_TEMPERATURE").unwrap_or(defaults.temperature),
            max_tokens: env_parse("ASSIST_MAX_TOKENS").unwrap_or(defaults.max_tokens),
            fallback_max_chars: env_parse("ASSIST_FALLBACK_MAX_CHARS")
                .unwrap_or(defaults.fallback_max_chars),
            chunk_max_chars: env_parse("ASSIST_CHUNK_MAX_CHARS")
                .unwrap_or(defaults.chunk_max_chars),
            knowledge_path: std::env::var("ASSIST_KNOWLEDGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.knowledge_path),
            store_load_timeout: env_parse("ASSIST_STORE_LOAD_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.store_load_timeout),
            session_ttl: env_parse("ASSIST_SESSION_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_ttl),
            reprompt_escalation_after: env_parse("ASSIST_REPROMPT_ESCALATION")
                .unwrap_or(defaults.reprompt_escalation_after),
            organization: std::env::var("ASSIST_ORG_NAME")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.organization),
            port: env_parse("ASSIST_PORT").unwrap_or(defaults.port),
        }
    }

    /// Reject values that would make the service misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retrieval_k == 0 {
            return Err(invalid("retrieval_k", "must be at least 1"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(invalid("temperature", "must be between 0.0 and 2.0"));
        }
        if self.inference_timeout.is_zero() {
            return Err(invalid("inference_timeout", "must be greater than zero"));
        }
        if self.store_load_timeout.is_zero() {
            return Err(invalid("store_load_timeout", "must be greater than zero"));
        }
        if self.chunk_max_chars == 0 {
            return Err(invalid("chunk_max_chars", "must be at least 1"));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AssistConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retrieval_k, 3);
        assert_eq!(config.inference_timeout, Duration::from_secs(5));
        assert!(config.temperature <= 0.2, "default temperature should be near-deterministic");
    }

    #[test]
    fn rejects_zero_k() {
        let config = AssistConfig {
            retrieval_k: 0,
            ..AssistConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("retrieval_k"));
    }

    #[test]
    fn rejects_out_of_range_temperature() {
        let config = AssistConfig {
            temperature: 3.5,
            ..AssistConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        let config = AssistConfig {
            inference_timeout: Duration::ZERO,
            ..AssistConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
