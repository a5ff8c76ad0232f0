//! Core data models for translation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Lifecycle of the shared model handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum ModelStatus {
    /// No load has been attempted yet
    NotLoaded,
    /// A load is in flight
    Loading,
    /// Handle published, translations allowed
    Ready,
    /// Last load failed; a new load may be started
    Failed(String),
}

impl ModelStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, ModelStatus::Ready)
    }
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelStatus::NotLoaded => write!(f, "not loaded"),
            ModelStatus::Loading => write!(f, "loading"),
            ModelStatus::Ready => write!(f, "ready"),
            ModelStatus::Failed(message) => write!(f, "failed: {}", message),
        }
    }
}

/// Result of a successful load call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// This call constructed and published the handle
    Loaded { elapsed: Duration },
    /// A handle was already published; nothing was reloaded
    AlreadyLoaded,
}

/// Decoding hyperparameters handed to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Upper bound on generated tokens, decoder start token included
    pub max_length: usize,
    pub num_beams: usize,
    /// Stop once `num_beams` hypotheses have finished
    pub early_stopping: bool,
    /// Exponent applied to hypothesis length when ranking
    pub length_penalty: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_length: 200,
            num_beams: 5,
            early_stopping: true,
            length_penalty: 1.0,
        }
    }
}

/// Translation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Source text with surrounding whitespace removed, `None` when blank
    pub fn source(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// Translation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResult {
    /// Output after dictionary substitution
    pub translation: String,
    /// Decoder output before dictionary substitution
    pub raw_translation: String,
    pub model_used: String,
    pub elapsed_ms: u64,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

/// Whole milliseconds, saturating at `u64::MAX`
pub fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_ms_saturates() {
        assert_eq!(duration_ms(Duration::from_micros(2_500)), 2);
        assert_eq!(duration_ms(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_request_source_trims() {
        assert_eq!(TranslationRequest::new("  سلام \n").source(), Some("سلام"));
        assert_eq!(TranslationRequest::new(" \t\n ").source(), None);
        assert_eq!(TranslationRequest::new("").source(), None);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(ModelStatus::Failed("offline".into())).unwrap();
        assert_eq!(json, serde_json::json!({"state": "failed", "message": "offline"}));

        let json = serde_json::to_value(ModelStatus::Ready).unwrap();
        assert_eq!(json, serde_json::json!({"state": "ready"}));
    }
}
