//! Custom error types for translation operations

use thiserror::Error;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Model or tokenizer could not be constructed
    #[error("Could not load model: {message}")]
    ModelLoadFailure {
        message: String,
    },

    /// Another load is already running
    #[error("Model load already in progress")]
    LoadInProgress,

    /// Source text was blank
    #[error("Please type an Urdu sentence to translate.")]
    EmptyInput,

    /// Translation requested before the model was published
    #[error("Model not loaded.")]
    ModelNotReady,

    /// Encode, generate or decode failed
    #[error("Translation failed: {message}")]
    InferenceFailure {
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    /// Clipboard sink rejected the write
    #[error("Clipboard error: {message}")]
    ClipboardError {
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

impl TranslationError {
    /// Errors the shell surfaces as a blocking notification
    pub fn is_blocking(&self) -> bool {
        !matches!(self, TranslationError::EmptyInput | TranslationError::LoadInProgress)
    }

    pub(crate) fn inference(err: impl std::fmt::Display) -> Self {
        TranslationError::InferenceFailure {
            message: err.to_string(),
        }
    }

    pub(crate) fn load(err: impl std::fmt::Display) -> Self {
        TranslationError::ModelLoadFailure {
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for TranslationError {
    fn from(err: anyhow::Error) -> Self {
        // `{:#}` keeps the context chain on one line
        TranslationError::InferenceFailure {
            message: format!("{:#}", err),
        }
    }
}

impl From<config::ConfigError> for TranslationError {
    fn from(err: config::ConfigError) -> Self {
        TranslationError::ConfigError {
            message: err.to_string(),
        }
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocking_classification() {
        assert!(!TranslationError::EmptyInput.is_blocking());
        assert!(TranslationError::ModelNotReady.is_blocking());
        assert!(TranslationError::inference("boom").is_blocking());
        assert!(TranslationError::load("offline").is_blocking());
    }

    #[test]
    fn test_anyhow_keeps_context() {
        let err = anyhow::anyhow!("shape mismatch").context("decoder step 3");
        let err: TranslationError = err.into();
        assert_eq!(
            err.to_string(),
            "Translation failed: decoder step 3: shape mismatch"
        );
    }
}
