//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::errors::{Result, TranslationError};
use crate::core::models::GenerationConfig;

/// Checkpoint used when nothing else is configured
pub const DEFAULT_MODEL_ID: &str = "Helsinki-NLP/opus-mt-ur-en";

/// Prefix for environment overrides, e.g. `URDU_TRANSLATOR_NUM_BEAMS=3`
pub const ENV_PREFIX: &str = "URDU_TRANSLATOR";

/// Configuration for translator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub model_id: String,
    pub max_length: usize,
    pub num_beams: usize,
    pub early_stopping: bool,
    pub length_penalty: f32,
    /// YAML or JSON file replacing the built-in dictionary
    pub dictionary_path: Option<PathBuf>,
    /// Start loading the model as soon as the shell opens
    pub auto_load: bool,
    pub use_gpu: bool,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        let generation = GenerationConfig::default();
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            max_length: generation.max_length,
            num_beams: generation.num_beams,
            early_stopping: generation.early_stopping,
            length_penalty: generation.length_penalty,
            dictionary_path: None,
            auto_load: true,
            use_gpu: false,
        }
    }
}

impl TranslatorConfig {
    /// Load defaults, then the optional file, then `URDU_TRANSLATOR_*` env vars
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = Self::layered(path, ENV_PREFIX)?;
        config.validate()?;
        info!(
            "Configuration loaded: model={}, beams={}, max_length={}",
            config.model_id, config.num_beams, config.max_length
        );
        Ok(config)
    }

    fn layered(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            debug!("Reading config file {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(config::Environment::with_prefix(env_prefix).try_parsing(true))
            .build()?
            .try_deserialize::<Self>()?;

        Ok(config)
    }

    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.model_id.trim().is_empty() {
            return Err(config_error("model_id is required"));
        }

        // the decoder start token occupies one slot
        if self.max_length < 2 {
            return Err(config_error("max_length must be at least 2"));
        }

        if self.num_beams == 0 {
            return Err(config_error("num_beams must be greater than 0"));
        }

        if !self.length_penalty.is_finite() {
            return Err(config_error("length_penalty must be a finite number"));
        }

        Ok(())
    }

    /// Decoding hyperparameters
    pub fn generation(&self) -> GenerationConfig {
        GenerationConfig {
            max_length: self.max_length,
            num_beams: self.num_beams,
            early_stopping: self.early_stopping,
            length_penalty: self.length_penalty,
        }
    }
}

fn config_error(message: &str) -> TranslationError {
    TranslationError::ConfigError {
        message: message.to_string(),
    }
}
