//! Urdu → English translator
//!
//! Loads a pretrained Marian MT checkpoint once, serializes translations
//! against it, and applies a phrase dictionary to the decoded output. The
//! interactive shell, one-shot CLI and HTTP server share the same cache and
//! dispatcher.

#![forbid(unsafe_code)]

pub mod cli;
pub mod core;
pub mod server;
pub mod shell;

// Re-export key types for convenience
pub use crate::core::{
    backend::{ModelProvider, TranslationBackend},
    cache::ModelCache,
    config::TranslatorConfig,
    dictionary::DictionaryTable,
    dispatcher::Translator,
    errors::TranslationError,
    marian::MarianProvider,
    models::{GenerationConfig, ModelStatus, TranslationRequest, TranslationResult},
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
