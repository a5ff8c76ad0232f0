//! Translation dispatcher: validation, serialized inference, post-processing

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::core::backend::TranslationBackend;
use crate::core::cache::ModelCache;
use crate::core::dictionary::DictionaryTable;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{duration_ms, GenerationConfig, TranslationRequest, TranslationResult};

/// Runs translations against the cached model, one inference at a time
#[derive(Clone)]
pub struct Translator {
    cache: Arc<ModelCache>,
    dictionary: Arc<DictionaryTable>,
    generation: GenerationConfig,
}

impl Translator {
    pub fn new(cache: Arc<ModelCache>, dictionary: DictionaryTable, generation: GenerationConfig) -> Self {
        Self {
            cache,
            dictionary: Arc::new(dictionary),
            generation,
        }
    }

    pub fn cache(&self) -> &Arc<ModelCache> {
        &self.cache
    }

    pub fn dictionary(&self) -> &DictionaryTable {
        &self.dictionary
    }

    pub fn generation(&self) -> &GenerationConfig {
        &self.generation
    }

    /// Translate a single request
    ///
    /// Blank input fails before the model lock is touched. Concurrent calls
    /// queue on the lock and run strictly one after another.
    pub async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        let source = request.source().ok_or(TranslationError::EmptyInput)?.to_string();

        let mut slot = self.cache.lock().await;
        if slot.is_none() {
            return Err(TranslationError::ModelNotReady);
        }

        debug!("Translating {} chars", source.chars().count());
        let generation = self.generation.clone();
        let started = Instant::now();

        // the guard moves into the worker so the lock spans the whole inference
        let raw = tokio::task::spawn_blocking(move || -> Result<String> {
            let backend = slot.as_mut().ok_or(TranslationError::ModelNotReady)?;
            run_inference(&mut **backend, &source, &generation)
        })
        .await
        .map_err(TranslationError::inference)??;

        let translation = self.dictionary.apply(&raw);
        let elapsed = started.elapsed();
        info!("Translation complete in {:?}", elapsed);

        Ok(TranslationResult {
            translation,
            raw_translation: raw,
            model_used: self.cache.model_id().to_string(),
            elapsed_ms: duration_ms(elapsed),
            completed_at: chrono::Utc::now(),
        })
    }

    /// Convenience wrapper around [`Translator::translate`]
    pub async fn translate_text(&self, text: &str) -> Result<TranslationResult> {
        self.translate(&TranslationRequest::new(text)).await
    }
}

fn run_inference(
    backend: &mut dyn TranslationBackend,
    source: &str,
    generation: &GenerationConfig,
) -> Result<String> {
    let input = backend.encode(source).map_err(|e| TranslationError::inference(format!("{:#}", e)))?;
    let output = backend
        .generate(&input, generation)
        .map_err(|e| TranslationError::inference(format!("{:#}", e)))?;
    let text = backend.decode(&output).map_err(|e| TranslationError::inference(format!("{:#}", e)))?;
    Ok(text.trim().to_string())
}
