//! Single-writer cache for the loaded model handle

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, Mutex, OwnedMutexGuard};
use tracing::{info, warn};

use crate::core::backend::{ModelProvider, TranslationBackend};
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{LoadOutcome, ModelStatus};

/// Slot holding the published backend, `None` until a load succeeds
pub(crate) type ModelSlot = Option<Box<dyn TranslationBackend>>;

/// Owns the model handle and its load lifecycle
pub struct ModelCache {
    model_id: String,
    provider: Arc<dyn ModelProvider>,
    slot: Arc<Mutex<ModelSlot>>,
    status: Arc<watch::Sender<ModelStatus>>,
}

impl ModelCache {
    /// Create an empty cache; nothing is fetched until [`ModelCache::load`]
    pub fn new(model_id: impl Into<String>, provider: Arc<dyn ModelProvider>) -> Self {
        let (status, _) = watch::channel(ModelStatus::NotLoaded);
        Self {
            model_id: model_id.into(),
            provider,
            slot: Arc::new(Mutex::new(None)),
            status: Arc::new(status),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Current lifecycle state
    pub fn status(&self) -> ModelStatus {
        self.status.borrow().clone()
    }

    /// Receiver notified on every status transition
    pub fn subscribe(&self) -> watch::Receiver<ModelStatus> {
        self.status.subscribe()
    }

    pub fn is_ready(&self) -> bool {
        self.status.borrow().is_ready()
    }

    /// Construct the backend on a blocking worker, then publish it
    ///
    /// Fails with [`TranslationError::LoadInProgress`] while another load is
    /// running. Once a handle is published, later calls return
    /// [`LoadOutcome::AlreadyLoaded`] without touching it.
    pub async fn load(&self) -> Result<LoadOutcome> {
        let mut early = None;
        self.status.send_if_modified(|status| match status {
            ModelStatus::Loading => {
                early = Some(Err(TranslationError::LoadInProgress));
                false
            }
            ModelStatus::Ready => {
                early = Some(Ok(LoadOutcome::AlreadyLoaded));
                false
            }
            _ => {
                *status = ModelStatus::Loading;
                true
            }
        });
        if let Some(outcome) = early {
            return outcome;
        }

        info!("Loading model {}", self.model_id);
        let provider = Arc::clone(&self.provider);
        let slot = Arc::clone(&self.slot);
        let status = Arc::clone(&self.status);
        let model_id = self.model_id.clone();

        // detached: the status leaves Loading even if this caller is dropped
        let task = tokio::spawn(async move {
            let started = Instant::now();
            let blocking_id = model_id.clone();
            let loaded = tokio::task::spawn_blocking(move || provider.load(&blocking_id))
                .await
                .map_err(TranslationError::load)
                .and_then(|result| result.map_err(|e| TranslationError::load(format!("{:#}", e))));

            match loaded {
                Ok(backend) => {
                    *slot.lock().await = Some(backend);
                    status.send_replace(ModelStatus::Ready);
                    let elapsed = started.elapsed();
                    info!("Model {} loaded in {:?}", model_id, elapsed);
                    Ok(LoadOutcome::Loaded { elapsed })
                }
                Err(err) => {
                    warn!("Model load failed: {}", err);
                    status.send_replace(ModelStatus::Failed(failure_message(&err)));
                    Err(err)
                }
            }
        });

        task.await.map_err(|e| {
            let err = TranslationError::load(e);
            self.status.send_replace(ModelStatus::Failed(failure_message(&err)));
            err
        })?
    }

    /// Exclusive access to the slot; waits for any in-flight inference
    pub(crate) async fn lock(&self) -> OwnedMutexGuard<ModelSlot> {
        Arc::clone(&self.slot).lock_owned().await
    }

    /// Whether the slot lock is currently free
    #[cfg(test)]
    pub(crate) fn slot_is_free(&self) -> bool {
        self.slot.try_lock().is_ok()
    }
}

fn failure_message(err: &TranslationError) -> String {
    match err {
        TranslationError::ModelLoadFailure { message } => message.clone(),
        other => other.to_string(),
    }
}
