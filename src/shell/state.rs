//! Pane contents and control enablement, mutated only by the event loop

use tracing::debug;

use crate::core::errors::TranslationError;
use crate::shell::events::{AppEvent, Notice};

pub const STATUS_NOT_LOADED: &str = "⏳ Model not loaded yet.";
pub const STATUS_LOADING: &str = "⏳ Loading model... (first time may take a while)";
pub const STATUS_READY: &str = "✅ Model loaded. Ready to translate.";
pub const STATUS_LOAD_FAILED: &str = "❌ Failed to load model.";
pub const STATUS_TRANSLATING: &str = "🔄 Translating...";
pub const STATUS_DONE: &str = "✅ Translation complete.";
pub const STATUS_TRANSLATE_FAILED: &str = "❌ Error during translation.";

#[derive(Debug, Clone)]
pub struct ShellState {
    pub status: String,
    /// Urdu input pane
    pub input: String,
    /// English output pane
    pub output: String,
    pub load_enabled: bool,
    pub translate_enabled: bool,
    pub copy_enabled: bool,
    loading: bool,
    translating: bool,
}

impl Default for ShellState {
    fn default() -> Self {
        Self {
            status: STATUS_NOT_LOADED.to_string(),
            input: String::new(),
            output: String::new(),
            load_enabled: true,
            translate_enabled: false,
            copy_enabled: false,
            loading: false,
            translating: false,
        }
    }
}

impl ShellState {
    pub fn is_translating(&self) -> bool {
        self.translating
    }

    /// A load or translation has been started and has not reported back
    pub fn is_busy(&self) -> bool {
        self.loading || self.translating
    }

    /// Append a line to the input pane
    pub fn push_input(&mut self, line: &str) {
        if !self.input.is_empty() {
            self.input.push('\n');
        }
        self.input.push_str(line);
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.output.clear();
    }

    /// Gate for the load action; disables it until the load reports back
    pub fn begin_load(&mut self) -> Result<(), Notice> {
        if !self.load_enabled {
            let message = if self.translate_enabled || self.translating {
                "The model is already loaded."
            } else {
                "The model is already loading."
            };
            return Err(Notice::info("Load Model", message));
        }
        self.load_enabled = false;
        self.loading = true;
        self.status = STATUS_LOADING.to_string();
        Ok(())
    }

    /// Gate for the translate action; returns the trimmed source on success
    pub fn begin_translate(&mut self) -> Result<String, Notice> {
        if self.translating {
            return Err(Notice::info("Busy", "A translation is already running."));
        }
        if !self.translate_enabled {
            return Err(Notice::info("Model not ready", "Load the model before translating."));
        }

        let source = self.input.trim();
        if source.is_empty() {
            return Err(Notice::info("No input", TranslationError::EmptyInput.to_string()));
        }
        let source = source.to_string();

        self.translate_enabled = false;
        self.translating = true;
        self.status = STATUS_TRANSLATING.to_string();
        Ok(source)
    }

    /// Text for the copy action
    pub fn copy_text(&self) -> Result<String, Notice> {
        if !self.copy_enabled {
            return Err(Notice::info("Copy English", "Load the model first."));
        }
        let english = self.output.trim();
        if english.is_empty() {
            return Err(Notice::info("Empty", "No English text to copy."));
        }
        Ok(english.to_string())
    }

    /// Fold a completion event into the state
    pub fn apply(&mut self, event: AppEvent) -> Option<Notice> {
        debug!("Applying event: {:?}", event);
        match event {
            AppEvent::ModelLoaded { .. } => {
                self.loading = false;
                self.status = STATUS_READY.to_string();
                self.load_enabled = false;
                self.translate_enabled = !self.translating;
                self.copy_enabled = true;
                None
            }
            AppEvent::ModelLoadFailed {
                error: TranslationError::LoadInProgress,
            } => {
                // the running load reports elsewhere, this request is done
                self.loading = false;
                Some(Notice::info("Load Model", TranslationError::LoadInProgress.to_string()))
            }
            AppEvent::ModelLoadFailed { error } => {
                self.loading = false;
                self.status = STATUS_LOAD_FAILED.to_string();
                self.load_enabled = true;
                Some(Notice::error("Model Load Error", error.to_string()))
            }
            AppEvent::TranslationFinished { result } => {
                self.output = result.translation;
                self.status = STATUS_DONE.to_string();
                self.finish_translation();
                None
            }
            AppEvent::TranslationFailed { error } => {
                self.finish_translation();
                if error.is_blocking() {
                    self.status = STATUS_TRANSLATE_FAILED.to_string();
                    Some(Notice::error("Translation Error", error.to_string()))
                } else {
                    Some(Notice::info("No input", error.to_string()))
                }
            }
        }
    }

    fn finish_translation(&mut self) {
        self.translating = false;
        self.translate_enabled = true;
    }
}
