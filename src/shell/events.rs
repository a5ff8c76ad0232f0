//! Messages from background tasks to the shell's event loop

use std::fmt;
use std::time::Duration;

use crate::core::errors::TranslationError;
use crate::core::models::TranslationResult;

/// Completion events produced by load and translate tasks
#[derive(Debug)]
pub enum AppEvent {
    /// `elapsed` is `None` when the model was already loaded
    ModelLoaded { elapsed: Option<Duration> },
    ModelLoadFailed { error: TranslationError },
    TranslationFinished { result: TranslationResult },
    TranslationFailed { error: TranslationError },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// User-facing notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let icon = match self.level {
            NoticeLevel::Info => "ℹ️ ",
            NoticeLevel::Error => "❌",
        };
        write!(f, "{} {}: {}", icon, self.title, self.message)
    }
}
