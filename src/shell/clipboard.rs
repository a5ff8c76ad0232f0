//! Write-only clipboard sink

use cli_clipboard::{ClipboardContext, ClipboardProvider};
use tracing::debug;

use crate::core::errors::{Result, TranslationError};

pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// Desktop clipboard through `cli-clipboard`
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        let mut ctx = ClipboardContext::new().map_err(clipboard_error)?;
        ctx.set_contents(text.to_string()).map_err(clipboard_error)?;
        debug!("Copied {} chars to clipboard", text.chars().count());
        Ok(())
    }
}

fn clipboard_error(err: impl std::fmt::Display) -> TranslationError {
    TranslationError::ClipboardError {
        message: err.to_string(),
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemoryClipboard {
    pub contents: Option<String>,
}

#[cfg(test)]
impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}
