//! Interactive shell: reads commands, dispatches background work, renders

use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::core::dispatcher::Translator;
use crate::core::models::{LoadOutcome, TranslationRequest};
use crate::shell::clipboard::Clipboard;
use crate::shell::commands::{ShellCommand, HELP};
use crate::shell::events::{AppEvent, Notice};
use crate::shell::state::ShellState;

/// Owns the shell state; background tasks only talk to it through events
pub struct Shell<C, W> {
    state: ShellState,
    translator: Translator,
    clipboard: C,
    out: W,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl<C: Clipboard, W: Write> Shell<C, W> {
    pub fn new(translator: Translator, clipboard: C, out: W) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            state: ShellState::default(),
            translator,
            clipboard,
            out,
            events_tx,
            events_rx,
        }
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    /// Event loop over stdin lines and background completions
    pub async fn run(mut self, auto_load: bool) -> anyhow::Result<()> {
        self.run_with(BufReader::new(tokio::io::stdin()), auto_load).await
    }

    /// Event loop over `input`; a started load or translation is always
    /// reported before the next line is read, so EOF and `:quit` never drop it
    pub async fn run_with<R>(&mut self, input: R, auto_load: bool) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        writeln!(self.out, "Urdu → English Translator")?;
        writeln!(self.out, "{}", HELP)?;
        writeln!(self.out, "{}", self.state.status)?;

        if auto_load {
            self.handle_command(ShellCommand::Load)?;
        }

        let mut lines = input.lines();
        loop {
            let idle = !self.state.is_busy();
            tokio::select! {
                line = lines.next_line(), if idle => {
                    let Some(line) = line? else {
                        break;
                    };
                    if !self.handle_command(ShellCommand::parse(&line))? {
                        break;
                    }
                }
                Some(event) = self.events_rx.recv() => {
                    self.handle_event(event)?;
                }
                else => break,
            }
        }

        info!("Shell closed");
        Ok(())
    }

    /// Apply one command; `false` means the shell should exit
    pub fn handle_command(&mut self, command: ShellCommand) -> anyhow::Result<bool> {
        match command {
            ShellCommand::Load => match self.state.begin_load() {
                Ok(()) => {
                    self.render_status()?;
                    self.spawn_load();
                }
                Err(notice) => self.render_notice(&notice)?,
            },
            ShellCommand::Translate => match self.state.begin_translate() {
                Ok(source) => {
                    self.render_status()?;
                    self.spawn_translate(source);
                }
                Err(notice) => self.render_notice(&notice)?,
            },
            ShellCommand::Clear => {
                self.state.clear();
                writeln!(self.out, "🧹 Cleared.")?;
            }
            ShellCommand::Copy => match self.state.copy_text() {
                Ok(english) => match self.clipboard.write_text(&english) {
                    Ok(()) => self.render_notice(&Notice::info(
                        "Copied",
                        "English translation copied to clipboard.",
                    ))?,
                    Err(err) => {
                        warn!("Clipboard write failed: {}", err);
                        self.render_notice(&Notice::error("Copy English", err.to_string()))?
                    }
                },
                Err(notice) => self.render_notice(&notice)?,
            },
            ShellCommand::Status => {
                writeln!(self.out, "{}", self.state.status)?;
                writeln!(
                    self.out,
                    "   model: {} ({})",
                    self.translator.cache().model_id(),
                    self.translator.cache().status()
                )?;
                writeln!(self.out, "   input: {} chars", self.state.input.chars().count())?;
            }
            ShellCommand::Help => writeln!(self.out, "{}", HELP)?,
            ShellCommand::Quit => return Ok(false),
            ShellCommand::Text(line) => self.state.push_input(&line),
            ShellCommand::Unknown(name) => writeln!(self.out, "Unknown command {}, try :help", name)?,
        }
        Ok(true)
    }

    /// Apply one background completion and render the result
    pub fn handle_event(&mut self, event: AppEvent) -> anyhow::Result<()> {
        let finished = matches!(event, AppEvent::TranslationFinished { .. });
        if let Some(notice) = self.state.apply(event) {
            self.render_notice(&notice)?;
        }
        self.render_status()?;
        if finished {
            writeln!(self.out, "English (output):\n{}", self.state.output)?;
        }
        Ok(())
    }

    /// Wait for the next background completion and apply it
    pub async fn next_event(&mut self) -> anyhow::Result<bool> {
        match self.events_rx.recv().await {
            Some(event) => {
                self.handle_event(event)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn spawn_load(&self) {
        let cache = std::sync::Arc::clone(self.translator.cache());
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let event = match cache.load().await {
                Ok(LoadOutcome::Loaded { elapsed }) => AppEvent::ModelLoaded {
                    elapsed: Some(elapsed),
                },
                Ok(LoadOutcome::AlreadyLoaded) => AppEvent::ModelLoaded { elapsed: None },
                Err(error) => AppEvent::ModelLoadFailed { error },
            };
            // receiver gone means the shell already exited
            let _ = tx.send(event);
        });
    }

    fn spawn_translate(&self, source: String) {
        let translator = self.translator.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let event = match translator.translate(&TranslationRequest::new(source)).await {
                Ok(result) => AppEvent::TranslationFinished { result },
                Err(error) => AppEvent::TranslationFailed { error },
            };
            let _ = tx.send(event);
        });
    }

    fn render_status(&mut self) -> std::io::Result<()> {
        writeln!(self.out, "{}", self.state.status)
    }

    fn render_notice(&mut self, notice: &Notice) -> std::io::Result<()> {
        writeln!(self.out, "{}", notice)
    }
}
