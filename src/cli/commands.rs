//! CLI command definitions and handlers

use clap::Subcommand;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::core::cache::ModelCache;
use crate::core::config::TranslatorConfig;
use crate::core::dictionary::DictionaryTable;
use crate::core::dispatcher::Translator;
use crate::core::marian::MarianProvider;
use crate::core::models::LoadOutcome;

/// Commands for the Urdu translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open the interactive shell (default)
    Shell {
        /// Do not start loading the model on startup
        #[arg(long)]
        no_auto_load: bool,
    },

    /// Translate a single text and print the English result
    Translate {
        /// Urdu text; read from stdin when omitted
        #[arg(short, long)]
        text: Option<String>,

        /// Also copy the result to the clipboard
        #[arg(long)]
        copy: bool,
    },

    /// Start HTTP API server
    Server {
        /// Bind address (default: 127.0.0.1)
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Listen port (default: 8000)
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },

    /// Write the effective configuration to a JSON file
    Config {
        /// Destination path
        #[arg(short, long, default_value = "urdu-translator.json")]
        output: PathBuf,
    },
}

/// Wire the model cache, dictionary and dispatcher from configuration
pub fn build_translator(config: &TranslatorConfig) -> anyhow::Result<Translator> {
    let dictionary = match &config.dictionary_path {
        Some(path) => DictionaryTable::from_file(path)?,
        None => DictionaryTable::default(),
    };

    let provider = Arc::new(MarianProvider::new(config.use_gpu));
    let cache = Arc::new(ModelCache::new(config.model_id.clone(), provider));

    Ok(Translator::new(cache, dictionary, config.generation()))
}

/// Handle interactive shell command
pub async fn handle_shell(config: TranslatorConfig, no_auto_load: bool) -> anyhow::Result<()> {
    use crate::shell::clipboard::SystemClipboard;
    use crate::shell::Shell;

    let translator = build_translator(&config)?;
    let shell = Shell::new(translator, SystemClipboard, std::io::stdout());
    shell.run(config.auto_load && !no_auto_load).await
}

/// Handle one-shot translation command
pub async fn handle_translate(
    config: TranslatorConfig,
    text: Option<String>,
    copy: bool,
) -> anyhow::Result<()> {
    use crate::shell::clipboard::{Clipboard, SystemClipboard};
    use indicatif::{ProgressBar, ProgressStyle};

    let text = match text {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let translator = build_translator(&config)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(format!("Loading {}", config.model_id));

    match translator.cache().load().await {
        Ok(LoadOutcome::Loaded { elapsed }) => info!("Model ready after {:?}", elapsed),
        Ok(LoadOutcome::AlreadyLoaded) => {}
        Err(e) => {
            pb.finish_and_clear();
            return Err(e.into());
        }
    }

    pb.set_message("Translating");
    let result = translator.translate_text(&text).await;
    pb.finish_and_clear();
    let result = result?;

    println!("{}", result.translation);

    if copy {
        SystemClipboard.write_text(&result.translation)?;
        eprintln!("📋 Copied to clipboard");
    }

    Ok(())
}

/// Handle server command
pub async fn handle_server(config: TranslatorConfig, host: String, port: u16) -> anyhow::Result<()> {
    use crate::server::api::run_server;

    let translator = build_translator(&config)?;

    info!("Starting HTTP server on {}:{}", host, port);
    println!("🚀 Server starting on http://{}:{}", host, port);

    run_server(host, port, translator, config.auto_load).await?;

    Ok(())
}

/// Handle config export command
pub fn handle_config(config: TranslatorConfig, output: PathBuf) -> anyhow::Result<()> {
    config.to_file(&output)?;
    println!("✅ Configuration written to {}", output.display());
    Ok(())
}
