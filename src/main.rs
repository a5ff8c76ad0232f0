//! Main entry point for the Urdu translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use urdu_translator::cli::commands::{self, Commands};
use urdu_translator::TranslatorConfig;

/// Urdu → English translator backed by a local Marian MT model
#[derive(Parser, Debug)]
#[command(name = "urdu-translator", version, about, long_about = None)]
struct Args {
    /// Config file (JSON, YAML or TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Hugging Face model identifier
    #[arg(long, global = true)]
    model: Option<String>,

    /// Beam-search width
    #[arg(long, global = true)]
    beams: Option<usize>,

    /// Maximum generated length in tokens
    #[arg(long, global = true)]
    max_length: Option<usize>,

    /// Run on CUDA when available
    #[arg(long, global = true)]
    gpu: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("urdu_translator={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = TranslatorConfig::load(args.config.as_deref())?;

    // Override config with CLI args if provided
    if let Some(model) = args.model {
        config.model_id = model;
    }
    if let Some(beams) = args.beams {
        config.num_beams = beams;
    }
    if let Some(max_length) = args.max_length {
        config.max_length = max_length;
    }
    if args.gpu {
        config.use_gpu = true;
    }
    config.validate()?;

    // Execute command
    match args.command {
        None => commands::handle_shell(config, false).await?,
        Some(Commands::Shell { no_auto_load }) => commands::handle_shell(config, no_auto_load).await?,
        Some(Commands::Translate { text, copy }) => commands::handle_translate(config, text, copy).await?,
        Some(Commands::Server { host, port }) => commands::handle_server(config, host, port).await?,
        Some(Commands::Config { output }) => commands::handle_config(config, output)?,
    }

    Ok(())
}
