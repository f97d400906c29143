//! Main entry point for Free Translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use free_translator::cli::commands::{self, Commands};
use free_translator::session::InputPolicy;
use free_translator::{FreeTranslator, TranslatorConfig};

/// Free Translator - translate text through free public translation APIs
#[derive(Parser, Debug)]
#[command(name = "free-translator", version, about, long_about = None)]
struct Args {
    /// JSON configuration file (environment variables override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Truncate input to this many characters
    #[arg(long)]
    max_length: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("free_translator={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match &args.config {
        Some(path) => TranslatorConfig::from_file(path)?,
        None => TranslatorConfig::default(),
    };
    config.apply_env()?;
    if args.max_length.is_some() {
        config.max_length = args.max_length;
    }

    let policy = InputPolicy {
        max_length: config.max_length,
    };
    let translator = FreeTranslator::new(config)?;

    match args.command {
        Some(Commands::Translate {
            text,
            source,
            target,
            provider,
        }) => {
            commands::handle_translate(translator, policy, text, source, target, provider).await?;
        }
        Some(Commands::Detect { text }) => {
            commands::handle_detect(translator, text).await?;
        }
        Some(Commands::Providers) => {
            commands::handle_providers(translator).await?;
        }
        Some(Commands::Interactive { source, target }) => {
            commands::handle_interactive(translator, policy, source, target).await?;
        }
        Some(Commands::Server { host, port }) => {
            commands::handle_server(translator, policy, host, port).await?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
