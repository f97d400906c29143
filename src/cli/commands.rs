//! CLI command definitions and handlers

use clap::Subcommand;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::core::client::FreeTranslator;
use crate::core::models::{ProviderKind, TranslationRequest};
use crate::session::{InputPolicy, LanguageSelection, TranslationSession};

/// Commands for Free Translator
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate a piece of text
    Translate {
        /// Text to translate
        text: String,

        /// Source language (auto-detect if not specified)
        #[arg(short, long, default_value = "auto")]
        source: String,

        /// Target language
        #[arg(short, long, default_value = "en")]
        target: String,

        /// Provider to start with (google-free, mymemory, libre, google-cloud)
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// Detect the language of a piece of text
    Detect {
        /// Text to inspect
        text: String,
    },

    /// List configured providers
    Providers,

    /// Translate lines read from stdin
    Interactive {
        /// Source language
        #[arg(short, long, default_value = "auto")]
        source: String,

        /// Target language
        #[arg(short, long, default_value = "en")]
        target: String,
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
}

/// Handle translate command
pub async fn handle_translate(
    translator: FreeTranslator,
    policy: InputPolicy,
    text: String,
    source: String,
    target: String,
    provider: Option<String>,
) -> anyhow::Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};

    if let Some(name) = provider {
        translator.set_method(&name).await?;
    }

    let languages = LanguageSelection::new(&source, &target)?;
    let text = policy.apply(&text);
    let request = TranslationRequest::new(&*text, languages.target()).with_source_lang(languages.source());

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Translating with {}...", translator.active_provider().await));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = translator.translate(&request).await;
    spinner.finish_and_clear();

    let result = result?;
    if let Some(provider) = result.provider_used {
        info!("Translated by {}", provider);
    }
    println!("{}", result.translated_text);

    Ok(())
}

/// Handle detect command
pub async fn handle_detect(translator: FreeTranslator, text: String) -> anyhow::Result<()> {
    println!("{}", translator.detect_language(&text).await);
    Ok(())
}

/// Handle providers command
pub async fn handle_providers(translator: FreeTranslator) -> anyhow::Result<()> {
    let active = translator.active_provider().await;
    let available = translator.available_providers();
    let fallback = translator.fallback_policy();

    for provider in ProviderKind::ALL {
        let marker = if provider == active { "*" } else { " " };
        let note = if !available.contains(&provider) {
            " (not configured)"
        } else if provider == fallback.secondary {
            " (fallback)"
        } else {
            ""
        };
        println!("{} {}{}", marker, provider, note);
    }

    Ok(())
}

/// Handle interactive command.
///
/// Lines starting with `:` are commands: `:provider NAME`, `:source CODE`,
/// `:target CODE`, `:swap`, `:quit`. Anything else is translated.
pub async fn handle_interactive(
    translator: FreeTranslator,
    policy: InputPolicy,
    source: String,
    target: String,
) -> anyhow::Result<()> {
    let languages = LanguageSelection::new(&source, &target)?;
    let mut session = TranslationSession::new(translator, policy).with_languages(languages);

    println!("{}", crate::session::SessionStatus::Ready);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if let Some(command) = line.trim().strip_prefix(':') {
            let mut parts = command.split_whitespace();
            let outcome = match (parts.next(), parts.next()) {
                (Some("quit"), _) | (Some("q"), _) => break,
                (Some("provider"), Some(name)) => session.set_method(name).await.map(|p| p.to_string()),
                (Some("source"), Some(code)) => session.languages_mut().set_source(code).map(|_| describe(&session)),
                (Some("target"), Some(code)) => session.languages_mut().set_target(code).map(|_| describe(&session)),
                (Some("swap"), _) => {
                    session.languages_mut().swap();
                    Ok(describe(&session))
                }
                _ => Ok("commands: :provider NAME, :source CODE, :target CODE, :swap, :quit".to_string()),
            };

            match outcome {
                Ok(message) => println!("{}", message),
                Err(e) => println!("❌ {}", e),
            }
            continue;
        }

        let outcome = session.submit(&line).await;
        if !outcome.output.is_empty() {
            println!("{}", outcome.output);
        }
        println!("{} [{}{}]", outcome.status, outcome.char_count, if outcome.truncated { ", truncated" } else { "" });
    }

    Ok(())
}

fn describe(session: &TranslationSession) -> String {
    format!("{} -> {}", session.languages().source(), session.languages().target())
}

/// Handle server command
pub async fn handle_server(
    translator: FreeTranslator,
    policy: InputPolicy,
    host: String,
    port: u16,
) -> anyhow::Result<()> {
    use crate::server::api::run_server;

    info!("Starting HTTP server on {}:{}", host, port);
    println!("🚀 Server starting on http://{}:{}", host, port);

    run_server(host, port, translator, policy).await?;

    Ok(())
}
