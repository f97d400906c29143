//! Free Translator - translation client over free public translation APIs
//!
//! Text is sent to one of several interchangeable providers (Google's free
//! endpoint, MyMemory, LibreTranslate, Google Cloud). When the primary free
//! provider fails, the client switches to a secondary provider for good and
//! retries the request once.

#![forbid(unsafe_code)]

pub mod cli;
pub mod core;
pub mod providers;
pub mod server;
pub mod session;

// Re-export key types for convenience
pub use crate::core::{
    client::{FallbackPolicy, FreeTranslator},
    config::TranslatorConfig,
    errors::{DetectionError, ProviderFailure, TranslationError},
    models::{DetectionResult, ProviderKind, ProviderState, TranslationRequest, TranslationResult, AUTO_LANGUAGE},
};

pub use session::{InputPolicy, LanguageSelection, TranslationSession};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
