//! Translation provider adapters
//!
//! Each adapter issues exactly one HTTP request per call and unwraps the
//! provider's JSON envelope into flat text. Retrying and fallback belong to
//! the dispatcher in [`crate::core::client`].

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::config::TranslatorConfig;
use crate::core::errors::{DetectionError, ProviderFailure};
use crate::core::models::{DetectionResult, ProviderKind};

pub mod detect;
pub mod google_cloud;
pub mod google_free;
pub mod libre;
pub mod mymemory;

pub use detect::DetectLanguageApi;
pub use google_cloud::GoogleCloudProvider;
pub use google_free::GoogleFreeProvider;
pub use libre::LibreTranslateProvider;
pub use mymemory::MyMemoryProvider;

/// Text produced by a single provider call
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderTranslation {
    pub text: String,
    pub detected_source_lang: Option<String>,
}

impl ProviderTranslation {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            detected_source_lang: None,
        }
    }
}

/// Uniform capability every provider implements
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Which provider this adapter talks to
    fn kind(&self) -> ProviderKind;

    /// Translate `text` from `source` (or `auto` where supported) to `target`
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<ProviderTranslation, ProviderFailure>;
}

/// Language detection capability
#[async_trait]
pub trait LanguageDetector: Send + Sync {
    async fn detect(&self, text: &str) -> Result<DetectionResult, DetectionError>;
}

/// Enum-keyed adapter table
pub type ProviderTable = HashMap<ProviderKind, Arc<dyn TranslationProvider>>;

/// Build an adapter for every provider the configuration allows
pub fn build_providers(config: &TranslatorConfig, client: &reqwest::Client) -> ProviderTable {
    let mut table: ProviderTable = HashMap::new();

    table.insert(
        ProviderKind::GoogleFree,
        Arc::new(GoogleFreeProvider::new(client.clone(), &config.google_free_endpoint)),
    );
    table.insert(
        ProviderKind::MyMemory,
        Arc::new(MyMemoryProvider::new(client.clone(), &config.mymemory_endpoint)),
    );
    table.insert(
        ProviderKind::LibreTranslate,
        Arc::new(LibreTranslateProvider::new(
            client.clone(),
            &config.libre_endpoint,
            config.libre_api_key.clone(),
        )),
    );

    if let Some(api_key) = &config.google_cloud_api_key {
        table.insert(
            ProviderKind::GoogleCloud,
            Arc::new(GoogleCloudProvider::new(
                client.clone(),
                &config.google_cloud_endpoint,
                api_key.clone(),
            )),
        );
    }

    table
}

/// Check the status and parse the body as JSON.
///
/// Non-success statuses keep the body for diagnostics; a body that is not JSON
/// counts as an envelope failure rather than a transport one.
pub(crate) async fn read_json(response: reqwest::Response) -> Result<Value, ProviderFailure> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ProviderFailure::Status {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| ProviderFailure::envelope(e.to_string()))
}

pub(crate) fn join_endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
