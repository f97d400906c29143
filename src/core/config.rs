//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::core::models::ProviderKind;

pub const DEFAULT_GOOGLE_FREE_ENDPOINT: &str = "https://translate.googleapis.com";
pub const DEFAULT_MYMEMORY_ENDPOINT: &str = "https://api.mymemory.translated.net";
pub const DEFAULT_LIBRE_ENDPOINT: &str = "https://libretranslate.com/translate";
pub const DEFAULT_GOOGLE_CLOUD_ENDPOINT: &str = "https://translation.googleapis.com";
pub const DEFAULT_DETECT_LANGUAGE_ENDPOINT: &str = "https://ws.detectlanguage.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

/// Configuration for translator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Provider used until a fallback or `set_method` changes it
    pub default_provider: ProviderKind,
    /// Provider switched to after a primary failure
    pub fallback_provider: ProviderKind,
    pub google_free_endpoint: String,
    pub mymemory_endpoint: String,
    pub libre_endpoint: String,
    pub libre_api_key: Option<String>,
    pub google_cloud_endpoint: String,
    pub google_cloud_api_key: Option<String>,
    pub detect_language_endpoint: String,
    pub detect_language_api_key: Option<String>,
    /// Input characters kept by the session; `None` is unbounded
    pub max_length: Option<usize>,
    /// No timeout when unset
    pub request_timeout_ms: Option<u64>,
    pub user_agent: String,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            default_provider: ProviderKind::GoogleFree,
            fallback_provider: ProviderKind::MyMemory,
            google_free_endpoint: DEFAULT_GOOGLE_FREE_ENDPOINT.to_string(),
            mymemory_endpoint: DEFAULT_MYMEMORY_ENDPOINT.to_string(),
            libre_endpoint: DEFAULT_LIBRE_ENDPOINT.to_string(),
            libre_api_key: None,
            google_cloud_endpoint: DEFAULT_GOOGLE_CLOUD_ENDPOINT.to_string(),
            google_cloud_api_key: None,
            detect_language_endpoint: DEFAULT_DETECT_LANGUAGE_ENDPOINT.to_string(),
            detect_language_api_key: None,
            max_length: None,
            request_timeout_ms: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl TranslatorConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields with any environment variables that are set
    pub fn apply_env(&mut self) -> anyhow::Result<()> {
        if let Some(provider) = env_string("TRANSLATOR_PROVIDER") {
            self.default_provider = provider.parse()?;
        }
        if let Some(fallback) = env_string("TRANSLATOR_FALLBACK") {
            self.fallback_provider = fallback.parse()?;
        }
        if let Some(endpoint) = env_string("GOOGLE_FREE_ENDPOINT") {
            self.google_free_endpoint = endpoint;
        }
        if let Some(endpoint) = env_string("MYMEMORY_ENDPOINT") {
            self.mymemory_endpoint = endpoint;
        }
        if let Some(endpoint) = env_string("LIBRE_ENDPOINT") {
            self.libre_endpoint = endpoint;
        }
        if let Some(key) = env_string("LIBRE_API_KEY") {
            self.libre_api_key = Some(key);
        }
        if let Some(endpoint) = env_string("GOOGLE_CLOUD_ENDPOINT") {
            self.google_cloud_endpoint = endpoint;
        }
        if let Some(key) = env_string("GOOGLE_CLOUD_API_KEY") {
            self.google_cloud_api_key = Some(key);
        }
        if let Some(endpoint) = env_string("DETECT_LANGUAGE_ENDPOINT") {
            self.detect_language_endpoint = endpoint;
        }
        if let Some(key) = env_string("DETECT_LANGUAGE_API_KEY") {
            self.detect_language_api_key = Some(key);
        }
        if let Some(max) = env_string("MAX_INPUT_CHARS") {
            self.max_length = Some(max.parse::<usize>()?);
        }
        if let Some(timeout) = env_string("REQUEST_TIMEOUT_MS") {
            self.request_timeout_ms = Some(timeout.parse::<u64>()?);
        }

        Ok(())
    }

    /// Load from JSON file; missing fields take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Whether an adapter for `provider` can be built from this configuration
    pub fn is_configured(&self, provider: ProviderKind) -> bool {
        match provider {
            ProviderKind::GoogleCloud => self.google_cloud_api_key.is_some(),
            _ => true,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.fallback_provider == ProviderKind::GoogleFree {
            return Err(anyhow::anyhow!(
                "fallback_provider must differ from the primary provider (google-free)"
            ));
        }

        if !self.is_configured(self.default_provider) {
            return Err(anyhow::anyhow!(
                "default provider {} requires an API key",
                self.default_provider
            ));
        }

        if !self.is_configured(self.fallback_provider) {
            warn!(
                "Fallback provider {} is not configured, primary failures will propagate",
                self.fallback_provider
            );
        }

        if self.max_length == Some(0) {
            return Err(anyhow::anyhow!("max_length must be greater than 0"));
        }

        if self.request_timeout_ms == Some(0) {
            return Err(anyhow::anyhow!("request_timeout_ms must be greater than 0"));
        }

        Ok(())
    }

    /// Providers that can be selected with this configuration
    pub fn configured_providers(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|p| self.is_configured(*p))
            .collect()
    }
}
