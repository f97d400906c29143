//! Custom error types for translation operations

use thiserror::Error;

use crate::core::models::ProviderKind;

/// Why a single provider call failed
#[derive(Error, Debug)]
pub enum ProviderFailure {
    /// Provider answered with a non-success HTTP status
    #[error("HTTP error: {status}")]
    Status {
        status: u16,
        body: String,
    },

    /// Transport failed before a response arrived
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Body did not match the provider's envelope
    #[error("Invalid response: {0}")]
    Envelope(String),
}

impl ProviderFailure {
    pub(crate) fn envelope(message: impl Into<String>) -> Self {
        ProviderFailure::Envelope(message.into())
    }

    /// HTTP status of the failure, if the provider answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderFailure::Status { status, .. } => Some(*status),
            ProviderFailure::Network(e) => e.status().map(|s| s.as_u16()),
            ProviderFailure::Envelope(_) => None,
        }
    }
}

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// A provider call failed; displayed with the provider name as prefix
    #[error("{provider}: {source}")]
    Provider {
        provider: ProviderKind,
        #[source]
        source: ProviderFailure,
    },

    /// Provider name not in the known set
    #[error("Unknown translation provider: {name}")]
    UnknownProvider {
        name: String,
    },

    /// Provider is known but was not configured (e.g. missing API key)
    #[error("Translation provider not configured: {provider}")]
    ProviderUnavailable {
        provider: ProviderKind,
    },

    /// Provider needs a concrete source language and detection gave up
    #[error("{provider} requires a source language and it could not be detected")]
    UnresolvedSourceLanguage {
        provider: ProviderKind,
    },

    /// Malformed language code
    #[error("Invalid language code: {code}")]
    InvalidLanguage {
        code: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl TranslationError {
    pub(crate) fn provider(provider: ProviderKind, source: ProviderFailure) -> Self {
        TranslationError::Provider { provider, source }
    }

    /// Whether the error came back from a provider rather than from the caller's input
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            TranslationError::Provider { .. } | TranslationError::UnresolvedSourceLanguage { .. }
        )
    }
}

impl From<anyhow::Error> for TranslationError {
    fn from(err: anyhow::Error) -> Self {
        TranslationError::ConfigError {
            message: err.to_string(),
        }
    }
}

/// Language detection errors. Collapsed to the `auto` sentinel at the client boundary.
#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("Language detector not configured")]
    NotConfigured,

    #[error("Detection failed: {0}")]
    Failed(#[from] ProviderFailure),

    #[error("Detector returned no language")]
    NoDetections,
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;
