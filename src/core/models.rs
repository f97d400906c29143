//! Core data models for translation

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::core::errors::TranslationError;

/// Source-language placeholder meaning "let the provider infer it"
pub const AUTO_LANGUAGE: &str = "auto";

/// Translation provider identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    /// translate.googleapis.com `client=gtx` endpoint, no key
    #[serde(rename = "google-free")]
    GoogleFree,
    /// MyMemory public API
    #[serde(rename = "mymemory")]
    MyMemory,
    /// LibreTranslate instance
    #[serde(rename = "libre")]
    LibreTranslate,
    /// Google Cloud Translation v2, needs an API key
    #[serde(rename = "google-cloud")]
    GoogleCloud,
}

impl ProviderKind {
    /// Every provider, in display order
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::GoogleFree,
        ProviderKind::MyMemory,
        ProviderKind::LibreTranslate,
        ProviderKind::GoogleCloud,
    ];

    /// Canonical name used by `set_method`, config files and the HTTP API
    pub fn name(self) -> &'static str {
        match self {
            ProviderKind::GoogleFree => "google-free",
            ProviderKind::MyMemory => "mymemory",
            ProviderKind::LibreTranslate => "libre",
            ProviderKind::GoogleCloud => "google-cloud",
        }
    }

    /// Whether the provider accepts `auto` as a source language
    pub fn accepts_auto_source(self) -> bool {
        matches!(self, ProviderKind::GoogleFree | ProviderKind::GoogleCloud)
    }

    pub fn requires_api_key(self) -> bool {
        matches!(self, ProviderKind::GoogleCloud)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "google-free" | "google_free" | "google" => Ok(ProviderKind::GoogleFree),
            "mymemory" | "my-memory" => Ok(ProviderKind::MyMemory),
            "libre" | "libretranslate" => Ok(ProviderKind::LibreTranslate),
            "google-cloud" | "google_cloud" => Ok(ProviderKind::GoogleCloud),
            _ => Err(TranslationError::UnknownProvider {
                name: s.to_string(),
            }),
        }
    }
}

fn language_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z]{2,3}(-[a-zA-Z]{2,4})?$").expect("language code pattern is valid")
    })
}

/// `auto`, or an ISO 639 code with optional region/script subtag (`vi`, `zh-CN`, `zh-Hant`)
pub fn is_valid_language_code(code: &str) -> bool {
    code == AUTO_LANGUAGE || language_code_pattern().is_match(code)
}

/// Check a language code, returning it owned
pub fn validate_language_code(code: &str) -> Result<String, TranslationError> {
    if is_valid_language_code(code) {
        Ok(code.to_string())
    } else {
        Err(TranslationError::InvalidLanguage {
            code: code.to_string(),
        })
    }
}

/// Translation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
}

impl TranslationRequest {
    /// Request with the source language left to the provider
    pub fn new(text: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_lang: AUTO_LANGUAGE.to_string(),
            target_lang: target_lang.into(),
        }
    }

    pub fn with_source_lang(mut self, source_lang: impl Into<String>) -> Self {
        self.source_lang = source_lang.into();
        self
    }

    pub fn is_auto_source(&self) -> bool {
        self.source_lang == AUTO_LANGUAGE
    }
}

/// Translation result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub translated_text: String,
    /// Provider that answered; `None` when no call was made
    pub provider_used: Option<ProviderKind>,
    pub detected_source_lang: Option<String>,
}

impl TranslationResult {
    /// Result for a skipped call (empty input, or a call already in flight)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.provider_used.is_none() && self.translated_text.is_empty()
    }
}

/// Snapshot of the dispatcher state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProviderState {
    pub active: ProviderKind,
    pub busy: bool,
}

/// Language detection outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub language: String,
    pub confidence: Option<f64>,
}

impl DetectionResult {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}
