//! Google Translate `client=gtx` endpoint (no key)

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{join_endpoint, read_json, LanguageDetector, ProviderTranslation, TranslationProvider};
use crate::core::errors::{DetectionError, ProviderFailure};
use crate::core::models::{DetectionResult, ProviderKind, AUTO_LANGUAGE};

/// Target used when the call is only made to learn the source language
const DETECTION_TARGET: &str = "en";

pub struct GoogleFreeProvider {
    client: Client,
    endpoint: String,
}

impl GoogleFreeProvider {
    pub fn new(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: join_endpoint(endpoint, "translate_a/single"),
        }
    }

    async fn request(&self, text: &str, source: &str, target: &str) -> Result<Value, ProviderFailure> {
        debug!("GET {} sl={} tl={} ({} chars)", self.endpoint, source, target, text.chars().count());

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        read_json(response).await
    }
}

/// Unwrap `[[[chunk, original, ...], ...], _, detected_lang?]`.
///
/// The translation is the concatenation of every chunk head that is a string.
pub fn parse_google_free_envelope(json: &Value) -> Result<ProviderTranslation, ProviderFailure> {
    let chunks = json
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or_else(|| ProviderFailure::envelope("expected an array of translation chunks at [0]"))?;

    let text: String = chunks
        .iter()
        .filter_map(|chunk| chunk.get(0).and_then(|v| v.as_str()))
        .collect();

    if text.is_empty() {
        return Err(ProviderFailure::envelope("no translated text in response"));
    }

    Ok(ProviderTranslation {
        text,
        detected_source_lang: detected_language(json),
    })
}

fn detected_language(json: &Value) -> Option<String> {
    json.get(2)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

#[async_trait]
impl TranslationProvider for GoogleFreeProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GoogleFree
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<ProviderTranslation, ProviderFailure> {
        let json = self.request(text, source, target).await?;
        parse_google_free_envelope(&json)
    }
}

/// Detection as a side effect of an `sl=auto` translation
#[async_trait]
impl LanguageDetector for GoogleFreeProvider {
    async fn detect(&self, text: &str) -> Result<DetectionResult, DetectionError> {
        let json = self.request(text, AUTO_LANGUAGE, DETECTION_TARGET).await?;
        detected_language(&json)
            .map(DetectionResult::new)
            .ok_or(DetectionError::NoDetections)
    }
}
