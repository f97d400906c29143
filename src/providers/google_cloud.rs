//! Google Cloud Translation v2 (API key)

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{join_endpoint, read_json, ProviderTranslation, TranslationProvider};
use crate::core::errors::ProviderFailure;
use crate::core::models::{ProviderKind, AUTO_LANGUAGE};

pub struct GoogleCloudProvider {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GoogleCloudProvider {
    pub fn new(client: Client, endpoint: &str, api_key: String) -> Self {
        Self {
            client,
            endpoint: join_endpoint(endpoint, "language/translate/v2"),
            api_key,
        }
    }

    /// `source` is left out for `auto` so the API detects it
    fn request_body(text: &str, source: &str, target: &str) -> Value {
        let mut body = serde_json::json!({
            "q": text,
            "target": target,
        });

        if source != AUTO_LANGUAGE {
            body["source"] = Value::String(source.to_string());
        }

        body
    }
}

/// Unwrap `{data: {translations: [{translatedText, detectedSourceLanguage?}]}}`
pub fn parse_google_cloud_envelope(json: &Value) -> Result<ProviderTranslation, ProviderFailure> {
    let first = json
        .get("data")
        .and_then(|d| d.get("translations"))
        .and_then(|t| t.get(0))
        .ok_or_else(|| ProviderFailure::envelope("missing data.translations[0]"))?;

    let text = first
        .get("translatedText")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ProviderFailure::envelope("missing translatedText"))?;

    Ok(ProviderTranslation {
        text: text.to_string(),
        detected_source_lang: first
            .get("detectedSourceLanguage")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
    })
}

#[async_trait]
impl TranslationProvider for GoogleCloudProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GoogleCloud
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<ProviderTranslation, ProviderFailure> {
        debug!("POST {} source={} target={}", self.endpoint, source, target);

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::request_body(text, source, target))
            .send()
            .await?;

        let json = read_json(response).await?;
        parse_google_cloud_envelope(&json)
    }
}
