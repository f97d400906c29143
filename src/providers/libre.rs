//! LibreTranslate instance

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{read_json, ProviderTranslation, TranslationProvider};
use crate::core::errors::ProviderFailure;
use crate::core::models::ProviderKind;

pub struct LibreTranslateProvider {
    client: Client,
    /// Full URL the request is posted to; some instances serve on the host root
    endpoint: String,
    api_key: Option<String>,
}

impl LibreTranslateProvider {
    pub fn new(client: Client, endpoint: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
            api_key,
        }
    }

    fn request_body(&self, text: &str, source: &str, target: &str) -> Value {
        let mut body = serde_json::json!({
            "q": text,
            "source": source,
            "target": target,
            "format": "text",
        });

        if let Some(api_key) = &self.api_key {
            body["api_key"] = Value::String(api_key.clone());
        }

        body
    }
}

/// Unwrap `{translatedText}`
pub fn parse_libre_envelope(json: &Value) -> Result<ProviderTranslation, ProviderFailure> {
    let text = json
        .get("translatedText")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ProviderFailure::envelope("missing translatedText"))?;

    let detected_source_lang = json
        .get("detectedLanguage")
        .and_then(|d| d.get("language"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    Ok(ProviderTranslation {
        text: text.to_string(),
        detected_source_lang,
    })
}

#[async_trait]
impl TranslationProvider for LibreTranslateProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::LibreTranslate
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
            .json(&self.request_body(text, source, target))
            .send()
            .await?;

        let json = read_json(response).await?;
        parse_libre_envelope(&json)
    }
}
