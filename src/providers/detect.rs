//! Keyed language detection API (detectlanguage.com v3)

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{join_endpoint, read_json, LanguageDetector};
use crate::core::errors::{DetectionError, ProviderFailure};
use crate::core::models::DetectionResult;

pub struct DetectLanguageApi {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl DetectLanguageApi {
    pub fn new(client: Client, endpoint: &str, api_key: String) -> Self {
        Self {
            client,
            endpoint: join_endpoint(endpoint, "v3/detect"),
            api_key,
        }
    }
}

/// Unwrap `{data: {detections: [[{language, confidence}]]}}`, taking the first
/// detection. A flat `detections: [{...}]` list is accepted as well.
pub fn parse_detection_envelope(json: &Value) -> Result<DetectionResult, DetectionError> {
    let detections = json
        .get("data")
        .and_then(|d| d.get("detections"))
        .ok_or_else(|| ProviderFailure::envelope("missing data.detections"))?;

    let first = match detections.get(0) {
        Some(Value::Array(group)) => group.first(),
        other => other,
    }
    .ok_or(DetectionError::NoDetections)?;

    let language = first
        .get("language")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or(DetectionError::NoDetections)?;

    let mut result = DetectionResult::new(language);
    if let Some(confidence) = first.get("confidence").and_then(|v| v.as_f64()) {
        result = result.with_confidence(confidence);
    }

    Ok(result)
}

#[async_trait]
impl LanguageDetector for DetectLanguageApi {
    async fn detect(&self, text: &str) -> Result<DetectionResult, DetectionError> {
        debug!("POST {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "q": text }))
            .send()
            .await
            .map_err(ProviderFailure::from)?;

        let json = read_json(response).await?;
        parse_detection_envelope(&json)
    }
}
