//! MyMemory public translation API

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{join_endpoint, read_json, ProviderTranslation, TranslationProvider};
use crate::core::errors::ProviderFailure;
use crate::core::models::ProviderKind;

pub struct MyMemoryProvider {
    client: Client,
    endpoint: String,
}

impl MyMemoryProvider {
    pub fn new(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: join_endpoint(endpoint, "get"),
        }
    }
}

/// Unwrap `{responseData: {translatedText}}`.
///
/// MyMemory reports some failures (bad language pair, quota) with HTTP 200 and
/// a non-200 `responseStatus`; those are treated as status failures.
pub fn parse_mymemory_envelope(json: &Value) -> Result<ProviderTranslation, ProviderFailure> {
    let status = match json.get("responseStatus") {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.parse::<u64>().ok(),
        _ => None,
    };

    if let Some(status) = status.filter(|s| *s != 200) {
        let details = json
            .get("responseDetails")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        return Err(ProviderFailure::Status {
            status: u16::try_from(status).unwrap_or(502),
            body: details,
        });
    }

    let text = json
        .get("responseData")
        .and_then(|d| d.get("translatedText"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| ProviderFailure::envelope("missing responseData.translatedText"))?;

    if text.is_empty() {
        return Err(ProviderFailure::envelope("empty translatedText"));
    }

    Ok(ProviderTranslation::new(text))
}

#[async_trait]
impl TranslationProvider for MyMemoryProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::MyMemory
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<ProviderTranslation, ProviderFailure> {
        let langpair = format!("{}|{}", source, target);
        debug!("GET {} langpair={}", self.endpoint, langpair);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", text), ("langpair", langpair.as_str())])
            .send()
            .await?;

        let json = read_json(response).await?;
        parse_mymemory_envelope(&json)
    }
}
