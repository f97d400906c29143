//! HTTP API server implementation

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::client::FreeTranslator;
use crate::core::errors::TranslationError;
use crate::core::models::{ProviderKind, ProviderState, TranslationRequest, AUTO_LANGUAGE};
use crate::session::{InputPolicy, LanguageSelection};

/// Application state
#[derive(Clone)]
pub struct AppState {
    translator: FreeTranslator,
    policy: InputPolicy,
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
    timestamp: String,
}

/// Providers list response
#[derive(Serialize)]
struct ProvidersResponse {
    active: ProviderKind,
    data: Vec<ProviderInfo>,
}

#[derive(Serialize)]
struct ProviderInfo {
    id: ProviderKind,
    accepts_auto_source: bool,
    requires_api_key: bool,
}

/// Provider selection request
#[derive(Deserialize)]
pub struct MethodRequest {
    pub provider: String,
}

/// Translation request body
#[derive(Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub source_lang: Option<String>,
    pub target_lang: String,
}

/// Translation response body; `provider` is null when the call was skipped
#[derive(Serialize)]
pub struct TranslateResponse {
    pub translated_text: String,
    pub provider: Option<ProviderKind>,
    pub detected_source_lang: Option<String>,
}

#[derive(Deserialize)]
pub struct DetectRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct DetectResponse {
    pub language: String,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Error with the HTTP status it maps to
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl From<TranslationError> for ApiError {
    fn from(err: TranslationError) -> Self {
        let (status, code) = match &err {
            TranslationError::UnknownProvider { .. } => (StatusCode::BAD_REQUEST, "unknown_provider"),
            TranslationError::ProviderUnavailable { .. } => (StatusCode::BAD_REQUEST, "provider_unavailable"),
            TranslationError::InvalidLanguage { .. } => (StatusCode::BAD_REQUEST, "invalid_language"),
            e if e.is_provider_failure() => (StatusCode::BAD_GATEWAY, "translation_error"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        ApiError {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorDetail {
                message: self.message,
                code: Some(self.code.to_string()),
            },
        };
        (self.status, axum::Json(body)).into_response()
    }
}

/// Health check handler
async fn health_check() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Get providers handler
async fn get_providers(State(state): State<Arc<AppState>>) -> axum::Json<ProvidersResponse> {
    let data = state
        .translator
        .available_providers()
        .into_iter()
        .map(|p| ProviderInfo {
            id: p,
            accepts_auto_source: p.accepts_auto_source(),
            requires_api_key: p.requires_api_key(),
        })
        .collect();

    axum::Json(ProvidersResponse {
        active: state.translator.active_provider().await,
        data,
    })
}

async fn get_state(State(state): State<Arc<AppState>>) -> axum::Json<ProviderState> {
    axum::Json(state.translator.state().await)
}

async fn set_method(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<MethodRequest>,
) -> Result<axum::Json<ProviderState>, ApiError> {
    state.translator.set_method(&payload.provider).await?;
    Ok(axum::Json(state.translator.state().await))
}

/// Translation handler
async fn translate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TranslateRequest>,
) -> Result<axum::Json<TranslateResponse>, ApiError> {
    let source_lang = payload.source_lang.as_deref().unwrap_or(AUTO_LANGUAGE);
    let languages = LanguageSelection::strict(source_lang, &payload.target_lang)?;
    let text = state.policy.apply(&payload.text);

    let request = TranslationRequest::new(&*text, languages.target()).with_source_lang(languages.source());

    match state.translator.translate(&request).await {
        Ok(result) => Ok(axum::Json(TranslateResponse {
            translated_text: result.translated_text,
            provider: result.provider_used,
            detected_source_lang: result.detected_source_lang,
        })),
        Err(e) => {
            warn!("Translation failed: {}", e);
            Err(e.into())
        }
    }
}

async fn detect(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DetectRequest>,
) -> axum::Json<DetectResponse> {
    axum::Json(DetectResponse {
        language: state.translator.detect_language(&payload.text).await,
    })
}

/// Build the API router around a translator; `policy` limits request text
pub fn router(translator: FreeTranslator, policy: InputPolicy) -> Router {
    let state = Arc::new(AppState { translator, policy });

    Router::new()
        .route("/", get(health_check))
        .route("/api/providers", get(get_providers))
        .route("/api/state", get(get_state))
        .route("/api/method", put(set_method))
        .route("/api/translate", post(translate))
        .route("/api/detect", post(detect))
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(
    host: String,
    port: u16,
    translator: FreeTranslator,
    policy: InputPolicy,
) -> anyhow::Result<()> {
    let app = router(translator, policy);

    // Bind address
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
