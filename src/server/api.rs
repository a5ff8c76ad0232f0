//! HTTP API server implementation

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::dispatcher::Translator;
use crate::core::errors::TranslationError;
use crate::core::models::{duration_ms, LoadOutcome, ModelStatus, TranslationRequest};

/// Application state
#[derive(Clone)]
pub struct AppState {
    translator: Translator,
}

impl AppState {
    pub fn new(translator: Translator) -> Self {
        Self { translator }
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub model: String,
    pub status: ModelStatus,
    pub num_beams: usize,
    pub max_length: usize,
    pub dictionary_entries: usize,
}

#[derive(Serialize)]
pub struct LoadResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
}

/// Translation request body
#[derive(Deserialize)]
pub struct TranslateRequest {
    pub text: String,
}

/// Translation response body
#[derive(Serialize)]
pub struct TranslateResponse {
    pub translation: String,
    pub raw_translation: String,
    pub model: String,
    pub elapsed_ms: u64,
    pub created: i64,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub code: String,
}

/// Translation error rendered with a matching HTTP status
pub struct ApiError(TranslationError);

impl From<TranslationError> for ApiError {
    fn from(err: TranslationError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            TranslationError::EmptyInput => (StatusCode::BAD_REQUEST, "empty_input"),
            TranslationError::ModelNotReady => (StatusCode::SERVICE_UNAVAILABLE, "model_not_ready"),
            TranslationError::LoadInProgress => (StatusCode::CONFLICT, "load_in_progress"),
            TranslationError::ModelLoadFailure { .. } => (StatusCode::BAD_GATEWAY, "model_load_failure"),
            TranslationError::InferenceFailure { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "inference_failure")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                message: self.0.to_string(),
                code: code.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Health check handler
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Model status handler
async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let translator = &state.translator;
    Json(StatusResponse {
        model: translator.cache().model_id().to_string(),
        status: translator.cache().status(),
        num_beams: translator.generation().num_beams,
        max_length: translator.generation().max_length,
        dictionary_entries: translator.dictionary().len(),
    })
}

/// Load the model; blocks until the load finishes
async fn load_model(State(state): State<Arc<AppState>>) -> Result<Json<LoadResponse>, ApiError> {
    let outcome = state.translator.cache().load().await.map_err(|e| {
        warn!("Load request failed: {}", e);
        ApiError(e)
    })?;

    Ok(Json(match outcome {
        LoadOutcome::Loaded { elapsed } => LoadResponse {
            status: "loaded".to_string(),
            elapsed_ms: Some(duration_ms(elapsed)),
        },
        LoadOutcome::AlreadyLoaded => LoadResponse {
            status: "already_loaded".to_string(),
            elapsed_ms: None,
        },
    }))
}

/// Translation handler; concurrent requests queue on the model lock
async fn translate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let request = TranslationRequest::new(payload.text);
    let result = state.translator.translate(&request).await.map_err(|e| {
        warn!("Translation failed: {}", e);
        ApiError(e)
    })?;

    Ok(Json(TranslateResponse {
        translation: result.translation,
        raw_translation: result.raw_translation,
        model: result.model_used,
        elapsed_ms: result.elapsed_ms,
        created: result.completed_at.timestamp(),
    }))
}

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/status", get(get_status))
        .route("/load", post(load_model))
        .route("/translate", post(translate))
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(host: String, port: u16, translator: Translator, auto_load: bool) -> anyhow::Result<()> {
    if auto_load {
        let cache = Arc::clone(translator.cache());
        tokio::spawn(async move {
            if let Err(e) = cache.load().await {
                warn!("Background model load failed: {}", e);
            }
        });
    }

    let state = Arc::new(AppState::new(translator));
    let app = router(state);

    // Bind address
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
