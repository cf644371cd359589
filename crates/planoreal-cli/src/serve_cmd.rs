use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::header::{self, HeaderValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::Instrument;
use uuid::Uuid;

use planoreal_core::render::export_pdf;
use planoreal_core::{ChatCompletionClient, LessonPlan, PipelineError, Planner, UpstreamError};

use crate::config::AppConfig;

/// Maximum accepted request body.
pub const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Suggested file name for exported PDFs.
pub const PDF_FILE_NAME: &str = "plano-de-aula.pdf";

pub const INVALID_DATA: &str = "Dados inválidos";
pub const INVALID_JSON_BODY: &str = "Corpo da requisição não é um JSON válido";
pub const INVALID_PLAN_BODY: &str = "Plano de aula deve ser um objeto JSON";
pub const UPSTREAM_FAILED: &str = "Erro ao chamar API de IA";
pub const REPLY_NOT_JSON: &str = "Resposta da IA não está em formato JSON válido";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    details: Option<Vec<String>>,
}

impl AppError {
    pub fn invalid(details: Vec<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: INVALID_DATA.to_string(),
            details: Some(details),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
            details: None,
        }
    }
}

impl From<PipelineError> for AppError {
    /// Upstream bodies and raw replies are logged here and never sent to
    /// the client.
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Validation(v) => {
                tracing::info!(errors = v.details.len(), "request rejected");
                Self::invalid(v.details)
            }
            PipelineError::Upstream(UpstreamError::Status { status, body }) => {
                tracing::error!(status, %body, "model endpoint returned an error");
                Self::internal(UPSTREAM_FAILED)
            }
            PipelineError::Upstream(e) => {
                tracing::error!(error = %e, "model call failed");
                Self::internal(UPSTREAM_FAILED)
            }
            PipelineError::Malformed(m) => {
                tracing::warn!(reason = %m.reason, raw = %m.raw, "model reply is not JSON");
                Self::internal(REPLY_NOT_JSON)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.message, "details": details }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Shared, read-only handler state.
pub struct AppState {
    pub planner: Planner,
}

pub fn build_router(planner: Planner) -> Router {
    let state = Arc::new(AppState { planner });
    Router::new()
        .route("/health", get(health))
        .route("/api/generate-plan", post(generate_plan))
        .route("/api/gerar-plano", post(generate_plan))
        .route("/api/export-pdf", post(export_plan_pdf))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(config: AppConfig) -> Result<()> {
    let client = ChatCompletionClient::new(config.gateway.clone())
        .context("failed to build model gateway")?;
    let app = build_router(Planner::new(Arc::new(client)));

    let listener = tokio::net::TcpListener::bind((config.bind.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.bind, config.port))?;
    let addr = listener.local_addr()?;
    tracing::info!(model = %config.gateway.model, "planoreal serve listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("planoreal serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn generate_plan(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("generate_plan", %request_id);

    async move {
        let body = parse_body(&body)?;
        let plan = state.planner.generate(&body).await?;
        tracing::info!("lesson plan generated");
        Ok::<_, AppError>(Json(plan.into_value()))
    }
    .instrument(span)
    .await
}

async fn export_plan_pdf(body: Bytes) -> Result<Response, AppError> {
    let plan = LessonPlan::from_value(parse_body(&body)?)
        .ok_or_else(|| AppError::invalid(vec![INVALID_PLAN_BODY.to_string()]))?;
    let pdf = export_pdf(&plan);
    tracing::debug!(bytes = pdf.len(), "lesson plan exported");

    let disposition = format!("attachment; filename=\"{PDF_FILE_NAME}\"");
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}

fn parse_body(body: &[u8]) -> Result<Value, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "request body is not JSON");
        AppError::invalid(vec![INVALID_JSON_BODY.to_string()])
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
