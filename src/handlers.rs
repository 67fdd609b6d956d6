use crate::db::Storage;
use crate::errors::AppError;
use crate::intake::LeadSubmission;
use crate::models::*;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;

/// Liveness text served at the root.
pub const ROOT_MESSAGE: &str = "SHAYAI API is running.";

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Storage slot; read-only from the handlers' point of view.
    pub storage: Arc<Storage>,
}

/// GET /
///
/// Plain-text liveness check.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service is running", body = String))
)]
pub async fn root() -> &'static str {
    ROOT_MESSAGE
}

/// GET /api/health
///
/// Reports storage connectivity and the current server time. Never fails.
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service health", body = HealthResponse))
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        db_connected: state.storage.is_connected().await,
        time: Utc::now(),
    })
}

/// POST /api/leads
///
/// Normalizes a landing-page submission, scores it, and stores it.
/// Storage readiness is checked before anything is built or written.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `body` - Raw JSON body; an empty body counts as `{}`. Reading it may
///   have failed (e.g. over the size limit); that is reported after the
///   readiness check.
///
/// # Returns
///
/// * `Result<Json<LeadCreatedResponse>, AppError>` - The stored id and record, or an error.
#[utoipa::path(
    post,
    path = "/api/leads",
    request_body = LeadSubmission,
    responses(
        (status = 200, description = "Lead stored", body = LeadCreatedResponse),
        (status = 400, description = "Malformed JSON body", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse),
        (status = 500, description = "Storage operation failed", body = ErrorResponse),
        (status = 503, description = "Database not connected", body = ErrorResponse)
    )
)]
pub async fn submit_lead(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<LeadCreatedResponse>, AppError> {
    let store = state.storage.store().await?;

    let body = body?;
    let submission = LeadSubmission::from_body(&body)?;
    let lead = submission.normalize().into_lead(Utc::now());

    let id = store.insert(&lead).await?;

    tracing::info!(
        "✅ Lead stored: id={}, dealType={:?}, heat={}, pool={}",
        id,
        lead.deal_type,
        lead.heat,
        lead.pool
    );

    Ok(Json(LeadCreatedResponse::ok(id, lead)))
}

/// GET /api/leads
///
/// Returns the most recent leads, newest first.
#[utoipa::path(
    get,
    path = "/api/leads",
    responses(
        (status = 200, description = "Most recent leads", body = LeadListResponse),
        (status = 500, description = "Storage operation failed", body = ErrorResponse),
        (status = 503, description = "Database not connected", body = ErrorResponse)
    )
)]
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LeadListResponse>, AppError> {
    let store = state.storage.store().await?;

    let leads = store.recent(RECENT_LEADS_LIMIT).await?;

    tracing::debug!("Listing {} recent leads", leads.len());

    Ok(Json(LeadListResponse::ok(leads)))
}
