//! Router and middleware assembly.

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{self, AppState};
use crate::openapi::ApiDoc;

/// Largest accepted request body. Landing-page forms are a few hundred bytes.
///
/// Enforced by the body extractor so oversized requests are rejected with the
/// usual JSON error envelope.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Builds the full application router.
///
/// Routes:
/// - `GET /` plain-text liveness
/// - `GET /api/health` storage connectivity and server time
/// - `POST /api/leads` submit a lead
/// - `GET /api/leads` most recent leads
/// - `GET /docs` Swagger UI over `/api-docs/openapi.json`
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/api/health", get(handlers::health))
        .route(
            "/api/leads",
            get(handlers::list_leads).post(handlers::submit_lead),
        )
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}
