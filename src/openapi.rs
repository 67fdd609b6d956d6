use utoipa::OpenApi;

use crate::classifier::Pool;
use crate::handlers;
use crate::intake::LeadSubmission;
use crate::models::{
    ErrorResponse, HealthResponse, Lead, LeadCreatedResponse, LeadListResponse, StoredLead,
};

/// OpenAPI document for the lead intake API, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SHAYAI Lead Intake API",
        description = "Accepts landing-page lead submissions, scores them, and stores them."
    ),
    paths(
        handlers::root,
        handlers::health,
        handlers::submit_lead,
        handlers::list_leads
    ),
    components(schemas(
        LeadSubmission,
        Lead,
        StoredLead,
        Pool,
        LeadCreatedResponse,
        LeadListResponse,
        HealthResponse,
        ErrorResponse
    ))
)]
pub struct ApiDoc;
