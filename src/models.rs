use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::classifier::Pool;

/// Source recorded when the submission does not name one.
pub const DEFAULT_SOURCE: &str = "LandingPage";

/// Stage assigned to every newly created lead.
pub const NEW_STAGE: &str = "New";

/// Maximum number of leads returned by the listing endpoint.
pub const RECENT_LEADS_LIMIT: i64 = 50;

// ============ Records ============

/// A prospective-customer record as persisted.
///
/// `heat` and `pool` are always derived from `deal_type` and `area`; the
/// record is never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub name: String,
    pub phone: String,
    pub area: String,
    /// "buy", "sell", or anything else (scores zero).
    pub deal_type: String,
    pub lang: String,
    pub is_broker: bool,
    pub source: String,
    /// Server-assigned creation time.
    pub created_at: DateTime<Utc>,
    pub stage: String,
    pub heat: i32,
    pub pool: Pool,
}

/// A lead together with the identifier assigned by storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StoredLead {
    pub id: Uuid,
    #[serde(flatten)]
    pub lead: Lead,
}

// ============ API Responses ============

/// Response for a successfully stored lead.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LeadCreatedResponse {
    /// Always "ok".
    pub status: String,
    pub id: Uuid,
    pub lead: Lead,
}

/// Response for the recent leads listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LeadListResponse {
    /// Always "ok".
    pub status: String,
    pub count: usize,
    /// Newest first.
    pub leads: Vec<StoredLead>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub db_connected: bool,
    pub time: DateTime<Utc>,
}

/// Body returned for every failed request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always "error".
    pub status: String,
    pub message: String,
}

impl LeadCreatedResponse {
    pub fn ok(id: Uuid, lead: Lead) -> Self {
        Self {
            status: "ok".to_string(),
            id,
            lead,
        }
    }
}

impl LeadListResponse {
    pub fn ok(leads: Vec<StoredLead>) -> Self {
        Self {
            status: "ok".to_string(),
            count: leads.len(),
            leads,
        }
    }
}
