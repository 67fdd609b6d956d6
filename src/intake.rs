//! Normalization of landing-page submissions into lead records.
//!
//! Request bodies are loosely typed: any field may be missing, `null`, or of
//! the wrong JSON type. Everything is resolved here into a fully populated
//! [`LeadFields`] so the classifier only ever sees plain strings.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use utoipa::ToSchema;

use crate::classifier::classify;
use crate::errors::AppError;
use crate::models::{Lead, DEFAULT_SOURCE, NEW_STAGE};

/// Raw form submission as posted by the landing page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadSubmission {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub area: Option<String>,
    /// "buy" or "sell"; other values are accepted and score zero.
    #[serde(default, deserialize_with = "lenient_text")]
    pub deal_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub lang: Option<String>,
    /// `true` or `"true"`; anything else is false.
    #[serde(default, deserialize_with = "truthy_flag")]
    pub is_broker: bool,
    #[serde(default, deserialize_with = "lenient_text")]
    pub source: Option<String>,
}

/// Submission with every default applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadFields {
    pub name: String,
    pub phone: String,
    pub area: String,
    pub deal_type: String,
    pub lang: String,
    pub is_broker: bool,
    pub source: String,
}

impl LeadSubmission {
    /// Decodes a request body. An empty body is an empty submission, and so
    /// is a JSON array: it carries no named fields.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if the body is not valid JSON, or is a
    /// bare scalar rather than an object or array.
    pub fn from_body(body: &[u8]) -> Result<Self, AppError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let value: Value = serde_json::from_slice(body).map_err(invalid_body)?;
        match value {
            Value::Object(_) => serde_json::from_value(value).map_err(invalid_body),
            Value::Array(_) => Ok(Self::default()),
            _ => Err(AppError::BadRequest(
                "Invalid JSON body: expected an object".to_string(),
            )),
        }
    }

    pub fn normalize(self) -> LeadFields {
        LeadFields {
            name: self.name.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            area: self.area.unwrap_or_default(),
            deal_type: self.deal_type.unwrap_or_default(),
            lang: self.lang.unwrap_or_default(),
            is_broker: self.is_broker,
            // An empty source falls back as well.
            source: self
                .source
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
        }
    }
}

fn invalid_body(e: serde_json::Error) -> AppError {
    AppError::BadRequest(format!("Invalid JSON body: {}", e))
}

impl LeadFields {
    /// Builds the record to persist, scoring it on the way.
    ///
    /// `created_at` is cut to microseconds, the resolution storage keeps, so
    /// the returned record is exactly what a later listing reads back.
    pub fn into_lead(self, created_at: DateTime<Utc>) -> Lead {
        let classification = classify(&self.deal_type, &self.area);

        Lead {
            name: self.name,
            phone: self.phone,
            area: self.area,
            deal_type: self.deal_type,
            lang: self.lang,
            is_broker: self.is_broker,
            source: self.source,
            created_at: created_at.trunc_subsecs(6),
            stage: NEW_STAGE.to_string(),
            heat: classification.heat,
            pool: classification.pool,
        }
    }
}

/// Accepts strings as-is and stringifies numbers and booleans.
/// `null`, arrays and objects are treated as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn truthy_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => s == "true",
        _ => false,
    })
}
