use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::classifier::Pool;
use crate::errors::{AppError, ResultExt};
use crate::models::{Lead, StoredLead};

/// Idempotent schema for the lead collection. Ids are assigned by Postgres.
/// `seq` records insertion order and breaks `created_at` ties.
const CREATE_LEADS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS leads (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        seq BIGSERIAL,
        name TEXT NOT NULL,
        phone TEXT NOT NULL,
        area TEXT NOT NULL,
        deal_type TEXT NOT NULL,
        lang TEXT NOT NULL,
        is_broker BOOLEAN NOT NULL,
        source TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        stage TEXT NOT NULL,
        heat INTEGER NOT NULL,
        pool TEXT NOT NULL
    )
"#;

/// Persistence backend for leads.
///
/// Each call is a single independent storage operation; implementations hold
/// no per-request state.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Stores a new lead and returns the identifier assigned by storage.
    async fn insert(&self, lead: &Lead) -> Result<Uuid, AppError>;

    /// Returns up to `limit` leads, newest first by `created_at`. Leads with
    /// the same `created_at` come back latest insert first.
    async fn recent(&self, limit: i64) -> Result<Vec<StoredLead>, AppError>;
}

/// Postgres-backed lead storage.
pub struct PgLeadStore {
    pool: PgPool,
}

impl PgLeadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `leads` table if it does not exist yet.
    pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query(CREATE_LEADS_TABLE).execute(pool).await?;
        Ok(())
    }
}

#[derive(Debug, FromRow)]
struct LeadRow {
    id: Uuid,
    name: String,
    phone: String,
    area: String,
    deal_type: String,
    lang: String,
    is_broker: bool,
    source: String,
    created_at: DateTime<Utc>,
    stage: String,
    heat: i32,
    pool: String,
}

impl TryFrom<LeadRow> for StoredLead {
    type Error = AppError;

    fn try_from(row: LeadRow) -> Result<Self, Self::Error> {
        let pool = row.pool.parse::<Pool>().map_err(|e| {
            AppError::InternalError(format!("Lead {} has invalid pool: {}", row.id, e))
        })?;

        Ok(StoredLead {
            id: row.id,
            lead: Lead {
                name: row.name,
                phone: row.phone,
                area: row.area,
                deal_type: row.deal_type,
                lang: row.lang,
                is_broker: row.is_broker,
                source: row.source,
                created_at: row.created_at,
                stage: row.stage,
                heat: row.heat,
                pool,
            },
        })
    }
}

#[async_trait]
impl LeadStore for PgLeadStore {
    async fn insert(&self, lead: &Lead) -> Result<Uuid, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO leads (
                name,
                phone,
                area,
                deal_type,
                lang,
                is_broker,
                source,
                created_at,
                stage,
                heat,
                pool
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(&lead.name)
        .bind(&lead.phone)
        .bind(&lead.area)
        .bind(&lead.deal_type)
        .bind(&lead.lang)
        .bind(lead.is_broker)
        .bind(&lead.source)
        .bind(lead.created_at)
        .bind(&lead.stage)
        .bind(lead.heat)
        .bind(lead.pool.as_str())
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert lead")?;

        Ok(id)
    }

    async fn recent(&self, limit: i64) -> Result<Vec<StoredLead>, AppError> {
        let rows = sqlx::query_as::<_, LeadRow>(
            r#"
            SELECT id, name, phone, area, deal_type, lang, is_broker, source,
                   created_at, stage, heat, pool
            FROM leads
            ORDER BY created_at DESC, seq DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch recent leads")?;

        rows.into_iter().map(StoredLead::try_from).collect()
    }
}

/// In-process lead storage. Records live as long as the store.
#[derive(Default, Clone)]
pub struct MemoryLeadStore {
    records: Arc<Mutex<Vec<StoredLead>>>,
}

impl MemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl LeadStore for MemoryLeadStore {
    async fn insert(&self, lead: &Lead) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();
        self.records.lock().await.push(StoredLead {
            id,
            lead: lead.clone(),
        });
        Ok(id)
    }

    async fn recent(&self, limit: i64) -> Result<Vec<StoredLead>, AppError> {
        let limit = usize::try_from(limit).unwrap_or(0);

        // Later inserts win ties: reverse first, then stable sort.
        let mut leads: Vec<StoredLead> = self.records.lock().await.iter().rev().cloned().collect();
        leads.sort_by(|a, b| b.lead.created_at.cmp(&a.lead.created_at));
        leads.truncate(limit);

        Ok(leads)
    }
}
