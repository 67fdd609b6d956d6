use chrono::{Duration, Utc};
use std::env;
use uuid::Uuid;

use shayai_api::classifier::Pool;
use shayai_api::db::Database;
use shayai_api::db_storage::{LeadStore, PgLeadStore};
use shayai_api::intake::LeadSubmission;

/// Integration smoke test for lead storage against a real Postgres.
/// Marked ignored to avoid running against production by accident; set TEST_DATABASE_URL to run.
#[tokio::test]
#[ignore]
async fn store_and_list_leads_smoke_test() -> anyhow::Result<()> {
    let db_url = env::var("TEST_DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("Set TEST_DATABASE_URL to run this test"))?;

    let db = Database::new(&db_url, 2).await?;
    let store = PgLeadStore::new(db.pool.clone());

    // Future timestamps keep these rows at the head of the listing on a shared database.
    let marker = Uuid::new_v4().to_string();
    let base = Utc::now() + Duration::days(365);

    let older = LeadSubmission {
        name: Some(format!("older-{}", marker)),
        deal_type: Some("buy".to_string()),
        ..Default::default()
    }
    .normalize()
    .into_lead(base);

    let newer = LeadSubmission {
        name: Some(format!("newer-{}", marker)),
        deal_type: Some("sell".to_string()),
        area: Some("North".to_string()),
        ..Default::default()
    }
    .normalize()
    .into_lead(base + Duration::seconds(1));

    let older_id = store.insert(&older).await.map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let newer_id = store.insert(&newer).await.map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert_ne!(older_id, newer_id);

    let recent = store.recent(50).await.map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert!(recent.len() <= 50);

    let newer_pos = recent.iter().position(|l| l.id == newer_id).expect("newer lead listed");
    let older_pos = recent.iter().position(|l| l.id == older_id).expect("older lead listed");
    assert!(newer_pos < older_pos);

    let stored = &recent[newer_pos].lead;
    assert_eq!(stored.created_at, newer.created_at);
    assert_eq!(stored.heat, 50);
    assert_eq!(stored.pool, Pool::Hot);
    assert_eq!(stored.stage, "New");
    assert_eq!(stored.source, "LandingPage");

    sqlx::query("DELETE FROM leads WHERE id = ANY($1)")
        .bind(vec![older_id, newer_id])
        .execute(&db.pool)
        .await?;

    Ok(())
}

/// Leads sharing a timestamp list in reverse insertion order.
#[tokio::test]
#[ignore]
async fn equal_timestamps_list_latest_insert_first() -> anyhow::Result<()> {
    let db_url = env::var("TEST_DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("Set TEST_DATABASE_URL to run this test"))?;

    let db = Database::new(&db_url, 2).await?;
    let store = PgLeadStore::new(db.pool.clone());

    let at = Utc::now() + Duration::days(730);
    let mut ids = Vec::new();
    for name in ["first", "second", "third"] {
        let lead = LeadSubmission {
            name: Some(name.to_string()),
            ..Default::default()
        }
        .normalize()
        .into_lead(at);
        ids.push(store.insert(&lead).await.map_err(|e| anyhow::anyhow!(e.to_string()))?);
    }

    let recent = store.recent(50).await.map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let listed: Vec<Uuid> = recent
        .iter()
        .map(|l| l.id)
        .filter(|id| ids.contains(id))
        .collect();
    assert_eq!(listed, vec![ids[2], ids[1], ids[0]]);

    sqlx::query("DELETE FROM leads WHERE id = ANY($1)")
        .bind(ids)
        .execute(&db.pool)
        .await?;

    Ok(())
}
