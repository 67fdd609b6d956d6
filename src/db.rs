use sqlx::{postgres::PgPoolOptions, PgPool};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db_storage::{LeadStore, PgLeadStore};
use crate::errors::AppError;

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;
        PgLeadStore::ensure_schema(&pool).await?;

        Ok(Self { pool })
    }
}

/// Observable lifecycle of the storage slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageStatus {
    Uninitialized,
    Connecting,
    Ready,
    /// Terminal: there is no reconnection.
    Failed,
}

impl fmt::Display for StorageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StorageStatus::Uninitialized => "uninitialized",
            StorageStatus::Connecting => "connecting",
            StorageStatus::Ready => "ready",
            StorageStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

enum StorageState {
    Uninitialized,
    Connecting,
    Ready(Arc<dyn LeadStore>),
    Failed,
}

impl StorageState {
    fn status(&self) -> StorageStatus {
        match self {
            StorageState::Uninitialized => StorageStatus::Uninitialized,
            StorageState::Connecting => StorageStatus::Connecting,
            StorageState::Ready(_) => StorageStatus::Ready,
            StorageState::Failed => StorageStatus::Failed,
        }
    }
}

/// Process-wide storage slot shared by all handlers.
///
/// The slot is initialized at most once. Until it reaches `Ready`, every
/// data-touching operation is refused with [`AppError::StorageUnavailable`].
/// The store handle is never replaced after that.
pub struct Storage {
    state: RwLock<StorageState>,
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StorageState::Uninitialized),
        }
    }

    /// A slot that is already ready with the given store.
    pub fn with_store(store: Arc<dyn LeadStore>) -> Self {
        Self {
            state: RwLock::new(StorageState::Ready(store)),
        }
    }

    pub async fn status(&self) -> StorageStatus {
        self.state.read().await.status()
    }

    /// Readiness predicate checked before any data-touching operation.
    pub async fn is_connected(&self) -> bool {
        self.status().await == StorageStatus::Ready
    }

    /// Returns the ready store.
    ///
    /// # Errors
    ///
    /// Returns `AppError::StorageUnavailable` in every state but `Ready`.
    pub async fn store(&self) -> Result<Arc<dyn LeadStore>, AppError> {
        match &*self.state.read().await {
            StorageState::Ready(store) => Ok(Arc::clone(store)),
            _ => Err(AppError::StorageUnavailable),
        }
    }

    /// Runs `connect` once and records the outcome.
    ///
    /// Only the first call on an uninitialized slot does anything; later
    /// calls log a warning and return the current status.
    pub async fn initialize_with<F, Fut>(&self, connect: F) -> StorageStatus
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Arc<dyn LeadStore>>>,
    {
        {
            let mut state = self.state.write().await;
            if !matches!(*state, StorageState::Uninitialized) {
                let status = state.status();
                tracing::warn!(
                    "⚠️  Storage initialization already attempted (status: {}), ignoring",
                    status
                );
                return status;
            }
            *state = StorageState::Connecting;
        }

        // The lock is not held while connecting so health checks keep answering.
        let next = match connect().await {
            Ok(store) => {
                tracing::info!("✅ Database connected");
                StorageState::Ready(store)
            }
            Err(e) => {
                tracing::error!("❌ Database connection failed: {:#}", e);
                StorageState::Failed
            }
        };

        let mut state = self.state.write().await;
        *state = next;
        state.status()
    }

    /// Connects to Postgres using the configured URL.
    ///
    /// Without a URL the slot moves straight to `Failed`.
    pub async fn connect(&self, config: &Config) -> StorageStatus {
        let database_url = config.database_url.clone();
        let max_connections = config.db_max_connections;

        self.initialize_with(|| async move {
            let url = database_url
                .ok_or_else(|| anyhow::anyhow!("DB_URL or DATABASE_URL is not configured"))?;
            let db = Database::new(&url, max_connections).await?;
            let store: Arc<dyn LeadStore> = Arc::new(PgLeadStore::new(db.pool));
            Ok::<_, anyhow::Error>(store)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db_storage::MemoryLeadStore;

    fn memory_store() -> Arc<dyn LeadStore> {
        Arc::new(MemoryLeadStore::new())
    }

    #[tokio::test]
    async fn test_new_slot_is_not_connected() {
        let storage = Storage::new();
        assert_eq!(storage.status().await, StorageStatus::Uninitialized);
        assert!(!storage.is_connected().await);
        assert!(matches!(
            storage.store().await,
            Err(AppError::StorageUnavailable)
        ));
    }

    #[tokio::test]
    async fn test_successful_initialization_is_ready() {
        let storage = Storage::new();
        let status = storage
            .initialize_with(|| async { Ok(memory_store()) })
            .await;

        assert_eq!(status, StorageStatus::Ready);
        assert!(storage.is_connected().await);
        assert!(storage.store().await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_initialization_is_terminal() {
        let storage = Storage::new();
        let status = storage
            .initialize_with(|| async { Err(anyhow::anyhow!("connection refused")) })
            .await;
        assert_eq!(status, StorageStatus::Failed);

        // A second attempt does not reconnect.
        let status = storage
            .initialize_with(|| async { Ok(memory_store()) })
            .await;
        assert_eq!(status, StorageStatus::Failed);
        assert!(!storage.is_connected().await);
    }

    #[tokio::test]
    async fn test_ready_slot_is_not_replaced() {
        let storage = Storage::with_store(memory_store());
        let status = storage
            .initialize_with(|| async { Err(anyhow::anyhow!("should not run")) })
            .await;
        assert_eq!(status, StorageStatus::Ready);
    }

    #[tokio::test]
    async fn test_connecting_while_connect_runs() {
        let storage = Arc::new(Storage::new());
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let task = {
            let storage = Arc::clone(&storage);
            tokio::spawn(async move {
                storage
                    .initialize_with(|| async move {
                        let _ = release_rx.await;
                        Ok(memory_store())
                    })
                    .await
            })
        };

        while storage.status().await == StorageStatus::Uninitialized {
            tokio::task::yield_now().await;
        }
        assert_eq!(storage.status().await, StorageStatus::Connecting);
        assert!(!storage.is_connected().await);

        release_tx.send(()).unwrap();
        assert_eq!(task.await.unwrap(), StorageStatus::Ready);
        assert!(storage.is_connected().await);
    }

    #[tokio::test]
    async fn test_connect_without_url_fails() {
        let config = Config {
            database_url: None,
            port: 3000,
            db_max_connections: 10,
        };
        let storage = Storage::new();

        assert_eq!(storage.connect(&config).await, StorageStatus::Failed);
        assert!(!storage.is_connected().await);
    }
}
