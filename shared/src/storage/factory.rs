use super::memory::MemoryShareStore;
use crate::config::DatabaseConfig;
use crate::db::pool::{find_migrations_dir, DatabasePool};
use crate::db::repositories::ShareRepository;
use crate::db::DatabaseError;
use crate::traits::ShareStore;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShareBackend {
    Postgres,
    Memory,
}

impl ShareBackend {
    pub fn from_env() -> Self {
        let backend = std::env::var("SHARE_STORE")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_lowercase();

        Self::parse(&backend)
    }

    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "memory" => ShareBackend::Memory,
            _ => ShareBackend::Postgres,
        }
    }
}

pub struct StorageFactory;

impl StorageFactory {
    /// Create the share store for `backend`.
    ///
    /// The postgres backend connects with `database`, which is then required,
    /// and applies the migrations found under `services/migrations`.
    pub async fn create(
        backend: ShareBackend,
        database: Option<&DatabaseConfig>,
    ) -> Result<Arc<dyn ShareStore>, DatabaseError> {
        match backend {
            ShareBackend::Memory => {
                info!("Initializing in-memory share store");
                Ok(Arc::new(MemoryShareStore::new()))
            }
            ShareBackend::Postgres => {
                let config = database.ok_or_else(|| {
                    DatabaseError::Config(
                        "DATABASE_URL is required when SHARE_STORE=postgres".to_string(),
                    )
                })?;
                info!("Initializing PostgreSQL share store");
                let db_pool = DatabasePool::from_config(config).await?;
                db_pool.run_migrations(&find_migrations_dir()?).await?;
                Ok(Arc::new(ShareRepository::new(db_pool.pool())))
            }
        }
    }
}
