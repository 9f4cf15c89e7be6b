use crate::config::DatabaseConfig;
use crate::db::error::DatabaseError;
use sqlx::migrate::Migrator;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Directory, relative to the workspace root, holding the SQL migrations.
pub const MIGRATIONS_DIR: &str = "services/migrations";

#[derive(Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    pub async fn new(database_url: &str) -> Result<Self, DatabaseError> {
        Self::new_with_options(database_url, 10, 3).await
    }

    pub async fn new_with_options(
        database_url: &str,
        max_connections: u32,
        timeout_seconds: u64,
    ) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(timeout_seconds))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn from_config(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        Self::new_with_options(
            &config.database_url,
            config.max_connections,
            config.acquire_timeout_seconds,
        )
        .await
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply every pending migration found in `dir`.
    pub async fn run_migrations(&self, dir: &Path) -> Result<(), DatabaseError> {
        let migrator = Migrator::new(dir.to_path_buf()).await?;
        migrator.run(&self.pool).await?;
        info!(dir = %dir.display(), "Database migrations applied");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Walk up from the current directory until [`MIGRATIONS_DIR`] is found.
pub fn find_migrations_dir() -> Result<PathBuf, DatabaseError> {
    let mut current_dir = std::env::current_dir()
        .map_err(|e| DatabaseError::Config(format!("Cannot read current directory: {e}")))?;
    loop {
        let candidate = current_dir.join(MIGRATIONS_DIR);
        if candidate.exists() {
            return Ok(candidate);
        }
        if !current_dir.pop() {
            return Err(DatabaseError::Config(format!(
                "Could not find migrations directory {MIGRATIONS_DIR}"
            )));
        }
    }
}
