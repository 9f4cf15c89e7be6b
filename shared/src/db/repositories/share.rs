use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::{
    db::error::DatabaseError,
    models::{NewShare, Share},
    traits::ShareStore,
    utils::generate_ulid,
};

pub struct ShareRepository {
    pool: PgPool,
}

impl ShareRepository {
    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }
}

#[async_trait]
impl ShareStore for ShareRepository {
    async fn find_by_hash(&self, hash: &str) -> Result<Option<Share>, DatabaseError> {
        let share = sqlx::query_as::<_, Share>(
            r#"
            SELECT id, hash, code, php_version, wordpress_version, multisite,
                   plugins, themes, created_at, updated_at
            FROM shares
            WHERE hash = $1
            "#,
        )
        .bind(hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(share)
    }

    async fn hash_exists(&self, hash: &str) -> Result<bool, DatabaseError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM shares WHERE hash = $1)")
                .bind(hash)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn insert(&self, hash: &str, share: &NewShare) -> Result<Share, DatabaseError> {
        let created = sqlx::query_as::<_, Share>(
            r#"
            INSERT INTO shares (id, hash, code, php_version, wordpress_version, multisite, plugins, themes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, hash, code, php_version, wordpress_version, multisite,
                      plugins, themes, created_at, updated_at
            "#,
        )
        .bind(generate_ulid())
        .bind(hash)
        .bind(&share.code)
        .bind(&share.php_version)
        .bind(&share.wordpress_version)
        .bind(share.multisite)
        .bind(Json(&share.plugins))
        .bind(Json(&share.themes))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DatabaseError::ConstraintViolation(format!("Share hash {hash} already exists"))
            }
            _ => DatabaseError::from(e),
        })?;

        Ok(created)
    }

    async fn count(&self) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shares")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
