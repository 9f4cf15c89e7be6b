use crate::db::error::DatabaseError;
use crate::models::{NewShare, Share};
use crate::utils::generate_share_hash;
use async_trait::async_trait;
use tracing::debug;

/// Create-only storage for shares. Shares are never updated or deleted.
#[async_trait]
pub trait ShareStore: Send + Sync {
    async fn find_by_hash(&self, hash: &str) -> Result<Option<Share>, DatabaseError>;

    async fn hash_exists(&self, hash: &str) -> Result<bool, DatabaseError>;

    /// Insert under an already chosen hash. Returns
    /// [`DatabaseError::ConstraintViolation`] if the hash is taken.
    async fn insert(&self, hash: &str, share: &NewShare) -> Result<Share, DatabaseError>;

    async fn count(&self) -> Result<i64, DatabaseError>;

    /// Store a share under a freshly sampled hash, resampling until it is
    /// unused by every existing share.
    async fn create(&self, share: NewShare) -> Result<Share, DatabaseError> {
        loop {
            let hash = generate_share_hash();
            if self.hash_exists(&hash).await? {
                debug!(hash = %hash, "Share hash already taken, resampling");
                continue;
            }

            match self.insert(&hash, &share).await {
                Err(DatabaseError::ConstraintViolation(reason)) => {
                    debug!(hash = %hash, reason = %reason, "Share insert raced, resampling");
                }
                result => return result,
            }
        }
    }
}
