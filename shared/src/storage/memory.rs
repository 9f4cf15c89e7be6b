use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use sqlx::types::time::OffsetDateTime;

use crate::db::error::DatabaseError;
use crate::models::{NewShare, Share};
use crate::traits::ShareStore;
use crate::utils::generate_ulid;

/// Process-local share store keyed by hash. Used for development and tests;
/// nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryShareStore {
    shares: DashMap<String, Share>,
}

impl MemoryShareStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShareStore for MemoryShareStore {
    async fn find_by_hash(&self, hash: &str) -> Result<Option<Share>, DatabaseError> {
        Ok(self.shares.get(hash).map(|entry| entry.value().clone()))
    }

    async fn hash_exists(&self, hash: &str) -> Result<bool, DatabaseError> {
        Ok(self.shares.contains_key(hash))
    }

    async fn insert(&self, hash: &str, share: &NewShare) -> Result<Share, DatabaseError> {
        match self.shares.entry(hash.to_string()) {
            Entry::Occupied(_) => Err(DatabaseError::ConstraintViolation(format!(
                "Share hash {hash} already exists"
            ))),
            Entry::Vacant(slot) => {
                let created = share.clone().into_share(
                    generate_ulid(),
                    hash.to_string(),
                    OffsetDateTime::now_utc(),
                );
                slot.insert(created.clone());
                Ok(created)
            }
        }
    }

    async fn count(&self) -> Result<i64, DatabaseError> {
        Ok(self.shares.len() as i64)
    }
}
