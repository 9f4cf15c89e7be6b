use serde::{Deserialize, Serialize};
use sqlx::types::time::OffsetDateTime;
use sqlx::FromRow;

/// An immutable snapshot of playground code and configuration, addressed by
/// its random `hash`. The internal `id` never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Share {
    #[serde(skip)]
    pub id: String,
    pub hash: String,
    pub code: String,
    pub php_version: String,
    pub wordpress_version: String,
    pub multisite: bool,
    #[sqlx(json)]
    pub plugins: Vec<String>,
    #[sqlx(json)]
    pub themes: Vec<String>,
    #[serde(with = "time::serde::iso8601")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::iso8601")]
    pub updated_at: OffsetDateTime,
}

/// Validated fields of a share that has not been stored yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewShare {
    pub code: String,
    pub php_version: String,
    pub wordpress_version: String,
    pub multisite: bool,
    #[serde(default)]
    pub plugins: Vec<String>,
    #[serde(default)]
    pub themes: Vec<String>,
}

impl NewShare {
    pub fn into_share(self, id: String, hash: String, now: OffsetDateTime) -> Share {
        Share {
            id,
            hash,
            code: self.code,
            php_version: self.php_version,
            wordpress_version: self.wordpress_version,
            multisite: self.multisite,
            plugins: self.plugins,
            themes: self.themes,
            created_at: now,
            updated_at: now,
        }
    }
}
