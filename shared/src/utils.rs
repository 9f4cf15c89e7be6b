use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use ulid::Ulid;

/// Number of characters in a share hash.
pub const SHARE_HASH_LENGTH: usize = 10;

pub fn generate_ulid() -> String {
    Ulid::new().to_string()
}

/// Sample a random alphanumeric share hash. Uniqueness is checked by the store.
pub fn generate_share_hash() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SHARE_HASH_LENGTH)
        .map(char::from)
        .collect()
}

/// Absolute URL of the page that renders a share.
pub fn share_url(app_url: &str, hash: &str) -> String {
    format!("{}/share/{}", app_url.trim_end_matches('/'), hash)
}

/// Share hash addressed by a `/share/{hash}` request path.
pub fn share_hash_from_path(path: &str) -> Option<&str> {
    path.strip_prefix("/share/")
        .filter(|hash| !hash.is_empty() && !hash.contains('/'))
}
