//! Durable client-side snapshot of session preferences, and the one-time
//! reconciliation of that snapshot with an opened share and the page URL.

use dashmap::DashMap;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use crate::action::StatePatch;
use crate::error::{PlaygroundError, Result};
use crate::share::ShareRecord;
use crate::state::{PhpVersion, PlaygroundState, WordPressVersion};

/// Key the snapshot is stored under.
pub const STORAGE_KEY: &str = "state";

/// String key/value storage with the shape of browser local storage.
pub trait SnapshotStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: DashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).map(|item| item.value().clone()))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Keeps all items in one JSON object on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_items(&self) -> Result<Map<String, Value>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(PlaygroundError::Storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(items)) => Ok(items),
            Ok(_) => Err(PlaygroundError::Storage(format!(
                "{} does not hold a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(PlaygroundError::Storage(format!(
                "Failed to parse {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

impl SnapshotStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .read_items()?
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.read_items().unwrap_or_else(|e| {
            warn!("Discarding unreadable storage file: {}", e);
            Map::new()
        });
        items.insert(key.to_string(), Value::String(value.to_string()));

        let serialized = serde_json::to_string(&items)
            .map_err(|e| PlaygroundError::Storage(e.to_string()))?;
        std::fs::write(&self.path, serialized).map_err(|e| {
            PlaygroundError::Storage(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}

/// The persisted subset of [`PlaygroundState`]. Absent fields keep whatever
/// the state already holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser_showing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub console_showing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multisite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub php_version: Option<PhpVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub themes: Option<Vec<String>>,
    #[serde(rename = "wordPressVersion", skip_serializing_if = "Option::is_none")]
    pub wordpress_version: Option<WordPressVersion>,
}

impl Snapshot {
    pub fn from_state(state: &PlaygroundState) -> Self {
        Self {
            browser_showing: Some(state.browser_showing),
            console_showing: Some(state.console_showing),
            multisite: Some(state.multisite),
            php_version: Some(state.php_version),
            plugins: Some(state.plugins.clone()),
            themes: Some(state.themes.clone()),
            wordpress_version: Some(state.wordpress_version),
        }
    }

    /// Parse stored JSON. Anything that is not an object yields an empty
    /// snapshot; fields with the wrong shape are dropped one by one.
    pub fn parse(raw: &str) -> Self {
        let fields = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) => {
                warn!("Stored playground state is not an object, ignoring it");
                return Self::default();
            }
            Err(e) => {
                warn!("Error parsing stored playground state: {}", e);
                return Self::default();
            }
        };

        let string_list = |key: &str| -> Option<Vec<String>> {
            fields
                .get(key)?
                .as_array()?
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect()
        };

        Self {
            browser_showing: fields.get("browserShowing").and_then(Value::as_bool),
            console_showing: fields.get("consoleShowing").and_then(Value::as_bool),
            multisite: fields.get("multisite").and_then(Value::as_bool),
            php_version: fields
                .get("phpVersion")
                .and_then(Value::as_str)
                .and_then(PhpVersion::parse),
            plugins: string_list("plugins"),
            themes: string_list("themes"),
            wordpress_version: fields
                .get("wordPressVersion")
                .and_then(Value::as_str)
                .and_then(WordPressVersion::parse),
        }
    }

    pub fn apply_to(&self, state: &mut PlaygroundState) {
        if let Some(showing) = self.browser_showing {
            state.browser_showing = showing;
        }
        if let Some(showing) = self.console_showing {
            state.console_showing = showing;
        }
        if let Some(multisite) = self.multisite {
            state.multisite = multisite;
        }
        if let Some(version) = self.php_version {
            state.php_version = version;
        }
        if let Some(plugins) = &self.plugins {
            state.plugins = plugins.clone();
        }
        if let Some(themes) = &self.themes {
            state.themes = themes.clone();
        }
        if let Some(version) = self.wordpress_version {
            state.wordpress_version = version;
        }
    }
}

/// Reads and writes the snapshot. Failures are logged and never surface.
#[derive(Clone)]
pub struct PersistenceBridge {
    storage: Arc<dyn SnapshotStorage>,
}

impl PersistenceBridge {
    pub fn new(storage: Arc<dyn SnapshotStorage>) -> Self {
        Self { storage }
    }

    pub fn load(&self) -> Snapshot {
        match self.storage.get_item(STORAGE_KEY) {
            Ok(Some(raw)) => Snapshot::parse(&raw),
            Ok(None) => Snapshot::default(),
            Err(e) => {
                warn!("Failed to read stored playground state: {}", e);
                Snapshot::default()
            }
        }
    }

    pub fn save(&self, snapshot: &Snapshot) {
        let serialized = match serde_json::to_string(snapshot) {
            Ok(serialized) => serialized,
            Err(e) => {
                warn!("Failed to serialize playground state: {}", e);
                return;
            }
        };

        if let Err(e) = self.storage.set_item(STORAGE_KEY, &serialized) {
            warn!("Failed to store playground state: {}", e);
        }
    }
}

/// What the page URL contributes to reconciliation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLocation {
    pub share_hash: Option<String>,
    pub plugins: Vec<String>,
    pub themes: Vec<String>,
}

impl PageLocation {
    pub fn from_url(url: &Url) -> Self {
        let share_hash = url
            .path()
            .strip_prefix("/share/")
            .map(|hash| hash.trim_end_matches('/'))
            .filter(|hash| !hash.is_empty() && !hash.contains('/'))
            .map(str::to_string);

        let mut plugins = Vec::new();
        let mut themes = Vec::new();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "plugin" => plugins.push(value.into_owned()),
                "theme" => themes.push(value.into_owned()),
                _ => {}
            }
        }

        Self {
            share_hash,
            plugins,
            themes,
        }
    }
}

/// Build the mount-time state, lowest priority first: defaults, stored
/// snapshot, share record, URL query.
pub fn reconcile(
    snapshot: &Snapshot,
    share: Option<&ShareRecord>,
    location: &PageLocation,
) -> StatePatch {
    let defaults = PlaygroundState::default();
    let mut state = PlaygroundState::default();

    snapshot.apply_to(&mut state);

    // Configuration always comes from the share or the URL, never from storage.
    state.execution_time = defaults.execution_time;
    state.multisite = defaults.multisite;
    state.php_version = defaults.php_version;
    state.plugins = defaults.plugins.clone();
    state.themes = defaults.themes.clone();
    state.wordpress_version = defaults.wordpress_version;

    if let Some(share) = share {
        debug!(hash = %share.hash, "Restoring state from share");
        state.code = share.code.clone();
        state.multisite = share.multisite;
        state.php_version = PhpVersion::parse(&share.php_version).unwrap_or_else(|| {
            warn!(
                "Share uses unsupported PHP version {}, using {}",
                share.php_version, defaults.php_version
            );
            defaults.php_version
        });
        state.plugins = share.plugins.clone().unwrap_or_default();
        state.themes = share.themes.clone().unwrap_or_default();
        state.wordpress_version =
            WordPressVersion::parse(&share.wordpress_version).unwrap_or_else(|| {
                warn!(
                    "Share uses unsupported WordPress version {}, using {}",
                    share.wordpress_version, defaults.wordpress_version
                );
                defaults.wordpress_version
            });
    }

    if !location.plugins.is_empty() {
        state.plugins = location.plugins.clone();
    }
    if !location.themes.is_empty() {
        state.themes = location.themes.clone();
    }

    state.loading = true;
    state.ready = true;
    state.settings_open = false;

    StatePatch::from_state(state)
}
