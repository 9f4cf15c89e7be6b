pub mod action;
pub mod error;
pub mod executor;
pub mod persistence;
pub mod reducer;
pub mod sandbox;
pub mod share;
pub mod state;
pub mod store;
pub mod view;
pub mod watchdog;

pub use action::{Action, StatePatch};
pub use error::{PlaygroundError, Result, SandboxError, ShareError};
pub use executor::{ExecutionCoordinator, RunOutcome};
pub use persistence::{FileStorage, MemoryStorage, PersistenceBridge, SnapshotStorage};
pub use sandbox::{LifecycleManager, SandboxClient, SandboxLauncher, WordPressVersions};
pub use share::{can_share, ShareClient, ShareRecord};
pub use state::{PhpVersion, PlaygroundState, SandboxHandle, WordPressVersion, DEFAULT_CODE};
pub use store::Store;

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use url::Url;

use persistence::{reconcile, PageLocation};
use share::ShareRequest;
use view::VersionOption;
use watchdog::BootWatchdog;

/// Settings applied from the settings dialog. Applying them replaces the
/// running sandbox with a freshly booted one.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub php_version: PhpVersion,
    pub wordpress_version: WordPressVersion,
    pub multisite: bool,
}

/// One playground session: state store plus the components acting on it.
pub struct Playground {
    store: Arc<Store>,
    persistence: PersistenceBridge,
    lifecycle: LifecycleManager,
    coordinator: ExecutionCoordinator,
    share_client: Option<ShareClient>,
    opened_share: Option<ShareRecord>,
    watchdog: Option<JoinHandle<()>>,
}

impl Playground {
    pub fn new(launcher: Arc<dyn SandboxLauncher>, storage: Arc<dyn SnapshotStorage>) -> Self {
        let persistence = PersistenceBridge::new(storage);
        let store = Arc::new(Store::with_persistence(persistence.clone()));

        Self {
            coordinator: ExecutionCoordinator::new(store.clone()),
            lifecycle: LifecycleManager::new(launcher),
            persistence,
            store,
            share_client: None,
            opened_share: None,
            watchdog: None,
        }
    }

    pub fn with_share_client(mut self, client: ShareClient) -> Self {
        self.share_client = Some(client);
        self
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn state(&self) -> PlaygroundState {
        self.store.state()
    }

    pub fn dispatch(&self, action: Action) {
        self.store.dispatch(action);
    }

    /// Reconcile stored preferences, the share named by `page_url` and its
    /// query parameters into the initial state, then arm the boot watchdog.
    pub async fn mount(&mut self, page_url: &Url) {
        let location = PageLocation::from_url(page_url);
        let snapshot = self.persistence.load();

        self.opened_share = match (&location.share_hash, &self.share_client) {
            (Some(hash), Some(client)) => match client.fetch(hash).await {
                Ok(Some(share)) => Some(share),
                Ok(None) => {
                    warn!("Share {} not found", hash);
                    None
                }
                Err(e) => {
                    warn!("Failed to fetch share {}: {}", hash, e);
                    None
                }
            },
            _ => None,
        };

        self.store.dispatch(Action::SetState(reconcile(
            &snapshot,
            self.opened_share.as_ref(),
            &location,
        )));
        info!(share = ?location.share_hash, "Playground mounted");

        if self.watchdog.is_none() {
            self.watchdog = Some(BootWatchdog::new(self.store.clone()).spawn());
        }
    }

    /// Boot the sandbox and run the current code once it is up.
    pub async fn boot(&self) -> Result<SandboxHandle> {
        let handle = self.lifecycle.boot(&self.store).await?;

        let code = self.store.state().code;
        let outcome = if code.is_empty() {
            None
        } else {
            Some(self.coordinator.run(&code).await)
        };

        // A run that never started leaves loading set.
        if matches!(outcome, None | Some(RunOutcome::Rejected(_))) {
            self.store.dispatch(Action::SetLoading(false));
        }

        Ok(handle)
    }

    pub async fn run(&self) -> RunOutcome {
        let code = self.store.state().code;
        self.coordinator.run(&code).await
    }

    pub async fn apply_settings(&self, settings: Settings) -> Result<SandboxHandle> {
        self.store.dispatch(Action::SetState(StatePatch {
            loading: Some(true),
            multisite: Some(settings.multisite),
            php_version: Some(settings.php_version),
            settings_open: Some(false),
            wordpress_version: Some(settings.wordpress_version),
            ..Default::default()
        }));

        self.dispose_sandbox().await;
        self.boot().await
    }

    /// Options for the WordPress version picker. Empty until a sandbox is up.
    pub async fn wordpress_version_options(&self) -> Result<Vec<VersionOption>> {
        let Some(handle) = self.store.state().sandbox_handle else {
            return Ok(Vec::new());
        };

        let versions = handle.client().wordpress_versions().await?;
        Ok(view::wordpress_version_options(&versions))
    }

    /// Error console contents, newest first.
    pub async fn console(&self) -> Vec<String> {
        let Some(handle) = self.store.state().sandbox_handle else {
            return Vec::new();
        };

        match handle.client().logs().await {
            Ok(logs) => view::console_entries(&logs),
            Err(e) => {
                warn!("Failed to read sandbox logs: {}", e);
                Vec::new()
            }
        }
    }

    pub fn can_share(&self) -> bool {
        can_share(&self.store.state().code, self.opened_share.as_ref())
    }

    /// Store the current code and configuration as a share and return its URL.
    pub async fn share(&self) -> Result<Url> {
        let client = self.share_client.as_ref().ok_or(ShareError::NotConfigured)?;
        if !self.can_share() {
            return Err(ShareError::Unchanged.into());
        }

        let honeypot = client.honeypot().await?;
        let request = ShareRequest::from_state(&self.store.state());
        let hash = client.create(&request, &honeypot).await?;

        Ok(client.share_url(&hash)?)
    }

    /// Throw the session away and start over from `page_url`.
    pub async fn reload(&mut self, page_url: &Url) -> Result<SandboxHandle> {
        self.dispose_sandbox().await;
        self.store.dispatch(Action::Reset);
        self.mount(page_url).await;
        self.boot().await
    }

    async fn dispose_sandbox(&self) {
        if let Some(handle) = self.store.state().sandbox_handle {
            handle.client().dispose().await;
        }
        self.store.dispatch(Action::SetSandboxHandle(None));
        self.store.dispatch(Action::SetPlaygroundReady(false));
        self.store.dispatch(Action::SetPlaygroundError(false));
    }
}

impl Drop for Playground {
    fn drop(&mut self) {
        if let Some(watchdog) = self.watchdog.take() {
            watchdog.abort();
        }
    }
}
