use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::action::Action;
use crate::sandbox::RunRequest;
use crate::store::Store;

pub const OPEN_TAG: &str = "<?php";
pub const BOOTSTRAP_LINE: &str = "require_once '/wordpress/wp-load.php';";
const LEGACY_LOADER: &str = "'wordpress/wp-load.php'";
const LOADER: &str = "'/wordpress/wp-load.php'";

pub const NOT_INITIALIZED: &str = "Playground client is not initialized.";
pub const MISSING_OPEN_TAG: &str = "Code must start with \"<?php\" to be run.";

/// `get_site_by_path()` needs the public host to resolve the site.
pub const SANDBOX_HOST: &str = "playground.wordpress.net:443";

/// Load WordPress ahead of the snippet and point the legacy relative loader
/// path at its new location. Only the first occurrence of each is rewritten.
pub fn prepare_code(source: &str) -> String {
    source
        .replacen(OPEN_TAG, &format!("{} {}", OPEN_TAG, BOOTSTRAP_LINE), 1)
        .replacen(LEGACY_LOADER, LOADER, 1)
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// A precondition failed; the sandbox was not called.
    Rejected(&'static str),
    Completed { status: u16, elapsed_ms: f64 },
    Failed(String),
}

pub struct ExecutionCoordinator {
    store: Arc<Store>,
}

impl ExecutionCoordinator {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub async fn run(&self, source: &str) -> RunOutcome {
        let Some(handle) = self.store.state().sandbox_handle else {
            return self.reject(NOT_INITIALIZED);
        };

        if !source.trim().starts_with(OPEN_TAG) {
            return self.reject(MISSING_OPEN_TAG);
        }

        self.store.dispatch(Action::SetLoading(true));

        let request = RunRequest {
            code: prepare_code(source),
            headers: BTreeMap::from([("host".to_string(), SANDBOX_HOST.to_string())]),
        };

        let started = Instant::now();
        let outcome = match handle.client().run(request).await {
            Ok(response) => {
                let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
                debug!(status = response.http_status_code, elapsed_ms, "Sandbox run finished");
                if response.http_status_code != 200 {
                    warn!(
                        status = response.http_status_code,
                        "Potential error in sandbox response"
                    );
                }

                self.store.dispatch(Action::SetOutput(response.text));
                self.store.dispatch(Action::SetExecutionTime(elapsed_ms));
                RunOutcome::Completed {
                    status: response.http_status_code,
                    elapsed_ms,
                }
            }
            Err(e) => {
                warn!("Error running code: {}", e);
                let message = e.to_string();
                self.store.dispatch(Action::SetOutput(message.clone()));
                self.store.dispatch(Action::SetExecutionTime(0.0));
                RunOutcome::Failed(message)
            }
        };

        self.store.dispatch(Action::SetLoading(false));
        outcome
    }

    fn reject(&self, message: &'static str) -> RunOutcome {
        self.store.dispatch(Action::SetError(message.to_string()));
        self.store.dispatch(Action::SetOutput(String::new()));
        RunOutcome::Rejected(message)
    }
}
