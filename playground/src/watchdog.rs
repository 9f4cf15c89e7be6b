use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::action::Action;
use crate::store::Store;

pub const BOOT_TIMEOUT: Duration = Duration::from_secs(60);

/// Flags the sandbox as failed when it has not come up in time after the
/// state became ready. It never retries; recovery is a full reload. The flag
/// is lifted again if the sandbox comes up after all.
pub struct BootWatchdog {
    store: Arc<Store>,
    timeout: Duration,
}

impl BootWatchdog {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            timeout: BOOT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.watch())
    }

    /// Runs until the task is aborted or the store goes away.
    pub async fn watch(self) {
        let mut rx = self.store.subscribe();

        loop {
            if rx
                .wait_for(|state| state.ready && !state.playground_ready)
                .await
                .is_err()
            {
                return;
            }

            let settled = tokio::time::timeout(
                self.timeout,
                rx.wait_for(|state| state.playground_ready || !state.ready),
            )
            .await
            .map(|changed| changed.is_ok());

            match settled {
                Ok(true) => {}
                Ok(false) => return,
                Err(_) => {
                    warn!(
                        timeout_secs = self.timeout.as_secs(),
                        "Sandbox did not become ready in time"
                    );
                    self.store.dispatch(Action::SetPlaygroundError(true));

                    if rx
                        .wait_for(|state| state.playground_ready || !state.ready)
                        .await
                        .is_err()
                    {
                        return;
                    }
                }
            }

            // A sandbox that came up late, or a state that went back to
            // not ready, clears the failure.
            if self.store.state().playground_error {
                self.store.dispatch(Action::SetPlaygroundError(false));
            }
        }
    }
}
