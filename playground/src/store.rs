use tokio::sync::watch;
use tracing::error;

use crate::action::Action;
use crate::persistence::{PersistenceBridge, Snapshot};
use crate::reducer;
use crate::state::PlaygroundState;

/// Owns the session state. Every mutation goes through [`Store::dispatch`].
pub struct Store {
    tx: watch::Sender<PlaygroundState>,
    persistence: Option<PersistenceBridge>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(PlaygroundState::default());
        Self {
            tx,
            persistence: None,
        }
    }

    /// A store that writes the snapshot after every change once the state
    /// has been reconciled.
    pub fn with_persistence(persistence: PersistenceBridge) -> Self {
        Self {
            persistence: Some(persistence),
            ..Self::new()
        }
    }

    pub fn dispatch(&self, action: Action) {
        let mut new_error = None;
        self.tx.send_modify(|state| {
            let previous = state.error.clone();
            reducer::apply(state, action);
            if state.error.is_some() && state.error != previous {
                new_error = state.error.clone();
            }
        });

        if let Some(message) = new_error {
            error!("Playground error: {}", message);
        }

        if let Some(persistence) = &self.persistence {
            let snapshot = {
                let state = self.tx.borrow();
                state.ready.then(|| Snapshot::from_state(&state))
            };
            if let Some(snapshot) = snapshot {
                persistence.save(&snapshot);
            }
        }
    }

    pub fn state(&self) -> PlaygroundState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaygroundState> {
        self.tx.subscribe()
    }
}
