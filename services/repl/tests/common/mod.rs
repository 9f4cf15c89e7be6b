use repl_server::config::{HoneypotConfig, ReplConfig};
use repl_server::{create_app, AppState};
use shared::{MemoryShareStore, ShareBackend, ShareStore};
use std::sync::Arc;

pub const APP_URL: &str = "https://repl.example.test";

pub fn honeypot_config(enabled: bool) -> HoneypotConfig {
    HoneypotConfig {
        enabled,
        name_field: "my_name".to_string(),
        valid_from_field: "valid_from".to_string(),
        min_seconds: 0,
        secret: "test-app-key".to_string(),
    }
}

pub struct TestFixture {
    pub state: AppState,
    pub store: Arc<MemoryShareStore>,
}

impl TestFixture {
    pub fn app(&self) -> axum::Router {
        create_app(self.state.clone())
    }
}

pub fn setup_test_fixture(honeypot_enabled: bool) -> TestFixture {
    let store = Arc::new(MemoryShareStore::new());
    let config = ReplConfig {
        port: 0,
        app_url: APP_URL.to_string(),
        share_backend: ShareBackend::Memory,
        database: None,
        honeypot: honeypot_config(honeypot_enabled),
    };

    let state = AppState::new(store.clone() as Arc<dyn ShareStore>, config);
    TestFixture { state, store }
}
