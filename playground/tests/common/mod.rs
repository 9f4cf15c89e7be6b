#![allow(dead_code)]

use async_trait::async_trait;
use playground::sandbox::{LaunchOptions, RunRequest, RunResponse, WordPressVersions};
use playground::{SandboxClient, SandboxError, SandboxLauncher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub struct FakeClient {
    pub runs: Mutex<Vec<RunRequest>>,
    pub disposed: AtomicBool,
    ready: Result<(), SandboxError>,
    response: Result<RunResponse, SandboxError>,
    logs: Result<Vec<String>, SandboxError>,
}

impl FakeClient {
    pub fn run_count(&self) -> usize {
        self.runs.lock().unwrap().len()
    }

    pub fn last_run(&self) -> Option<RunRequest> {
        self.runs.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl SandboxClient for FakeClient {
    async fn is_ready(&self) -> Result<(), SandboxError> {
        self.ready.clone()
    }

    async fn run(&self, request: RunRequest) -> Result<RunResponse, SandboxError> {
        self.runs.lock().unwrap().push(request);
        self.response.clone()
    }

    async fn wordpress_versions(&self) -> Result<WordPressVersions, SandboxError> {
        Ok(WordPressVersions {
            all: vec![
                ("beta".to_string(), "6.8-beta2".to_string()),
                ("6.7".to_string(), "6.7".to_string()),
                ("6.6".to_string(), "6.6".to_string()),
            ],
            latest: "6.7".to_string(),
        })
    }

    async fn logs(&self) -> Result<Vec<String>, SandboxError> {
        self.logs.clone()
    }

    async fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }
}

/// Launches [`FakeClient`]s and remembers every launch.
pub struct FakeLauncher {
    pub launches: Mutex<Vec<LaunchOptions>>,
    pub clients: Mutex<Vec<Arc<FakeClient>>>,
    launch_error: Option<SandboxError>,
    ready: Result<(), SandboxError>,
    response: Result<RunResponse, SandboxError>,
    logs: Result<Vec<String>, SandboxError>,
}

impl Default for FakeLauncher {
    fn default() -> Self {
        Self {
            launches: Mutex::new(Vec::new()),
            clients: Mutex::new(Vec::new()),
            launch_error: None,
            ready: Ok(()),
            response: Ok(RunResponse {
                http_status_code: 200,
                text: "Hello, World!".to_string(),
            }),
            logs: Ok(Vec::new()),
        }
    }
}

impl FakeLauncher {
    pub fn failing_launch(message: &str) -> Self {
        Self {
            launch_error: Some(SandboxError::Launch(message.to_string())),
            ..Default::default()
        }
    }

    pub fn with_response(response: Result<RunResponse, SandboxError>) -> Self {
        Self {
            response,
            ..Default::default()
        }
    }

    pub fn with_logs(logs: Result<Vec<String>, SandboxError>) -> Self {
        Self {
            logs,
            ..Default::default()
        }
    }

    pub fn launch_count(&self) -> usize {
        self.launches.lock().unwrap().len()
    }

    pub fn last_launch(&self) -> Option<LaunchOptions> {
        self.launches.lock().unwrap().last().cloned()
    }

    pub fn client(&self, index: usize) -> Arc<FakeClient> {
        self.clients.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl SandboxLauncher for FakeLauncher {
    async fn launch(&self, options: LaunchOptions) -> Result<Arc<dyn SandboxClient>, SandboxError> {
        self.launches.lock().unwrap().push(options);

        if let Some(error) = &self.launch_error {
            return Err(error.clone());
        }

        let client = Arc::new(FakeClient {
            runs: Mutex::new(Vec::new()),
            disposed: AtomicBool::new(false),
            ready: self.ready.clone(),
            response: self.response.clone(),
            logs: self.logs.clone(),
        });
        self.clients.lock().unwrap().push(client.clone());
        Ok(client)
    }
}
