//! Seam to the external WordPress sandbox and the boot sequence around it.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::action::Action;
use crate::error::{PlaygroundError, Result, SandboxError};
use crate::state::{PhpVersion, PlaygroundState, SandboxHandle, WordPressVersion};
use crate::store::Store;

pub const REMOTE_URL: &str = "https://playground.wordpress.net/remote.html";
pub const SAPI_NAME: &str = "cli";

pub const PLUGIN_RESOURCE: &str = "wordpress.org/plugins";
pub const THEME_RESOURCE: &str = "wordpress.org/themes";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreferredVersions {
    pub php: PhpVersion,
    pub wp: WordPressVersion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Features {
    pub networking: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceRef {
    pub resource: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstallOptions {
    pub activate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum Step {
    Login {
        username: String,
        password: String,
    },
    EnableMultisite,
    InstallPlugin {
        #[serde(rename = "pluginData")]
        plugin_data: ResourceRef,
        options: InstallOptions,
    },
    InstallTheme {
        #[serde(rename = "themeData")]
        theme_data: ResourceRef,
    },
}

/// Declarative setup handed to the sandbox at boot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    pub preferred_versions: PreferredVersions,
    pub features: Features,
    pub landing_page: String,
    pub steps: Vec<Step>,
}

impl Blueprint {
    pub fn from_state(state: &PlaygroundState) -> Self {
        let mut steps = vec![Step::Login {
            username: "admin".to_string(),
            password: "password".to_string(),
        }];

        if state.multisite {
            steps.push(Step::EnableMultisite);
        }

        steps.extend(state.plugins.iter().map(|slug| Step::InstallPlugin {
            plugin_data: ResourceRef {
                resource: PLUGIN_RESOURCE.to_string(),
                slug: slug.clone(),
            },
            options: InstallOptions { activate: true },
        }));

        steps.extend(state.themes.iter().map(|slug| Step::InstallTheme {
            theme_data: ResourceRef {
                resource: THEME_RESOURCE.to_string(),
                slug: slug.clone(),
            },
        }));

        Self {
            preferred_versions: PreferredVersions {
                php: state.php_version,
                wp: state.wordpress_version,
            },
            features: Features { networking: true },
            landing_page: "/".to_string(),
            steps,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchOptions {
    pub remote_url: String,
    pub blueprint: Blueprint,
    pub sapi_name: String,
}

impl LaunchOptions {
    pub fn new(blueprint: Blueprint) -> Self {
        Self {
            remote_url: REMOTE_URL.to_string(),
            blueprint,
            sapi_name: SAPI_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub code: String,
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunResponse {
    pub http_status_code: u16,
    pub text: String,
}

/// WordPress builds a sandbox can boot, in the order the sandbox lists them.
/// Keys are versions (`6.7`, `nightly`, `beta`); for `beta` the value names
/// the beta build.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WordPressVersions {
    pub all: Vec<(String, String)>,
    pub latest: String,
}

/// A running sandbox.
#[async_trait]
pub trait SandboxClient: Send + Sync {
    /// Resolves once the sandbox has finished applying its blueprint.
    async fn is_ready(&self) -> std::result::Result<(), SandboxError>;

    async fn run(&self, request: RunRequest) -> std::result::Result<RunResponse, SandboxError>;

    async fn wordpress_versions(&self) -> std::result::Result<WordPressVersions, SandboxError>;

    /// Error log lines from the sandbox, PHP and WordPress, oldest first.
    async fn logs(&self) -> std::result::Result<Vec<String>, SandboxError>;

    async fn dispose(&self) {}
}

/// Starts sandboxes.
#[async_trait]
pub trait SandboxLauncher: Send + Sync {
    async fn launch(
        &self,
        options: LaunchOptions,
    ) -> std::result::Result<Arc<dyn SandboxClient>, SandboxError>;
}

#[derive(Clone)]
pub struct LifecycleManager {
    launcher: Arc<dyn SandboxLauncher>,
}

impl LifecycleManager {
    pub fn new(launcher: Arc<dyn SandboxLauncher>) -> Self {
        Self { launcher }
    }

    /// Boot a sandbox for the current configuration and publish its handle.
    pub async fn boot(&self, store: &Store) -> Result<SandboxHandle> {
        let state = store.state();
        if !state.ready {
            return Err(PlaygroundError::NotReady);
        }

        let options = LaunchOptions::new(Blueprint::from_state(&state));
        info!(
            php = %state.php_version,
            wp = %state.wordpress_version,
            multisite = state.multisite,
            steps = options.blueprint.steps.len(),
            "Booting sandbox"
        );

        match self.start(options).await {
            Ok(client) => {
                let handle = SandboxHandle::new(client);
                store.dispatch(Action::SetSandboxHandle(Some(handle.clone())));
                store.dispatch(Action::SetPlaygroundReady(true));
                info!("Sandbox ready");
                Ok(handle)
            }
            Err(e) => {
                warn!("Sandbox boot failed: {}", e);
                store.dispatch(Action::SetPlaygroundError(true));
                Err(e.into())
            }
        }
    }

    async fn start(
        &self,
        options: LaunchOptions,
    ) -> std::result::Result<Arc<dyn SandboxClient>, SandboxError> {
        let client = self.launcher.launch(options).await?;
        client.is_ready().await?;
        Ok(client)
    }
}
