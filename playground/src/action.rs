use crate::state::{PhpVersion, PlaygroundState, SandboxHandle, WordPressVersion};

/// Every state mutation is one of these. None of them performs I/O.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetCode(String),
    SetPhpVersion(PhpVersion),
    SetWordPressVersion(WordPressVersion),
    SetMultisite(bool),
    SetPlugins(Vec<String>),
    SetThemes(Vec<String>),
    SetBrowserShowing(bool),
    SetConsoleShowing(bool),
    SetSettingsOpen(bool),
    SetOutput(String),
    SetExecutionTime(f64),
    /// An empty message clears the error.
    SetError(String),
    SetLoading(bool),
    SetSandboxHandle(Option<SandboxHandle>),
    SetPlaygroundReady(bool),
    SetPlaygroundError(bool),
    SetState(StatePatch),
    /// Back to the default state. Dispose the sandbox first.
    Reset,
}

/// Partial state merged field by field by [`Action::SetState`]. The sandbox
/// handle is not part of a patch; it only changes through
/// [`Action::SetSandboxHandle`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatePatch {
    pub code: Option<String>,
    pub php_version: Option<PhpVersion>,
    pub wordpress_version: Option<WordPressVersion>,
    pub multisite: Option<bool>,
    pub plugins: Option<Vec<String>>,
    pub themes: Option<Vec<String>>,
    pub ready: Option<bool>,
    pub playground_ready: Option<bool>,
    pub playground_error: Option<bool>,
    pub output: Option<Option<String>>,
    pub execution_time: Option<Option<f64>>,
    pub error: Option<Option<String>>,
    pub loading: Option<bool>,
    pub settings_open: Option<bool>,
    pub console_showing: Option<bool>,
    pub browser_showing: Option<bool>,
}

impl StatePatch {
    /// A patch that overwrites every field except the sandbox handle.
    pub fn from_state(state: PlaygroundState) -> Self {
        Self {
            code: Some(state.code),
            php_version: Some(state.php_version),
            wordpress_version: Some(state.wordpress_version),
            multisite: Some(state.multisite),
            plugins: Some(state.plugins),
            themes: Some(state.themes),
            ready: Some(state.ready),
            playground_ready: Some(state.playground_ready),
            playground_error: Some(state.playground_error),
            output: Some(state.output),
            execution_time: Some(state.execution_time),
            error: Some(state.error),
            loading: Some(state.loading),
            settings_open: Some(state.settings_open),
            console_showing: Some(state.console_showing),
            browser_showing: Some(state.browser_showing),
        }
    }

    pub fn apply(self, state: &mut PlaygroundState) {
        fn merge<T>(field: Option<T>, target: &mut T) {
            if let Some(value) = field {
                *target = value;
            }
        }

        merge(self.code, &mut state.code);
        merge(self.php_version, &mut state.php_version);
        merge(self.wordpress_version, &mut state.wordpress_version);
        merge(self.multisite, &mut state.multisite);
        merge(self.plugins, &mut state.plugins);
        merge(self.themes, &mut state.themes);
        merge(self.ready, &mut state.ready);
        merge(self.playground_ready, &mut state.playground_ready);
        merge(self.playground_error, &mut state.playground_error);
        merge(self.output, &mut state.output);
        merge(self.execution_time, &mut state.execution_time);
        merge(self.error, &mut state.error);
        merge(self.loading, &mut state.loading);
        merge(self.settings_open, &mut state.settings_open);
        merge(self.console_showing, &mut state.console_showing);
        merge(self.browser_showing, &mut state.browser_showing);
    }
}
