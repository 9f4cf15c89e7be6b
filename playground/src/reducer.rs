use crate::action::Action;
use crate::state::PlaygroundState;

pub fn reduce(state: &PlaygroundState, action: Action) -> PlaygroundState {
    let mut next = state.clone();
    apply(&mut next, action);
    next
}

pub(crate) fn apply(state: &mut PlaygroundState, action: Action) {
    match action {
        Action::SetCode(code) => state.code = code,
        Action::SetPhpVersion(version) => state.php_version = version,
        Action::SetWordPressVersion(version) => state.wordpress_version = version,
        Action::SetMultisite(multisite) => state.multisite = multisite,
        Action::SetPlugins(plugins) => state.plugins = plugins,
        Action::SetThemes(themes) => state.themes = themes,
        Action::SetBrowserShowing(showing) => state.browser_showing = showing,
        Action::SetConsoleShowing(showing) => state.console_showing = showing,
        Action::SetSettingsOpen(open) => state.settings_open = open,
        Action::SetOutput(output) => state.output = Some(output),
        Action::SetExecutionTime(ms) => state.execution_time = Some(ms),
        Action::SetError(message) => {
            state.error = if message.is_empty() {
                None
            } else {
                Some(message)
            }
        }
        Action::SetLoading(loading) => state.loading = loading,
        Action::SetSandboxHandle(handle) => state.sandbox_handle = handle,
        Action::SetPlaygroundReady(ready) => state.playground_ready = ready,
        Action::SetPlaygroundError(error) => state.playground_error = error,
        Action::SetState(patch) => patch.apply(state),
        Action::Reset => *state = PlaygroundState::default(),
    }
}
