//! Derived presentation state.

use regex::Regex;
use std::sync::LazyLock;

use crate::sandbox::WordPressVersions;
use crate::state::{PlaygroundState, DEFAULT_CODE};

pub const EMPTY_OUTPUT: &str = "No output produced.";
pub const EMPTY_CONSOLE: &str = "Error logs for Playground, WordPress, and PHP will show up here \
     when something goes wrong.";

static DOCTYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<!DOCTYPE html>").expect("doctype pattern is valid"));

// <br> alone does not make output HTML.
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)<(html|head|body|div|span|p|h[1-6]|ul|ol|li|table|form|input|button|a|img|section|article|nav|header|footer|main)\b",
    )
    .expect("html tag pattern is valid")
});

static LOG_SEVERITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Error:|Fatal:").expect("log severity pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Hidden,
    Preparing,
    /// Boot failed or timed out; the only way out is a reload.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTab {
    Text,
    Html,
}

pub fn overlay(state: &PlaygroundState) -> Overlay {
    if !state.ready || state.playground_ready {
        Overlay::Hidden
    } else if state.playground_error {
        Overlay::Failed
    } else {
        Overlay::Preparing
    }
}

pub fn run_disabled(state: &PlaygroundState) -> bool {
    state.loading || !state.playground_ready
}

pub fn show_welcome(state: &PlaygroundState) -> bool {
    state.code == DEFAULT_CODE && state.playground_ready
}

pub fn looks_like_html(output: &str) -> bool {
    DOCTYPE.is_match(output) || HTML_TAG.is_match(output)
}

pub fn preferred_tab(state: &PlaygroundState) -> OutputTab {
    match state.output.as_deref() {
        Some(output) if looks_like_html(output) => OutputTab::Html,
        _ => OutputTab::Text,
    }
}

/// Text for the plain output tab.
pub fn output_text(state: &PlaygroundState) -> &str {
    match state.output.as_deref() {
        Some(output) if !output.is_empty() => output,
        _ if !state.loading => EMPTY_OUTPUT,
        _ => "",
    }
}

/// One entry of the WordPress version picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionOption {
    pub value: String,
    pub label: String,
}

/// Picker entries for the versions a sandbox offers. A beta build is only
/// listed when its major release is not offered already.
pub fn wordpress_version_options(versions: &WordPressVersions) -> Vec<VersionOption> {
    versions
        .all
        .iter()
        .filter_map(|(version, value)| {
            let label = if version == "beta" {
                let major = value.get(..3).unwrap_or(value.as_str());
                if versions.all.iter().any(|(other, _)| other == major) {
                    return None;
                }
                value.clone()
            } else {
                version.clone()
            };

            let label = if *version == versions.latest {
                format!("{} (latest)", label)
            } else {
                label
            };

            Some(VersionOption {
                value: version.clone(),
                label,
            })
        })
        .collect()
}

/// Console entries, newest first, with the first severity marker of each
/// line wrapped in `<mark>`.
pub fn console_entries(logs: &[String]) -> Vec<String> {
    logs.iter()
        .rev()
        .map(|line| LOG_SEVERITY.replace(line, "<mark>$0</mark>").into_owned())
        .collect()
}
