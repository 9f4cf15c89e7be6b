use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::sandbox::SandboxClient;

/// Editor contents for a fresh session.
pub const DEFAULT_CODE: &str = r#"<?php
/*
 Welcome to REPL for WordPress!

 This is a simple PHP code playground for WordPress. WordPress is
 running in your browser via WordPress Playground. Changes will
 persist until you refresh the page or navigate away.

 You can use this playground to test PHP code snippets, interact
 with WordPress functions, and see the results in real-time via
 the browser below.

 The PHP and WordPress versions can be changed by clicking the
 versions below the code editor.

 To get started, simply modify the code below and click "Run" to
 execute it. You can also share code snippets with others by
 clicking "Share" to generate a unique URL.

 Happy coding!

   -- Alley (https://alley.com/)
*/

// Output a simple message to the browser.
echo "Hello, World!";
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PhpVersion {
    #[serde(rename = "8.4")]
    Php84,
    #[default]
    #[serde(rename = "8.3")]
    Php83,
    #[serde(rename = "8.2")]
    Php82,
    #[serde(rename = "8.1")]
    Php81,
    #[serde(rename = "8.0")]
    Php80,
    #[serde(rename = "7.4")]
    Php74,
    #[serde(rename = "7.3")]
    Php73,
    #[serde(rename = "7.2")]
    Php72,
    #[serde(rename = "latest")]
    Latest,
}

impl PhpVersion {
    pub const SUPPORTED: [PhpVersion; 9] = [
        PhpVersion::Php84,
        PhpVersion::Php83,
        PhpVersion::Php82,
        PhpVersion::Php81,
        PhpVersion::Php80,
        PhpVersion::Php74,
        PhpVersion::Php73,
        PhpVersion::Php72,
        PhpVersion::Latest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhpVersion::Php84 => "8.4",
            PhpVersion::Php83 => "8.3",
            PhpVersion::Php82 => "8.2",
            PhpVersion::Php81 => "8.1",
            PhpVersion::Php80 => "8.0",
            PhpVersion::Php74 => "7.4",
            PhpVersion::Php73 => "7.3",
            PhpVersion::Php72 => "7.2",
            PhpVersion::Latest => "latest",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::SUPPORTED
            .into_iter()
            .find(|version| version.as_str() == value)
    }
}

impl fmt::Display for PhpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhpVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unsupported PHP version: {}", s))
    }
}

/// `latest`, `nightly`, the current `beta`, or a `major.minor` release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WordPressVersion {
    #[default]
    Latest,
    Nightly,
    Beta,
    Release { major: u16, minor: u16 },
}

impl WordPressVersion {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "latest" => Some(WordPressVersion::Latest),
            "nightly" => Some(WordPressVersion::Nightly),
            "beta" => Some(WordPressVersion::Beta),
            other => {
                let (major, minor) = other.split_once('.')?;
                let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
                if !all_digits(major) || !all_digits(minor) {
                    return None;
                }
                Some(WordPressVersion::Release {
                    major: major.parse().ok()?,
                    minor: minor.parse().ok()?,
                })
            }
        }
    }
}

impl fmt::Display for WordPressVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordPressVersion::Latest => f.write_str("latest"),
            WordPressVersion::Nightly => f.write_str("nightly"),
            WordPressVersion::Beta => f.write_str("beta"),
            WordPressVersion::Release { major, minor } => write!(f, "{}.{}", major, minor),
        }
    }
}

impl FromStr for WordPressVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unsupported WordPress version: {}", s))
    }
}

impl Serialize for WordPressVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WordPressVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Shared handle to a booted sandbox. Two handles are equal only when they
/// point at the same client.
#[derive(Clone)]
pub struct SandboxHandle {
    client: Arc<dyn SandboxClient>,
}

impl SandboxHandle {
    pub fn new(client: Arc<dyn SandboxClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<dyn SandboxClient> {
        &self.client
    }
}

impl fmt::Debug for SandboxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SandboxHandle")
            .field("client", &Arc::as_ptr(&self.client).cast::<()>())
            .finish()
    }
}

impl PartialEq for SandboxHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::as_ptr(&self.client).cast::<()>() == Arc::as_ptr(&other.client).cast::<()>()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaygroundState {
    pub code: String,
    pub php_version: PhpVersion,
    pub wordpress_version: WordPressVersion,
    pub multisite: bool,
    pub plugins: Vec<String>,
    pub themes: Vec<String>,
    /// Initial reconciliation has completed.
    pub ready: bool,
    pub playground_ready: bool,
    pub playground_error: bool,
    pub sandbox_handle: Option<SandboxHandle>,
    pub output: Option<String>,
    /// Milliseconds spent in the last sandbox run.
    pub execution_time: Option<f64>,
    pub error: Option<String>,
    pub loading: bool,
    pub settings_open: bool,
    pub console_showing: bool,
    pub browser_showing: bool,
}

impl Default for PlaygroundState {
    fn default() -> Self {
        Self {
            code: DEFAULT_CODE.to_string(),
            php_version: PhpVersion::default(),
            wordpress_version: WordPressVersion::default(),
            multisite: false,
            plugins: Vec::new(),
            themes: Vec::new(),
            ready: false,
            playground_ready: false,
            playground_error: false,
            sandbox_handle: None,
            output: None,
            execution_time: None,
            error: None,
            loading: true,
            settings_open: false,
            console_showing: false,
            browser_showing: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_php_version_parse() {
        assert_eq!(PhpVersion::parse("8.4"), Some(PhpVersion::Php84));
        assert_eq!(PhpVersion::parse(" 7.2 "), Some(PhpVersion::Php72));
        assert_eq!(PhpVersion::parse("latest"), Some(PhpVersion::Latest));
        assert_eq!(PhpVersion::parse("5.6"), None);
        assert_eq!(PhpVersion::default().as_str(), "8.3");
    }

    #[test]
    fn test_wordpress_version_parse() {
        assert_eq!(WordPressVersion::parse("latest"), Some(WordPressVersion::Latest));
        assert_eq!(WordPressVersion::parse("nightly"), Some(WordPressVersion::Nightly));
        assert_eq!(
            WordPressVersion::parse("6.5"),
            Some(WordPressVersion::Release { major: 6, minor: 5 })
        );
        assert_eq!(WordPressVersion::parse("6.5.2"), None);
        assert_eq!(WordPressVersion::parse("six.5"), None);
        assert_eq!(WordPressVersion::parse(".5"), None);
        assert_eq!(WordPressVersion::parse("6.10").unwrap().to_string(), "6.10");
    }

    #[test]
    fn test_version_serialization() {
        assert_eq!(serde_json::to_value(PhpVersion::Php80).unwrap(), "8.0");
        assert_eq!(
            serde_json::to_value(WordPressVersion::Release { major: 6, minor: 4 }).unwrap(),
            "6.4"
        );
        let parsed: WordPressVersion = serde_json::from_value("nightly".into()).unwrap();
        assert_eq!(parsed, WordPressVersion::Nightly);
        let parsed: WordPressVersion = serde_json::from_value("beta".into()).unwrap();
        assert_eq!(parsed, WordPressVersion::Beta);
        assert!(serde_json::from_value::<WordPressVersion>("trunk".into()).is_err());
    }

    #[test]
    fn test_default_state() {
        let state = PlaygroundState::default();
        assert_eq!(state.code, DEFAULT_CODE);
        assert!(state.loading);
        assert!(!state.ready);
        assert!(state.sandbox_handle.is_none());
        assert_eq!(state.php_version, PhpVersion::Php83);
        assert_eq!(state.wordpress_version, WordPressVersion::Latest);
    }

    #[test]
    fn test_default_code_is_signed() {
        assert!(DEFAULT_CODE.starts_with("<?php\n/*\n Welcome to REPL for WordPress!"));
        assert!(DEFAULT_CODE.contains(" Happy coding!\n\n   -- Alley (https://alley.com/)\n*/\n"));
        assert!(DEFAULT_CODE.ends_with("echo \"Hello, World!\";\n"));
    }
}
