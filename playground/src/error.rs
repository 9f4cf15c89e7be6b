use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlaygroundError>;

#[derive(Error, Debug)]
pub enum PlaygroundError {
    #[error("Playground state has not been reconciled yet")]
    NotReady,
    #[error("Sandbox error: {0}")]
    Sandbox(#[from] SandboxError),
    #[error("Share error: {0}")]
    Share(#[from] ShareError),
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Failures reported by the external WordPress sandbox.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SandboxError {
    #[error("Failed to launch sandbox: {0}")]
    Launch(String),
    #[error("Sandbox did not become ready: {0}")]
    Ready(String),
    /// A failed run. The message is shown to the user as output.
    #[error("{0}")]
    Run(String),
}

#[derive(Error, Debug)]
pub enum ShareError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unexpected status {0}")]
    UnexpectedStatus(u16),
    #[error("Share was rejected by the server")]
    Rejected,
    #[error("Code is unchanged and cannot be shared")]
    Unchanged,
    #[error("No share endpoint configured")]
    NotConfigured,
}
