use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Every failure a push run can hit.
///
/// `Configuration` and `Transport` abort a run. `ResponseFormat` is soft: the orchestrator
/// logs it and finishes without touching the push history.
#[derive(Debug, Error)]
pub enum SitePushError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("response format error: {0}")]
    ResponseFormat(String),
    #[error("push history {path:?}: {source}")]
    History {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to scan content directory {path:?}: {message}")]
    ContentScan { path: PathBuf, message: String },
}

impl SitePushError {
    /// Process exit code for this kind of failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            SitePushError::Configuration(_) => 2,
            SitePushError::Transport(_) => 3,
            SitePushError::History { .. } | SitePushError::ContentScan { .. } => 4,
            SitePushError::ResponseFormat(_) => 1,
        }
    }
}
