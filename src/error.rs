// Error types for the Bugzilla client.
// Covers transport failures, bad responses, URL building, and cache file I/O.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BugzillaError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: StatusCode, url: String },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Unexpected response from {url}: {reason}")]
    UnexpectedResponse { url: String, reason: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl BugzillaError {
    /// Whether the error came from the network side of a fetch.
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            BugzillaError::Http(_) | BugzillaError::Status { .. } | BugzillaError::UnexpectedResponse { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, BugzillaError>;
