use std::path::PathBuf;

use pacas_core::ValidationError;
use thiserror::Error;

/// Errors returned by the PacasHomes API client and the controllers built on it.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid API base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    /// A form field failed client-side validation; nothing was sent.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The backend refused the request with a 4xx and an error message.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The backend answered 200 but reported `success: false`.
    #[error("{0}")]
    Rejected(String),

    #[error("not signed in")]
    NotSignedIn,

    #[error("rate limited by the backend (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    /// Any other non-2xx answer, with the body's error text when it had one.
    #[error("unexpected HTTP status {status} from {url}{}", detail_suffix(.message.as_deref()))]
    UnexpectedStatus {
        status: u16,
        url: String,
        message: Option<String>,
    },

    /// A "load more" request is already in flight.
    #[error("a page load is already in progress")]
    Busy,

    #[error("no search has been run yet")]
    NoActiveSearch,

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn detail_suffix(message: Option<&str>) -> String {
    message.map(|m| format!(": {m}")).unwrap_or_default()
}

/// Errors reading or writing the persisted client state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not access state file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("state file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
