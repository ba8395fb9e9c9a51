use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Runtime settings for the client, read from `PACAS_*` environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub env: Environment,
    pub log_level: String,
    /// Where contact details, view counter, and the session cookie persist.
    pub state_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Listings shown per display page.
    pub page_size: usize,
    /// Pause before requesting the next backend page after an empty one.
    pub empty_page_delay_ms: u64,
    /// Consecutive empty backend pages skipped before "load more" gives up.
    pub max_empty_page_skips: u32,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}
