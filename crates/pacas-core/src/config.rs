use std::path::PathBuf;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load client configuration from environment variables already in the process.
///
/// `.env` files are not read here; the binary loads them once at startup.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to a value that cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build configuration using the provided env-var lookup function.
///
/// Every variable has a default, so only malformed values fail.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let api_base_url = or_default("PACAS_API_BASE_URL", "http://127.0.0.1:5000");
    if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
        return Err(invalid(
            "PACAS_API_BASE_URL",
            format!("expected an http(s) URL, got '{api_base_url}'"),
        ));
    }

    let env = parse_environment(&or_default("PACAS_ENV", "development"))?;
    let log_level = or_default("PACAS_LOG_LEVEL", "info");
    let state_path = PathBuf::from(or_default("PACAS_STATE_PATH", "./.pacas/state.json"));
    let request_timeout_secs = parse_u64("PACAS_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("PACAS_USER_AGENT", "pacas-client/0.1");

    let page_size = or_default("PACAS_PAGE_SIZE", "6")
        .parse::<usize>()
        .map_err(|e| invalid("PACAS_PAGE_SIZE", e.to_string()))?;
    if page_size == 0 {
        return Err(invalid("PACAS_PAGE_SIZE", "must be at least 1".to_string()));
    }

    let empty_page_delay_ms = parse_u64("PACAS_EMPTY_PAGE_DELAY_MS", "1000")?;
    let max_empty_page_skips = parse_u32("PACAS_MAX_EMPTY_PAGE_SKIPS", "5")?;
    let max_retries = parse_u32("PACAS_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("PACAS_RETRY_BACKOFF_BASE_MS", "500")?;

    Ok(AppConfig {
        api_base_url,
        env,
        log_level,
        state_path,
        request_timeout_secs,
        user_agent,
        page_size,
        empty_page_delay_ms,
        max_empty_page_skips,
        max_retries,
        retry_backoff_base_ms,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PACAS_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
