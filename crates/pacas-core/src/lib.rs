//! Domain types, form validation, and configuration shared by the
//! PacasHomes client crates.

pub mod app_config;
pub mod config;
pub mod listing;
pub mod prices;
pub mod search;
pub mod validate;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::load_app_config_from_env;
pub use listing::{Favorite, Listing};
pub use prices::{format_gbp, price_options, PriceOption, PricePresets};
pub use search::{ListingType, SearchParams, SearchResponse, Site, SiteStat, SortKey};
pub use validate::ValidationError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
