//! Search request and response shapes for the `/api/search*` endpoints.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::listing::{null_entries_as_invalid, Listing};
use crate::validate::ValidationError;

/// Which source the backend should search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    #[default]
    Zoopla,
    Rightmove,
    OpenRent,
    /// Zoopla and Rightmove merged server-side.
    Combined,
}

impl Site {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Site::Zoopla => "zoopla",
            Site::Rightmove => "rightmove",
            Site::OpenRent => "openrent",
            Site::Combined => "combined",
        }
    }

    /// First-page endpoint for this site.
    #[must_use]
    pub fn search_path(self) -> &'static str {
        match self {
            Site::Combined => "/api/search/combined",
            _ => "/api/search",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Site {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zoopla" => Ok(Site::Zoopla),
            "rightmove" => Ok(Site::Rightmove),
            "openrent" => Ok(Site::OpenRent),
            "combined" => Ok(Site::Combined),
            other => Err(ValidationError::new(
                "site",
                format!("Invalid site option: {other}. Must be one of: zoopla, rightmove, openrent, combined"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingType {
    #[default]
    Sale,
    Rent,
}

impl ListingType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ListingType::Sale => "sale",
            ListingType::Rent => "rent",
        }
    }
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sale" => Ok(ListingType::Sale),
            "rent" => Ok(ListingType::Rent),
            other => Err(ValidationError::new(
                "listing_type",
                format!("Invalid listing type '{other}'. Must be one of: sale, rent"),
            )),
        }
    }
}

/// Client-side ordering of held listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    PriceAsc,
    PriceDesc,
    BedsAsc,
    BedsDesc,
    /// Arrival order; the backend returns newest first.
    #[default]
    Newest,
    Oldest,
}

impl SortKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::PriceAsc => "price_asc",
            SortKey::PriceDesc => "price_desc",
            SortKey::BedsAsc => "beds_asc",
            SortKey::BedsDesc => "beds_desc",
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "price_asc" => Ok(SortKey::PriceAsc),
            "price_desc" => Ok(SortKey::PriceDesc),
            "beds_asc" => Ok(SortKey::BedsAsc),
            "beds_desc" => Ok(SortKey::BedsDesc),
            "newest" => Ok(SortKey::Newest),
            "oldest" => Ok(SortKey::Oldest),
            other => Err(ValidationError::new(
                "sort_by",
                format!(
                    "Invalid sort '{other}'. Must be one of: price_asc, price_desc, beds_asc, beds_desc, newest, oldest"
                ),
            )),
        }
    }
}

/// The search form, mirrored into every search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub site: Site,
    pub location: String,
    pub listing_type: ListingType,
    pub min_price: u64,
    pub max_price: u64,
    pub min_beds: u32,
    pub max_beds: u32,
    pub keywords: String,
    pub sort_by: SortKey,
    pub current_page: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            site: Site::default(),
            location: String::new(),
            listing_type: ListingType::default(),
            min_price: 0,
            max_price: 10_000_000,
            min_beds: 0,
            max_beds: 10,
            keywords: String::new(),
            sort_by: SortKey::default(),
            current_page: 1,
        }
    }
}

impl SearchParams {
    #[must_use]
    pub fn new(location: &str) -> Self {
        Self {
            location: location.to_string(),
            ..Self::default()
        }
    }
}

/// Per-source counts reported by combined searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteStat {
    #[serde(default)]
    pub listings: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub source: String,
}

fn first_page() -> u32 {
    1
}

/// Body returned by every search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "null_entries_as_invalid")]
    pub listings: Vec<Listing>,
    #[serde(default)]
    pub total_found: u64,
    #[serde(default = "first_page")]
    pub total_pages: u32,
    #[serde(default = "first_page")]
    pub current_page: u32,
    #[serde(default)]
    pub is_complete: Option<bool>,
    #[serde(default)]
    pub has_next_page: Option<bool>,
    #[serde(default)]
    pub site_stats: Option<BTreeMap<String, SiteStat>>,
    /// The validated parameters echoed back; shapes vary by endpoint.
    #[serde(default)]
    pub search_params: Option<serde_json::Value>,
}

impl SearchResponse {
    /// Whether the backend has another page after `current_page`.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.has_next_page
            .unwrap_or(self.current_page < self.total_pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Site::OpenRent).unwrap(), "openrent");
        assert_eq!(serde_json::to_value(Site::Combined).unwrap(), "combined");
        assert_eq!("RightMove".parse::<Site>().unwrap(), Site::Rightmove);
        assert!("onthemarket".parse::<Site>().is_err());
    }

    #[test]
    fn combined_site_uses_combined_endpoint() {
        assert_eq!(Site::Combined.search_path(), "/api/search/combined");
        assert_eq!(Site::Zoopla.search_path(), "/api/search");
        assert_eq!(Site::OpenRent.search_path(), "/api/search");
    }

    #[test]
    fn default_params_match_form_defaults() {
        let p = SearchParams::new("Leeds");
        assert_eq!(p.site, Site::Zoopla);
        assert_eq!(p.listing_type, ListingType::Sale);
        assert_eq!(p.min_price, 0);
        assert_eq!(p.max_price, 10_000_000);
        assert_eq!(p.min_beds, 0);
        assert_eq!(p.max_beds, 10);
        assert_eq!(p.sort_by, SortKey::Newest);
        assert_eq!(p.current_page, 1);
    }

    #[test]
    fn params_serialize_with_form_field_names() {
        let value = serde_json::to_value(SearchParams::new("Leeds")).unwrap();
        assert_eq!(value["site"], "zoopla");
        assert_eq!(value["listing_type"], "sale");
        assert_eq!(value["sort_by"], "newest");
        assert_eq!(value["max_price"], 10_000_000);
    }

    #[test]
    fn response_defaults_missing_paging_fields() {
        let resp: SearchResponse =
            serde_json::from_value(serde_json::json!({ "listings": [] })).unwrap();
        assert_eq!(resp.total_pages, 1);
        assert_eq!(resp.current_page, 1);
        assert!(!resp.has_more());
    }

    #[test]
    fn null_listing_entries_become_invalid_listings() {
        let resp: SearchResponse = serde_json::from_value(serde_json::json!({
            "listings": [
                null,
                {
                    "title": "2 bed flat",
                    "price": "£1,250 pcm",
                    "url": "https://www.zoopla.co.uk/to-rent/details/1"
                }
            ],
            "total_found": 2
        }))
        .unwrap();
        assert_eq!(resp.listings.len(), 2);
        assert!(!resp.listings[0].is_structurally_valid());
        assert!(resp.listings[1].is_structurally_valid());

        let resp: SearchResponse =
            serde_json::from_value(serde_json::json!({ "listings": null })).unwrap();
        assert!(resp.listings.is_empty());
    }

    #[test]
    fn has_more_prefers_explicit_flag() {
        let resp = SearchResponse {
            current_page: 1,
            total_pages: 5,
            has_next_page: Some(false),
            ..SearchResponse::default()
        };
        assert!(!resp.has_more());

        let resp = SearchResponse {
            current_page: 2,
            total_pages: 5,
            ..SearchResponse::default()
        };
        assert!(resp.has_more());
    }

    #[test]
    fn combined_response_parses_site_stats() {
        let resp: SearchResponse = serde_json::from_value(serde_json::json!({
            "listings": [],
            "total_found": 40,
            "total_pages": 3,
            "current_page": 1,
            "site_stats": {
                "zoopla": { "listings": 25, "total_pages": 2, "source": "live" },
                "rightmove": { "listings": 15, "total_pages": 3, "source": "cache" }
            }
        }))
        .unwrap();
        let stats = resp.site_stats.unwrap();
        assert_eq!(stats["zoopla"].listings, 25);
        assert_eq!(stats["rightmove"].source, "cache");
    }
}
