//! Property listings as the backend returns them.
//!
//! The scrapers behind the API are loose about field presence: any field can
//! be missing or `null`, and the description arrives as `desc`. Every string
//! field therefore deserializes `null`/absent to an empty string, and
//! "missing" means "empty" throughout the client.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};

/// Shown in place of a listing image when the backend has none.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300x200?text=No+Image";

static BEDROOMS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*bed").expect("valid bedrooms regex"));

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Listing arrays may hold `null` entries; each becomes an empty, and so
/// structurally invalid, listing that merging counts and drops.
pub(crate) fn null_entries_as_invalid<'de, D>(deserializer: D) -> Result<Vec<Listing>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<Option<Listing>>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(entries.into_iter().map(Option::unwrap_or_default).collect())
}

/// One scraped property record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    /// Display string, currency-prefixed (e.g. `"£1,250 pcm"`).
    #[serde(default, deserialize_with = "null_as_empty")]
    pub price: String,
    /// Free-text bedroom summary (e.g. `"3 bed flat"`).
    #[serde(default, deserialize_with = "null_as_empty")]
    pub specs: String,
    #[serde(
        default,
        rename = "desc",
        alias = "description",
        deserialize_with = "null_as_empty"
    )]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image: String,
    /// Name of the site the listing was scraped from.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub source: String,
    /// Destination URL on the source site.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub address: String,
}

impl Listing {
    /// A listing can be shown and redirected to only when it has a title,
    /// a price, and a destination URL.
    #[must_use]
    pub fn is_structurally_valid(&self) -> bool {
        !self.title.trim().is_empty() && !self.price.trim().is_empty() && !self.url.trim().is_empty()
    }

    /// Title for a card, falling back to the address.
    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.address
        } else {
            &self.title
        }
    }

    /// Image URL for a card, or [`PLACEHOLDER_IMAGE`] when there is none.
    #[must_use]
    pub fn image_or_placeholder(&self) -> &str {
        if self.image.trim().is_empty() {
            PLACEHOLDER_IMAGE
        } else {
            &self.image
        }
    }

    /// Numeric price from the display string, digits only.
    ///
    /// `"£1,250 pcm"` → `Some(1250)`. Returns `None` when the string has no
    /// digits at all (e.g. `"POA"`) or the digits overflow.
    #[must_use]
    pub fn price_value(&self) -> Option<u64> {
        let digits: String = self.price.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return None;
        }
        digits.parse().ok()
    }

    /// Bedroom count from the first `N bed` in `specs`, or 0.
    #[must_use]
    pub fn bedrooms(&self) -> u32 {
        BEDROOMS_RE
            .captures(&self.specs)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    }

    /// Stable identity used to drop duplicates when pages are merged.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let input = format!("{}|{}|{}", self.title.trim(), self.price.trim(), self.url.trim());
        format!("{:x}", Sha256::digest(input.as_bytes()))
    }
}

/// A property saved to the signed-in user's favorites.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub property_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub property_title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub property_price: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub property_image: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub site: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub bedrooms: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location: String,
    /// Backend timestamp, passed through verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<String>,
}

impl Favorite {
    /// Builds a favorite from a listing card, tagging it with the search location.
    #[must_use]
    pub fn from_listing(listing: &Listing, location: &str) -> Self {
        Self {
            property_url: listing.url.clone(),
            property_title: listing.display_title().to_string(),
            property_price: listing.price.clone(),
            property_image: listing.image.clone(),
            site: listing.source.clone(),
            bedrooms: listing.specs.clone(),
            location: location.to_string(),
            added_at: None,
        }
    }
}
