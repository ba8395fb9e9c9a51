//! Form validation run before any request leaves the client.
//!
//! Every check returns a [`ValidationError`] naming the offending field and a
//! message fit for showing next to it. Successful checks return the value in
//! the normalised form the backend expects.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::search::{ListingType, SearchParams, Site};

/// Minimum account password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Digits in an emailed verification code.
pub const VERIFICATION_CODE_LEN: usize = 6;

/// Rightmove will not search rentals above this monthly price.
pub const RIGHTMOVE_RENT_PRICE_CAP: u64 = 20_000;

static FULL_POSTCODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{1,2}[0-9][A-Z0-9]? ?[0-9][A-Z]{2}$").expect("valid postcode regex")
});

static OUTWARD_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{1,2}[0-9][A-Z0-9]?$").expect("valid outward code regex"));

static PLACE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z\s,]+$").expect("valid place name regex"));

static UK_PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0[1-9][0-9]{8,9}$").expect("valid phone regex"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Cities, areas, and counties the search form accepts by name.
pub const KNOWN_LOCATIONS: &[&str] = &[
    // London areas
    "London", "Central London", "North London", "South London", "East London", "West London",
    "Camden", "Kensington", "Chelsea", "Westminster", "Greenwich", "Richmond", "Hackney",
    // Major cities
    "Manchester", "Liverpool", "Birmingham", "Leeds", "Glasgow", "Edinburgh", "Cardiff",
    "Bristol", "Sheffield", "Nottingham", "Leicester", "Coventry", "Hull", "Newcastle",
    // Around major cities
    "Greater Manchester", "Merseyside", "West Midlands", "West Yorkshire", "Greater Glasgow",
    "Lothian", "South Gloucestershire", "South Yorkshire", "Nottinghamshire", "Leicestershire",
    // Other areas
    "Brighton", "Bath", "Oxford", "Cambridge", "York", "Belfast", "Aberdeen", "Dundee",
    "Exeter", "Plymouth", "Southampton", "Portsmouth", "Norwich", "Derby",
    // Counties and nations
    "Surrey", "Kent", "Essex", "Hertfordshire", "Buckinghamshire", "Berkshire", "Hampshire",
    "Sussex", "Devon", "Cornwall", "Somerset", "Dorset", "Wiltshire", "Gloucestershire",
    "Worcestershire", "Warwickshire", "Staffordshire", "Cheshire", "Lancashire", "Yorkshire",
    "Durham", "Northumberland", "Cumbria", "Wales", "Scotland", "Northern Ireland",
];

/// A form field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Full postcode (`M1 1AE`) or outward code (`M40`), case-insensitive.
#[must_use]
pub fn is_valid_postcode(input: &str) -> bool {
    let upper = input.trim().to_ascii_uppercase();
    FULL_POSTCODE_RE.is_match(&upper) || OUTWARD_CODE_RE.is_match(&upper)
}

/// True when the input names, or contains the name of, a known location.
#[must_use]
pub fn is_known_location(input: &str) -> bool {
    let normalized = input.trim().to_lowercase();
    KNOWN_LOCATIONS.iter().any(|known| {
        let known = known.to_lowercase();
        normalized == known || normalized.contains(&known)
    })
}

/// Validates the location field.
///
/// Anything containing a digit is treated as a postcode and returned
/// uppercased. Otherwise the input must be at least two characters of
/// letters, spaces, and commas, and mention a known location.
///
/// # Errors
///
/// Returns a [`ValidationError`] on the `location` field.
pub fn validate_location(input: &str) -> Result<String, ValidationError> {
    let location = input.trim();
    if location.is_empty() {
        return Err(ValidationError::new("location", "Please enter a location"));
    }

    if location.chars().any(|c| c.is_ascii_digit()) {
        if is_valid_postcode(location) {
            return Ok(location.to_ascii_uppercase());
        }
        return Err(ValidationError::new("location", "Invalid postcode format"));
    }

    if location.chars().count() < 2 {
        return Err(ValidationError::new(
            "location",
            "Location must be at least 2 characters",
        ));
    }

    if !PLACE_NAME_RE.is_match(location) {
        return Err(ValidationError::new(
            "location",
            "Location must contain only letters, spaces, and commas (or be a valid postcode)",
        ));
    }

    if !is_known_location(location) {
        return Err(ValidationError::new(
            "location",
            format!("'{location}' is not a valid UK location. Please enter a valid city, area, county, or postcode."),
        ));
    }

    Ok(location.to_string())
}

/// Validates a UK phone number and returns it as bare national digits.
///
/// Spaces, dashes, dots, and parentheses are ignored, and a leading `+44`
/// or `0044` is rewritten to `0`. The result must be 10 or 11 digits
/// starting `0[1-9]`. Numbers whose subscriber digits are all the same
/// (`07777777777`, `0000000000`) are rejected as placeholders.
///
/// # Errors
///
/// Returns a [`ValidationError`] on the `phone` field.
pub fn validate_uk_phone(input: &str) -> Result<String, ValidationError> {
    let compact: String = input
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();
    if compact.is_empty() {
        return Err(ValidationError::new("phone", "Please enter a phone number"));
    }

    let national = if let Some(rest) = compact.strip_prefix("+44") {
        format!("0{}", rest.trim_start_matches('0'))
    } else if let Some(rest) = compact.strip_prefix("0044") {
        format!("0{}", rest.trim_start_matches('0'))
    } else {
        compact
    };

    let invalid = || ValidationError::new("phone", "Please enter a valid UK phone number");

    let digits = national.as_bytes();
    if digits.len() > 1 && digits.iter().all(|d| *d == digits[0]) {
        return Err(invalid());
    }
    if !UK_PHONE_RE.is_match(&national) {
        return Err(invalid());
    }
    let subscriber = &digits[1..];
    if subscriber.iter().all(|d| *d == subscriber[0]) {
        return Err(invalid());
    }

    Ok(national)
}

/// Validates an email address and returns it trimmed and lowercased.
///
/// # Errors
///
/// Returns a [`ValidationError`] on the `email` field.
pub fn validate_email(input: &str) -> Result<String, ValidationError> {
    let email = input.trim();
    if email.is_empty() {
        return Err(ValidationError::new("email", "Please enter your email address"));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::new(
            "email",
            "Please enter a valid email address",
        ));
    }
    Ok(email.to_lowercase())
}

/// # Errors
///
/// Returns a [`ValidationError`] on the `password` field when the password is
/// shorter than [`MIN_PASSWORD_LEN`] characters.
pub fn validate_password(input: &str) -> Result<(), ValidationError> {
    if input.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::new(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

/// Validates an emailed verification code: exactly six digits, surrounding
/// whitespace ignored.
///
/// # Errors
///
/// Returns a [`ValidationError`] on the `code` field.
pub fn validate_verification_code(input: &str) -> Result<String, ValidationError> {
    let code = input.trim();
    if code.len() != VERIFICATION_CODE_LEN || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new(
            "code",
            format!("Please enter the {VERIFICATION_CODE_LEN}-digit code from your email"),
        ));
    }
    Ok(code.to_string())
}

/// Checks the price range and applies the Rightmove rental cap.
///
/// # Errors
///
/// Returns a [`ValidationError`] on `max_price` when the range is inverted.
pub fn validate_price_range(
    min_price: u64,
    max_price: u64,
    listing_type: ListingType,
    site: Site,
) -> Result<(u64, u64), ValidationError> {
    if max_price < min_price {
        return Err(ValidationError::new(
            "max_price",
            "Maximum price must be greater than minimum price",
        ));
    }
    let max_price = if listing_type == ListingType::Rent && site == Site::Rightmove {
        max_price.min(RIGHTMOVE_RENT_PRICE_CAP)
    } else {
        max_price
    };
    Ok((min_price, max_price))
}

/// # Errors
///
/// Returns a [`ValidationError`] on `max_beds` when the range is inverted.
pub fn validate_bed_range(min_beds: u32, max_beds: u32) -> Result<(u32, u32), ValidationError> {
    if max_beds < min_beds {
        return Err(ValidationError::new(
            "max_beds",
            "Maximum beds must be greater than minimum beds",
        ));
    }
    Ok((min_beds, max_beds))
}

/// Validates the whole search form and returns the normalised parameters.
///
/// # Errors
///
/// Returns the first failing field's [`ValidationError`].
pub fn validate_search_params(params: &SearchParams) -> Result<SearchParams, ValidationError> {
    let location = validate_location(&params.location)?;
    let (min_price, max_price) = validate_price_range(
        params.min_price,
        params.max_price,
        params.listing_type,
        params.site,
    )?;
    let (min_beds, max_beds) = validate_bed_range(params.min_beds, params.max_beds)?;

    Ok(SearchParams {
        location,
        min_price,
        max_price,
        min_beds,
        max_beds,
        keywords: params.keywords.trim().to_string(),
        current_page: params.current_page.max(1),
        ..params.clone()
    })
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
