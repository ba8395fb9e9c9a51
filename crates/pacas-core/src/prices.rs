//! Min/max price presets offered by the search form.
//!
//! Zoopla accepts arbitrary price bands, so it gets fine-grained steps; the
//! other sources get a short coarse list. Rentals are priced per calendar
//! month.

use crate::search::{ListingType, Site};

const ZOOPLA_RENT_MIN: &[u64] = &[
    100, 200, 300, 400, 500, 600, 700, 800, 900, 1_000, 1_250, 1_500, 1_750, 2_000, 2_500, 3_000,
    4_000, 5_000, 7_500, 10_000, 15_000, 20_000,
];
const ZOOPLA_RENT_MAX: &[u64] = &[
    200, 300, 400, 500, 600, 700, 800, 900, 1_000, 1_250, 1_500, 1_750, 2_000, 2_500, 3_000, 4_000,
    5_000, 7_500, 10_000, 15_000, 20_000, 25_000,
];
const OTHER_RENT_MIN: &[u64] = &[500, 1_000, 1_500, 2_000, 3_000];
const OTHER_RENT_MAX: &[u64] = &[1_500, 2_500, 5_000, 10_000];

const ZOOPLA_SALE_MIN: &[u64] = &[
    50_000, 60_000, 70_000, 80_000, 90_000, 100_000, 110_000, 120_000, 130_000, 140_000, 150_000,
    160_000, 170_000, 180_000, 190_000, 200_000, 250_000, 300_000, 400_000, 500_000, 600_000,
    700_000, 800_000, 900_000, 1_000_000,
];
const ZOOPLA_SALE_MAX: &[u64] = &[
    60_000, 70_000, 80_000, 90_000, 100_000, 110_000, 120_000, 130_000, 140_000, 150_000, 160_000,
    170_000, 180_000, 190_000, 200_000, 250_000, 300_000, 400_000, 500_000, 600_000, 700_000,
    800_000, 900_000, 1_000_000, 1_500_000, 2_000_000, 3_000_000, 4_000_000, 5_000_000,
];
const OTHER_SALE_MIN: &[u64] = &[50_000, 100_000, 200_000, 300_000, 500_000];
const OTHER_SALE_MAX: &[u64] = &[300_000, 500_000, 1_000_000, 2_000_000];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceOption {
    pub value: u64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricePresets {
    pub min: Vec<PriceOption>,
    pub max: Vec<PriceOption>,
}

/// `1250` → `"£1,250"`.
#[must_use]
pub fn format_gbp(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    format!("£{out}")
}

/// Presets for the given source and listing type.
#[must_use]
pub fn price_options(site: Site, listing_type: ListingType) -> PricePresets {
    let (min, max) = match (listing_type, site) {
        (ListingType::Rent, Site::Zoopla) => (ZOOPLA_RENT_MIN, ZOOPLA_RENT_MAX),
        (ListingType::Rent, _) => (OTHER_RENT_MIN, OTHER_RENT_MAX),
        (ListingType::Sale, Site::Zoopla) => (ZOOPLA_SALE_MIN, ZOOPLA_SALE_MAX),
        (ListingType::Sale, _) => (OTHER_SALE_MIN, OTHER_SALE_MAX),
    };
    let label = |value: u64| match listing_type {
        ListingType::Rent => format!("{} pcm", format_gbp(value)),
        ListingType::Sale => format_gbp(value),
    };
    let to_options = |values: &[u64]| -> Vec<PriceOption> {
        values
            .iter()
            .map(|&value| PriceOption {
                value,
                label: label(value),
            })
            .collect()
    };
    PricePresets {
        min: to_options(min),
        max: to_options(max),
    }
}
