//! Display paging over the listings fetched so far.
//!
//! The pager holds every listing received for the current search, in the
//! selected sort order, and slices that sequence into fixed-size display
//! pages. Each listing remembers its arrival position, so sorting never loses
//! the fetch order: `Newest` restores it exactly and every other key breaks
//! ties by arrival.

use std::cmp::Ordering;
use std::collections::HashSet;

use pacas_core::{Listing, SortKey};

#[derive(Debug, Clone)]
struct Held {
    seq: u64,
    price: Option<u64>,
    beds: u32,
    listing: Listing,
}

/// What happened to a batch handed to [`ListingPager::append`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub added: usize,
    pub skipped_invalid: usize,
    pub skipped_duplicate: usize,
}

#[derive(Debug, Clone)]
pub struct ListingPager {
    entries: Vec<Held>,
    seen: HashSet<String>,
    next_seq: u64,
    page_size: usize,
    current_page: usize,
    sort: SortKey,
}

impl ListingPager {
    /// A zero page size is treated as one.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            entries: Vec::new(),
            seen: HashSet::new(),
            next_seq: 0,
            page_size: page_size.max(1),
            current_page: 1,
            sort: SortKey::default(),
        }
    }

    /// Drops every held listing and returns to page 1. The sort key is kept.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.seen.clear();
        self.next_seq = 0;
        self.current_page = 1;
    }

    /// Appends a fetched batch, re-sorts, and clamps the displayed page.
    ///
    /// Listings missing a title, price, or URL are dropped, as are listings
    /// already held.
    pub fn append(&mut self, listings: impl IntoIterator<Item = Listing>) -> MergeStats {
        let mut stats = MergeStats::default();
        for listing in listings {
            if !listing.is_structurally_valid() {
                stats.skipped_invalid += 1;
                continue;
            }
            if !self.seen.insert(listing.fingerprint()) {
                stats.skipped_duplicate += 1;
                continue;
            }
            self.entries.push(Held {
                seq: self.next_seq,
                price: listing.price_value(),
                beds: listing.bedrooms(),
                listing,
            });
            self.next_seq += 1;
            stats.added += 1;
        }
        self.apply_sort();
        self.clamp_current_page();
        stats
    }

    /// Re-sorts the held listings and returns to page 1.
    pub fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
        self.apply_sort();
        self.current_page = 1;
    }

    #[must_use]
    pub fn sort(&self) -> SortKey {
        self.sort
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of display pages; zero when nothing is held.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.entries.len().div_ceil(self.page_size)
    }

    /// Displayed page, 1-based. Always at least 1.
    #[must_use]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Listings on display page `n` (1-based); empty when `n` is out of range.
    #[must_use]
    pub fn page(&self, n: usize) -> Vec<&Listing> {
        let Some(start) = n
            .checked_sub(1)
            .and_then(|i| i.checked_mul(self.page_size))
        else {
            return Vec::new();
        };
        self.entries
            .iter()
            .skip(start)
            .take(self.page_size)
            .map(|h| &h.listing)
            .collect()
    }

    /// Listings on the displayed page.
    #[must_use]
    pub fn visible(&self) -> Vec<&Listing> {
        self.page(self.current_page)
    }

    /// Every held listing in display order.
    pub fn listings(&self) -> impl Iterator<Item = &Listing> {
        self.entries.iter().map(|h| &h.listing)
    }

    /// Moves to page `n`. Returns `false`, leaving the page unchanged, when
    /// `n` is out of range.
    pub fn go_to_page(&mut self, n: usize) -> bool {
        if n == 0 || n > self.page_count() {
            return false;
        }
        self.current_page = n;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.current_page + 1)
    }

    pub fn previous_page(&mut self) -> bool {
        self.go_to_page(self.current_page.saturating_sub(1))
    }

    /// "Show More" is offered only on the last held page.
    #[must_use]
    pub fn show_more_visible(&self) -> bool {
        !self.entries.is_empty() && self.current_page == self.page_count()
    }

    fn clamp_current_page(&mut self) {
        self.current_page = self.current_page.clamp(1, self.page_count().max(1));
    }

    fn apply_sort(&mut self) {
        let sort = self.sort;
        self.entries.sort_by(|a, b| compare(sort, a, b).then(a.seq.cmp(&b.seq)));
    }
}

fn compare(sort: SortKey, a: &Held, b: &Held) -> Ordering {
    match sort {
        SortKey::PriceAsc => compare_price(a.price, b.price, false),
        SortKey::PriceDesc => compare_price(a.price, b.price, true),
        SortKey::BedsAsc => a.beds.cmp(&b.beds),
        SortKey::BedsDesc => b.beds.cmp(&a.beds),
        SortKey::Newest => a.seq.cmp(&b.seq),
        SortKey::Oldest => b.seq.cmp(&a.seq),
    }
}

/// Unpriced listings sort last in both directions.
fn compare_price(a: Option<u64>, b: Option<u64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) if descending => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
#[path = "pager_test.rs"]
mod tests;
