//! Search session: the state machine behind the results list and "Show More".
//!
//! [`SearchSession`] adopts the first page of a search, pages through the
//! held listings, and merges further backend pages on request. The pure state
//! transitions (`start`, `begin_load_more`, `finish_load_more`,
//! `abort_load_more`) are usable without a network; [`SearchSession::search`]
//! and [`SearchSession::load_more`] drive them with a [`PacasClient`].

use std::collections::BTreeMap;
use std::time::Duration;

use pacas_core::validate::validate_search_params;
use pacas_core::{AppConfig, Listing, SearchParams, SearchResponse, SiteStat, SortKey};

use crate::client::PacasClient;
use crate::error::ClientError;
use crate::pager::{ListingPager, MergeStats};

/// How [`SearchSession::load_more`] treats backend pages with nothing usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadMorePolicy {
    pub empty_page_delay: Duration,
    /// Further pages requested after an empty one before giving up.
    pub max_empty_page_skips: u32,
}

impl Default for LoadMorePolicy {
    fn default() -> Self {
        Self {
            empty_page_delay: Duration::from_millis(1_000),
            max_empty_page_skips: 5,
        }
    }
}

impl LoadMorePolicy {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            empty_page_delay: Duration::from_millis(config.empty_page_delay_ms),
            max_empty_page_skips: config.max_empty_page_skips,
        }
    }
}

/// Result of merging one backend page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// New listings were merged.
    Appended { added: usize, has_more: bool },
    /// The page had no usable listings but the backend has more pages.
    Empty,
    /// Nothing usable and nothing further to fetch.
    Exhausted,
}

#[derive(Debug)]
pub struct SearchSession {
    pager: ListingPager,
    params: Option<SearchParams>,
    backend_page: u32,
    total_pages: u32,
    total_found: u64,
    summary_count: u64,
    site_stats: Option<BTreeMap<String, SiteStat>>,
    has_more: bool,
    loading: bool,
    pending_page: Option<u32>,
}

impl SearchSession {
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            pager: ListingPager::new(page_size),
            params: None,
            backend_page: 0,
            total_pages: 0,
            total_found: 0,
            summary_count: 0,
            site_stats: None,
            has_more: false,
            loading: false,
            pending_page: None,
        }
    }

    /// Replaces everything held with the first page of a new search.
    pub fn start(&mut self, response: SearchResponse, params: SearchParams) -> MergeStats {
        self.pager.reset();
        self.pager.set_sort(params.sort_by);
        self.backend_page = response.current_page.max(1);
        self.total_pages = response.total_pages;
        self.total_found = response.total_found;
        self.summary_count = response.total_found;
        self.has_more = response.has_more();
        self.site_stats = response.site_stats;
        self.loading = false;
        self.pending_page = None;
        self.params = Some(params);

        let stats = self.pager.append(response.listings);
        tracing::info!(
            total_found = self.total_found,
            total_pages = self.total_pages,
            added = stats.added,
            skipped_invalid = stats.skipped_invalid,
            "search results adopted"
        );
        stats
    }

    /// Marks a "load more" as in flight and returns the backend page to fetch.
    ///
    /// Returns `Ok(None)` when the backend has no further pages.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Busy`] if a load is already in flight.
    /// - [`ClientError::NoActiveSearch`] before the first search.
    pub fn begin_load_more(&mut self) -> Result<Option<u32>, ClientError> {
        if self.loading {
            return Err(ClientError::Busy);
        }
        if self.params.is_none() {
            return Err(ClientError::NoActiveSearch);
        }
        if !self.has_more {
            return Ok(None);
        }
        let Some(page) = self.backend_page.checked_add(1) else {
            tracing::warn!(backend_page = self.backend_page, "page counter exhausted");
            self.has_more = false;
            return Ok(None);
        };
        self.loading = true;
        self.pending_page = Some(page);
        Ok(Some(page))
    }

    /// Applies the answer to the in-flight load and clears the busy flag.
    pub fn finish_load_more(&mut self, response: SearchResponse) -> LoadOutcome {
        let requested = self
            .pending_page
            .take()
            .unwrap_or_else(|| self.backend_page.saturating_add(1));
        self.loading = false;
        self.backend_page = response.current_page.max(requested);
        self.total_pages = response.total_pages;
        self.has_more = response.has_more();

        let stats = self.pager.append(response.listings);
        tracing::debug!(
            backend_page = self.backend_page,
            added = stats.added,
            skipped_invalid = stats.skipped_invalid,
            skipped_duplicate = stats.skipped_duplicate,
            "merged backend page"
        );

        if stats.added > 0 {
            self.summary_count = u64::try_from(self.pager.len()).unwrap_or(u64::MAX);
            LoadOutcome::Appended {
                added: stats.added,
                has_more: self.has_more,
            }
        } else if self.has_more {
            LoadOutcome::Empty
        } else {
            LoadOutcome::Exhausted
        }
    }

    /// Clears the busy flag after a failed load. Held listings are untouched.
    pub fn abort_load_more(&mut self) {
        self.loading = false;
        self.pending_page = None;
    }

    /// `"Found N properties"` or `"No properties found"`.
    #[must_use]
    pub fn results_summary(&self) -> String {
        if self.summary_count > 0 {
            format!("Found {} properties", self.summary_count)
        } else {
            "No properties found".to_owned()
        }
    }

    #[must_use]
    pub fn page(&self, n: usize) -> Vec<&Listing> {
        self.pager.page(n)
    }

    #[must_use]
    pub fn current_page(&self) -> usize {
        self.pager.current_page()
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pager.page_count()
    }

    #[must_use]
    pub fn visible(&self) -> Vec<&Listing> {
        self.pager.visible()
    }

    pub fn go_to_page(&mut self, n: usize) -> bool {
        self.pager.go_to_page(n)
    }

    pub fn next_page(&mut self) -> bool {
        self.pager.next_page()
    }

    pub fn previous_page(&mut self) -> bool {
        self.pager.previous_page()
    }

    #[must_use]
    pub fn show_more_visible(&self) -> bool {
        self.pager.show_more_visible()
    }

    /// Re-sorts the held listings and returns to page 1.
    pub fn set_sort(&mut self, sort: SortKey) {
        self.pager.set_sort(sort);
        if let Some(params) = self.params.as_mut() {
            params.sort_by = sort;
        }
    }

    #[must_use]
    pub fn params(&self) -> Option<&SearchParams> {
        self.params.as_ref()
    }

    #[must_use]
    pub fn held(&self) -> usize {
        self.pager.len()
    }

    #[must_use]
    pub fn total_found(&self) -> u64 {
        self.total_found
    }

    #[must_use]
    pub fn backend_page(&self) -> u32 {
        self.backend_page
    }

    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn site_stats(&self) -> Option<&BTreeMap<String, SiteStat>> {
        self.site_stats.as_ref()
    }

    /// Validates `params`, runs the search, and adopts the first page.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] before any request is sent, or any error
    /// from [`PacasClient::search`]. On error the previous results are kept.
    pub async fn search(
        &mut self,
        client: &PacasClient,
        params: &SearchParams,
    ) -> Result<MergeStats, ClientError> {
        let params = validate_search_params(params)?;
        let response = client.search(&params).await?;
        Ok(self.start(response, params))
    }

    /// Fetches and merges the next backend page.
    ///
    /// Pages with no usable listings are skipped after `policy.empty_page_delay`,
    /// at most `policy.max_empty_page_skips` times in a row; past that the
    /// load reports [`LoadOutcome::Exhausted`].
    ///
    /// # Errors
    ///
    /// [`ClientError::Busy`], [`ClientError::NoActiveSearch`], or any error
    /// from [`PacasClient::next_page`]. The busy flag is cleared on failure.
    pub async fn load_more(
        &mut self,
        client: &PacasClient,
        policy: &LoadMorePolicy,
    ) -> Result<LoadOutcome, ClientError> {
        let mut skipped = 0u32;
        loop {
            let Some(page) = self.begin_load_more()? else {
                return Ok(LoadOutcome::Exhausted);
            };
            let fetched = match self.params.as_ref() {
                Some(params) => client.next_page(params, page).await,
                None => Err(ClientError::NoActiveSearch),
            };
            let response = match fetched {
                Ok(response) => response,
                Err(err) => {
                    self.abort_load_more();
                    return Err(err);
                }
            };

            match self.finish_load_more(response) {
                LoadOutcome::Empty => {
                    if skipped >= policy.max_empty_page_skips {
                        tracing::warn!(
                            page,
                            skipped,
                            "too many empty backend pages in a row, giving up"
                        );
                        return Ok(LoadOutcome::Exhausted);
                    }
                    skipped += 1;
                    tracing::warn!(
                        page,
                        skipped,
                        "backend page had no usable listings, trying the next one"
                    );
                    tokio::time::sleep(policy.empty_page_delay).await;
                }
                outcome => return Ok(outcome),
            }
        }
    }
}
