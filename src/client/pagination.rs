//! Pagination controller for the listing API
//!
//! Total page count is unknown until the first page succeeds: the first
//! response carries the query's total result count, and
//! `page_count = ceil(movie_count / 50)`. The controller therefore fetches
//! the starting page unconditionally with a bounded retry budget (without it
//! the run has no useful work to do), then fans out over the remaining pages
//! either sequentially or through a bounded worker pool.
//!
//! Failure policy:
//! - First page: retried up to [`FIRST_PAGE_MAX_ATTEMPTS`] times, then fatal
//! - Any later page: skip-and-continue; the page is dropped from the result
//!   set and pagination proceeds
//!
//! In concurrent mode completion is declared only once every dispatched
//! fetch has resolved; collecting the fetch stream is the join barrier.

use crate::client::{ClientError, ClientResult, ListingClient, ListingQuery};
use crate::report::{ReportEvent, SharedReporter};
use crate::shutdown::SharedShutdown;
use crate::Page;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Retry budget for the starting page.
pub const FIRST_PAGE_MAX_ATTEMPTS: u32 = 10;

/// Delay between first-page retry attempts.
const FIRST_PAGE_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Worker pool width for concurrent page fetching.
pub const PAGE_POOL_WIDTH: usize = 10;

/// How the remaining pages are fetched once the count is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Strictly in page order, one request at a time
    Sequential,
    /// Bounded worker pool of [`PAGE_POOL_WIDTH`] concurrent requests
    Concurrent,
}

/// Result of a full pagination pass.
#[derive(Debug)]
pub struct CatalogFetch {
    /// Total matching items reported by the API
    pub movie_count: u64,
    /// Derived page count for the whole query
    pub page_count: u32,
    /// Successfully fetched pages, ordered by page number
    pub pages: Vec<Page>,
}

/// Drives page discovery and fetch for one query.
pub struct PaginationController {
    client: Arc<dyn ListingClient>,
    reporter: SharedReporter,
    shutdown: SharedShutdown,
    mode: FetchMode,
}

impl PaginationController {
    /// Create a controller.
    pub fn new(
        client: Arc<dyn ListingClient>,
        reporter: SharedReporter,
        shutdown: SharedShutdown,
        mode: FetchMode,
    ) -> Self {
        Self {
            client,
            reporter,
            shutdown,
            mode,
        }
    }

    /// Discover the page count and fetch every page from `start_page` on.
    ///
    /// # Arguments
    /// * `query` - Listing query shared by every page
    /// * `start_page` - First page to fetch; values below 1 are clamped to 1
    ///
    /// # Errors
    /// Returns [`ClientError::ExhaustedRetries`] if the starting page never
    /// succeeds. Failures on later pages are logged and skipped.
    pub async fn discover_and_fetch_all(
        &self,
        query: &ListingQuery,
        start_page: u32,
    ) -> ClientResult<CatalogFetch> {
        let start_page = start_page.max(1);

        let first = self.fetch_first_page_with_retry(query, start_page).await?;
        let movie_count = first.movie_count;
        let page_count = first.page_count();

        info!(
            movie_count = movie_count,
            page_count = page_count,
            start_page = start_page,
            "Pagination discovered"
        );

        if movie_count == 0 {
            return Ok(CatalogFetch {
                movie_count: 0,
                page_count: 0,
                pages: Vec::new(),
            });
        }

        self.reporter
            .event(ReportEvent::PageFetched(start_page, page_count));

        let mut pages = vec![Page {
            number: start_page,
            items: first.items,
        }];

        let remaining: Vec<u32> = (start_page + 1..=page_count).collect();
        match self.mode {
            FetchMode::Sequential => {
                for number in remaining {
                    if self.shutdown.is_shutdown_requested() {
                        warn!("Early exit requested - stopping pagination");
                        break;
                    }
                    match self.client.fetch_page(query, number).await {
                        Ok(response) => {
                            self.reporter
                                .event(ReportEvent::PageFetched(number, page_count));
                            pages.push(Page {
                                number,
                                items: response.items,
                            });
                        }
                        Err(e) => {
                            warn!(page = number, error = %e, "Skipping page after fetch failure");
                        }
                    }
                }
            }
            FetchMode::Concurrent => {
                // buffer_unordered bounds in-flight requests; collecting the
                // stream waits for every dispatched fetch to resolve.
                let fetched: Vec<(u32, ClientResult<Vec<crate::CatalogItem>>)> =
                    stream::iter(remaining)
                        .map(|number| {
                            let client = Arc::clone(&self.client);
                            let query = query.clone();
                            async move {
                                let result =
                                    client.fetch_page(&query, number).await.map(|r| r.items);
                                (number, result)
                            }
                        })
                        .buffer_unordered(PAGE_POOL_WIDTH)
                        .collect()
                        .await;

                for (number, result) in fetched {
                    match result {
                        Ok(items) => {
                            self.reporter
                                .event(ReportEvent::PageFetched(number, page_count));
                            pages.push(Page { number, items });
                        }
                        Err(e) => {
                            warn!(page = number, error = %e, "Skipping page after fetch failure");
                        }
                    }
                }
            }
        }

        pages.sort_by_key(|p| p.number);
        // start_page may lie past the last page; never derive an expected
        // count by subtraction here.
        debug!(
            fetched = pages.len(),
            page_count = page_count,
            start_page = start_page,
            "Pagination complete"
        );

        Ok(CatalogFetch {
            movie_count,
            page_count,
            pages,
        })
    }

    /// Fetch the starting page, retrying transient failures.
    ///
    /// Network and parse failures count against the same budget: either way
    /// the total result count is still unknown.
    async fn fetch_first_page_with_retry(
        &self,
        query: &ListingQuery,
        page: u32,
    ) -> ClientResult<crate::client::PageResponse> {
        let mut last_error = String::new();

        for attempt in 1..=FIRST_PAGE_MAX_ATTEMPTS {
            match self.client.fetch_page(query, page).await {
                Ok(response) => {
                    debug!(attempt = attempt, "First page fetched");
                    return Ok(response);
                }
                Err(e) => {
                    warn!(
                        attempt = attempt,
                        max_attempts = FIRST_PAGE_MAX_ATTEMPTS,
                        error = %e,
                        "First page fetch failed"
                    );
                    last_error = e.to_string();
                }
            }

            if attempt < FIRST_PAGE_MAX_ATTEMPTS {
                tokio::select! {
                    _ = tokio::time::sleep(FIRST_PAGE_RETRY_DELAY) => {}
                    _ = self.shutdown.wait_for_shutdown() => {
                        return Err(ClientError::ExhaustedRetries {
                            attempts: attempt,
                            last_error: "shutdown requested".to_string(),
                        });
                    }
                }
            }
        }

        Err(ClientError::ExhaustedRetries {
            attempts: FIRST_PAGE_MAX_ATTEMPTS,
            last_error,
        })
    }
}
