//! Progress events emitted by the search components.
//!
//! The components never print. They report what happens through a
//! [`SearchObserver`] and the binary decides how to show it.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::error::RejectedQuery;
use crate::models::{RateLimitInfo, SearchRequest};

/// Callbacks for search progress. Every method defaults to doing nothing.
pub trait SearchObserver {
    fn on_request(&self, _request: &SearchRequest) {}

    fn on_page_fetched(&self, _query: &str, _page: u32, _items: usize) {}

    fn on_rate_limit(&self, _info: &RateLimitInfo, _wait: Duration) {}

    fn on_query_rejected(&self, _rejected: &RejectedQuery) {}

    fn on_query_total(&self, _query: &str, _total: Option<u64>) {}
}

/// Silent observer.
impl SearchObserver for () {}

impl<O: SearchObserver + ?Sized> SearchObserver for &O {
    fn on_request(&self, request: &SearchRequest) {
        (**self).on_request(request)
    }

    fn on_page_fetched(&self, query: &str, page: u32, items: usize) {
        (**self).on_page_fetched(query, page, items)
    }

    fn on_rate_limit(&self, info: &RateLimitInfo, wait: Duration) {
        (**self).on_rate_limit(info, wait)
    }

    fn on_query_rejected(&self, rejected: &RejectedQuery) {
        (**self).on_query_rejected(rejected)
    }

    fn on_query_total(&self, query: &str, total: Option<u64>) {
        (**self).on_query_total(query, total)
    }
}

/// Spinner on stderr plus `tracing` events for each callback.
pub struct ProgressObserver {
    pb: ProgressBar,
}

impl ProgressObserver {
    pub fn new() -> Self {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(80));
        Self { pb }
    }

    /// Hidden bar, for runs where stderr is not a terminal.
    pub fn hidden() -> Self {
        Self {
            pb: ProgressBar::hidden(),
        }
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchObserver for ProgressObserver {
    fn on_request(&self, request: &SearchRequest) {
        self.pb.suspend(|| {
            debug!(
                query = %request.query,
                page = ?request.page,
                per_page = request.per_page,
                "Requesting search page"
            )
        });
        match request.page {
            Some(page) => self
                .pb
                .set_message(format!("Searching '{}' - page {}", request.query, page)),
            None => self
                .pb
                .set_message(format!("Counting '{}'", request.query)),
        }
    }

    fn on_page_fetched(&self, query: &str, page: u32, items: usize) {
        self.pb
            .suspend(|| info!("Fetched {} results for '{}' page {}", items, query, page));
    }

    fn on_rate_limit(&self, info: &RateLimitInfo, wait: Duration) {
        let limit = info
            .limit
            .map_or_else(|| "?".to_string(), |l| l.to_string());
        let remaining = info
            .remaining
            .map_or_else(|| "?".to_string(), |r| r.to_string());
        self.pb.suspend(|| {
            warn!(
                "Rate limit reached ({}/{}). Waiting {} seconds...",
                remaining,
                limit,
                wait.as_secs()
            )
        });
        self.pb.set_message(format!(
            "Rate limited ({}/{}) - waiting {}s",
            remaining,
            limit,
            wait.as_secs()
        ));
    }

    fn on_query_rejected(&self, rejected: &RejectedQuery) {
        self.pb.suspend(|| {
            warn!(
                query = %rejected.query,
                status = rejected.status,
                reason = %rejected.reason,
                "Skipping rejected query"
            )
        });
    }

    fn on_query_total(&self, query: &str, total: Option<u64>) {
        self.pb.suspend(|| match total {
            Some(total) => info!("total_count {} for '{}'", total, query),
            None => warn!("Could not determine total for '{}'", query),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        pages: RefCell<Vec<(String, u32, usize)>>,
    }

    impl SearchObserver for Recorder {
        fn on_page_fetched(&self, query: &str, page: u32, items: usize) {
            self.pages.borrow_mut().push((query.to_string(), page, items));
        }
    }

    #[test]
    fn references_forward_events() {
        let recorder = Recorder::default();
        let by_ref = &recorder;
        by_ref.on_page_fetched("render", 2, 7);
        by_ref.on_request(&SearchRequest::total_only(
            &crate::SearchQuery::new("render").unwrap(),
        ));
        assert_eq!(*recorder.pages.borrow(), vec![("render".to_string(), 2, 7)]);
    }

    #[test]
    fn hidden_progress_accepts_all_events() {
        let observer = ProgressObserver::hidden();
        let rejected = RejectedQuery {
            query: "(r/render ".to_string(),
            status: 422,
            reason: "Validation Failed".to_string(),
        };
        let query = crate::SearchQuery::new("(r/render ").unwrap();
        observer.on_request(&SearchRequest::page(&query, 100, 1));
        observer.on_request(&SearchRequest::total_only(&query));
        observer.on_page_fetched("(r/render ", 1, 100);
        observer.on_query_rejected(&rejected);
        observer.on_rate_limit(&RateLimitInfo::default(), Duration::from_secs(3));
        observer.on_query_total("(r/render ", Some(4));
        observer.on_query_total("(r/render ", None);
        observer.finish();
    }
}
