use std::time::Duration;

use tracing::{debug, info};

use crate::config::Config;
use crate::error::FetchError;
use crate::models::{ResultItem, ResultPage, SearchQuery, SearchRequest};
use crate::observer::SearchObserver;
use crate::rate_limit::pace;
use crate::transport::SearchTransport;

/// Collects result items for one query across consecutive pages.
pub struct PaginatedSearchFetcher<T, O = ()> {
    transport: T,
    observer: O,
    per_page: u32,
    page_cooldown: Duration,
}

impl<T: SearchTransport> PaginatedSearchFetcher<T> {
    pub fn new(transport: T, config: &Config) -> Self {
        Self {
            transport,
            observer: (),
            per_page: config.per_page,
            page_cooldown: config.page_cooldown,
        }
    }
}

impl<T: SearchTransport, O: SearchObserver> PaginatedSearchFetcher<T, O> {
    pub fn with_observer<P: SearchObserver>(self, observer: P) -> PaginatedSearchFetcher<T, P> {
        PaginatedSearchFetcher {
            transport: self.transport,
            observer,
            per_page: self.per_page,
            page_cooldown: self.page_cooldown,
        }
    }

    /// Fetch pages `1..=max_pages` of `query`, stopping at the first empty
    /// page. Items keep the order the API returned them in.
    ///
    /// Any failed page aborts the whole fetch; no partial results are
    /// returned.
    pub async fn fetch_all(
        &self,
        query: &SearchQuery,
        max_pages: u32,
    ) -> Result<Vec<ResultItem>, FetchError> {
        let mut items = Vec::new();

        for page in 1..=max_pages {
            let request = SearchRequest::page(query, self.per_page, page);
            self.observer.on_request(&request);

            let response = self.transport.get(&request).await?.error_for_status()?;
            let rate_limit = response.rate_limit;
            let ResultPage { items: page_items } = response.json::<ResultPage>()?;

            let count = page_items.len();
            self.observer.on_page_fetched(query.as_str(), page, count);
            if count == 0 {
                debug!("No more results for '{}'", query);
                break;
            }
            items.extend(page_items);

            if page == max_pages {
                info!("Max page limit reached for '{}' (limit: {})", query, max_pages);
                break;
            }
            pace(&rate_limit, self.page_cooldown, &self.observer).await;
        }

        Ok(items)
    }
}
