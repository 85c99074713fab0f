//! # GitHub Usage Census
//!
//! A Rust library for estimating how a library is used in public code,
//! built on GitHub code search with rate-limit aware pagination.
//!
//! ## Main Components
//!
//! - [`PaginatedSearchFetcher`]: pages through results for one query
//! - [`AliasCounter`]: tallies bracketed alias forms in text-match fragments
//! - [`BucketedTotalCounter`]: sums `total_count` over buckets of queries
//! - [`SearchTransport`]: the HTTP seam, implemented by [`GitHubTransport`]
//! - [`Config`] and [`Args`]: settings and the command line
//!
//! ## Example
//!
//! ```no_run
//! use github_usage_census::{
//!     count_aliases, Config, GitHubTransport, PaginatedSearchFetcher, SearchQuery,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let config = Config::default().with_token("ghp_...");
//!     let transport = GitHubTransport::new(&config)?;
//!     let fetcher = PaginatedSearchFetcher::new(transport, &config);
//!
//!     let query = SearchQuery::new("[reagent.core")?;
//!     let items = fetcher.fetch_all(&query, 2).await?;
//!     let tally = count_aliases(&items, "[reagent.core")?;
//!
//!     for (alias, count) in tally.sorted() {
//!         println!("{count:<5} {alias}");
//!     }
//!     Ok(())
//! }
//! ```

mod aliases;
mod args;
mod buckets;
mod config;
mod error;
mod fetcher;
mod models;
mod observer;
mod rate_limit;
mod report;
mod transport;

pub use crate::aliases::{count_aliases, AliasCounter, AliasTally};
pub use crate::args::{Args, Command};
pub use crate::buckets::{
    candidate_queries, reagent_buckets, sum_bucket, Bucket, BucketReport, BucketedTotalCounter,
};
pub use crate::config::{Config, DEFAULT_API_URL, TOKEN_ENV_VAR};
pub use crate::error::{ConfigError, Error, FetchError, RejectedQuery, Result};
pub use crate::fetcher::PaginatedSearchFetcher;
pub use crate::models::{
    RateLimitInfo, ResultItem, ResultPage, SearchQuery, SearchRequest, SearchResponse, TextMatch,
    TotalCount,
};
pub use crate::observer::{ProgressObserver, SearchObserver};
pub use crate::rate_limit::backoff_delay;
pub use crate::report::{render_alias_report, render_bucket_report, DEFAULT_USAGE_TITLE};
pub use crate::transport::{GitHubTransport, SearchTransport};
