//! Per-bucket usage totals.
//!
//! A bucket groups alternative spellings of one call site (`(r/render `,
//! `(rdom/render `, ...). Each query is asked for its `total_count` only and
//! the bucket total is the sum over its queries.

use std::str::FromStr;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{ConfigError, FetchError, RejectedQuery};
use crate::models::{SearchQuery, SearchRequest, TotalCount};
use crate::observer::SearchObserver;
use crate::rate_limit::backoff;
use crate::transport::SearchTransport;

/// A named group of equivalent queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub name: String,
    pub queries: Vec<SearchQuery>,
}

impl Bucket {
    pub fn new<I, S>(name: impl Into<String>, queries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queries = queries
            .into_iter()
            .map(SearchQuery::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: name.into(),
            queries,
        })
    }
}

/// Parses `NAME=QUERY[|QUERY...]`. Queries are kept verbatim, trailing
/// spaces included.
impl FromStr for Bucket {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidBucket(s.to_string());
        let (name, queries) = s.split_once('=').ok_or_else(invalid)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid());
        }
        let queries: Vec<&str> = queries.split('|').filter(|q| !q.is_empty()).collect();
        if queries.is_empty() {
            return Err(invalid());
        }
        Bucket::new(name, queries)
    }
}

/// Bucket totals in input order. `None` means no query of the bucket
/// produced a count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketReport {
    pub entries: Vec<(String, Option<u64>)>,
}

impl BucketReport {
    pub fn get(&self, name: &str) -> Option<Option<u64>> {
        self.entries
            .iter()
            .find(|(bucket, _)| bucket == name)
            .map(|(_, total)| *total)
    }

    /// Descending by total, unknown totals last, ties in input order.
    pub fn sorted(&self) -> Vec<(&str, Option<u64>)> {
        let mut sorted: Vec<_> = self
            .entries
            .iter()
            .map(|(name, total)| (name.as_str(), *total))
            .collect();
        sorted.sort_by_key(|&(_, total)| std::cmp::Reverse(total.map_or(-1, |t| t as i128)));
        sorted
    }
}

/// Candidate spellings tried for one query: the query itself, then its
/// quoted form when it has no qualifier and is not quoted already.
pub fn candidate_queries(query: &SearchQuery) -> Vec<SearchQuery> {
    let mut candidates = vec![query.clone()];
    let text = query.as_str();
    if !text.contains(':') && !text.starts_with('"') {
        let quoted = query.quoted();
        if !candidates.contains(&quoted) {
            candidates.push(quoted);
        }
    }
    candidates
}

/// Bucket total from per-query totals: unknown only when every query was
/// unknown, otherwise unknown queries contribute nothing.
pub fn sum_bucket(totals: &[Option<u64>]) -> Option<u64> {
    totals
        .iter()
        .flatten()
        .fold(None, |sum, total| Some(sum.unwrap_or(0) + total))
}

/// Outcome of a single candidate request.
enum CandidateOutcome {
    Total(Option<u64>),
    Rejected(RejectedQuery),
}

/// Asks the search endpoint for `total_count` of queries and buckets.
pub struct BucketedTotalCounter<T, O = ()> {
    transport: T,
    observer: O,
    query_cooldown: Duration,
}

impl<T: SearchTransport> BucketedTotalCounter<T> {
    pub fn new(transport: T, config: &Config) -> Self {
        Self {
            transport,
            observer: (),
            query_cooldown: config.query_cooldown,
        }
    }
}

impl<T: SearchTransport, O: SearchObserver> BucketedTotalCounter<T, O> {
    pub fn with_observer<P: SearchObserver>(self, observer: P) -> BucketedTotalCounter<T, P> {
        BucketedTotalCounter {
            transport: self.transport,
            observer,
            query_cooldown: self.query_cooldown,
        }
    }

    /// Total result count for `query`, trying each candidate spelling.
    ///
    /// The first positive count wins. A zero confirmed by the endpoint is
    /// kept as the answer if nothing better turns up; `None` means no
    /// candidate produced a count at all.
    pub async fn total_for_query(&self, query: &SearchQuery) -> Result<Option<u64>, FetchError> {
        let mut best_total = None;

        for candidate in candidate_queries(query) {
            match self.fetch_candidate(&candidate).await? {
                CandidateOutcome::Rejected(rejected) => {
                    self.observer.on_query_rejected(&rejected);
                }
                CandidateOutcome::Total(None) => {
                    debug!("No total_count for '{}'", candidate);
                }
                CandidateOutcome::Total(Some(total)) if total > 0 => {
                    self.observer.on_query_total(query.as_str(), Some(total));
                    return Ok(Some(total));
                }
                CandidateOutcome::Total(Some(zero)) => {
                    best_total.get_or_insert(zero);
                }
            }
        }

        self.observer.on_query_total(query.as_str(), best_total);
        Ok(best_total)
    }

    async fn fetch_candidate(
        &self,
        candidate: &SearchQuery,
    ) -> Result<CandidateOutcome, FetchError> {
        let request = SearchRequest::total_only(candidate);
        self.observer.on_request(&request);

        let response = self.transport.get(&request).await?;
        debug!(
            status = response.status,
            url = %response.url,
            query = ?candidate.as_str(),
            "Candidate response"
        );
        backoff(&response.rate_limit, &self.observer).await;

        if response.is_rejection() {
            let rejected = RejectedQuery {
                query: candidate.to_string(),
                status: response.status,
                reason: response.reason(),
            };
            debug!("{}", rejected);
            return Ok(CandidateOutcome::Rejected(rejected));
        }

        let TotalCount { total_count } = response.error_for_status()?.json::<TotalCount>()?;
        debug!("total_count {:?} for {:?}", total_count, candidate.as_str());
        Ok(CandidateOutcome::Total(total_count))
    }

    /// Totals for every bucket, in bucket order. A fetch error aborts the
    /// whole run.
    pub async fn totals_for_buckets(&self, buckets: &[Bucket]) -> Result<BucketReport, FetchError> {
        let mut report = BucketReport::default();
        let mut first_query = true;

        for bucket in buckets {
            info!("Processing bucket: {}", bucket.name);
            let mut totals = Vec::with_capacity(bucket.queries.len());
            for query in &bucket.queries {
                if !first_query {
                    sleep(self.query_cooldown).await;
                }
                first_query = false;
                totals.push(self.total_for_query(query).await?);
            }
            report.entries.push((bucket.name.clone(), sum_bucket(&totals)));
        }

        Ok(report)
    }
}

/// The bucket table for surveying Reagent API usage.
pub fn reagent_buckets() -> Result<Vec<Bucket>, ConfigError> {
    let core_fn = |name: &str| -> Vec<String> {
        ["r", "reagent", "ra", "reagent.core"]
            .iter()
            .map(|ns| format!("({ns}/{name} "))
            .collect()
    };
    let render = [
        "rdom", "rd", "dom", "d", "reagent-dom", "reagent", "r", "rdomc", "rdc", "r-dom", "r.dom",
        "rdom-client", "dom-server", "rs", "rclient", "server", "reagent.dom",
    ]
    .iter()
    .map(|ns| format!("({ns}/render "))
    .collect::<Vec<_>>();

    let table: Vec<(&str, Vec<String>)> = vec![
        ("import reagent.core", vec!["[reagent.core".to_string()]),
        ("import reagent.dom", vec!["[reagent.dom".to_string()]),
        ("render", render),
        ("atom", core_fn("atom")),
        ("cursor", core_fn("cursor")),
        ("track", core_fn("track")),
        ("track!", core_fn("track!")),
        ("reaction", core_fn("reaction")),
        ("wrap", core_fn("wrap")),
        ("with-let", core_fn("with-let")),
        ("unsafe-html", core_fn("unsafe-html")),
        (
            ":dangerouslySetInnerHTML",
            vec![":dangerouslySetInnerHTML".to_string()],
        ),
    ];

    table
        .into_iter()
        .map(|(name, queries)| Bucket::new(name, queries))
        .collect()
}
