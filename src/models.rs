//! Request, response and result shapes shared by the search components.

use std::fmt;

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{ConfigError, FetchError};

pub const RATE_LIMIT_LIMIT: &str = "x-ratelimit-limit";
pub const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
pub const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

/// A search string sent verbatim as the `q` parameter. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Result<Self, ConfigError> {
        let query = query.into();
        if query.is_empty() {
            return Err(ConfigError::EmptyQuery);
        }
        Ok(Self(query))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The query wrapped in double quotes, for exact-phrase matching.
    pub fn quoted(&self) -> Self {
        Self(format!("\"{}\"", self.0))
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SearchQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One call against the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: SearchQuery,
    pub per_page: u32,
    pub page: Option<u32>,
}

impl SearchRequest {
    pub fn page(query: &SearchQuery, per_page: u32, page: u32) -> Self {
        Self {
            query: query.clone(),
            per_page,
            page: Some(page),
        }
    }

    /// Single-result request used when only `total_count` matters.
    pub fn total_only(query: &SearchQuery) -> Self {
        Self {
            query: query.clone(),
            per_page: 1,
            page: None,
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", self.query.to_string()),
            ("per_page", self.per_page.to_string()),
        ];
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        params
    }
}

/// Quota state echoed by the endpoint on every response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub limit: Option<i64>,
    pub remaining: Option<i64>,
    pub reset_epoch_seconds: Option<i64>,
}

impl RateLimitInfo {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            limit: header_number(headers, RATE_LIMIT_LIMIT),
            remaining: header_number(headers, RATE_LIMIT_REMAINING),
            reset_epoch_seconds: header_number(headers, RATE_LIMIT_RESET),
        }
    }
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<i64> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

/// Raw answer from a [`SearchTransport`](crate::SearchTransport).
///
/// Error statuses are carried here rather than raised so that each
/// component can decide which ones it tolerates.
#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub status: u16,
    pub url: String,
    pub rate_limit: RateLimitInfo,
    pub body: String,
}

impl SearchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            url: String::new(),
            rate_limit: RateLimitInfo::default(),
            body: body.into(),
        }
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimitInfo) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 403 and 422 mean the endpoint refused the query itself.
    pub fn is_rejection(&self) -> bool {
        matches!(self.status, 403 | 422)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Converts a non-2xx response into the matching error.
    pub fn error_for_status(self) -> Result<Self, FetchError> {
        if self.is_success() {
            return Ok(self);
        }
        Err(FetchError::Status {
            status: self.status,
            url: self.url,
            body: self.body,
        })
    }

    /// The `message` field of an error body, or the raw body text.
    pub fn reason(&self) -> String {
        #[derive(Deserialize)]
        struct ErrorBody {
            message: Option<String>,
        }

        match serde_json::from_str::<ErrorBody>(&self.body) {
            Ok(ErrorBody { message: Some(message) }) => message,
            Ok(_) => String::new(),
            Err(_) => self.body.clone(),
        }
    }
}

/// One page of `/search/code` results.
#[derive(Debug, Default, Deserialize)]
pub struct ResultPage {
    #[serde(default)]
    pub items: Vec<ResultItem>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TotalCount {
    pub total_count: Option<u64>,
}

/// A code-search hit; only its text matches are of interest here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResultItem {
    #[serde(default)]
    pub text_matches: Vec<TextMatch>,
}

impl ResultItem {
    pub fn from_fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            text_matches: fragments
                .into_iter()
                .map(|fragment| TextMatch {
                    fragment: fragment.into(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TextMatch {
    #[serde(default)]
    pub fragment: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn empty_query_is_rejected() {
        assert!(matches!(SearchQuery::new(""), Err(ConfigError::EmptyQuery)));
        assert_eq!(SearchQuery::new("render").unwrap().as_str(), "render");
    }

    #[test]
    fn page_request_params() {
        let query = SearchQuery::new("[reagent.core").unwrap();
        let params = SearchRequest::page(&query, 100, 3).params();
        assert_eq!(
            params,
            vec![
                ("q", "[reagent.core".to_string()),
                ("per_page", "100".to_string()),
                ("page", "3".to_string()),
            ]
        );

        let params = SearchRequest::total_only(&query).params();
        assert_eq!(params.len(), 2);
        assert_eq!(params[1], ("per_page", "1".to_string()));
    }

    #[test]
    fn rate_limit_headers_are_parsed_leniently() {
        let mut headers = HeaderMap::new();
        headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from_static("30"));
        headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from_static("not-a-number"));
        headers.insert(RATE_LIMIT_RESET, HeaderValue::from_static("1700000000"));

        let info = RateLimitInfo::from_headers(&headers);
        assert_eq!(info.limit, Some(30));
        assert_eq!(info.remaining, None);
        assert_eq!(info.reset_epoch_seconds, Some(1_700_000_000));
    }

    #[test]
    fn missing_items_decode_as_empty_page() {
        let response = SearchResponse::new(200, r#"{"total_count": 0}"#);
        let page: ResultPage = response.json().unwrap();
        assert!(page.items.is_empty());
    }

    #[test]
    fn items_without_text_matches_decode() {
        let body = r#"{"items": [
            {"name": "core.cljs", "text_matches": [{"fragment": "(ns app (:require [reagent.core :as r]))"}]},
            {"name": "other.cljs"}
        ]}"#;
        let page: ResultPage = SearchResponse::new(200, body).json().unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].text_matches.len(), 1);
        assert!(page.items[1].text_matches.is_empty());
    }

    #[test]
    fn rejection_reason_prefers_message() {
        let response = SearchResponse::new(422, r#"{"message": "Validation Failed"}"#);
        assert!(response.is_rejection());
        assert_eq!(response.reason(), "Validation Failed");

        let response = SearchResponse::new(403, "plain text");
        assert_eq!(response.reason(), "plain text");
    }

    #[test]
    fn error_for_status_keeps_details() {
        let mut response = SearchResponse::new(500, "boom");
        response.url = "https://api.github.com/search/code?q=x".to_string();
        let err = response.error_for_status().unwrap_err();
        match err {
            FetchError::Status { status, url, body } => {
                assert_eq!(status, 500);
                assert!(url.ends_with("q=x"));
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
