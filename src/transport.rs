use std::future::Future;

use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::debug;

use crate::config::Config;
use crate::error::FetchError;
use crate::models::{RateLimitInfo, SearchRequest, SearchResponse};

const TEXT_MATCH_MEDIA_TYPE: &str = "application/vnd.github.text-match+json";
const API_VERSION: &str = "2022-11-28";

/// The HTTP call the search components are built on.
///
/// Implementations return every status they receive; only transport
/// failures are errors here.
pub trait SearchTransport {
    fn get(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<SearchResponse, FetchError>> + Send;
}

impl<T: SearchTransport> SearchTransport for &T {
    fn get(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<SearchResponse, FetchError>> + Send {
        (**self).get(request)
    }
}

/// `reqwest` transport against the GitHub code-search endpoint.
#[derive(Debug, Clone)]
pub struct GitHubTransport {
    client: Client,
    api_url: String,
    token: Option<String>,
}

impl GitHubTransport {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            token: config.token.clone(),
        })
    }
}

impl SearchTransport for GitHubTransport {
    async fn get(&self, request: &SearchRequest) -> Result<SearchResponse, FetchError> {
        let mut builder = self
            .client
            .get(&self.api_url)
            .header(ACCEPT, TEXT_MATCH_MEDIA_TYPE)
            .header("X-GitHub-Api-Version", API_VERSION)
            .query(&request.params());
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let rate_limit = RateLimitInfo::from_headers(response.headers());
        debug!(
            status,
            url = %url,
            limit = ?rate_limit.limit,
            remaining = ?rate_limit.remaining,
            reset = ?rate_limit.reset_epoch_seconds,
            "Received search response"
        );

        let body = response.text().await?;
        Ok(SearchResponse {
            status,
            url,
            rate_limit,
            body,
        })
    }
}
