use thiserror::Error;

/// Problems detected before any request is sent.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GitHub token is required (pass --token or set GITHUB_TOKEN)")]
    MissingToken,

    #[error("search query must not be empty")]
    EmptyQuery,

    #[error("invalid bucket '{0}': expected NAME=QUERY[|QUERY...]")]
    InvalidBucket(String),
}

/// A request that could not be completed. Aborts the operation in progress.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error: {status} for {url}: {body}")]
    Status { status: u16, url: String, body: String },

    #[error("could not decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The endpoint refused a query (403 or 422). Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("query {query:?} rejected with status {status}: {reason}")]
pub struct RejectedQuery {
    pub query: String,
    pub status: u16,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("invalid alias pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
