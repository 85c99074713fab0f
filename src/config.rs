use std::env;
use std::time::Duration;

use crate::error::ConfigError;
use crate::Args;

pub const DEFAULT_API_URL: &str = "https://api.github.com/search/code";
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

const DEFAULT_USER_AGENT: &str = "github-usage-census";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_COOLDOWN: Duration = Duration::from_secs(2);
const DEFAULT_PER_PAGE: u32 = 100;

/// Settings handed to the transport and the search components.
///
/// Built once by the binary; nothing below it reads the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: Option<String>,
    pub api_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Pause between result pages when the quota is not yet exhausted.
    pub page_cooldown: Duration,
    /// Pause between consecutive queries of a bucket run.
    pub query_cooldown: Duration,
    pub per_page: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: None,
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            page_cooldown: DEFAULT_COOLDOWN,
            query_cooldown: DEFAULT_COOLDOWN,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Config {
    /// Resolve settings from parsed arguments, falling back to `GITHUB_TOKEN`.
    pub fn from_args(args: &Args) -> Self {
        let token = non_blank(args.token.clone())
            .or_else(|| non_blank(env::var(TOKEN_ENV_VAR).ok()));

        Self {
            token,
            api_url: args.api_url.clone(),
            timeout: Duration::from_secs(args.timeout),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = non_blank(Some(token.into()));
        self
    }

    pub fn require_token(&self) -> Result<&str, ConfigError> {
        self.token.as_deref().ok_or(ConfigError::MissingToken)
    }
}

fn non_blank(token: Option<String>) -> Option<String> {
    token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn defaults_match_search_api() {
        let config = Config::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.per_page, 100);
        assert_eq!(config.page_cooldown, Duration::from_secs(2));
        assert_eq!(config.query_cooldown, Duration::from_secs(2));
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let config = Config::default().with_token("   ");
        assert!(config.token.is_none());
        assert!(matches!(config.require_token(), Err(ConfigError::MissingToken)));

        let config = Config::default().with_token("ghp_abc");
        assert_eq!(config.require_token().unwrap(), "ghp_abc");
    }

    #[test]
    fn flag_token_wins() {
        let args = Args::parse_from([
            "github-usage-census",
            "--token",
            "from-flag",
            "--timeout",
            "5",
            "usage",
        ]);
        let config = Config::from_args(&args);
        assert_eq!(config.token.as_deref(), Some("from-flag"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
