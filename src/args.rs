use clap::{Parser, Subcommand};

use crate::config::DEFAULT_API_URL;

/// Count library usage patterns across GitHub code search results,
/// honoring the API's rate limits.
#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about,
    long_about = "Query GitHub code search to tally namespace alias forms and estimate how often call-site idioms are used, waiting out rate limits between requests."
)]
pub struct Args {
    /// GitHub API token for authentication. Falls back to GITHUB_TOKEN.
    #[clap(short, long, global = true)]
    pub token: Option<String>,

    /// Code search endpoint.
    #[clap(long, global = true, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Request timeout in seconds.
    #[clap(long, global = true, value_name = "SECS", default_value = "30")]
    pub timeout: u64,

    /// Enable debug logging.
    #[clap(short, long, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Tally bracketed alias forms of a namespace in text-match fragments.
    Aliases {
        /// Namespace prefix that opens an alias, e.g. "[reagent.core".
        #[clap(short, long, default_value = "[reagent.core")]
        prefix: String,

        /// Search query; defaults to the prefix.
        #[clap(short, long)]
        query: Option<String>,

        /// Maximum number of pages to retrieve.
        /// Each page contains up to 100 results.
        #[clap(short = 'm', long, value_name = "NUM", default_value = "1")]
        max_pages: u32,
    },

    /// Estimate usage per bucket of equivalent queries from total counts.
    Usage {
        /// Bucket as NAME=QUERY[|QUERY...]; repeatable. Defaults to the
        /// built-in Reagent buckets.
        #[clap(short, long = "bucket", value_name = "BUCKET")]
        buckets: Vec<String>,

        /// Report heading.
        #[clap(long, default_value = crate::report::DEFAULT_USAGE_TITLE)]
        title: String,
    },
}
