use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use dotenv::dotenv;
use github_usage_census::{
    reagent_buckets, render_alias_report, render_bucket_report, AliasCounter, Args, Bucket,
    BucketedTotalCounter, Command, Config, Error, GitHubTransport, PaginatedSearchFetcher,
    ProgressObserver, SearchQuery,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", failure_line(&e));
            ExitCode::FAILURE
        }
    }
}

/// The one line printed for a fatal error. Nothing is logged for it.
fn failure_line(e: &Error) -> String {
    format!("Error: {e}")
}

/// Logs go to stderr so stdout carries only the report. `RUST_LOG` wins
/// over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Spinner only when stderr is a terminal.
fn progress_observer() -> ProgressObserver {
    if std::io::stderr().is_terminal() {
        ProgressObserver::new()
    } else {
        ProgressObserver::hidden()
    }
}

async fn run(args: Args) -> Result<(), Error> {
    let config = Config::from_args(&args);

    match args.command {
        Command::Aliases {
            prefix,
            query,
            max_pages,
        } => {
            config.require_token()?;
            let query = SearchQuery::new(query.unwrap_or_else(|| prefix.clone()))?;
            let counter = AliasCounter::new(&prefix)?;

            let transport = GitHubTransport::new(&config)?;
            let observer = progress_observer();
            let fetcher = PaginatedSearchFetcher::new(transport, &config).with_observer(&observer);

            println!("Fetching results for query: '{}'...", query);
            let items = fetcher.fetch_all(&query, max_pages).await;
            observer.finish();
            let items = items?;
            println!("Found {} items.\n", items.len());

            let tally = counter.count(&items);
            info!("{} distinct aliases, {} matches", tally.len(), tally.total());
            print!("{}", render_alias_report(&tally));
        }
        Command::Usage { buckets, title } => {
            let buckets = if buckets.is_empty() {
                reagent_buckets()?
            } else {
                buckets
                    .iter()
                    .map(|b| b.parse::<Bucket>())
                    .collect::<Result<Vec<_>, _>>()?
            };
            if config.token.is_none() {
                info!("No GitHub token configured; using the unauthenticated quota");
            }

            let transport = GitHubTransport::new(&config)?;
            let observer = progress_observer();
            let counter = BucketedTotalCounter::new(transport, &config).with_observer(&observer);

            let report = counter.totals_for_buckets(&buckets).await;
            observer.finish();
            print!("\n{}\n", render_bucket_report(&report?, &title));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use github_usage_census::ConfigError;

    #[test]
    fn fatal_error_is_a_single_line() {
        let line = failure_line(&Error::Config(ConfigError::MissingToken));
        assert!(line.starts_with("Error: "));
        assert!(line.contains("GITHUB_TOKEN"));
        assert_eq!(line.lines().count(), 1);
    }
}
