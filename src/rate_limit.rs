//! Rate-limit backoff shared by the paginated fetcher and the total counter.
//!
//! GitHub reports the quota window on every response. When at most one
//! request is left we sleep until the window resets (plus one second of
//! slack); otherwise callers may ask for a fixed courtesy pause to stay clear
//! of the secondary rate limit.

use std::time::Duration;

use chrono::Utc;
use tokio::time::sleep;
use tracing::debug;

use crate::models::RateLimitInfo;
use crate::observer::SearchObserver;

/// Wait required before the next request, if the quota is nearly spent.
///
/// `None` when `remaining` is unknown or above one, or when no reset time
/// was reported.
pub fn backoff_delay(info: &RateLimitInfo, now_epoch_seconds: i64) -> Option<Duration> {
    match (info.remaining, info.reset_epoch_seconds) {
        (Some(remaining), Some(reset)) if remaining <= 1 => {
            let wait = reset.saturating_sub(now_epoch_seconds).max(0) as u64 + 1;
            Some(Duration::from_secs(wait))
        }
        _ => None,
    }
}

/// Sleep for the quota backoff if one is due, else for `cooldown`.
///
/// Returns the duration slept.
pub async fn pace<O: SearchObserver>(
    info: &RateLimitInfo,
    cooldown: Duration,
    observer: &O,
) -> Duration {
    match backoff_delay(info, Utc::now().timestamp()) {
        Some(wait) => {
            wait_for_reset(info, wait, observer).await;
            wait
        }
        None => {
            sleep(cooldown).await;
            cooldown
        }
    }
}

/// Sleep only when the quota is nearly spent.
pub async fn backoff<O: SearchObserver>(info: &RateLimitInfo, observer: &O) -> Option<Duration> {
    let wait = backoff_delay(info, Utc::now().timestamp())?;
    wait_for_reset(info, wait, observer).await;
    Some(wait)
}

async fn wait_for_reset<O: SearchObserver>(info: &RateLimitInfo, wait: Duration, observer: &O) {
    debug!(
        remaining = ?info.remaining,
        limit = ?info.limit,
        reset = ?info.reset_epoch_seconds,
        "Rate limit reached, waiting {} seconds",
        wait.as_secs()
    );
    observer.on_rate_limit(info, wait);
    sleep(wait).await;
}
