//! Poll-until-terminal utility.
//!
//! Every flow that waits on an external job (actor runs, bulk email
//! verification) goes through this one loop rather than rolling its own.
//! The loop fetches a status snapshot at a fixed interval until the
//! snapshot is terminal or the attempt budget runs out, and returns the
//! last snapshot either way; reaching the budget is not an error.

use std::future::Future;
use std::time::Duration;

use anyhow::{anyhow, Result};
use apify_client::Run;

use crate::kernel::BaseScraperPlatform;

/// Delay between status fetches.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Wall-clock cap on one polling session.
pub const POLL_WALL_CLOCK_CAP: Duration = Duration::from_secs(30 * 60);

/// Result of a polling session. Both variants carry the last observed
/// snapshot so the caller can record the run for billing regardless of how
/// the session ended.
#[derive(Debug, Clone)]
pub enum PollOutcome<S> {
    /// The job reached a terminal state.
    Terminal(S),
    /// The attempt budget ran out; the snapshot is the last non-terminal one.
    TimedOut(S),
}

impl<S> PollOutcome<S> {
    pub fn snapshot(&self) -> &S {
        match self {
            PollOutcome::Terminal(s) | PollOutcome::TimedOut(s) => s,
        }
    }

    pub fn into_snapshot(self) -> S {
        match self {
            PollOutcome::Terminal(s) | PollOutcome::TimedOut(s) => s,
        }
    }
}

/// Number of status fetches a polling session may make:
/// `ceil(wall_clock_cap / interval)`, at least one.
pub fn attempt_budget(wall_clock_cap: Duration, interval: Duration) -> u32 {
    let interval_ms = interval.as_millis().max(1);
    let cap_ms = wall_clock_cap.as_millis();
    (cap_ms.div_ceil(interval_ms)).max(1) as u32
}

/// Fetch a status snapshot every `interval` until `is_terminal` or the
/// attempt budget is exhausted.
///
/// A failed fetch is treated as transient: it consumes an attempt and the
/// loop keeps going. Only a session in which no snapshot was ever observed
/// returns an error.
pub async fn poll_until_terminal<S, F, Fut, P>(
    mut fetch: F,
    is_terminal: P,
    interval: Duration,
    wall_clock_cap: Duration,
) -> Result<PollOutcome<S>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<S>>,
    P: Fn(&S) -> bool,
{
    let budget = attempt_budget(wall_clock_cap, interval);
    let mut last: Option<S> = None;

    for attempt in 1..=budget {
        match fetch().await {
            Ok(snapshot) => {
                if is_terminal(&snapshot) {
                    return Ok(PollOutcome::Terminal(snapshot));
                }
                last = Some(snapshot);
            }
            Err(e) => {
                tracing::warn!(attempt, error = %e, "Status fetch failed, continuing to poll");
            }
        }

        if attempt < budget {
            tokio::time::sleep(interval).await;
        }
    }

    match last {
        Some(snapshot) => Ok(PollOutcome::TimedOut(snapshot)),
        None => Err(anyhow!("no status snapshot observed within the polling budget")),
    }
}

/// Poll an actor run with the standard interval and cap.
pub async fn poll_run(
    platform: &dyn BaseScraperPlatform,
    run_id: &str,
) -> Result<PollOutcome<Run>> {
    poll_until_terminal(
        || platform.get_run(run_id),
        |run: &Run| run.status.is_terminal(),
        POLL_INTERVAL,
        POLL_WALL_CLOCK_CAP,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_is_ceiling_of_cap_over_interval() {
        assert_eq!(
            attempt_budget(POLL_WALL_CLOCK_CAP, POLL_INTERVAL),
            360,
        );
        assert_eq!(
            attempt_budget(Duration::from_secs(11), Duration::from_secs(5)),
            3,
        );
        assert_eq!(
            attempt_budget(Duration::from_secs(10), Duration::from_secs(5)),
            2,
        );
    }

    #[test]
    fn budget_is_at_least_one() {
        assert_eq!(attempt_budget(Duration::ZERO, Duration::from_secs(5)), 1);
    }
}
