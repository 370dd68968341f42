//! Poll-until-terminal boundary behavior.
//!
//! These tests run under a paused tokio clock, so the real 5-second
//! interval and 30-minute cap execute instantly while keeping their exact
//! arithmetic.

use apify_client::RunStatus;
use server_core::domains::scrapers::polling::{
    poll_run, poll_until_terminal, PollOutcome, POLL_INTERVAL, POLL_WALL_CLOCK_CAP,
};
use server_core::kernel::test_dependencies::{make_run, MockEmailVerifier, MockScraperPlatform};
use server_core::kernel::{BaseEmailVerifier, BulkJobState, BulkJobStatus};

#[tokio::test(start_paused = true)]
async fn forever_running_run_exhausts_budget_after_360_polls() {
    let platform = MockScraperPlatform::new()
        .with_steady_status(make_run("run-1", RunStatus::Running));

    let outcome = poll_run(&platform, "run-1").await.unwrap();

    // ceil(30 min / 5 s) fetches, and the last non-terminal snapshot comes back.
    assert_eq!(platform.status_call_count(), 360);
    match outcome {
        PollOutcome::TimedOut(run) => assert_eq!(run.status, RunStatus::Running),
        PollOutcome::Terminal(run) => panic!("expected timeout, got terminal {}", run.status),
    }
}

#[tokio::test(start_paused = true)]
async fn succeeding_on_third_poll_fetches_exactly_three_times() {
    let platform = MockScraperPlatform::new()
        .with_status(make_run("run-1", RunStatus::Running))
        .with_status(make_run("run-1", RunStatus::Running))
        .with_status(make_run("run-1", RunStatus::Succeeded));

    let outcome = poll_run(&platform, "run-1").await.unwrap();

    assert_eq!(platform.status_call_count(), 3);
    match outcome {
        PollOutcome::Terminal(run) => assert_eq!(run.status, RunStatus::Succeeded),
        PollOutcome::TimedOut(run) => panic!("unexpected timeout at status {}", run.status),
    }
}

#[tokio::test(start_paused = true)]
async fn non_succeeded_terminal_status_is_an_outcome_not_an_error() {
    let platform = MockScraperPlatform::new()
        .with_status(make_run("run-1", RunStatus::Running))
        .with_status(make_run("run-1", RunStatus::Aborted));

    let outcome = poll_run(&platform, "run-1").await.unwrap();

    match outcome {
        PollOutcome::Terminal(run) => assert_eq!(run.status, RunStatus::Aborted),
        PollOutcome::TimedOut(_) => panic!("expected terminal outcome"),
    }
}

#[tokio::test(start_paused = true)]
async fn transient_fetch_failures_consume_budget_without_aborting() {
    // One observable snapshot, then every further fetch errors (nothing
    // queued, no steady status). The loop must ride out the errors and
    // still return the last snapshot it saw.
    let platform = MockScraperPlatform::new().with_status(make_run("run-1", RunStatus::Running));

    let outcome = poll_run(&platform, "run-1").await.unwrap();

    assert_eq!(platform.status_call_count(), 360);
    match outcome {
        PollOutcome::TimedOut(run) => assert_eq!(run.status, RunStatus::Running),
        PollOutcome::Terminal(_) => panic!("expected timeout"),
    }
}

#[tokio::test(start_paused = true)]
async fn bulk_verification_jobs_poll_through_the_same_loop() {
    let verifier = MockEmailVerifier::new()
        .with_bulk_state(BulkJobState::Queued)
        .with_bulk_state(BulkJobState::InProgress)
        .with_bulk_state(BulkJobState::Finished);

    let outcome = poll_until_terminal(
        || verifier.bulk_status("42"),
        |status: &BulkJobStatus| status.state.is_terminal(),
        POLL_INTERVAL,
        POLL_WALL_CLOCK_CAP,
    )
    .await
    .unwrap();

    match outcome {
        PollOutcome::Terminal(status) => assert_eq!(status.state, BulkJobState::Finished),
        PollOutcome::TimedOut(_) => panic!("expected terminal outcome"),
    }
}
