//! Shared runner flow: start, poll, fetch, and best-effort ledger writes.
//!
//! The ledger row must land on every path that has a run id - success,
//! failed run, and exhausted polling budget alike - because a failed job
//! still costs money.

use std::sync::Arc;

use apify_client::RunStatus;
use serde_json::json;

use server_core::common::UserId;
use server_core::domains::scrapers::models::RunSource;
use server_core::domains::scrapers::{execute_actor_run, RunContext, RunFailure};
use server_core::kernel::test_dependencies::{
    make_run, make_server_deps, MemoryRunLedger, MockEmailVerifier, MockScraperPlatform,
};

fn ctx(user_id: UserId) -> RunContext {
    RunContext::builder()
        .user_id(user_id)
        .source(RunSource::Scraping)
        .build()
}

#[tokio::test(start_paused = true)]
async fn successful_run_returns_items_and_records_ledger_row() {
    let run = make_run("run-1", RunStatus::Running);
    let dataset_id = run.default_dataset_id.clone().unwrap();
    let platform = Arc::new(
        MockScraperPlatform::new()
            .with_started_run(run)
            .with_status(make_run("run-1", RunStatus::Running))
            .with_status(make_run("run-1", RunStatus::Succeeded))
            .with_dataset(&dataset_id, vec![json!({"name": "Acme"}), json!({"name": "Beta"})]),
    );
    let ledger = Arc::new(MemoryRunLedger::new());
    let deps = make_server_deps(
        platform,
        Arc::new(MockEmailVerifier::new()),
        ledger.clone(),
    );
    let user_id = UserId::new();

    let finished = execute_actor_run(&deps, "acme~actor", &json!({}), ctx(user_id))
        .await
        .unwrap();

    assert_eq!(finished.items.len(), 2);
    let rows = ledger.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].run_id, "run-1");
    assert_eq!(rows[0].status, "SUCCEEDED");
    assert_eq!(rows[0].item_count, 2);
    assert_eq!(rows[0].user_id, user_id);
}

#[tokio::test(start_paused = true)]
async fn failed_run_is_a_typed_error_and_still_recorded() {
    let platform = Arc::new(
        MockScraperPlatform::new()
            .with_started_run(make_run("run-1", RunStatus::Running))
            .with_status(make_run("run-1", RunStatus::Failed)),
    );
    let ledger = Arc::new(MemoryRunLedger::new());
    let deps = make_server_deps(
        platform,
        Arc::new(MockEmailVerifier::new()),
        ledger.clone(),
    );

    let err = execute_actor_run(&deps, "acme~actor", &json!({}), ctx(UserId::new()))
        .await
        .unwrap_err();

    match err {
        RunFailure::Unsuccessful { run_id, status } => {
            assert_eq!(run_id, "run-1");
            assert_eq!(status, "FAILED");
        }
        other => panic!("expected Unsuccessful, got {other}"),
    }

    let rows = ledger.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, "FAILED");
    assert_eq!(rows[0].item_count, 0);
}

#[tokio::test(start_paused = true)]
async fn exhausted_poll_budget_is_recorded_as_still_running() {
    let platform = Arc::new(
        MockScraperPlatform::new()
            .with_started_run(make_run("run-1", RunStatus::Ready))
            .with_steady_status(make_run("run-1", RunStatus::Running)),
    );
    let ledger = Arc::new(MemoryRunLedger::new());
    let deps = make_server_deps(
        platform,
        Arc::new(MockEmailVerifier::new()),
        ledger.clone(),
    );

    let err = execute_actor_run(&deps, "acme~actor", &json!({}), ctx(UserId::new()))
        .await
        .unwrap_err();

    match err {
        RunFailure::TimedOut { run_id, last_status } => {
            assert_eq!(run_id, "run-1");
            assert_eq!(last_status, "RUNNING");
        }
        other => panic!("expected TimedOut, got {other}"),
    }

    let rows = ledger.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, "RUNNING");
}
