//! Backfill reconciler behavior against scripted platform history.

use apify_client::RunStatus;
use chrono::Utc;

use server_core::common::{ScraperId, UserId};
use server_core::domains::scrapers::models::{NewScraperRun, RunSource, Scraper};
use server_core::domains::scrapers::{backfill_runs, reset_imported_runs, BackfillSummary};
use server_core::kernel::test_dependencies::{make_run, MemoryRunLedger, MockScraperPlatform};

fn imported_row(run_id: &str, user_id: UserId) -> NewScraperRun {
    NewScraperRun::builder()
        .run_id(run_id)
        .user_id(user_id)
        .source(RunSource::Import)
        .status(RunStatus::Succeeded.to_string())
        .build()
}

fn live_row(run_id: &str, user_id: UserId) -> NewScraperRun {
    NewScraperRun::builder()
        .run_id(run_id)
        .user_id(user_id)
        .source(RunSource::Scraping)
        .status(RunStatus::Succeeded.to_string())
        .build()
}

#[tokio::test]
async fn five_runs_two_already_recorded() {
    let user_id = UserId::new();
    let mut platform = MockScraperPlatform::new();
    for i in 1..=5 {
        let run = make_run(&format!("run-{i}"), RunStatus::Succeeded);
        platform = platform.with_history_run(run.clone()).with_run_detail(run);
    }

    // Two of the five were already recorded by the live flow.
    let ledger = MemoryRunLedger::new()
        .with_row(live_row("run-2", user_id))
        .with_row(live_row("run-4", user_id));

    let summary = backfill_runs(&platform, &ledger, &[], user_id, 90)
        .await
        .unwrap();

    assert_eq!(
        summary,
        BackfillSummary {
            processed: 5,
            imported: 3,
            skipped: 2,
            errors: 0,
        }
    );
    assert_eq!(ledger.rows().len(), 5);
}

#[tokio::test]
async fn non_backfillable_statuses_are_not_processed() {
    let user_id = UserId::new();
    let ready = make_run("run-ready", RunStatus::Ready);
    let running = make_run("run-running", RunStatus::Running);
    let platform = MockScraperPlatform::new()
        .with_history_run(ready.clone())
        .with_run_detail(ready)
        .with_history_run(running.clone())
        .with_run_detail(running);
    let ledger = MemoryRunLedger::new();

    let summary = backfill_runs(&platform, &ledger, &[], user_id, 90)
        .await
        .unwrap();

    // RUNNING is imported (in-flight spend), READY is not.
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.imported, 1);
    let rows = ledger.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].run_id, "run-running");
}

#[tokio::test]
async fn detail_fetch_failure_is_isolated_per_run() {
    let user_id = UserId::new();
    let good = make_run("run-good", RunStatus::Succeeded);
    // "run-broken" appears in the history but its detail fetch errors.
    let platform = MockScraperPlatform::new()
        .with_history_run(good.clone())
        .with_run_detail(good)
        .with_history_run(make_run("run-broken", RunStatus::Succeeded));
    let ledger = MemoryRunLedger::new();

    let summary = backfill_runs(&platform, &ledger, &[], user_id, 90)
        .await
        .unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.imported, 1);
    assert_eq!(summary.errors, 1);
    assert_eq!(ledger.rows().len(), 1);
}

#[tokio::test]
async fn actor_id_resolves_to_configured_scraper() {
    let user_id = UserId::new();
    let scraper = Scraper {
        id: ScraperId::new(),
        slug: "google-maps".to_string(),
        name: "Google Maps Leads".to_string(),
        actor_id: "compass~crawler-google-places".to_string(),
        default_input: serde_json::json!({}),
        created_at: Utc::now(),
    };

    // The platform reports this run under the aliased opaque actor id.
    let mut run = make_run("run-1", RunStatus::Succeeded);
    run.act_id = Some("nwua9Gu5YrADL7ZDj".to_string());
    let platform = MockScraperPlatform::new()
        .with_history_run(run.clone())
        .with_run_detail(run);
    let ledger = MemoryRunLedger::new();

    backfill_runs(&platform, &ledger, &[scraper.clone()], user_id, 90)
        .await
        .unwrap();

    let rows = ledger.rows();
    assert_eq!(rows[0].scraper_id, Some(scraper.id));
    assert_eq!(rows[0].source, RunSource::Import);
}

#[tokio::test]
async fn unknown_actor_imports_with_null_scraper() {
    let user_id = UserId::new();
    let mut run = make_run("run-1", RunStatus::Succeeded);
    run.act_id = Some("stranger~unknown-actor".to_string());
    let platform = MockScraperPlatform::new()
        .with_history_run(run.clone())
        .with_run_detail(run);
    let ledger = MemoryRunLedger::new();

    let summary = backfill_runs(&platform, &ledger, &[], user_id, 90)
        .await
        .unwrap();

    assert_eq!(summary.imported, 1);
    assert_eq!(ledger.rows()[0].scraper_id, None);
}

#[tokio::test]
async fn reset_removes_exactly_the_users_imported_rows() {
    let user_a = UserId::new();
    let user_b = UserId::new();
    let ledger = MemoryRunLedger::new()
        .with_row(imported_row("run-1", user_a))
        .with_row(imported_row("run-2", user_a))
        .with_row(live_row("run-3", user_a))
        .with_row(imported_row("run-4", user_b));

    let removed = reset_imported_runs(&ledger, user_a).await.unwrap();

    assert_eq!(removed, 2);
    let remaining: Vec<String> = ledger.rows().iter().map(|r| r.run_id.clone()).collect();
    assert_eq!(remaining, vec!["run-3".to_string(), "run-4".to_string()]);
}

#[tokio::test]
async fn backfill_then_reset_then_backfill_reimports_everything() {
    let user_id = UserId::new();
    let run = make_run("run-1", RunStatus::Succeeded);
    let platform = MockScraperPlatform::new()
        .with_history_run(run.clone())
        .with_run_detail(run);
    let ledger = MemoryRunLedger::new();

    let first = backfill_runs(&platform, &ledger, &[], user_id, 90)
        .await
        .unwrap();
    assert_eq!(first.imported, 1);

    // Second pass without reset: everything is a duplicate.
    let second = backfill_runs(&platform, &ledger, &[], user_id, 90)
        .await
        .unwrap();
    assert_eq!(second.imported, 0);
    assert_eq!(second.skipped, 1);

    reset_imported_runs(&ledger, user_id).await.unwrap();
    let third = backfill_runs(&platform, &ledger, &[], user_id, 90)
        .await
        .unwrap();
    assert_eq!(third.imported, 1);
}
