//! Run ledger writer and cost oracle behavior.

use apify_client::{RunCost, RunStatus};
use rust_decimal::Decimal;
use serde_json::json;

use server_core::common::UserId;
use server_core::domains::scrapers::models::{NewScraperRun, RunSource};
use server_core::domains::scrapers::{
    lookup_run_cost, record_scraper_run, CostResolution, RecordOutcome,
};
use server_core::kernel::test_dependencies::{MemoryRunLedger, MockScraperPlatform};

fn descriptor(run_id: &str, user_id: UserId) -> NewScraperRun {
    NewScraperRun::builder()
        .run_id(run_id)
        .user_id(user_id)
        .source(RunSource::Scraping)
        .item_count(12)
        .status(RunStatus::Succeeded.to_string())
        .build()
}

#[tokio::test]
async fn recording_the_same_run_twice_leaves_one_row() {
    let platform = MockScraperPlatform::new();
    let ledger = MemoryRunLedger::new();
    let user_id = UserId::new();

    let first = record_scraper_run(
        &platform,
        &ledger,
        descriptor("run-1", user_id),
        CostResolution::Skip,
    )
    .await
    .unwrap();
    let second = record_scraper_run(
        &platform,
        &ledger,
        descriptor("run-1", user_id),
        CostResolution::Skip,
    )
    .await
    .unwrap();

    assert_eq!(first, RecordOutcome::Recorded);
    assert_eq!(second, RecordOutcome::AlreadyRecorded);
    assert_eq!(ledger.rows().len(), 1);
}

#[tokio::test]
async fn caller_supplied_cost_is_used_without_lookup() {
    // No cost configured on the platform: a lookup would fail loudly.
    let platform = MockScraperPlatform::new();
    let ledger = MemoryRunLedger::new();

    record_scraper_run(
        &platform,
        &ledger,
        descriptor("run-1", UserId::new()),
        CostResolution::Provided(Decimal::new(75, 2)),
    )
    .await
    .unwrap();

    assert_eq!(ledger.rows()[0].cost_usd, Some(Decimal::new(75, 2)));
}

#[tokio::test]
async fn platform_cost_fills_row_fields() {
    let platform = MockScraperPlatform::new().with_cost(
        "run-1",
        RunCost {
            usage_total_usd: Some(1.25),
            usage_usd: Some(json!({"ACTOR_COMPUTE_UNITS": 1.25})),
            started_at: None,
            finished_at: None,
        },
    );
    let ledger = MemoryRunLedger::new();

    record_scraper_run(
        &platform,
        &ledger,
        descriptor("run-1", UserId::new()),
        CostResolution::FetchFromPlatform,
    )
    .await
    .unwrap();

    let row = &ledger.rows()[0];
    assert_eq!(row.cost_usd, Some(Decimal::new(125, 2)));
    assert_eq!(
        row.usage_details,
        Some(json!({"ACTOR_COMPUTE_UNITS": 1.25}))
    );
}

#[tokio::test]
async fn failed_cost_lookup_still_records_the_row() {
    // Nothing configured for this run id: the lookup errors, the row lands
    // with a null cost.
    let platform = MockScraperPlatform::new();
    let ledger = MemoryRunLedger::new();

    let outcome = record_scraper_run(
        &platform,
        &ledger,
        descriptor("run-1", UserId::new()),
        CostResolution::FetchFromPlatform,
    )
    .await
    .unwrap();

    assert_eq!(outcome, RecordOutcome::Recorded);
    assert_eq!(ledger.rows()[0].cost_usd, None);
}

#[tokio::test(start_paused = true)]
async fn hanging_cost_lookup_times_out_to_none() {
    let platform = MockScraperPlatform::new().with_hanging_cost_lookups();

    let summary = lookup_run_cost(&platform, "run-1").await;

    assert!(summary.is_none());
}

#[tokio::test(start_paused = true)]
async fn hanging_cost_lookup_does_not_block_recording() {
    let platform = MockScraperPlatform::new().with_hanging_cost_lookups();
    let ledger = MemoryRunLedger::new();

    let outcome = record_scraper_run(
        &platform,
        &ledger,
        descriptor("run-1", UserId::new()),
        CostResolution::FetchFromPlatform,
    )
    .await
    .unwrap();

    assert_eq!(outcome, RecordOutcome::Recorded);
    assert_eq!(ledger.rows()[0].cost_usd, None);
}
