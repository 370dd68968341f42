//! Run ledger writer.
//!
//! Exactly one insert attempt per run descriptor. A duplicate `run_id` is
//! success ("already recorded"); a real storage failure is returned as a
//! typed error so the caller can decide to log-and-ignore - which every
//! caller does, because a missing ledger row must never abort the
//! user-facing operation that triggered it.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domains::scrapers::cost::lookup_run_cost;
use crate::domains::scrapers::models::NewScraperRun;
use crate::kernel::{BaseScraperPlatform, RunLedger};

/// How the writer should obtain the run's cost.
#[derive(Debug, Clone)]
pub enum CostResolution {
    /// Use this value as-is, no platform lookup.
    Provided(Decimal),
    /// Ask the cost oracle; a failed lookup leaves the cost null.
    FetchFromPlatform,
    /// Record without a cost.
    Skip,
}

/// What happened to the insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded,
    /// A row for this `run_id` already existed.
    AlreadyRecorded,
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("ledger insert for run {run_id} failed: {cause}")]
    Ledger { run_id: String, cause: anyhow::Error },
}

/// Record one run in the ledger.
///
/// When `cost` is [`CostResolution::FetchFromPlatform`], the oracle's answer
/// also fills in usage details and timestamps the descriptor is missing.
pub async fn record_scraper_run(
    platform: &dyn BaseScraperPlatform,
    ledger: &dyn RunLedger,
    mut row: NewScraperRun,
    cost: CostResolution,
) -> Result<RecordOutcome, RecordError> {
    match cost {
        CostResolution::Provided(cost_usd) => {
            row.cost_usd = Some(cost_usd);
        }
        CostResolution::FetchFromPlatform => {
            if let Some(summary) = lookup_run_cost(platform, &row.run_id).await {
                row.cost_usd = summary.cost_usd;
                if row.usage_details.is_none() {
                    row.usage_details = summary.usage_details;
                }
                if row.started_at.is_none() {
                    row.started_at = summary.started_at;
                }
                if row.finished_at.is_none() {
                    row.finished_at = summary.finished_at;
                }
            }
        }
        CostResolution::Skip => {}
    }

    match ledger.insert_run(&row).await {
        Ok(true) => {
            tracing::debug!(
                run_id = %row.run_id,
                source = %row.source,
                cost_usd = ?row.cost_usd,
                "Recorded scraper run"
            );
            Ok(RecordOutcome::Recorded)
        }
        Ok(false) => {
            tracing::debug!(run_id = %row.run_id, "Scraper run already recorded");
            Ok(RecordOutcome::AlreadyRecorded)
        }
        Err(cause) => Err(RecordError::Ledger {
            run_id: row.run_id,
            cause,
        }),
    }
}
