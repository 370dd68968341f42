//! Cost oracle: best-effort lookup of a run's billed usage.
//!
//! The lookup races an 8-second timeout so a slow platform API cannot drag
//! out the request that triggered it. Timeout or failure yields `None`; the
//! ledger row is then recorded without a cost rather than not at all.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::kernel::BaseScraperPlatform;

/// Upper bound on how long a cost lookup may take.
pub const COST_LOOKUP_TIMEOUT: Duration = Duration::from_secs(8);

/// What the oracle learned about a run.
#[derive(Debug, Clone, Default)]
pub struct RunCostSummary {
    pub cost_usd: Option<Decimal>,
    pub usage_details: Option<serde_json::Value>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Fetch a run's billed usage, bounded by [`COST_LOOKUP_TIMEOUT`].
pub async fn lookup_run_cost(
    platform: &dyn BaseScraperPlatform,
    run_id: &str,
) -> Option<RunCostSummary> {
    let lookup = platform.get_run_cost(run_id);

    match tokio::time::timeout(COST_LOOKUP_TIMEOUT, lookup).await {
        Ok(Ok(cost)) => Some(RunCostSummary {
            cost_usd: cost.usage_total_usd.and_then(Decimal::from_f64),
            usage_details: cost.usage_usd,
            started_at: cost.started_at,
            finished_at: cost.finished_at,
        }),
        Ok(Err(e)) => {
            tracing::warn!(run_id, error = %e, "Run cost lookup failed");
            None
        }
        Err(_) => {
            tracing::warn!(run_id, "Run cost lookup timed out");
            None
        }
    }
}
