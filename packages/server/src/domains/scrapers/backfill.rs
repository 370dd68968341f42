//! Backfill reconciler: import historical platform runs into the ledger.
//!
//! Live recording is best-effort, so the ledger can miss runs (a crashed
//! request, a run started outside this app). The reconciler walks the
//! platform's run history and inserts whatever is missing, tagged
//! `source = 'import'`. Re-running is safe: duplicates are counted as
//! skipped, and `reset_imported_runs` clears a previous import wholesale.

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use serde::Serialize;

use apify_client::RunStatus;

use crate::common::{ScraperId, UserId};
use crate::domains::scrapers::cost::lookup_run_cost;
use crate::domains::scrapers::models::{NewScraperRun, RunSource, Scraper};
use crate::kernel::{BaseScraperPlatform, RunLedger};

/// Known aliases between short and fully-qualified actor identifiers.
///
/// The platform reports some runs under an opaque actor id and others under
/// the `owner~name` form for the same actor. This is a finite set of
/// observed inconsistencies, not a derivable convention - keep it a literal
/// table.
const ACTOR_ALIASES: &[(&str, &str)] = &[("compass~crawler-google-places", "nwua9Gu5YrADL7ZDj")];

/// Aggregate counts for one backfill pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackfillSummary {
    /// Runs examined after status filtering.
    pub processed: u32,
    /// Ledger rows inserted.
    pub imported: u32,
    /// Runs already present in the ledger.
    pub skipped: u32,
    /// Runs that failed to import (detail fetch or insert error).
    pub errors: u32,
}

/// Statuses worth importing: every terminal state plus still-running jobs,
/// so in-flight spend shows up too.
fn is_backfillable(status: RunStatus) -> bool {
    status.is_terminal() || status == RunStatus::Running
}

/// Map every configured scraper's actor identifier (and its known aliases)
/// to the scraper's id. Built once per backfill pass.
pub fn build_actor_lookup(scrapers: &[Scraper]) -> HashMap<String, ScraperId> {
    let mut lookup = HashMap::new();

    for scraper in scrapers {
        lookup.insert(scraper.actor_id.clone(), scraper.id);

        for (name, alias) in ACTOR_ALIASES {
            if scraper.actor_id == *name {
                lookup.insert((*alias).to_string(), scraper.id);
            } else if scraper.actor_id == *alias {
                lookup.insert((*name).to_string(), scraper.id);
            }
        }
    }

    lookup
}

/// Delete a user's previously imported rows, returning the count removed.
pub async fn reset_imported_runs(ledger: &dyn RunLedger, user_id: UserId) -> Result<u64> {
    let removed = ledger
        .delete_imported(user_id)
        .await
        .context("failed to delete imported ledger rows")?;
    tracing::info!(%user_id, removed, "Reset imported scraper runs");
    Ok(removed)
}

/// Import the trailing `days_back` days of platform runs into the ledger.
///
/// Each run is processed independently: a failure on one increments
/// `errors` and the batch continues.
pub async fn backfill_runs(
    platform: &dyn BaseScraperPlatform,
    ledger: &dyn RunLedger,
    scrapers: &[Scraper],
    user_id: UserId,
    days_back: i64,
) -> Result<BackfillSummary> {
    let cutoff = Utc::now() - Duration::days(days_back);
    let lookup = build_actor_lookup(scrapers);

    let runs = platform
        .list_runs_since(cutoff)
        .await
        .context("failed to list platform runs")?;

    let mut summary = BackfillSummary::default();

    for run in runs {
        if !is_backfillable(run.status) {
            continue;
        }
        summary.processed += 1;

        let detail = match platform.get_run(&run.id).await {
            Ok(detail) => detail,
            Err(e) => {
                tracing::warn!(run_id = %run.id, error = %e, "Backfill: run detail fetch failed");
                summary.errors += 1;
                continue;
            }
        };

        let scraper_id = detail
            .act_id
            .as_deref()
            .and_then(|actor_id| lookup.get(actor_id))
            .copied();

        let cost = lookup_run_cost(platform, &detail.id).await;

        let row = NewScraperRun::builder()
            .run_id(detail.id.clone())
            .scraper_id(scraper_id)
            .user_id(user_id)
            .source(RunSource::Import)
            .cost_usd(cost.as_ref().and_then(|c| c.cost_usd))
            .usage_details(cost.as_ref().and_then(|c| c.usage_details.clone()))
            .status(detail.status.to_string())
            .started_at(detail.started_at)
            .finished_at(detail.finished_at)
            .build();

        match ledger.insert_run(&row).await {
            Ok(true) => summary.imported += 1,
            Ok(false) => summary.skipped += 1,
            Err(e) => {
                tracing::warn!(run_id = %detail.id, error = %e, "Backfill: ledger insert failed");
                summary.errors += 1;
            }
        }
    }

    tracing::info!(
        %user_id,
        days_back,
        processed = summary.processed,
        imported = summary.imported,
        skipped = summary.skipped,
        errors = summary.errors,
        "Backfill finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn scraper(slug: &str, actor_id: &str) -> Scraper {
        Scraper {
            id: ScraperId::new(),
            slug: slug.to_string(),
            name: slug.to_string(),
            actor_id: actor_id.to_string(),
            default_input: serde_json::json!({}),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn lookup_contains_configured_actor_ids() {
        let scrapers = vec![scraper("trustpilot", "nikita-sviridenko~trustpilot-reviews-scraper")];
        let lookup = build_actor_lookup(&scrapers);
        assert_eq!(
            lookup.get("nikita-sviridenko~trustpilot-reviews-scraper"),
            Some(&scrapers[0].id)
        );
    }

    #[test]
    fn lookup_expands_alias_from_name_to_id() {
        let scrapers = vec![scraper("google-maps", "compass~crawler-google-places")];
        let lookup = build_actor_lookup(&scrapers);
        // Both spellings resolve to the same scraper.
        assert_eq!(lookup.get("compass~crawler-google-places"), Some(&scrapers[0].id));
        assert_eq!(lookup.get("nwua9Gu5YrADL7ZDj"), Some(&scrapers[0].id));
    }

    #[test]
    fn lookup_expands_alias_from_id_to_name() {
        let scrapers = vec![scraper("google-maps", "nwua9Gu5YrADL7ZDj")];
        let lookup = build_actor_lookup(&scrapers);
        assert_eq!(lookup.get("compass~crawler-google-places"), Some(&scrapers[0].id));
    }

    #[test]
    fn backfillable_statuses() {
        assert!(is_backfillable(RunStatus::Succeeded));
        assert!(is_backfillable(RunStatus::Failed));
        assert!(is_backfillable(RunStatus::Aborted));
        assert!(is_backfillable(RunStatus::TimedOut));
        assert!(is_backfillable(RunStatus::Running));
        assert!(!is_backfillable(RunStatus::Ready));
        assert!(!is_backfillable(RunStatus::Aborting));
    }
}
