//! Shared actor-run execution flow.
//!
//! Every live call site (scraping, enrichment, email finding, reviews, SEO)
//! follows the same shape: start the actor, poll to a terminal state, fetch
//! the dataset on success, and record a ledger row best-effort in every
//! case - a failed run still costs money. This module is that shape,
//! parameterized by the ledger context the caller wants on the row.

use thiserror::Error;
use typed_builder::TypedBuilder;

use apify_client::{Run, RunStatus};

use crate::common::{CollectionId, CompanyId, LeadId, ScraperId, UserId};
use crate::domains::scrapers::accounting::{record_scraper_run, CostResolution};
use crate::domains::scrapers::models::{NewScraperRun, RunSource};
use crate::domains::scrapers::polling::{poll_run, PollOutcome};
use crate::kernel::ServerDeps;

/// Ledger context for a live run: who triggered it, why, and which domain
/// entity it belongs to.
#[derive(Debug, Clone, TypedBuilder)]
pub struct RunContext {
    pub user_id: UserId,
    pub source: RunSource,
    #[builder(default)]
    pub scraper_id: Option<ScraperId>,
    #[builder(default)]
    pub collection_id: Option<CollectionId>,
    #[builder(default)]
    pub lead_id: Option<LeadId>,
    #[builder(default)]
    pub company_id: Option<CompanyId>,
}

/// A run that reached SUCCEEDED, with its dataset items.
#[derive(Debug, Clone)]
pub struct FinishedRun {
    pub run: Run,
    pub items: Vec<serde_json::Value>,
}

/// Typed failure of an actor run. Variants that happen after the run was
/// started carry the platform run id so the caller can surface it for
/// correlation with platform-side diagnostics.
#[derive(Debug, Error)]
pub enum RunFailure {
    #[error("failed to start actor run: {0}")]
    Start(anyhow::Error),

    #[error("run {run_id} ended with status {status}")]
    Unsuccessful { run_id: String, status: String },

    #[error("run {run_id} still {last_status} when the polling budget ran out")]
    TimedOut { run_id: String, last_status: String },

    #[error("run {run_id}: {cause}")]
    Platform { run_id: String, cause: anyhow::Error },
}

impl RunFailure {
    /// The platform run id, when the run got far enough to have one.
    pub fn run_id(&self) -> Option<&str> {
        match self {
            RunFailure::Start(_) => None,
            RunFailure::Unsuccessful { run_id, .. }
            | RunFailure::TimedOut { run_id, .. }
            | RunFailure::Platform { run_id, .. } => Some(run_id),
        }
    }
}

/// Start an actor, poll it to completion, fetch its dataset, and record the
/// ledger row. The ledger write happens on every path that has a run id;
/// its failure is logged and swallowed.
pub async fn execute_actor_run(
    deps: &ServerDeps,
    actor_id: &str,
    input: &serde_json::Value,
    ctx: RunContext,
) -> Result<FinishedRun, RunFailure> {
    let platform = deps.platform.as_ref();

    let run = platform
        .start_run(actor_id, input)
        .await
        .map_err(RunFailure::Start)?;
    tracing::info!(actor_id, run_id = %run.id, source = %ctx.source, "Actor run started");

    let outcome = match poll_run(platform, &run.id).await {
        Ok(outcome) => outcome,
        Err(e) => {
            // Status was never observed; record what we know from the start
            // snapshot and surface the platform error.
            record_best_effort(deps, &ctx, &run, 0).await;
            return Err(RunFailure::Platform {
                run_id: run.id,
                cause: e,
            });
        }
    };

    match outcome {
        PollOutcome::Terminal(snapshot) if snapshot.status == RunStatus::Succeeded => {
            let items = match &snapshot.default_dataset_id {
                Some(dataset_id) => match platform.get_dataset_items(dataset_id).await {
                    Ok(items) => items,
                    Err(e) => {
                        record_best_effort(deps, &ctx, &snapshot, 0).await;
                        return Err(RunFailure::Platform {
                            run_id: snapshot.id,
                            cause: e,
                        });
                    }
                },
                None => Vec::new(),
            };

            record_best_effort(deps, &ctx, &snapshot, items.len()).await;
            tracing::info!(
                run_id = %snapshot.id,
                items = items.len(),
                "Actor run succeeded"
            );
            Ok(FinishedRun {
                run: snapshot,
                items,
            })
        }
        PollOutcome::Terminal(snapshot) => {
            record_best_effort(deps, &ctx, &snapshot, 0).await;
            Err(RunFailure::Unsuccessful {
                run_id: snapshot.id.clone(),
                status: snapshot.status.to_string(),
            })
        }
        PollOutcome::TimedOut(snapshot) => {
            record_best_effort(deps, &ctx, &snapshot, 0).await;
            Err(RunFailure::TimedOut {
                run_id: snapshot.id.clone(),
                last_status: snapshot.status.to_string(),
            })
        }
    }
}

/// Record the ledger row for a live run. Cost comes from the oracle; any
/// failure is logged and ignored so the primary flow proceeds.
async fn record_best_effort(deps: &ServerDeps, ctx: &RunContext, run: &Run, item_count: usize) {
    let row = NewScraperRun::builder()
        .run_id(run.id.clone())
        .scraper_id(ctx.scraper_id)
        .user_id(ctx.user_id)
        .source(ctx.source)
        .collection_id(ctx.collection_id)
        .lead_id(ctx.lead_id)
        .company_id(ctx.company_id)
        .item_count(item_count as i32)
        .status(run.status.to_string())
        .started_at(run.started_at)
        .finished_at(run.finished_at)
        .build();

    if let Err(e) = record_scraper_run(
        deps.platform.as_ref(),
        deps.ledger.as_ref(),
        row,
        CostResolution::FetchFromPlatform,
    )
    .await
    {
        tracing::warn!(run_id = %run.id, error = %e, "Failed to record scraper run");
    }
}
