//! Bulk email verification for a collection or a company.
//!
//! The verification service runs upload-then-poll jobs, so this flow goes
//! through the same poll-until-terminal utility as the actor runs. Cost is
//! caller-supplied (a flat per-check rate) rather than looked up: the
//! verifier has no usage API.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::common::{CollectionId, CompanyId, IngestStats, UserId};
use crate::domains::leads::models::{Collection, Company, Lead};
use crate::domains::scrapers::accounting::{record_scraper_run, CostResolution};
use crate::domains::scrapers::models::{NewScraperRun, RunSource};
use crate::domains::scrapers::polling::{
    poll_until_terminal, PollOutcome, POLL_INTERVAL, POLL_WALL_CLOCK_CAP,
};
use crate::domains::scrapers::runner::RunFailure;
use crate::kernel::{BulkJobState, BulkJobStatus, ServerDeps};

use super::ActionError;

/// Flat per-address rate charged by the verification service.
fn cost_per_check() -> Decimal {
    // 0.004 USD per verified address
    Decimal::new(4, 3)
}

/// Ledger `status` label for a bulk-job state.
fn bulk_state_label(state: BulkJobState) -> &'static str {
    match state {
        BulkJobState::Queued => "READY",
        BulkJobState::InProgress => "RUNNING",
        BulkJobState::Finished => "SUCCEEDED",
        BulkJobState::Failed => "FAILED",
    }
}

/// Result of a bulk verification.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub run_id: String,
    /// Distinct addresses submitted.
    pub checked: usize,
    pub stats: IngestStats,
}

/// Verify the email addresses of every lead in a collection.
pub async fn verify_collection_emails(
    deps: &ServerDeps,
    user_id: UserId,
    collection_id: CollectionId,
) -> Result<VerificationReport, ActionError> {
    let collection = Collection::find_by_id_for_user(collection_id, user_id, &deps.db_pool)
        .await?
        .ok_or(ActionError::NotFound("collection"))?;

    let leads = Lead::find_verifiable_by_collection(collection.id, user_id, &deps.db_pool).await?;
    verify_leads(
        deps,
        user_id,
        RunSource::EnrichEmailsCollection,
        Some(collection.id),
        None,
        leads,
    )
    .await
}

/// Verify the email addresses of every lead attached to a company.
pub async fn verify_company_emails(
    deps: &ServerDeps,
    user_id: UserId,
    company_id: CompanyId,
) -> Result<VerificationReport, ActionError> {
    let company = Company::find_by_id_for_user(company_id, user_id, &deps.db_pool)
        .await?
        .ok_or(ActionError::NotFound("company"))?;

    let leads = Lead::find_verifiable_by_company(company.id, user_id, &deps.db_pool).await?;
    verify_leads(
        deps,
        user_id,
        RunSource::EnrichEmailsCompany,
        None,
        Some(company.id),
        leads,
    )
    .await
}

async fn verify_leads(
    deps: &ServerDeps,
    user_id: UserId,
    source: RunSource,
    collection_id: Option<CollectionId>,
    company_id: Option<CompanyId>,
    leads: Vec<Lead>,
) -> Result<VerificationReport, ActionError> {
    let emails: Vec<String> = leads
        .iter()
        .filter_map(|lead| lead.email.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    if emails.is_empty() {
        return Err(ActionError::Invalid(
            "no leads with an email address to verify".to_string(),
        ));
    }

    let verifier = deps.email_verifier.as_ref();
    let file_id = verifier.start_bulk(&emails).await?;
    // Verifier jobs share the ledger's run_id namespace with platform runs;
    // the prefix keeps them from ever colliding.
    let run_key = format!("elv-{file_id}");
    tracing::info!(%file_id, count = emails.len(), %source, "Bulk verification started");

    let outcome = poll_until_terminal(
        || verifier.bulk_status(&file_id),
        |status: &BulkJobStatus| status.state.is_terminal(),
        POLL_INTERVAL,
        POLL_WALL_CLOCK_CAP,
    )
    .await?;

    let record = |status: &'static str, item_count: usize, cost: CostResolution| {
        let row = NewScraperRun::builder()
            .run_id(run_key.clone())
            .user_id(user_id)
            .source(source)
            .collection_id(collection_id)
            .company_id(company_id)
            .item_count(item_count as i32)
            .status(status)
            .build();
        record_scraper_run(deps.platform.as_ref(), deps.ledger.as_ref(), row, cost)
    };

    match outcome {
        PollOutcome::Terminal(status) if status.state == BulkJobState::Finished => {
            let results = verifier.bulk_results(&file_id).await?;

            let mut stats = IngestStats::default();
            for (email, verdict) in &results {
                match Lead::update_status_for_email(user_id, email, verdict.as_str(), &deps.db_pool)
                    .await
                {
                    Ok(0) => stats.skipped += 1,
                    Ok(_) => stats.created += 1,
                    Err(e) => {
                        tracing::warn!(error = %e, "Verdict update failed");
                        stats.errors += 1;
                    }
                }
            }

            let cost = cost_per_check() * Decimal::from(emails.len());
            if let Err(e) = record("SUCCEEDED", results.len(), CostResolution::Provided(cost)).await
            {
                tracing::warn!(run_id = %run_key, error = %e, "Failed to record verification run");
            }

            Ok(VerificationReport {
                run_id: run_key,
                checked: emails.len(),
                stats,
            })
        }
        PollOutcome::Terminal(status) => {
            if let Err(e) = record("FAILED", 0, CostResolution::Skip).await {
                tracing::warn!(run_id = %run_key, error = %e, "Failed to record verification run");
            }
            Err(RunFailure::Unsuccessful {
                run_id: run_key,
                status: bulk_state_label(status.state).to_string(),
            }
            .into())
        }
        PollOutcome::TimedOut(status) => {
            let label = bulk_state_label(status.state);
            if let Err(e) = record(label, 0, CostResolution::Skip).await {
                tracing::warn!(run_id = %run_key, error = %e, "Failed to record verification run");
            }
            Err(RunFailure::TimedOut {
                run_id: run_key,
                last_status: label.to_string(),
            }
            .into())
        }
    }
}
