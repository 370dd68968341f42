//! Service trait abstractions for external dependencies.
//!
//! Every network-facing service and the run ledger sit behind a trait so
//! domain flows can be exercised against in-memory implementations. The
//! production implementations live beside the traits in this module tree;
//! mocks live in [`test_dependencies`](super::test_dependencies).

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use apify_client::{Run, RunCost};

use crate::common::UserId;
use crate::domains::leads::models::NewCompanyReview;
use crate::domains::scrapers::models::NewScraperRun;

// =============================================================================
// Scraping platform
// =============================================================================

/// The external actor-running platform: start a job, read its status and
/// billed usage, page through the account's run history, fetch results.
#[async_trait]
pub trait BaseScraperPlatform: Send + Sync {
    /// Start an actor run; returns immediately with the run handle.
    async fn start_run(&self, actor_id: &str, input: &serde_json::Value) -> Result<Run>;

    /// Fetch the current status snapshot of a run.
    async fn get_run(&self, run_id: &str) -> Result<Run>;

    /// Fetch the billed usage of a run.
    async fn get_run_cost(&self, run_id: &str) -> Result<RunCost>;

    /// List all account runs started at or after `cutoff`, newest first.
    async fn list_runs_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Run>>;

    /// Fetch the items of a run's dataset.
    async fn get_dataset_items(&self, dataset_id: &str) -> Result<Vec<serde_json::Value>>;
}

// =============================================================================
// Email verification service
// =============================================================================

/// Verdict for a single verified email address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailVerdict {
    /// Deliverable mailbox.
    Ok,
    /// Hard failure (mailbox does not exist, syntax error, disabled).
    Invalid,
    /// Accept-all / catch-all domain; deliverability cannot be proven.
    Risky,
    /// The service could not reach a verdict.
    Unknown,
}

impl EmailVerdict {
    /// Stable string form stored on `leads.email_status`.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailVerdict::Ok => "ok",
            EmailVerdict::Invalid => "invalid",
            EmailVerdict::Risky => "risky",
            EmailVerdict::Unknown => "unknown",
        }
    }
}

/// Progress state of a bulk verification job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkJobState {
    Queued,
    InProgress,
    Finished,
    Failed,
}

impl BulkJobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BulkJobState::Finished | BulkJobState::Failed)
    }
}

/// Status snapshot of a bulk verification job.
#[derive(Debug, Clone)]
pub struct BulkJobStatus {
    pub file_id: String,
    pub state: BulkJobState,
}

/// The external email verification service. Single-address checks are
/// synchronous; bulk checks are an upload-then-poll job, mirroring the
/// scraping platform's run lifecycle.
#[async_trait]
pub trait BaseEmailVerifier: Send + Sync {
    /// Verify one address synchronously.
    async fn verify_one(&self, email: &str) -> Result<EmailVerdict>;

    /// Upload a batch of addresses; returns the service-issued file id.
    async fn start_bulk(&self, emails: &[String]) -> Result<String>;

    /// Fetch the current status of a bulk job.
    async fn bulk_status(&self, file_id: &str) -> Result<BulkJobStatus>;

    /// Download the per-address verdicts of a finished bulk job.
    async fn bulk_results(&self, file_id: &str) -> Result<Vec<(String, EmailVerdict)>>;
}

// =============================================================================
// Run ledger storage
// =============================================================================

/// Where scraper-run ledger rows live.
///
/// The accounting layer needs exactly two operations: an insert that ignores
/// duplicate `run_id`s, and the reconciler's delete-imported-rows reset.
/// Production is the Postgres pool; tests use an in-memory vector.
#[async_trait]
pub trait RunLedger: Send + Sync {
    /// Insert one ledger row. Returns `false` when a row for the same
    /// `run_id` already exists (not an error).
    async fn insert_run(&self, row: &NewScraperRun) -> Result<bool>;

    /// Delete all rows with `source = 'import'` for one user, returning the
    /// count removed.
    async fn delete_imported(&self, user_id: UserId) -> Result<u64>;
}

// =============================================================================
// Review storage
// =============================================================================

/// Storage seam for review ingestion.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Insert one review, keyed by `(company_id, review_id)`. Returns
    /// `false` when the review already exists (not an error).
    async fn insert_review(&self, review: &NewCompanyReview) -> Result<bool>;
}
