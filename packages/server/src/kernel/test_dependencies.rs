//! In-memory implementations of the kernel service traits.
//!
//! These back the flow tests in `tests/`: every external service and the
//! run ledger can be substituted so the scraping, verification and backfill
//! flows run without a database or network.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use apify_client::{Run, RunCost, RunStatus};

use crate::common::UserId;
use crate::domains::leads::models::NewCompanyReview;
use crate::domains::scrapers::models::NewScraperRun;
use crate::kernel::{
    BaseEmailVerifier, BaseScraperPlatform, BulkJobState, BulkJobStatus, EmailVerdict, ReviewStore,
    RunLedger,
};

/// Assemble a [`ServerDeps`] over mock services. The database pool is lazy
/// and never connected; flows under test must stay on the trait seams.
pub fn make_server_deps(
    platform: Arc<MockScraperPlatform>,
    verifier: Arc<MockEmailVerifier>,
    ledger: Arc<MemoryRunLedger>,
) -> crate::kernel::ServerDeps {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgres://localhost/leadgrid_test")
        .expect("lazy pool construction cannot fail");
    let jwt_service = Arc::new(crate::domains::auth::JwtService::new(
        "test-secret",
        "leadgrid-test".to_string(),
    ));

    crate::kernel::ServerDeps::new(pool, platform, verifier, jwt_service).with_ledger(ledger)
}

/// Build a run snapshot with the given id and status.
pub fn make_run(id: &str, status: RunStatus) -> Run {
    Run {
        id: id.to_string(),
        act_id: None,
        status,
        started_at: Some(Utc::now()),
        finished_at: status.is_terminal().then(Utc::now),
        default_dataset_id: Some(format!("dataset-{id}")),
    }
}

// =============================================================================
// MockScraperPlatform
// =============================================================================

/// Scraping platform mock with scripted responses.
///
/// `get_run` pops queued snapshots and then repeats the steady snapshot
/// forever, so a test can script "RUNNING, RUNNING, SUCCEEDED" or
/// "RUNNING forever". Cost lookups can be configured to hang, which is how
/// the cost-oracle timeout is exercised under a paused clock.
#[derive(Default)]
pub struct MockScraperPlatform {
    start_responses: Mutex<VecDeque<Run>>,
    run_statuses: Mutex<VecDeque<Run>>,
    steady_status: Mutex<Option<Run>>,
    details: Mutex<HashMap<String, Run>>,
    costs: Mutex<HashMap<String, RunCost>>,
    datasets: Mutex<HashMap<String, Vec<serde_json::Value>>>,
    history: Mutex<Vec<Run>>,
    hang_cost_lookups: bool,
    status_calls: AtomicUsize,
}

impl MockScraperPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next `start_run` call.
    pub fn with_started_run(self, run: Run) -> Self {
        self.start_responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(run);
        self
    }

    /// Queue one `get_run` snapshot.
    pub fn with_status(self, run: Run) -> Self {
        self.run_statuses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(run);
        self
    }

    /// Snapshot returned by every `get_run` call once the queue is drained.
    pub fn with_steady_status(self, run: Run) -> Self {
        *self.steady_status.lock().unwrap_or_else(|e| e.into_inner()) = Some(run);
        self
    }

    /// Fixed `get_run` response for one specific run id. Takes precedence
    /// over the queue; used by backfill tests where many runs are fetched.
    pub fn with_run_detail(self, run: Run) -> Self {
        self.details
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(run.id.clone(), run);
        self
    }

    /// Configure the billed usage returned for a run id.
    pub fn with_cost(self, run_id: &str, cost: RunCost) -> Self {
        self.costs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(run_id.to_string(), cost);
        self
    }

    /// Make every cost lookup block forever.
    pub fn with_hanging_cost_lookups(mut self) -> Self {
        self.hang_cost_lookups = true;
        self
    }

    /// Configure the items of a dataset.
    pub fn with_dataset(self, dataset_id: &str, items: Vec<serde_json::Value>) -> Self {
        self.datasets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(dataset_id.to_string(), items);
        self
    }

    /// Add a run to the account history used by `list_runs_since`.
    pub fn with_history_run(self, run: Run) -> Self {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(run);
        self
    }

    /// Number of `get_run` calls made so far.
    pub fn status_call_count(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BaseScraperPlatform for MockScraperPlatform {
    async fn start_run(&self, actor_id: &str, _input: &serde_json::Value) -> Result<Run> {
        self.start_responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .ok_or_else(|| anyhow!("no start_run response configured for actor {actor_id}"))
    }

    async fn get_run(&self, run_id: &str) -> Result<Run> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(run) = self
            .details
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(run_id)
        {
            return Ok(run.clone());
        }
        if let Some(run) = self
            .run_statuses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
        {
            return Ok(run);
        }
        self.steady_status
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or_else(|| anyhow!("no status configured for run {run_id}"))
    }

    async fn get_run_cost(&self, run_id: &str) -> Result<RunCost> {
        if self.hang_cost_lookups {
            std::future::pending::<()>().await;
        }
        self.costs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(run_id)
            .cloned()
            .ok_or_else(|| anyhow!("no cost configured for run {run_id}"))
    }

    async fn list_runs_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Run>> {
        Ok(self
            .history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|run| run.started_at.map(|t| t >= cutoff).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn get_dataset_items(&self, dataset_id: &str) -> Result<Vec<serde_json::Value>> {
        Ok(self
            .datasets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(dataset_id)
            .cloned()
            .unwrap_or_default())
    }
}

// =============================================================================
// MockEmailVerifier
// =============================================================================

/// Email verification mock with scripted verdicts and bulk-job states.
#[derive(Default)]
pub struct MockEmailVerifier {
    verdicts: Mutex<HashMap<String, EmailVerdict>>,
    bulk_states: Mutex<VecDeque<BulkJobState>>,
    uploaded: Mutex<Vec<String>>,
}

impl MockEmailVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verdict(self, email: &str, verdict: EmailVerdict) -> Self {
        self.verdicts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(email.to_string(), verdict);
        self
    }

    /// Queue one bulk-status snapshot; the last queued state repeats.
    pub fn with_bulk_state(self, state: BulkJobState) -> Self {
        self.bulk_states
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(state);
        self
    }

    /// Addresses uploaded through `start_bulk`.
    pub fn uploaded_emails(&self) -> Vec<String> {
        self.uploaded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl BaseEmailVerifier for MockEmailVerifier {
    async fn verify_one(&self, email: &str) -> Result<EmailVerdict> {
        Ok(self
            .verdicts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(email)
            .copied()
            .unwrap_or(EmailVerdict::Unknown))
    }

    async fn start_bulk(&self, emails: &[String]) -> Result<String> {
        self.uploaded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(emails.iter().cloned());
        Ok("42".to_string())
    }

    async fn bulk_status(&self, file_id: &str) -> Result<BulkJobStatus> {
        let mut states = self.bulk_states.lock().unwrap_or_else(|e| e.into_inner());
        let state = if states.len() > 1 {
            states.pop_front().unwrap_or(BulkJobState::Finished)
        } else {
            states.front().copied().unwrap_or(BulkJobState::Finished)
        };
        Ok(BulkJobStatus {
            file_id: file_id.to_string(),
            state,
        })
    }

    async fn bulk_results(&self, _file_id: &str) -> Result<Vec<(String, EmailVerdict)>> {
        let verdicts = self.verdicts.lock().unwrap_or_else(|e| e.into_inner());
        Ok(self
            .uploaded
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|email| {
                (
                    email.clone(),
                    verdicts.get(email).copied().unwrap_or(EmailVerdict::Unknown),
                )
            })
            .collect())
    }
}

// =============================================================================
// MemoryRunLedger
// =============================================================================

/// In-memory run ledger with the same conflict-ignore semantics as the
/// `scraper_runs` table.
#[derive(Default)]
pub struct MemoryRunLedger {
    rows: Mutex<Vec<NewScraperRun>>,
}

impl MemoryRunLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a ledger row (for duplicate-handling tests).
    pub fn with_row(self, row: NewScraperRun) -> Self {
        self.rows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(row);
        self
    }

    /// All rows currently in the ledger.
    pub fn rows(&self) -> Vec<NewScraperRun> {
        self.rows.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl RunLedger for MemoryRunLedger {
    async fn insert_run(&self, row: &NewScraperRun) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        if rows.iter().any(|r| r.run_id == row.run_id) {
            return Ok(false);
        }
        rows.push(row.clone());
        Ok(true)
    }

    async fn delete_imported(&self, user_id: UserId) -> Result<u64> {
        let mut rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        let before = rows.len();
        rows.retain(|r| !(r.user_id == user_id && r.source.is_import()));
        Ok((before - rows.len()) as u64)
    }
}

// =============================================================================
// MemoryReviewStore
// =============================================================================

/// In-memory review store keyed by `(company_id, review_id)`.
#[derive(Default)]
pub struct MemoryReviewStore {
    seen: Mutex<HashSet<(Uuid, String)>>,
}

impl MemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ReviewStore for MemoryReviewStore {
    async fn insert_review(&self, review: &NewCompanyReview) -> Result<bool> {
        Ok(self
            .seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((review.company_id.into_uuid(), review.review_id.clone())))
    }
}
