//! Apify implementation of [`BaseScraperPlatform`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use apify_client::{ApifyClient, Run, RunCost};

use super::BaseScraperPlatform;

/// Page size when walking the account's run history.
const LIST_RUNS_PAGE_SIZE: u32 = 250;

/// Apify client implementation of BaseScraperPlatform
pub struct ApifyPlatform {
    client: ApifyClient,
}

impl ApifyPlatform {
    pub fn new(api_token: String) -> Self {
        Self {
            client: ApifyClient::new(api_token),
        }
    }
}

#[async_trait]
impl BaseScraperPlatform for ApifyPlatform {
    async fn start_run(&self, actor_id: &str, input: &serde_json::Value) -> Result<Run> {
        self.client
            .start_run(actor_id, input)
            .await
            .context("Apify start run failed")
    }

    async fn get_run(&self, run_id: &str) -> Result<Run> {
        self.client
            .get_run(run_id)
            .await
            .context("Apify get run failed")
    }

    async fn get_run_cost(&self, run_id: &str) -> Result<RunCost> {
        self.client
            .get_run_cost(run_id)
            .await
            .context("Apify run cost lookup failed")
    }

    /// The platform API has no started-after filter, so this pages through
    /// the history newest-first and stops at the first run older than
    /// `cutoff`.
    async fn list_runs_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<Run>> {
        let mut runs = Vec::new();
        let mut offset = 0u32;

        loop {
            let page = self
                .client
                .list_runs(LIST_RUNS_PAGE_SIZE, offset, true)
                .await
                .context("Apify list runs failed")?;
            let count = page.count;

            for run in page.items {
                match run.started_at {
                    Some(started_at) if started_at < cutoff => return Ok(runs),
                    _ => runs.push(run),
                }
            }

            offset += count as u32;
            if count < LIST_RUNS_PAGE_SIZE as i64 || (offset as i64) >= page.total {
                return Ok(runs);
            }
        }
    }

    async fn get_dataset_items(&self, dataset_id: &str) -> Result<Vec<serde_json::Value>> {
        self.client
            .get_dataset_items(dataset_id)
            .await
            .context("Apify dataset fetch failed")
    }
}
