//! Pure Apify REST API client.
//!
//! A minimal client for the Apify platform API. Supports starting actor
//! runs, reading run status and billed usage, paging through the account's
//! run history, and fetching dataset results.
//!
//! # Example
//!
//! ```rust,ignore
//! use apify_client::ApifyClient;
//!
//! let client = ApifyClient::new("your-api-token".into());
//!
//! let run = client
//!     .start_run("apify~google-maps-scraper", &serde_json::json!({"query": "plumbers"}))
//!     .await?;
//! let items: Vec<serde_json::Value> = client
//!     .get_dataset_items(run.default_dataset_id.as_deref().unwrap())
//!     .await?;
//! ```

pub mod error;
pub mod types;

pub use error::{ApifyError, Result};
pub use types::{ApiResponse, Run, RunCost, RunPage, RunStatus};

use serde::de::DeserializeOwned;

const BASE_URL: &str = "https://api.apify.com/v2";

pub struct ApifyClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl ApifyClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API root (local stub servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Start an actor run. Returns immediately with run metadata; the run
    /// continues remotely regardless of what the caller does next.
    pub async fn start_run(&self, actor_id: &str, input: &serde_json::Value) -> Result<Run> {
        let url = format!("{}/acts/{}/runs", self.base_url, actor_id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;

        let api_resp: ApiResponse<Run> = Self::read_json(resp).await?;
        tracing::debug!(actor_id, run_id = %api_resp.data.id, "Started actor run");
        Ok(api_resp.data)
    }

    /// Fetch the current status snapshot of a run.
    pub async fn get_run(&self, run_id: &str) -> Result<Run> {
        let url = format!("{}/actor-runs/{}", self.base_url, run_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let api_resp: ApiResponse<Run> = Self::read_json(resp).await?;
        Ok(api_resp.data)
    }

    /// Fetch the billed usage of a run. The usage fields live on the run
    /// detail object, so this is the same endpoint as [`get_run`] read
    /// through a different lens.
    ///
    /// [`get_run`]: ApifyClient::get_run
    pub async fn get_run_cost(&self, run_id: &str) -> Result<RunCost> {
        let url = format!("{}/actor-runs/{}", self.base_url, run_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let api_resp: ApiResponse<RunCost> = Self::read_json(resp).await?;
        Ok(api_resp.data)
    }

    /// Fetch one page of the account's run history.
    pub async fn list_runs(&self, limit: u32, offset: u32, desc: bool) -> Result<RunPage> {
        let url = format!(
            "{}/actor-runs?limit={}&offset={}&desc={}",
            self.base_url, limit, offset, desc
        );
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let api_resp: ApiResponse<RunPage> = Self::read_json(resp).await?;
        Ok(api_resp.data)
    }

    /// Fetch dataset items from a run's default dataset.
    pub async fn get_dataset_items<T: DeserializeOwned>(&self, dataset_id: &str) -> Result<Vec<T>> {
        let url = format!("{}/datasets/{}/items?format=json", self.base_url, dataset_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let items: Vec<T> = resp.json().await?;
        Ok(items)
    }

    /// Check the response status and decode the JSON body.
    async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(resp.json().await?)
    }
}
