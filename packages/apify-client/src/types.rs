use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an actor run.
///
/// `TIMING-OUT` and `ABORTING` are transitional states the platform reports
/// briefly before the corresponding terminal state; they are modelled
/// explicitly so a poll loop treats them as "not finished yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    #[serde(rename = "READY")]
    Ready,
    #[serde(rename = "RUNNING")]
    Running,
    #[serde(rename = "SUCCEEDED")]
    Succeeded,
    #[serde(rename = "FAILED")]
    Failed,
    #[serde(rename = "TIMING-OUT")]
    TimingOut,
    #[serde(rename = "TIMED-OUT")]
    TimedOut,
    #[serde(rename = "ABORTING")]
    Aborting,
    #[serde(rename = "ABORTED")]
    Aborted,
}

impl RunStatus {
    /// True for states from which no further transition occurs.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Succeeded | RunStatus::Failed | RunStatus::TimedOut | RunStatus::Aborted
        )
    }

    /// The platform's wire representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Ready => "READY",
            RunStatus::Running => "RUNNING",
            RunStatus::Succeeded => "SUCCEEDED",
            RunStatus::Failed => "FAILED",
            RunStatus::TimingOut => "TIMING-OUT",
            RunStatus::TimedOut => "TIMED-OUT",
            RunStatus::Aborting => "ABORTING",
            RunStatus::Aborted => "ABORTED",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actor run metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct Run {
    pub id: String,
    #[serde(rename = "actId")]
    pub act_id: Option<String>,
    pub status: RunStatus,
    #[serde(rename = "startedAt")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "finishedAt")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(rename = "defaultDatasetId")]
    pub default_dataset_id: Option<String>,
}

/// Usage and billing detail for a finished (or still running) run.
///
/// `usage_usd` is the per-component breakdown the platform reports
/// (compute units, dataset writes, proxy traffic, ...), kept opaque.
#[derive(Debug, Clone, Deserialize)]
pub struct RunCost {
    #[serde(rename = "usageTotalUsd")]
    pub usage_total_usd: Option<f64>,
    #[serde(rename = "usageUsd")]
    pub usage_usd: Option<serde_json::Value>,
    #[serde(rename = "startedAt")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "finishedAt")]
    pub finished_at: Option<DateTime<Utc>>,
}

/// One page of the account's run history.
#[derive(Debug, Clone, Deserialize)]
pub struct RunPage {
    pub total: i64,
    pub offset: i64,
    pub count: i64,
    pub items: Vec<Run>,
}

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(RunStatus::Succeeded.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
        assert!(RunStatus::TimedOut.is_terminal());
        assert!(RunStatus::Aborted.is_terminal());
        assert!(!RunStatus::Ready.is_terminal());
        assert!(!RunStatus::Running.is_terminal());
        assert!(!RunStatus::TimingOut.is_terminal());
        assert!(!RunStatus::Aborting.is_terminal());
    }

    #[test]
    fn status_round_trips_hyphenated_names() {
        let status: RunStatus = serde_json::from_str("\"TIMED-OUT\"").unwrap();
        assert_eq!(status, RunStatus::TimedOut);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"TIMED-OUT\"");
    }

    #[test]
    fn run_deserializes_from_api_shape() {
        let json = r#"{
            "id": "HG7ML7M8z78YcAPEB",
            "actId": "janedoe~my-actor",
            "status": "SUCCEEDED",
            "startedAt": "2026-07-01T08:00:00.000Z",
            "finishedAt": "2026-07-01T08:05:00.000Z",
            "defaultDatasetId": "wmKPijuyDnPZAPRMk"
        }"#;
        let run: Run = serde_json::from_str(json).unwrap();
        assert_eq!(run.id, "HG7ML7M8z78YcAPEB");
        assert_eq!(run.status, RunStatus::Succeeded);
        assert_eq!(run.default_dataset_id.as_deref(), Some("wmKPijuyDnPZAPRMk"));
    }
}
