//! Scrapers domain: configured integrations, the run ledger, and the flows
//! that drive external runs.
//!
//! Layering, leaves first: `polling` (the shared wait loop), `cost` (the
//! bounded usage lookup), `accounting` (the ledger writer), `runner` (the
//! start/poll/record flow every live call site uses), `backfill` (the
//! reconciler), and `actions` (the call sites themselves).

pub mod accounting;
pub mod actions;
pub mod backfill;
pub mod cost;
pub mod models;
pub mod polling;
pub mod runner;

pub use accounting::{record_scraper_run, CostResolution, RecordError, RecordOutcome};
pub use backfill::{backfill_runs, reset_imported_runs, BackfillSummary};
pub use cost::{lookup_run_cost, RunCostSummary, COST_LOOKUP_TIMEOUT};
pub use polling::{poll_run, poll_until_terminal, PollOutcome, POLL_INTERVAL, POLL_WALL_CLOCK_CAP};
pub use runner::{execute_actor_run, FinishedRun, RunContext, RunFailure};
