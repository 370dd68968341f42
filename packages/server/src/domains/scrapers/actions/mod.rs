//! Scraper-run call sites: thin orchestration over the shared runner,
//! the domain models, and the run ledger.

pub mod enrich;
pub mod find_email;
pub mod scrape_collection;
pub mod seo;
pub mod trustpilot;
pub mod verify_emails;

use thiserror::Error;

use crate::domains::scrapers::runner::RunFailure;

/// Failure of an action, shaped for the HTTP layer.
///
/// Ledger/bookkeeping failures never show up here - they are logged and
/// swallowed inside the flows. What does show up is the primary-flow
/// outcome the caller must know about: bad input, a missing entity, or an
/// external run that ended badly (with its run id for correlation).
#[derive(Debug, Error)]
pub enum ActionError {
    /// The request cannot be served as asked (nothing to verify, no website
    /// configured, ...).
    #[error("{0}")]
    Invalid(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Run(#[from] RunFailure),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use enrich::{enrich_collection, enrich_company, enrich_lead, EnrichReport};
pub use find_email::{find_lead_email, FindEmailReport};
pub use scrape_collection::{scrape_collection, ScrapeReport};
pub use seo::{seo_local_ranking, SeoReport};
pub use trustpilot::{sync_company_reviews, ReviewSyncReport};
pub use verify_emails::{verify_collection_emails, verify_company_emails, VerificationReport};
