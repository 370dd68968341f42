//! Server dependency container.
//!
//! One explicit container built at process start and passed by reference
//! into every flow that needs it. External services are trait objects so
//! tests can substitute the mocks in
//! [`test_dependencies`](super::test_dependencies); there is no ambient
//! global client anywhere in the codebase.

use sqlx::PgPool;
use std::sync::Arc;

use crate::domains::auth::JwtService;
use crate::kernel::{BaseEmailVerifier, BaseScraperPlatform, RunLedger};

/// Server dependencies accessible to domain actions and HTTP handlers.
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    /// Where run ledger rows go. In production this is the database pool
    /// itself; tests swap in an in-memory ledger.
    pub ledger: Arc<dyn RunLedger>,
    /// Scraping platform client (Apify in production).
    pub platform: Arc<dyn BaseScraperPlatform>,
    /// Email verification service client.
    pub email_verifier: Arc<dyn BaseEmailVerifier>,
    /// JWT service for token verification.
    pub jwt_service: Arc<JwtService>,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies. The run ledger
    /// defaults to the database pool.
    pub fn new(
        db_pool: PgPool,
        platform: Arc<dyn BaseScraperPlatform>,
        email_verifier: Arc<dyn BaseEmailVerifier>,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        let ledger: Arc<dyn RunLedger> = Arc::new(db_pool.clone());
        Self {
            db_pool,
            ledger,
            platform,
            email_verifier,
            jwt_service,
        }
    }

    /// Substitute the run ledger (tests).
    pub fn with_ledger(mut self, ledger: Arc<dyn RunLedger>) -> Self {
        self.ledger = ledger;
        self
    }
}
