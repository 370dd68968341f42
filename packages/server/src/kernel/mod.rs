//! Infrastructure services: the dependency container, external-service
//! traits, their production clients, and in-memory test implementations.

pub mod apify_platform;
pub mod deps;
pub mod email_verifier;
pub mod test_dependencies;
pub mod traits;

pub use apify_platform::ApifyPlatform;
pub use deps::ServerDeps;
pub use email_verifier::EmailListVerifyClient;
pub use traits::{
    BaseEmailVerifier, BaseScraperPlatform, BulkJobState, BulkJobStatus, EmailVerdict,
    ReviewStore, RunLedger,
};
