//! Typed ID definitions for all domain entities.
//!
//! Type aliases over [`Id`] give each entity its own incompatible ID type.

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for User entities (tenant owners).
pub struct User;

/// Marker type for Collection entities (folders of leads).
pub struct Collection;

/// Marker type for Lead entities.
pub struct Lead;

/// Marker type for Company entities.
pub struct Company;

/// Marker type for Scraper entities (configured platform integrations).
pub struct Scraper;

/// Marker type for ScraperRun ledger entries.
pub struct ScraperRun;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for User entities.
pub type UserId = Id<User>;

/// Typed ID for Collection entities.
pub type CollectionId = Id<Collection>;

/// Typed ID for Lead entities.
pub type LeadId = Id<Lead>;

/// Typed ID for Company entities.
pub type CompanyId = Id<Company>;

/// Typed ID for Scraper entities.
pub type ScraperId = Id<Scraper>;

/// Typed ID for ScraperRun ledger entries.
pub type ScraperRunId = Id<ScraperRun>;
