// Leadgrid - API Core
//
// This crate provides the backend API for a multi-tenant lead-generation CRM:
// collections of leads and companies, third-party scraping/enrichment runs on
// the Apify actor platform, and a per-user cost ledger for every external run.
//
// All SQL lives in domains/*/models/; external services sit behind traits in
// kernel/ so flows can be exercised against mocks.

pub mod common;
pub mod config;
pub mod domains;
pub mod http;
pub mod kernel;

pub use config::*;
