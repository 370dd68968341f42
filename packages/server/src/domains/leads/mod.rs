//! Leads domain: collections, leads, companies and their review/SEO data.

pub mod models;
