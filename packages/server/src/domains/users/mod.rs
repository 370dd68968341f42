//! Users domain: tenant accounts.

pub mod models;
