// Domain modules - each owns its models and flows

pub mod auth;
pub mod leads;
pub mod scrapers;
pub mod users;
