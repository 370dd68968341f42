//! Authentication: JWT verification and the request extractor.
//!
//! Token issuance is delegated to the identity provider; this domain only
//! verifies inbound tokens and exposes the authenticated caller to handlers.

pub mod extract;
pub mod jwt;

pub use extract::AuthUser;
pub use jwt::{Claims, JwtService};
