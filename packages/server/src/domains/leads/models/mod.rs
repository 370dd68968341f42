pub mod collection;
pub mod company;
pub mod company_review;
pub mod lead;
pub mod seo_snapshot;

pub use collection::Collection;
pub use company::Company;
pub use company_review::{CompanyReview, NewCompanyReview};
pub use lead::{Lead, LeadEnrichment, NewLead};
pub use seo_snapshot::SeoSnapshot;
