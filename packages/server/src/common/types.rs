//! Small shared types used across domains.

use serde::Serialize;

/// Outcome counts for a batch of independently-processed items.
///
/// Every mapper and importer in this codebase processes items one at a time
/// and never lets a single bad item abort the batch, so the counts always
/// satisfy `created + skipped + errors == items processed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub created: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl IngestStats {
    pub fn total(&self) -> usize {
        self.created + self.skipped + self.errors
    }
}
