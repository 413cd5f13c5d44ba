//! Result of inspecting one auxiliary context.

use serde::{Deserialize, Serialize};

use super::seller::SellerRecord;

/// Transient value returned by the auxiliary-context extractor.
///
/// Not persisted directly: the engine decides whether to reopen the same
/// product before committing `seller_data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub retry_requested: bool,
    pub seller_data: SellerRecord,
}

impl ExtractionOutcome {
    /// Final outcome; no reopen wanted.
    pub fn accepted(seller_data: SellerRecord) -> Self {
        Self {
            retry_requested: false,
            seller_data,
        }
    }

    /// Outcome the caller may improve by reopening the context.
    pub fn retry(seller_data: SellerRecord) -> Self {
        Self {
            retry_requested: true,
            seller_data,
        }
    }
}
