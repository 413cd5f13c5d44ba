//! Engine errors.

use thiserror::Error;

use harvest_protocols::{ProbeError, StoreError};

/// Errors of the seller iteration engine.
///
/// Only `AlreadyRunning`, `PanelUnavailable`, `NoSellers` and `Store` leave
/// [`crate::SellerEngine::run`]; the rest are turned into sentinel records at
/// the per-seller boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Engine is already running")]
    AlreadyRunning,

    #[error("Seller panel could not be opened after {attempts} attempts")]
    PanelUnavailable { attempts: u32 },

    #[error("No selectable seller facets found")]
    NoSellers,

    #[error("Resume store error: {0}")]
    Store(#[from] StoreError),

    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    #[error("Seller iteration panicked: {0}")]
    Panicked(String),
}

impl EngineError {
    /// Whether the error ends the run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EngineError::AlreadyRunning
                | EngineError::PanelUnavailable { .. }
                | EngineError::NoSellers
                | EngineError::Store(_)
        )
    }
}
