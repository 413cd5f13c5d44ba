//! UI-probe errors.

use thiserror::Error;

/// Errors raised by a [`crate::UiProbe`] or [`crate::AuxiliaryContext`].
///
/// A missing element is normally reported as `Ok(false)` / `Ok(None)`;
/// these errors cover the cases where the probe itself could not answer.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("Auxiliary context unavailable: {0}")]
    ContextUnavailable(String),

    #[error("Probe timed out: {0}")]
    Timeout(String),

    #[error("Probe session closed")]
    Closed,
}
