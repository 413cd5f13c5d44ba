//! CDP implementations of the UI-probe traits.

mod context;
mod listing;
pub mod scripts;

pub use context::CdpAuxContext;
pub use listing::CdpUiProbe;
