//! Error types for the protocol layer.

mod probe;
mod store;

pub use probe::*;
pub use store::*;
