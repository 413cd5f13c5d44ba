//! Domain types shared by the engine, the store and the probe implementations.

mod extraction;
mod seller;
mod sentinel;

pub use extraction::*;
pub use seller::*;
pub use sentinel::*;
