//! # Harvest Protocols
//!
//! Core protocol definitions for the seller-harvest engine.
//! Contains only interface definitions and plain data types - no implementations.
//!
//! ## Core Traits
//!
//! - [`UiProbe`] - Yes/no questions and actions against the live listing document
//! - [`AuxiliaryContext`] - A secondary browsing context opened for one product
//! - [`KeyValueStore`] - Durable key-value persistence used by the resume store
//!
//! ## Core Types
//!
//! - [`SellerFacet`] - One selectable seller option in the filter panel
//! - [`SellerRecord`] - One persisted result per processed seller
//! - [`Sentinel`] - Fixed failure strings written into [`SellerRecord::email`]
//! - [`ExtractionOutcome`] - Transient result of the auxiliary-context extractor

pub mod error;
pub mod probe;
pub mod store;
pub mod types;

pub use error::{ProbeError, StoreError};
pub use probe::{AuxiliaryContext, UiProbe};
pub use store::KeyValueStore;
pub use types::*;
