//! # Harvest Engine
//!
//! The resumable seller iteration state machine and its helpers.
//!
//! ## Components
//!
//! - [`oracle`] - bounded "wait until" polling over the UI probe
//! - [`parser`] - contact-text parsing into business name, email and headquarters
//! - [`extractor`] - seller-page navigation and contact extraction in an auxiliary context
//! - [`panel`] - opening the filter modal and the seller facet panel
//! - [`engine`] - the per-seller loop with durable cursor and records
//! - [`controller`] - START/STOP control channel with a re-entrancy guard

pub mod controller;
pub mod engine;
mod engine_iteration;
mod engine_recovery;
pub mod error;
pub mod extractor;
pub mod options;
pub mod oracle;
pub mod panel;
pub mod parser;
pub mod state;

pub use controller::{ControlSignal, EngineController};
pub use engine::{RunOutcome, RunSummary, SellerEngine};
pub use error::EngineError;
pub use extractor::ContextExtractor;
pub use options::EngineOptions;
pub use oracle::PollingOracle;
pub use panel::PanelOpener;
pub use parser::{ContactDetails, parse_contact};
pub use state::EngineState;
