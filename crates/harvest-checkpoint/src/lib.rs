//! # Harvest Checkpoint
//!
//! Resume state for the seller iteration engine.
//!
//! ## Features
//!
//! - Key-value backends: in-memory for tests, single JSON file for real runs
//! - Typed accessors for the resume layout (records, cursor, category context)
//! - Export of collected records as JSON or CSV, search and summary stats

pub mod export;
pub mod resume;
pub mod store;

pub use export::{RecordStats, filter_records, render_table, to_csv, to_json};
pub use resume::{ResumeSnapshot, ResumeStore, keys};
pub use store::{FileKeyValueStore, MemoryKeyValueStore};
