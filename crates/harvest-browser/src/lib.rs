//! # Harvest Browser
//!
//! Chrome DevTools Protocol binding for the seller-harvest engine.
//!
//! ## Layers
//!
//! - [`cdp`] - WebSocket JSON-RPC client and per-page sessions
//! - [`manager`] - Chrome discovery, launch and tab bookkeeping
//! - [`probe`] - [`CdpUiProbe`] and [`CdpAuxContext`], the engine-facing
//!   implementations of the UI-probe traits

pub mod cdp;
pub mod manager;
pub mod probe;

pub use cdp::{CdpClient, CdpError, PageSession};
pub use manager::{BrowserError, BrowserManager, BrowserManagerConfig};
pub use probe::{CdpAuxContext, CdpUiProbe};
