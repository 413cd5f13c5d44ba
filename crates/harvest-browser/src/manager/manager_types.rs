//! Manager configuration and errors.

use std::path::PathBuf;

use harvest_config::BrowserConfig;
use thiserror::Error;

use crate::cdp::CdpError;

/// Failures while reaching Chrome or the listing tab.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Listing tab not found: {0}")]
    ListingTabNotFound(String),

    #[error("Browser not connected")]
    NotConnected,

    #[error("Chrome not found. Please install Google Chrome.")]
    ChromeNotFound,

    #[error("Failed to launch Chrome: {0}")]
    LaunchFailed(String),

    #[error(transparent)]
    Cdp(CdpError),
}

impl From<CdpError> for BrowserError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::ConnectionFailed(msg) | CdpError::ChromeNotAvailable(msg) => {
                BrowserError::ConnectionFailed(msg)
            }
            CdpError::SessionClosed => BrowserError::NotConnected,
            other => BrowserError::Cdp(other),
        }
    }
}

/// The slice of [`BrowserConfig`] the manager acts on.
#[derive(Debug, Clone)]
pub struct BrowserManagerConfig {
    pub debug_port: u16,
    pub launch: bool,
    pub profile_dir: PathBuf,
    pub headless: bool,
    /// Substring that identifies the listing tab.
    pub listing_url_contains: String,
}

impl Default for BrowserManagerConfig {
    fn default() -> Self {
        Self::from(&BrowserConfig::default())
    }
}

impl From<&BrowserConfig> for BrowserManagerConfig {
    fn from(config: &BrowserConfig) -> Self {
        Self {
            debug_port: config.debug_port,
            launch: config.launch,
            profile_dir: config.profile_dir.clone(),
            headless: config.headless,
            listing_url_contains: config.listing_url_contains.clone(),
        }
    }
}

impl BrowserManagerConfig {
    /// DevTools HTTP endpoint on the loopback interface.
    pub fn endpoint(&self) -> String {
        format!("http://localhost:{}", self.debug_port)
    }
}
