//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod schema_selectors;
mod schema_timing;

pub use schema_selectors::*;
pub use schema_timing::*;

/// Shared default helper used by submodules.
pub(crate) fn default_true() -> bool {
    true
}

/// `~/.seller-harvest`, falling back to a relative directory.
pub fn harvest_home() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".seller-harvest"))
        .unwrap_or_else(|| PathBuf::from(".seller-harvest"))
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub selectors: SelectorConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Chrome connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Chrome remote-debugging port.
    #[serde(default = "default_debug_port")]
    pub debug_port: u16,

    /// Launch Chrome when nothing listens on the debug port.
    #[serde(default = "default_true")]
    pub launch: bool,

    #[serde(default)]
    pub headless: bool,

    /// Persistent profile so the site session survives restarts.
    #[serde(default = "default_profile_dir")]
    pub profile_dir: PathBuf,

    /// Substring identifying the listing tab among open pages.
    #[serde(default)]
    pub listing_url_contains: String,
}

fn default_debug_port() -> u16 {
    9222
}

fn default_profile_dir() -> PathBuf {
    harvest_home().join("browser-profile")
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            debug_port: default_debug_port(),
            launch: default_true(),
            headless: false,
            profile_dir: default_profile_dir(),
            listing_url_contains: String::new(),
        }
    }
}

/// Resume store location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    harvest_home().join("store.json")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    /// Directory for the daily-rolling log file.
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,

    /// Days of log files to keep.
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    harvest_home().join("logs")
}

fn default_max_log_files() -> usize {
    30
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: default_log_dir(),
            max_files: default_max_log_files(),
        }
    }
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
