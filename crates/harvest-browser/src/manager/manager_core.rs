//! BrowserManager: find or start Chrome, hold the CDP connection.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{BrowserError, BrowserManagerConfig};
use crate::cdp::CdpClient;

const STARTUP_POLL: Duration = Duration::from_millis(200);
const STARTUP_ATTEMPTS: u32 = 30;

#[cfg(target_os = "macos")]
const CHROME_CANDIDATES: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];

#[cfg(target_os = "linux")]
const CHROME_CANDIDATES: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
];

#[cfg(target_os = "windows")]
const CHROME_CANDIDATES: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
];

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
const CHROME_CANDIDATES: &[&str] = &[];

#[derive(Default)]
pub(super) struct Connection {
    pub(super) client: Option<Arc<CdpClient>>,
    /// Set only when this process started Chrome. Chrome outlives us either way.
    launched: Option<Child>,
}

/// Owns the single CDP connection the harvester drives.
pub struct BrowserManager {
    pub(super) config: BrowserManagerConfig,
    pub(super) connection: Mutex<Connection>,
}

impl BrowserManager {
    pub fn new(config: BrowserManagerConfig) -> Self {
        Self {
            config,
            connection: Mutex::new(Connection::default()),
        }
    }

    /// First installed Chrome/Chromium binary.
    pub fn find_chrome() -> Option<PathBuf> {
        CHROME_CANDIDATES.iter().map(PathBuf::from).find(|p| p.exists())
    }

    /// Command-line flags for a Chrome this manager starts itself.
    pub(crate) fn launch_args(config: &BrowserManagerConfig) -> Vec<String> {
        let mut args = vec![
            format!("--remote-debugging-port={}", config.debug_port),
            format!("--user-data-dir={}", config.profile_dir.display()),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-sync".to_string(),
            // Product tabs are opened by script.
            "--disable-popup-blocking".to_string(),
        ];
        if config.headless {
            args.push("--headless=new".to_string());
        }
        args
    }

    /// Whether anything answers `/json/version` on the debug port.
    pub async fn is_chrome_running(&self) -> bool {
        reqwest::get(format!("{}/json/version", self.config.endpoint()))
            .await
            .is_ok()
    }

    async fn launch_chrome(&self) -> Result<Child, BrowserError> {
        let chrome = Self::find_chrome().ok_or(BrowserError::ChromeNotFound)?;

        if let Err(e) = std::fs::create_dir_all(&self.config.profile_dir) {
            warn!("Cannot create profile dir {}: {}", self.config.profile_dir.display(), e);
        }

        let child = Command::new(&chrome)
            .args(Self::launch_args(&self.config))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        info!(
            "Launched {} (pid {:?}) with profile {}",
            chrome.display(),
            child.id(),
            self.config.profile_dir.display()
        );
        Ok(child)
    }

    async fn wait_until_listening(&self) -> Result<(), BrowserError> {
        for _ in 0..STARTUP_ATTEMPTS {
            tokio::time::sleep(STARTUP_POLL).await;
            if self.is_chrome_running().await {
                return Ok(());
            }
        }
        Err(BrowserError::LaunchFailed(format!(
            "nothing listening on {} after {:?}",
            self.config.endpoint(),
            STARTUP_POLL * STARTUP_ATTEMPTS
        )))
    }

    /// Connect, starting Chrome first when allowed and nothing is listening.
    pub async fn connect(&self) -> Result<Arc<CdpClient>, BrowserError> {
        let mut connection = self.connection.lock().await;
        if let Some(client) = &connection.client {
            return Ok(client.clone());
        }

        if self.is_chrome_running().await {
            info!("Using Chrome already listening on port {}", self.config.debug_port);
        } else if self.config.launch {
            connection.launched = Some(self.launch_chrome().await?);
            self.wait_until_listening().await?;
        } else {
            return Err(BrowserError::ConnectionFailed(format!(
                "nothing listens on {} and launching is disabled",
                self.config.endpoint()
            )));
        }

        let client = Arc::new(CdpClient::connect(&self.config.endpoint()).await?);
        connection.client = Some(client.clone());
        Ok(client)
    }

    /// The live client, if [`connect`](Self::connect) succeeded.
    pub async fn client(&self) -> Result<Arc<CdpClient>, BrowserError> {
        self.connection
            .lock()
            .await
            .client
            .clone()
            .ok_or(BrowserError::NotConnected)
    }

    /// Drop the CDP connection. The browser and its tabs stay open.
    pub async fn close(&self) -> Result<(), BrowserError> {
        let mut connection = self.connection.lock().await;
        if connection.client.take().is_some() {
            info!("Disconnected from Chrome");
        }
        if let Some(child) = connection.launched.take() {
            info!("Leaving launched Chrome (pid {:?}) running", child.id());
        }
        Ok(())
    }
}
