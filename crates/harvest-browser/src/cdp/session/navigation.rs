//! Navigation operations for a CDP page session.

use std::time::Duration;

use serde_json::json;

use crate::cdp::error::CdpError;

use super::core::PageSession;

const LOAD_TIMEOUT: Duration = Duration::from_secs(30);
const LOAD_POLL: Duration = Duration::from_millis(100);

impl PageSession {
    /// Current `document.readyState`.
    pub async fn ready_state(&self) -> Result<String, CdpError> {
        let result = self.evaluate("document.readyState").await?;
        Ok(result.as_str().unwrap_or("").to_string())
    }

    /// Wait until the document is at least interactive.
    pub async fn wait_for_load(&self) -> Result<(), CdpError> {
        let start = tokio::time::Instant::now();

        loop {
            // The context is briefly gone right after a navigation commits.
            if let Ok(state) = self.ready_state().await {
                if state == "complete" || state == "interactive" {
                    return Ok(());
                }
            }

            if start.elapsed() > LOAD_TIMEOUT {
                return Err(CdpError::Timeout("Page load timeout".to_string()));
            }

            tokio::time::sleep(LOAD_POLL).await;
        }
    }

    /// Reload page.
    pub async fn reload(&self) -> Result<(), CdpError> {
        self.call("Page.reload", None).await?;
        self.wait_for_load().await?;
        Ok(())
    }

    /// Go back one history entry. No-op at the start of history.
    pub async fn go_back(&self) -> Result<(), CdpError> {
        let history = self.call("Page.getNavigationHistory", None).await?;

        if let Some(entry_id) = Self::previous_entry_id(&history) {
            self.call(
                "Page.navigateToHistoryEntry",
                Some(json!({"entryId": entry_id})),
            )
            .await?;
            self.wait_for_load().await?;
        }
        Ok(())
    }

    /// Id of the history entry before the current one.
    pub(crate) fn previous_entry_id(history: &serde_json::Value) -> Option<i64> {
        let current_index = history["currentIndex"].as_i64()?;
        if current_index <= 0 {
            return None;
        }
        let entries = history["entries"].as_array()?;
        let entry = entries.get(usize::try_from(current_index - 1).ok()?)?;
        entry["id"].as_i64()
    }

    /// Get current URL.
    pub async fn get_url(&self) -> Result<String, CdpError> {
        let result = self.evaluate("window.location.href").await?;
        Ok(result.as_str().unwrap_or("").to_string())
    }
}
