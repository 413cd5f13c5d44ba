//! CDP client: target discovery over HTTP, commands over one WebSocket.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, info};
use url::Url;

use super::error::CdpError;
use super::protocol::{BrowserVersion, PageInfo};
use super::session::PageSession;
use super::transport::Transport;

/// Connection to one Chrome instance.
///
/// Page sessions are multiplexed over the browser socket with flattened
/// `sessionId`s, so opening an auxiliary tab never opens a second socket.
pub struct CdpClient {
    /// `http://host:port`, without trailing slash.
    http_endpoint: String,
    transport: Arc<Transport>,
    reader: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to Chrome at `endpoint`, e.g. `http://localhost:9222`.
    pub async fn connect(endpoint: &str) -> Result<Self, CdpError> {
        let http_endpoint = endpoint.trim_end_matches('/').to_string();
        let unavailable = |e: reqwest::Error| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e));

        let version: BrowserVersion = reqwest::get(format!("{}/json/version", http_endpoint))
            .await
            .map_err(unavailable)?
            .json()
            .await
            .map_err(unavailable)?;

        let (stream, _) = tokio_tungstenite::connect_async(&version.web_socket_debugger_url)
            .await
            .map_err(|e| CdpError::ConnectionFailed(format!("WebSocket: {}", e)))?;
        let (transport, reader) = Transport::start(stream);

        info!("Attached to {} at {}", version.browser, http_endpoint);
        Ok(Self {
            http_endpoint,
            transport,
            reader,
        })
    }

    /// Browser-level command (no page session).
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.transport.send(method, params, None).await
    }

    /// Every target the HTTP endpoint knows about.
    pub async fn list_pages(&self) -> Result<Vec<PageInfo>, CdpError> {
        let url = format!("{}/json/list", self.http_endpoint);
        Ok(reqwest::get(&url).await?.json().await?)
    }

    /// `/json/new?{url}`; the target URL travels as the raw query.
    pub(crate) fn new_target_url(http_endpoint: &str, url: Option<&str>) -> Result<Url, CdpError> {
        let mut create_url = Url::parse(&format!("{}/json/new", http_endpoint))?;
        create_url.set_query(url);
        Ok(create_url)
    }

    /// Open a tab on `url` and attach to it.
    pub async fn new_page(&self, url: Option<&str>) -> Result<PageSession, CdpError> {
        let create_url = Self::new_target_url(&self.http_endpoint, url)?;

        // /json/new only answers PUT on current Chrome.
        let page: PageInfo = reqwest::Client::new()
            .put(create_url)
            .send()
            .await?
            .json()
            .await?;
        debug!("Created target {} for {}", page.id, page.url);

        self.attach_page(&page.id).await
    }

    /// Attach a flattened session to an existing target.
    pub async fn attach_page(&self, target_id: &str) -> Result<PageSession, CdpError> {
        let reply = self
            .call(
                "Target.attachToTarget",
                Some(json!({"targetId": target_id, "flatten": true})),
            )
            .await?;

        let session_id = reply["sessionId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing sessionId".to_string()))?;

        let session = PageSession::new(target_id.to_string(), session_id.to_string(), self.transport.clone());
        session.enable_domains().await?;
        Ok(session)
    }

    /// Close the target behind `session`.
    pub async fn close_page(&self, session: &PageSession) -> Result<(), CdpError> {
        self.call("Target.closeTarget", Some(json!({"targetId": session.target_id()})))
            .await?;
        debug!("Closed target {}", session.target_id());
        Ok(())
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}
