//! CDP errors and their mapping onto probe errors.

use harvest_protocols::ProbeError;
use thiserror::Error;

/// Everything that can go wrong between us and the DevTools endpoint.
#[derive(Debug, Error)]
pub enum CdpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Nothing answered on the debug port.
    #[error("Chrome not available at {0}. Start Chrome with: chrome --remote-debugging-port=9222")]
    ChromeNotAvailable(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Error object in a command reply.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// `/json/*` discovery and target creation.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Exception thrown by an evaluated script.
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    /// The socket went away with the command still pending.
    #[error("Session closed")]
    SessionClosed,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}

impl From<url::ParseError> for CdpError {
    fn from(e: url::ParseError) -> Self {
        CdpError::ConnectionFailed(format!("Invalid URL: {}", e))
    }
}

impl From<CdpError> for ProbeError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::JavaScript(msg) => ProbeError::Script(msg),
            CdpError::Timeout(msg) => ProbeError::Timeout(msg),
            CdpError::SessionClosed => ProbeError::Closed,
            other => ProbeError::Transport(other.to_string()),
        }
    }
}
