//! START/STOP control channel.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::engine::{RunOutcome, SellerEngine};
use crate::error::EngineError;

/// Inbound control signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    Start,
    Stop,
}

type RunHandle = JoinHandle<Result<RunOutcome, EngineError>>;

/// Hosts a [`SellerEngine`] and maps control signals onto it.
///
/// At most one run is in flight; `Start` while one is active is ignored.
pub struct EngineController {
    engine: Arc<SellerEngine>,
    token: Mutex<Option<CancellationToken>>,
    handle: Mutex<Option<RunHandle>>,
}

impl EngineController {
    pub fn new(engine: Arc<SellerEngine>) -> Self {
        Self {
            engine,
            token: Mutex::new(None),
            handle: Mutex::new(None),
        }
    }

    pub fn engine(&self) -> &Arc<SellerEngine> {
        &self.engine
    }

    pub fn handle_signal(&self, signal: ControlSignal) -> bool {
        match signal {
            ControlSignal::Start => self.start(),
            ControlSignal::Stop => self.stop(),
        }
    }

    /// Spawn a run with a fresh cancellation token.
    ///
    /// Returns `false` when a run is already active.
    pub fn start(&self) -> bool {
        let mut handle = self.handle.lock();
        let in_flight = handle.as_ref().is_some_and(|h| !h.is_finished());
        if in_flight || self.engine.is_running() {
            info!("Seller iteration already running");
            return false;
        }

        let token = CancellationToken::new();
        *self.token.lock() = Some(token.clone());

        let engine = self.engine.clone();
        *handle = Some(tokio::spawn(async move { engine.run(token).await }));
        info!("Seller iteration started");
        true
    }

    /// Request cooperative cancellation of the current run.
    ///
    /// Returns `false` when nothing was running.
    pub fn stop(&self) -> bool {
        match self.token.lock().as_ref() {
            Some(token) if !token.is_cancelled() => {
                token.cancel();
                info!("Stop requested");
                true
            }
            _ => {
                debug!("Stop ignored, no active run");
                false
            }
        }
    }

    /// Wait for the current run to finish. `None` when nothing was started.
    pub async fn wait(&self) -> Option<Result<RunOutcome, EngineError>> {
        let handle = self.handle.lock().take()?;
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(EngineError::Panicked(e.to_string())),
        };
        self.token.lock().take();
        Some(result)
    }

    /// Drive the controller from a channel until every sender is dropped.
    pub async fn serve(&self, mut signals: mpsc::Receiver<ControlSignal>) {
        while let Some(signal) = signals.recv().await {
            debug!(?signal, "Control signal received");
            self.handle_signal(signal);
        }
        debug!("Control channel closed");
    }
}
