//! Request/reply plumbing over the browser WebSocket.
//!
//! Every [`PageSession`](super::PageSession) shares one [`Transport`] with its
//! [`CdpClient`](super::CdpClient). Replies are matched to callers by id;
//! unsolicited events are dropped since nothing in the harvester subscribes.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};

use super::error::CdpError;
use super::protocol::{CdpRequest, CdpResponse};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;
type Reply = oneshot::Sender<Result<Value, CdpError>>;

/// Upper bound on a single CDP round-trip.
const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Callers waiting on a reply, keyed by request id.
#[derive(Default)]
pub(crate) struct Inflight {
    waiters: Mutex<HashMap<u64, Reply>>,
    next_id: AtomicU64,
}

impl Inflight {
    pub(crate) fn register(&self) -> (u64, oneshot::Receiver<Result<Value, CdpError>>) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let (tx, rx) = oneshot::channel();
        self.waiters.lock().insert(id, tx);
        (id, rx)
    }

    pub(crate) fn forget(&self, id: u64) {
        self.waiters.lock().remove(&id);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.waiters.lock().len()
    }

    /// Hand a reply to whoever is waiting on its id.
    pub(crate) fn settle(&self, reply: CdpResponse) {
        let Some(id) = reply.id else {
            trace!("Ignoring event {:?}", reply.method);
            return;
        };
        let Some(waiter) = self.waiters.lock().remove(&id) else {
            return;
        };
        let outcome = match reply.error {
            Some(error) => Err(CdpError::Protocol {
                code: error.code,
                message: error.message,
            }),
            None => Ok(reply.result.unwrap_or(Value::Null)),
        };
        let _ = waiter.send(outcome);
    }

    /// Wake every waiter with [`CdpError::SessionClosed`].
    pub(crate) fn fail_all(&self) {
        let orphaned: Vec<Reply> = self.waiters.lock().drain().map(|(_, w)| w).collect();
        for waiter in orphaned {
            let _ = waiter.send(Err(CdpError::SessionClosed));
        }
    }
}

pub(crate) struct Transport {
    sink: tokio::sync::Mutex<WsSink>,
    inflight: Inflight,
}

impl Transport {
    /// Split the socket and start the reader task.
    pub(crate) fn start(stream: WsStream) -> (Arc<Self>, tokio::task::JoinHandle<()>) {
        let (sink, source) = stream.split();
        let transport = Arc::new(Self {
            sink: tokio::sync::Mutex::new(sink),
            inflight: Inflight::default(),
        });
        let reader = tokio::spawn(Self::pump(transport.clone(), source));
        (transport, reader)
    }

    async fn pump(transport: Arc<Self>, mut source: WsSource) {
        while let Some(frame) = source.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    trace!("CDP recv: {}", text);
                    match serde_json::from_str::<CdpResponse>(&text) {
                        Ok(reply) => transport.inflight.settle(reply),
                        Err(e) => warn!("Unparseable CDP frame: {}", e),
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("Browser closed the CDP socket");
                    break;
                }
                Err(e) => {
                    error!("CDP socket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
        transport.inflight.fail_all();
    }

    /// Send one command, optionally scoped to a flattened page session.
    pub(crate) async fn send(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        let (id, rx) = self.inflight.register();
        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(str::to_string),
        };
        let json = serde_json::to_string(&request)?;
        trace!("CDP send: {}", json);

        if let Err(e) = self.sink.lock().await.send(Message::Text(json.into())).await {
            self.inflight.forget(id);
            return Err(e.into());
        }

        match tokio::time::timeout(CALL_TIMEOUT, rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(CdpError::SessionClosed),
            Err(_) => {
                self.inflight.forget(id);
                Err(CdpError::Timeout(format!("{} got no reply", method)))
            }
        }
    }
}
