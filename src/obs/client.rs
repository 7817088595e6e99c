use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream, StreamExt};
use futures::SinkExt;
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::control::RemoteControl;
use super::messages::{
    Envelope, Incoming, RequestResponse, OP_IDENTIFIED, OP_REQUEST_RESPONSE, STATUS_SUCCESS,
};
use crate::error::ControlError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Waiter = oneshot::Sender<Result<(), ControlError>>;

/// Pending requests keyed by request id, plus the liveness flag.
///
/// Both live under one lock so a request can never be registered after the
/// receive loop has drained the map on disconnect.
#[derive(Default)]
struct Pending {
    connected: bool,
    waiters: BTreeMap<u64, Waiter>,
}

/// Persistent obs-websocket client
///
/// Responses are matched to callers by `requestId`. A response that carries
/// no id resolves the oldest outstanding request, which keeps strictly
/// serialized callers working against servers that omit the id.
pub struct ObsClient {
    url: String,
    sink: Mutex<SplitSink<WsStream, Message>>,
    pending: Arc<Mutex<Pending>>,
    connected: Arc<AtomicBool>,
    next_request_id: AtomicU64,
    receive_task: JoinHandle<()>,
}

impl ObsClient {
    /// Connect, identify, and start the background receive loop.
    ///
    /// Fails with `ControlError::Connection` if the socket cannot be opened or
    /// the server does not acknowledge Identify within `handshake_timeout`.
    pub async fn connect(url: &str, handshake_timeout: Duration) -> Result<Self, ControlError> {
        info!("Connecting to OBS WebSocket at {}", url);

        let (stream, _) = tokio::time::timeout(handshake_timeout, connect_async(url))
            .await
            .map_err(|_| ControlError::Connection(format!("timed out connecting to {}", url)))?
            .map_err(|e| ControlError::Connection(format!("failed to connect to {}: {}", url, e)))?;

        let (mut sink, stream) = stream.split();

        let pending = Arc::new(Mutex::new(Pending {
            connected: true,
            waiters: BTreeMap::new(),
        }));
        let connected = Arc::new(AtomicBool::new(true));
        let (identified_tx, identified_rx) = oneshot::channel();

        let receive_task = tokio::spawn(receive_loop(
            stream,
            Arc::clone(&pending),
            Arc::clone(&connected),
            identified_tx,
        ));

        let identify = serde_json::to_string(&Envelope::identify())
            .map_err(|e| ControlError::Protocol(e.to_string()))?;
        if let Err(e) = sink.send(Message::Text(identify)).await {
            receive_task.abort();
            return Err(ControlError::Connection(format!("failed to send identify: {}", e)));
        }

        match tokio::time::timeout(handshake_timeout, identified_rx).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => {
                receive_task.abort();
                return Err(ControlError::Connection(
                    "connection closed during handshake".to_string(),
                ));
            }
            Err(_) => {
                receive_task.abort();
                return Err(ControlError::Connection(format!(
                    "identify not acknowledged within {:?}",
                    handshake_timeout
                )));
            }
        }

        info!("Identified with OBS WebSocket");

        Ok(Self {
            url: url.to_string(),
            sink: Mutex::new(sink),
            pending,
            connected,
            next_request_id: AtomicU64::new(1),
            receive_task,
        })
    }

    /// Send a hotkey request and wait for its response
    pub async fn trigger_action(&self, action_id: &str) -> Result<(), ControlError> {
        let request_id = self.next_request_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();

        {
            let mut pending = self.pending.lock().await;
            if !pending.connected {
                return Err(ControlError::Connection(format!(
                    "not connected to {}",
                    self.url
                )));
            }
            pending.waiters.insert(request_id, tx);
        }

        let payload = serde_json::to_string(&Envelope::trigger_hotkey(
            request_id.to_string(),
            action_id,
        ))
        .map_err(|e| ControlError::Protocol(e.to_string()))?;

        debug!("Triggering {} (request {})", action_id, request_id);

        let sent = self.sink.lock().await.send(Message::Text(payload)).await;
        if let Err(e) = sent {
            self.pending.lock().await.waiters.remove(&request_id);
            return Err(ControlError::Connection(format!(
                "failed to send request: {}",
                e
            )));
        }

        match rx.await {
            Ok(result) => result,
            Err(_) => Err(ControlError::Connection(
                "connection dropped before a response arrived".to_string(),
            )),
        }
    }

    /// Whether the receive loop is still running
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Send a close frame to the server
    pub async fn close(&self) -> Result<(), ControlError> {
        info!("Closing OBS WebSocket connection");
        self.sink
            .lock()
            .await
            .close()
            .await
            .map_err(|e| ControlError::Connection(e.to_string()))
    }
}

impl Drop for ObsClient {
    fn drop(&mut self) {
        self.receive_task.abort();
    }
}

#[async_trait]
impl RemoteControl for ObsClient {
    async fn trigger_action(&self, action_id: &str) -> Result<(), ControlError> {
        ObsClient::trigger_action(self, action_id).await
    }
}

async fn receive_loop(
    mut stream: SplitStream<WsStream>,
    pending: Arc<Mutex<Pending>>,
    connected: Arc<AtomicBool>,
    identified_tx: oneshot::Sender<()>,
) {
    let mut identified_tx = Some(identified_tx);

    let reason = loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => match serde_json::from_str::<Incoming>(&text) {
                Ok(message) => handle_message(message, &pending, &mut identified_tx).await,
                Err(e) => warn!("Ignoring unparseable control message: {}", e),
            },
            Some(Ok(Message::Close(frame))) => {
                break format!("connection closed by server ({:?})", frame);
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => break format!("read error: {}", e),
            None => break "connection closed".to_string(),
        }
    };

    warn!("OBS WebSocket receive loop stopped: {}", reason);

    let mut pending = pending.lock().await;
    pending.connected = false;
    connected.store(false, Ordering::SeqCst);
    for (_, waiter) in std::mem::take(&mut pending.waiters) {
        let _ = waiter.send(Err(ControlError::Connection(reason.clone())));
    }
}

async fn handle_message(
    message: Incoming,
    pending: &Mutex<Pending>,
    identified_tx: &mut Option<oneshot::Sender<()>>,
) {
    match message.op {
        OP_IDENTIFIED => {
            if let Some(tx) = identified_tx.take() {
                let _ = tx.send(());
            }
        }
        OP_REQUEST_RESPONSE => {
            let Some(d) = message.d else {
                warn!("Request response without payload");
                return;
            };
            let response: RequestResponse = match serde_json::from_value(d) {
                Ok(response) => response,
                Err(e) => {
                    warn!("Malformed request response: {}", e);
                    return;
                }
            };

            let status = response.request_status;
            let result = if status.code == STATUS_SUCCESS {
                Ok(())
            } else {
                Err(ControlError::Remote {
                    code: status.code,
                    message: status.comment.unwrap_or_default(),
                })
            };

            let mut pending = pending.lock().await;
            let waiter = match response.request_id {
                Some(id) => id
                    .parse::<u64>()
                    .ok()
                    .and_then(|id| pending.waiters.remove(&id)),
                None => pending.waiters.pop_first().map(|(_, waiter)| waiter),
            };

            match waiter {
                Some(waiter) => {
                    let _ = waiter.send(result);
                }
                None => warn!("Response with no matching pending request"),
            }
        }
        op => debug!("Ignoring control message with op {}", op),
    }
}
