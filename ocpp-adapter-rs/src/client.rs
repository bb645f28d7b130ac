//! OCPP WebSocket client
//!
//! Split in two halves: [`StationClient`] is a cheap clone handed to anything
//! that wants to send, and [`Connection`] owns the socket and drives it.
//! Requests are correlated by message id through a pending map; inbound CSMS
//! CALLs are forwarded on a channel for the router to answer.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio_tungstenite::{
    connect_async_with_config,
    tungstenite::{
        handshake::client::Request,
        http::{header, Uri},
        protocol::WebSocketConfig,
        Message,
    },
};
use tracing::{debug, error, info, warn};

use crate::config::StationConfig;
use crate::error::OcppError;
use crate::frame::{Action, Call, CallError, CallResult, Frame};
use crate::session::{Session, SessionEvent};
use crate::signing::SignaturePolicy;

/// OCPP 2.0.1 WebSocket subprotocol
const OCPP_SUBPROTOCOL: &str = "ocpp2.0.1";

struct PendingRequest {
    action: Action,
    response_tx: oneshot::Sender<Result<CallResult, OcppError>>,
}

type PendingMap = Arc<RwLock<HashMap<String, PendingRequest>>>;

/// Sending half of the client. Clone freely; all clones share the same
/// socket, session, and pending map.
#[derive(Clone)]
pub struct StationClient {
    station_id: String,
    session: Arc<RwLock<Session>>,
    pending: PendingMap,
    outgoing_tx: mpsc::Sender<Frame>,
    policy: Arc<dyn SignaturePolicy>,
    request_timeout: Duration,
}

impl StationClient {
    pub fn session(&self) -> Arc<RwLock<Session>> {
        self.session.clone()
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    pub(crate) fn policy(&self) -> &dyn SignaturePolicy {
        self.policy.as_ref()
    }

    /// Send a CALL and wait for the correlated CALLRESULT.
    ///
    /// The payload is signed before it leaves; the reply is returned raw,
    /// verification happens in the typed wrappers.
    pub async fn request(&self, mut call: Call) -> Result<CallResult, OcppError> {
        self.policy.sign(call.action, &mut call.payload)?;
        call = call.via(&self.station_id);

        let (response_tx, response_rx) = oneshot::channel();
        {
            let mut pending = self.pending.write().await;
            pending.insert(
                call.message_id.clone(),
                PendingRequest {
                    action: call.action,
                    response_tx,
                },
            );
        }
        let message_id = call.message_id.clone();

        if self.outgoing_tx.send(Frame::Call(call)).await.is_err() {
            self.pending.write().await.remove(&message_id);
            return Err(OcppError::ConnectionClosed);
        }

        match tokio::time::timeout(self.request_timeout, response_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(OcppError::ConnectionClosed),
            Err(_) => {
                self.pending.write().await.remove(&message_id);
                Err(OcppError::Timeout)
            }
        }
    }

    /// Answer a CSMS request.
    pub async fn respond(&self, response: CallResult) -> Result<(), OcppError> {
        self.outgoing_tx
            .send(Frame::CallResult(response))
            .await
            .map_err(|_| OcppError::ConnectionClosed)
    }

    /// Answer a CSMS request with an error.
    pub async fn respond_error(&self, error: CallError) -> Result<(), OcppError> {
        self.outgoing_tx
            .send(Frame::CallError(error))
            .await
            .map_err(|_| OcppError::ConnectionClosed)
    }
}

/// Owns the WebSocket and runs the connect/receive loop.
pub struct Connection {
    config: StationConfig,
    client: StationClient,
    outgoing_rx: mpsc::Receiver<Frame>,
    incoming_tx: mpsc::Sender<Call>,
}

impl Connection {
    /// Build a connection and its sending handle. The returned receiver
    /// yields CSMS-originated CALLs for the router.
    pub fn new(
        config: StationConfig,
        policy: Arc<dyn SignaturePolicy>,
    ) -> (Self, StationClient, mpsc::Receiver<Call>) {
        let mut session = Session::new(&config.station_id, &config.vendor, &config.model);
        if let Some(ref serial) = config.serial_number {
            session = session.with_serial(serial);
        }
        if let Some(ref firmware) = config.firmware_version {
            session = session.with_firmware(firmware);
        }
        for i in 1..=config.evse_count {
            session.add_evse(i as i32, 1);
        }

        let (outgoing_tx, outgoing_rx) = mpsc::channel(64);
        let (incoming_tx, incoming_rx) = mpsc::channel(64);

        let client = StationClient {
            station_id: config.station_id.clone(),
            session: Arc::new(RwLock::new(session)),
            pending: Arc::new(RwLock::new(HashMap::new())),
            outgoing_tx,
            policy,
            request_timeout: config.request_timeout,
        };

        let connection = Self {
            config,
            client: client.clone(),
            outgoing_rx,
            incoming_tx,
        };

        (connection, client, incoming_rx)
    }

    #[cfg(test)]
    pub(crate) fn into_outgoing_rx(self) -> mpsc::Receiver<Frame> {
        self.outgoing_rx
    }

    /// Connect and drive the socket, reconnecting with exponential backoff.
    /// Returns only when the CSMS closes the connection cleanly.
    pub async fn run(mut self) -> Result<(), OcppError> {
        let mut reconnect_delay = self.config.reconnect_delay;

        loop {
            info!("connecting to CSMS: {}", self.config.station_url());

            match self.connect_and_drive().await {
                Ok(()) => {
                    info!("connection closed gracefully");
                    return Ok(());
                }
                Err(e) => {
                    error!("connection error: {}", e);
                    self.on_disconnect().await;

                    info!("reconnecting in {:?}", reconnect_delay);
                    tokio::time::sleep(reconnect_delay).await;
                    reconnect_delay =
                        std::cmp::min(reconnect_delay * 2, self.config.max_reconnect_delay);
                }
            }
        }
    }

    async fn on_disconnect(&self) {
        self.client
            .session
            .write()
            .await
            .handle_event(SessionEvent::Disconnected);

        // Callers blocked on replies will never get one.
        let mut pending = self.client.pending.write().await;
        for (_, request) in pending.drain() {
            let _ = request.response_tx.send(Err(OcppError::ConnectionClosed));
        }
    }

    async fn connect_and_drive(&mut self) -> Result<(), OcppError> {
        let url = self.config.station_url();
        let uri: Uri = url.parse().map_err(|_| OcppError::InvalidFormat)?;

        let request = Request::builder()
            .uri(&url)
            .header(header::SEC_WEBSOCKET_PROTOCOL, OCPP_SUBPROTOCOL)
            .header(header::HOST, uri.host().unwrap_or("localhost"))
            .body(())
            .map_err(|_| OcppError::InvalidFormat)?;

        let ws_config = WebSocketConfig {
            max_message_size: Some(64 * 1024),
            max_frame_size: Some(16 * 1024),
            ..Default::default()
        };

        let (ws_stream, response) = connect_async_with_config(request, Some(ws_config), false)
            .await
            .map_err(|e| {
                error!("WebSocket connection failed: {}", e);
                OcppError::ConnectionClosed
            })?;

        let accepted_protocol = response
            .headers()
            .get(header::SEC_WEBSOCKET_PROTOCOL)
            .and_then(|v| v.to_str().ok());
        if accepted_protocol != Some(OCPP_SUBPROTOCOL) {
            warn!(
                "CSMS did not accept the ocpp2.0.1 subprotocol, got: {:?}",
                accepted_protocol
            );
        }

        info!("WebSocket connected to {}", url);
        self.client
            .session
            .write()
            .await
            .handle_event(SessionEvent::Connected);

        // Boot runs through the normal request path on a handle clone so the
        // receive loop below stays free to correlate the reply.
        let boot_client = self.client.clone();
        tokio::spawn(async move {
            match boot_client.boot_notification().await {
                Ok(response) => {
                    debug!("BootNotification answered: {:?}", response.status);
                    if let Err(e) = boot_client.status_notification_all().await {
                        warn!("initial StatusNotification failed: {}", e);
                    }
                }
                Err(e) => warn!("BootNotification failed: {}", e),
            }
        });

        let (mut ws_tx, mut ws_rx) = ws_stream.split();
        let mut heartbeat_tick = tokio::time::interval(Duration::from_secs(1));
        heartbeat_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                frame = self.outgoing_rx.recv() => {
                    let Some(frame) = frame else {
                        // All handles dropped.
                        return Ok(());
                    };
                    let bytes = frame.to_bytes()?;
                    debug!("sending: {}", String::from_utf8_lossy(&bytes));
                    ws_tx
                        .send(Message::Text(String::from_utf8_lossy(&bytes).into_owned().into()))
                        .await
                        .map_err(|e| {
                            error!("WebSocket send failed: {}", e);
                            OcppError::ConnectionClosed
                        })?;
                }

                msg = ws_rx.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            debug!("received: {}", text);
                            self.handle_frame(text.as_bytes()).await;
                        }
                        Some(Ok(Message::Close(_))) => {
                            info!("WebSocket closed by server");
                            self.on_disconnect().await;
                            return Ok(());
                        }
                        Some(Ok(Message::Ping(_))) => {
                            // Pong is handled by tungstenite.
                            debug!("received ping");
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            error!("WebSocket error: {}", e);
                            return Err(OcppError::ConnectionClosed);
                        }
                        None => {
                            info!("WebSocket stream ended");
                            return Err(OcppError::ConnectionClosed);
                        }
                    }
                }

                _ = heartbeat_tick.tick() => {
                    // Attempts are marked before the task is spawned, so a
                    // reply slower than the tick does not stack duplicates.
                    let mut session = self.client.session.write().await;
                    if session.heartbeat_due() {
                        session.mark_heartbeat_attempt();
                        drop(session);
                        let client = self.client.clone();
                        tokio::spawn(async move {
                            if let Err(e) = client.heartbeat().await {
                                warn!("heartbeat failed: {}", e);
                            }
                        });
                    } else if session.boot_retry_due() {
                        session.mark_boot_attempt();
                        drop(session);
                        let client = self.client.clone();
                        tokio::spawn(async move {
                            if let Err(e) = client.boot_notification().await {
                                warn!("BootNotification retry failed: {}", e);
                            }
                        });
                    }
                }
            }
        }
    }

    /// Dispatch one inbound frame: CALLs go to the router channel, replies
    /// resolve their pending entry.
    async fn handle_frame(&self, bytes: &[u8]) {
        match Frame::parse(bytes) {
            Ok(Frame::Call(call)) => {
                if let Err(e) = self.incoming_tx.send(call).await {
                    error!("failed to forward CSMS request: {}", e);
                }
            }
            Ok(Frame::CallResult(result)) => {
                let mut pending = self.client.pending.write().await;
                match pending.remove(&result.message_id) {
                    Some(request) => {
                        debug!("{} answered", request.action);
                        let _ = request.response_tx.send(Ok(result));
                    }
                    None => warn!("CALLRESULT for unknown message id {}", result.message_id),
                }
            }
            Ok(Frame::CallError(error)) => {
                let mut pending = self.client.pending.write().await;
                if let Some(request) = pending.remove(&error.message_id) {
                    let _ = request.response_tx.send(Err(OcppError::Remote {
                        code: error.error_code,
                        description: error.error_description,
                        details: error.error_details,
                    }));
                } else {
                    warn!("CALLERROR for unknown message id {}", error.message_id);
                }
            }
            Err(e) => {
                warn!("failed to parse OCPP frame: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::NoSigning;

    fn setup() -> (Connection, StationClient, mpsc::Receiver<Call>) {
        let config = StationConfig::default()
            .with_station_id("EK3-TEST")
            .with_request_timeout(Duration::from_millis(50));
        Connection::new(config, Arc::new(NoSigning))
    }

    #[tokio::test]
    async fn request_times_out_without_a_driver_reply() {
        let (_connection, client, _incoming) = setup();
        let call = Call::new(
            Action::Heartbeat,
            ocpp_model::messages::HeartbeatRequest::default(),
        )
        .unwrap();

        let err = client.request(call).await.unwrap_err();
        assert!(matches!(err, OcppError::Timeout));
        // Timed-out entry is removed from the pending map.
        assert!(client.pending.read().await.is_empty());
    }

    #[tokio::test]
    async fn request_fails_fast_when_driver_is_gone() {
        let (connection, client, _incoming) = setup();
        drop(connection);

        let call = Call::new(
            Action::Heartbeat,
            ocpp_model::messages::HeartbeatRequest::default(),
        )
        .unwrap();
        let err = client.request(call).await.unwrap_err();
        assert!(matches!(err, OcppError::ConnectionClosed));
    }

    #[tokio::test]
    async fn inbound_call_reaches_the_router_channel() {
        let (connection, _client, mut incoming) = setup();
        connection
            .handle_frame(br#"[2, "m-1", "Reset", {"type": "OnIdle"}]"#)
            .await;

        let call = incoming.recv().await.unwrap();
        assert_eq!(call.message_id, "m-1");
        assert_eq!(call.action, Action::Reset);
    }

    #[tokio::test]
    async fn call_result_resolves_pending_request() {
        let (connection, client, _incoming) = setup();

        let (response_tx, response_rx) = oneshot::channel();
        client.pending.write().await.insert(
            "m-7".to_string(),
            PendingRequest {
                action: Action::Heartbeat,
                response_tx,
            },
        );

        connection
            .handle_frame(br#"[3, "m-7", {"currentTime": "2026-08-20T12:00:00Z"}]"#)
            .await;

        let result = response_rx.await.unwrap().unwrap();
        assert_eq!(result.message_id, "m-7");
        assert!(client.pending.read().await.is_empty());
    }

    #[tokio::test]
    async fn call_error_resolves_pending_request_as_remote() {
        let (connection, client, _incoming) = setup();

        let (response_tx, response_rx) = oneshot::channel();
        client.pending.write().await.insert(
            "m-8".to_string(),
            PendingRequest {
                action: Action::SetVariables,
                response_tx,
            },
        );

        connection
            .handle_frame(br#"[4, "m-8", "NotImplemented", "no handler", {}]"#)
            .await;

        let err = response_rx.await.unwrap().unwrap_err();
        assert!(err.is_remote());
    }

    #[tokio::test]
    async fn disconnect_fails_all_pending() {
        let (connection, client, _incoming) = setup();

        let (response_tx, response_rx) = oneshot::channel();
        client.pending.write().await.insert(
            "m-9".to_string(),
            PendingRequest {
                action: Action::Authorize,
                response_tx,
            },
        );

        connection.on_disconnect().await;
        let err = response_rx.await.unwrap().unwrap_err();
        assert!(matches!(err, OcppError::ConnectionClosed));
    }
}
