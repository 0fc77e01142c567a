//! # Discord Gateway Session
//!
//! Presence can only be set over the gateway websocket, so the bot keeps one
//! session open: Hello, Identify, wait for READY, then heartbeat in a spawned
//! task until the session drops.
//!
//! There is no reconnect loop. A dropped session is replaced on the next
//! presence update, which in practice means the next poll cycle.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::model::{PresenceUpdate, DEFAULT_INTENTS};
use crate::lifecycle::BotClock;
use crate::notify::{deliver, LifecycleNotice, NotificationSink};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::publisher::{PublishError, PublishResult};

/// Default gateway URL
pub const DEFAULT_GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

/// Connect plus handshake must finish within this
pub const READY_TIMEOUT: Duration = Duration::from_secs(10);

const OP_DISPATCH: u8 = 0;
const OP_HEARTBEAT: u8 = 1;
const OP_IDENTIFY: u8 = 2;
const OP_PRESENCE_UPDATE: u8 = 3;
const OP_RECONNECT: u8 = 7;
const OP_INVALID_SESSION: u8 = 9;
const OP_HELLO: u8 = 10;
const OP_HEARTBEAT_ACK: u8 = 11;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Deserialize)]
struct Frame {
    op: u8,
    #[serde(default)]
    d: Value,
    #[serde(default)]
    s: Option<u64>,
    #[serde(default)]
    t: Option<String>,
}

/// Gateway settings
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub url: String,
    pub token: String,
    pub intents: u64,
    pub ready_timeout: Duration,
}

impl GatewayConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            url: DEFAULT_GATEWAY_URL.to_string(),
            token: token.into(),
            intents: DEFAULT_INTENTS,
            ready_timeout: READY_TIMEOUT,
        }
    }
}

/// Sends the `GatewayDisconnected` notice when an established session drops
#[derive(Clone)]
pub struct DisconnectNotifier {
    pub sink: Arc<dyn NotificationSink>,
    pub server_name: String,
    pub clock: BotClock,
    pub metrics: Arc<MetricsRegistry>,
}

impl DisconnectNotifier {
    async fn notify(&self) {
        let notice = LifecycleNotice::GatewayDisconnected {
            bot_uptime: self.clock.uptime(),
        };
        deliver(
            self.sink.as_ref(),
            &notice.to_notice(&self.server_name),
            notice.as_str(),
            &self.metrics,
        )
        .await;
    }
}

struct Session {
    outbound: mpsc::UnboundedSender<String>,
}

impl Session {
    fn is_alive(&self) -> bool {
        !self.outbound.is_closed()
    }
}

/// Lazily connected gateway session
pub struct Gateway {
    config: GatewayConfig,
    notifier: Option<DisconnectNotifier>,
    session: Mutex<Option<Session>>,
}

impl Gateway {
    pub fn new(config: GatewayConfig, notifier: Option<DisconnectNotifier>) -> Self {
        Self {
            config,
            notifier,
            session: Mutex::new(None),
        }
    }

    /// Send a presence update, connecting first when no session is alive
    pub async fn update_presence(&self, update: &PresenceUpdate) -> PublishResult<()> {
        let frame = json!({ "op": OP_PRESENCE_UPDATE, "d": update }).to_string();

        let mut session = self.session.lock().await;
        if !session.as_ref().map(Session::is_alive).unwrap_or(false) {
            *session = None;
            *session = Some(self.connect().await?);
        }

        match session.as_ref() {
            Some(active) => active
                .outbound
                .send(frame)
                .map_err(|_| PublishError::Gateway("session closed".to_string())),
            None => Err(PublishError::Gateway("no session".to_string())),
        }
    }

    #[cfg(test)]
    async fn is_connected(&self) -> bool {
        self.session
            .lock()
            .await
            .as_ref()
            .map(Session::is_alive)
            .unwrap_or(false)
    }

    /// Close the session without sending a disconnect notice
    pub async fn close(&self) {
        self.session.lock().await.take();
    }

    async fn connect(&self) -> PublishResult<Session> {
        let limit = self.config.ready_timeout;
        let timed_out = || PublishError::GatewayTimeout(limit.as_millis() as u64);

        let (mut socket, _) = timeout(limit, connect_async(self.config.url.as_str()))
            .await
            .map_err(|_| timed_out())?
            .map_err(|e| PublishError::Gateway(e.to_string()))?;

        let (heartbeat, seq) = timeout(limit, handshake(&mut socket, &self.config))
            .await
            .map_err(|_| timed_out())??;

        let interval_ms = heartbeat.as_millis().to_string();
        log_event_with_fields(
            Event::GatewayConnected,
            &[("heartbeat_ms", interval_ms.as_str())],
        );

        let (outbound, commands) = mpsc::unbounded_channel();
        tokio::spawn(run_session(
            socket,
            commands,
            heartbeat,
            seq,
            self.notifier.clone(),
        ));

        Ok(Session { outbound })
    }
}

async fn handshake(
    socket: &mut Socket,
    config: &GatewayConfig,
) -> PublishResult<(Duration, Option<u64>)> {
    let hello = next_frame(socket).await?;
    if hello.op != OP_HELLO {
        return Err(PublishError::Gateway(format!(
            "expected Hello, got op {}",
            hello.op
        )));
    }
    let interval_ms = hello
        .d
        .get("heartbeat_interval")
        .and_then(Value::as_u64)
        .ok_or_else(|| PublishError::Decode("Hello without heartbeat_interval".to_string()))?;

    let identify = json!({
        "op": OP_IDENTIFY,
        "d": {
            "token": config.token,
            "intents": config.intents,
            "properties": {
                "os": std::env::consts::OS,
                "browser": "statusbot",
                "device": "statusbot"
            }
        }
    });
    socket
        .send(WsMessage::Text(identify.to_string()))
        .await
        .map_err(|e| PublishError::Gateway(e.to_string()))?;

    loop {
        let frame = next_frame(socket).await?;
        match frame.op {
            OP_DISPATCH if frame.t.as_deref() == Some("READY") => {
                return Ok((Duration::from_millis(interval_ms), frame.s));
            }
            OP_INVALID_SESSION => {
                return Err(PublishError::Gateway("identify rejected".to_string()));
            }
            _ => {}
        }
    }
}

async fn next_frame(socket: &mut Socket) -> PublishResult<Frame> {
    loop {
        match socket.next().await {
            Some(Ok(WsMessage::Text(text))) => {
                return serde_json::from_str(&text).map_err(|e| PublishError::Decode(e.to_string()));
            }
            Some(Ok(WsMessage::Close(frame))) => {
                return Err(PublishError::Gateway(close_reason(frame)));
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(PublishError::Gateway(e.to_string())),
            None => return Err(PublishError::Gateway("connection closed".to_string())),
        }
    }
}

fn close_reason(frame: Option<CloseFrame<'_>>) -> String {
    match frame {
        Some(frame) => format!("closed with code {}: {}", u16::from(frame.code), frame.reason),
        None => "closed".to_string(),
    }
}

enum SessionEnd {
    /// The owner let go of the session
    Released,
    /// The connection failed underneath us
    Dropped(String),
}

async fn run_session(
    socket: Socket,
    commands: mpsc::UnboundedReceiver<String>,
    heartbeat: Duration,
    seq: Option<u64>,
    notifier: Option<DisconnectNotifier>,
) {
    if let SessionEnd::Dropped(reason) = drive_session(socket, commands, heartbeat, seq).await {
        log_event_with_fields(Event::GatewayDisconnected, &[("reason", reason.as_str())]);
        if let Some(notifier) = notifier {
            notifier.notify().await;
        }
    }
}

async fn send_heartbeat(socket: &mut Socket, seq: Option<u64>) -> Result<(), String> {
    let frame = json!({ "op": OP_HEARTBEAT, "d": seq }).to_string();
    socket
        .send(WsMessage::Text(frame))
        .await
        .map_err(|e| e.to_string())
}

async fn drive_session(
    mut socket: Socket,
    mut commands: mpsc::UnboundedReceiver<String>,
    heartbeat: Duration,
    mut seq: Option<u64>,
) -> SessionEnd {
    let mut ticker = interval_at(Instant::now() + heartbeat, heartbeat);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut awaiting_ack = false;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if awaiting_ack {
                    let _ = socket.close(None).await;
                    return SessionEnd::Dropped("heartbeat not acknowledged".to_string());
                }
                if let Err(e) = send_heartbeat(&mut socket, seq).await {
                    return SessionEnd::Dropped(e);
                }
                awaiting_ack = true;
            }

            command = commands.recv() => match command {
                Some(text) => {
                    if let Err(e) = socket.send(WsMessage::Text(text)).await {
                        return SessionEnd::Dropped(e.to_string());
                    }
                }
                None => {
                    let _ = socket.close(None).await;
                    return SessionEnd::Released;
                }
            },

            inbound = socket.next() => match inbound {
                Some(Ok(WsMessage::Text(text))) => {
                    if let Ok(frame) = serde_json::from_str::<Frame>(&text) {
                        if frame.s.is_some() {
                            seq = frame.s;
                        }
                        match frame.op {
                            OP_HEARTBEAT_ACK => awaiting_ack = false,
                            OP_HEARTBEAT => {
                                if let Err(e) = send_heartbeat(&mut socket, seq).await {
                                    return SessionEnd::Dropped(e);
                                }
                            }
                            OP_RECONNECT => {
                                return SessionEnd::Dropped("reconnect requested".to_string());
                            }
                            OP_INVALID_SESSION => {
                                return SessionEnd::Dropped("session invalidated".to_string());
                            }
                            _ => {}
                        }
                    }
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    return SessionEnd::Dropped(close_reason(frame));
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return SessionEnd::Dropped(e.to_string()),
                None => return SessionEnd::Dropped("connection closed".to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{Presence, PresenceIndicator};
    use crate::notify::MemorySink;
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Accepts one client, completes the handshake, reports the identify and
    /// the first frame after READY, then closes if asked to.
    async fn fake_gateway(
        close_after_first: bool,
    ) -> (String, oneshot::Receiver<(Value, Value)>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

            let hello = json!({"op": 10, "d": {"heartbeat_interval": 45000}});
            ws.send(WsMessage::Text(hello.to_string())).await.unwrap();

            let identify = read_json(&mut ws).await;
            let ready = json!({"op": 0, "t": "READY", "s": 1, "d": {}});
            ws.send(WsMessage::Text(ready.to_string())).await.unwrap();

            let first = read_json(&mut ws).await;
            let _ = tx.send((identify, first));

            if close_after_first {
                let _ = ws.close(None).await;
            } else {
                while ws.next().await.is_some() {}
            }
        });

        (url, rx)
    }

    async fn read_json<S>(ws: &mut WebSocketStream<S>) -> Value
    where
        S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
    {
        loop {
            match ws.next().await {
                Some(Ok(WsMessage::Text(text))) => return serde_json::from_str(&text).unwrap(),
                Some(_) => {}
                None => panic!("client went away"),
            }
        }
    }

    fn presence() -> PresenceUpdate {
        PresenceUpdate::from(&Presence {
            indicator: PresenceIndicator::DoNotDisturb,
            activity: "🔧 Server Maintenance".to_string(),
        })
    }

    fn config(url: String) -> GatewayConfig {
        GatewayConfig {
            url,
            ..GatewayConfig::new("secret-token")
        }
    }

    #[tokio::test]
    async fn test_identify_then_presence() {
        let (url, frames) = fake_gateway(false).await;
        let gateway = Gateway::new(config(url), None);

        gateway.update_presence(&presence()).await.unwrap();
        let (identify, update) = frames.await.unwrap();

        assert_eq!(identify["op"], 2);
        assert_eq!(identify["d"]["token"], "secret-token");
        assert_eq!(identify["d"]["intents"], 513);
        assert_eq!(update["op"], 3);
        assert_eq!(update["d"]["status"], "dnd");
        assert_eq!(update["d"]["activities"][0]["type"], 3);
        assert!(gateway.is_connected().await);

        gateway.close().await;
        assert!(!gateway.is_connected().await);
    }

    #[tokio::test]
    async fn test_drop_sends_notice() {
        let (url, frames) = fake_gateway(true).await;
        let sink = Arc::new(MemorySink::new());
        let notifier = DisconnectNotifier {
            sink: sink.clone(),
            server_name: "Kota".to_string(),
            clock: BotClock::start(),
            metrics: Arc::new(MetricsRegistry::new()),
        };
        let gateway = Gateway::new(config(url), Some(notifier));

        gateway.update_presence(&presence()).await.unwrap();
        frames.await.unwrap();

        for _ in 0..50 {
            if sink.sent_count() > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(sink.sent_count(), 1);
        assert!(sink.sent()[0].title.contains("Disconnected"));
        assert!(!gateway.is_connected().await);
    }

    #[tokio::test]
    async fn test_unreachable_gateway_fails() {
        let gateway = Gateway::new(config("ws://127.0.0.1:1".to_string()), None);
        let err = gateway.update_presence(&presence()).await.unwrap_err();
        assert_eq!(err.kind(), "gateway");
    }

    #[test]
    fn test_close_reason() {
        assert_eq!(close_reason(None), "closed");
    }
}
