use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::protocol::codec;
use crate::protocol::types::{HeartbeatMessage, MessageType, now_ms};

use super::config::ClientConfig;

/// Connection-state notification fired towards client subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientEvent {
    /// First Pong heard from the server.
    Connected,
    /// The client stopped and said goodbye.
    Disconnected,
}

pub struct HeartbeatClient {
    config: ClientConfig,
    socket: Arc<UdpSocket>,
    sequence: AtomicU64,
    connected: AtomicBool,
    events: broadcast::Sender<ClientEvent>,
}

/// Owns the shutdown signal and the spawned loop tasks; the only way to stop
/// a running client. Dropping the last handle also closes the socket once
/// the loops have wound down.
pub struct ClientHandle {
    client: Arc<HeartbeatClient>,
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl ClientHandle {
    /// Graceful shutdown: both loops exit at their next suspension point,
    /// then a best-effort Leave goes out and the disconnect notification
    /// fires.
    pub async fn stop(self) {
        // Loops first, so no ping can trail the goodbye and re-register the
        // node on the server.
        let _ = self.shutdown_tx.send(true);
        for task in self.tasks {
            let _ = task.await;
        }

        if let Err(e) = self
            .client
            .send_message(MessageType::Leave, HashMap::new())
            .await
        {
            tracing::warn!("Leave send failed: {}", e);
        }

        self.client.connected.store(false, Ordering::SeqCst);
        let _ = self.client.events.send(ClientEvent::Disconnected);

        tracing::info!("Client {} stopped", self.client.config.node_id);
    }
}

impl HeartbeatClient {
    /// Binds an ephemeral local port and fixes the server as the remote
    /// endpoint. No traffic flows until [`start`](Self::start).
    pub async fn connect(config: ClientConfig) -> Result<Arc<Self>> {
        config.validate()?;

        let socket = UdpSocket::bind(SocketAddr::from(([0, 0, 0, 0], 0)))
            .await
            .context("failed to bind client socket")?;
        socket
            .connect(config.server_addr)
            .await
            .with_context(|| format!("cannot set remote endpoint {}", config.server_addr))?;

        Ok(Arc::new(Self {
            config,
            socket: Arc::new(socket),
            sequence: AtomicU64::new(0),
            connected: AtomicBool::new(false),
            events: broadcast::channel(16).0,
        }))
    }

    /// Sends the Join and spawns the send and receive loops.
    ///
    /// An unreachable server is not an error here: the client keeps pinging
    /// until stopped and only ever reports `Connected` once a Pong arrives.
    pub fn start(self: Arc<Self>) -> ClientHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut tasks = Vec::with_capacity(2);

        let client = self.clone();
        let send_shutdown = shutdown_rx.clone();
        tasks.push(tokio::spawn(async move {
            if let Err(e) = client
                .send_message(MessageType::Join, client.config.metadata.clone())
                .await
            {
                tracing::warn!("Join send failed, will keep pinging: {}", e);
            } else {
                tracing::info!(
                    "Client {} announced itself to {}",
                    client.config.node_id,
                    client.config.server_addr
                );
            }

            client.send_loop(send_shutdown).await;
        }));

        let client = self.clone();
        tasks.push(tokio::spawn(async move {
            client.receive_loop(shutdown_rx).await;
        }));

        ClientHandle {
            client: self,
            shutdown_tx,
            tasks,
        }
    }

    /// Pushes one application-driven Health update with fresh metadata.
    pub async fn send_health(&self, metadata: HashMap<String, String>) -> Result<()> {
        self.send_message(MessageType::Health, metadata).await
    }

    /// Whether a Pong has been heard since the client started.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub fn node_id(&self) -> &str {
        &self.config.node_id
    }

    /// Numbers and sends one message. The counter is shared across all
    /// message types, so sequences are strictly increasing per client.
    async fn send_message(
        &self,
        kind: MessageType,
        metadata: HashMap<String, String>,
    ) -> Result<()> {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let msg = HeartbeatMessage::new(kind, self.config.node_id.clone(), sequence, metadata);
        let payload = codec::encode(&msg)?;

        self.socket.send(&payload).await?;
        Ok(())
    }

    async fn send_loop(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.heartbeat_interval);
        // The interval's first tick completes immediately; the Join already
        // covered that slot.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {
                    if let Err(e) = self
                        .send_message(MessageType::Ping, self.config.metadata.clone())
                        .await
                    {
                        tracing::warn!("Ping send failed: {}", e);
                    }
                }
            }
        }

        tracing::debug!("Client send loop stopped");
    }

    async fn receive_loop(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut buf = vec![0u8; 2048];

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                received = self.socket.recv(&mut buf) => match received {
                    Ok(len) => match codec::decode(&buf[..len]) {
                        Ok(msg) if msg.kind == MessageType::Pong => self.handle_pong(&msg),
                        Ok(msg) => {
                            tracing::debug!("Ignoring unexpected {:?} from server", msg.kind);
                        }
                        Err(e) => {
                            tracing::debug!("Dropping undecodable datagram: {}", e);
                        }
                    },
                    Err(e) if is_transient(&e) => {
                        // A refused send means the server is down right now;
                        // keep listening, it may come back.
                        tracing::warn!("UDP receive error: {}", e);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                    Err(e) => {
                        tracing::error!("Fatal UDP receive error, stopping: {}", e);
                        break;
                    }
                },
            }
        }

        tracing::debug!("Client receive loop stopped");
    }

    fn handle_pong(&self, msg: &HeartbeatMessage) {
        let latency_ms = now_ms().saturating_sub(msg.timestamp);
        tracing::debug!("Pong seq={} latency={}ms", msg.sequence, latency_ms);

        if !self.connected.swap(true, Ordering::SeqCst) {
            tracing::info!("Connected to server {}", self.config.server_addr);
            let _ = self.events.send(ClientEvent::Connected);
        }
    }
}

fn is_transient(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::WouldBlock
            | ErrorKind::Interrupted
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionRefused
    )
}
