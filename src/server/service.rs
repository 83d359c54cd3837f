use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::events::bus::EventBus;
use crate::events::types::NodeEvent;
use crate::protocol::codec;
use crate::protocol::types::{HeartbeatMessage, MessageType};
use crate::registry::store::NodeRegistry;
use crate::registry::types::{HealthTransition, NodeStatus};

use super::config::ServerConfig;

pub struct HeartbeatServer {
    config: ServerConfig,
    socket: Arc<UdpSocket>,
    registry: Arc<NodeRegistry>,
    events: EventBus,
}

/// Owns the shutdown signal and the spawned loop tasks. Dropping the handle
/// without calling [`shutdown`](ServerHandle::shutdown) leaves the loops
/// running for the lifetime of the runtime.
pub struct ServerHandle {
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl ServerHandle {
    /// Signals every loop to exit at its next suspension point.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Waits for the loops to finish. Call after [`shutdown`](Self::shutdown).
    pub async fn stopped(self) {
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

impl HeartbeatServer {
    /// Binds the UDP socket and assembles the server. Fails fast when the
    /// port is taken; the caller decides whether that is fatal.
    pub async fn bind(config: ServerConfig) -> Result<Arc<Self>> {
        config.validate()?;

        let bind_addr = SocketAddr::from(([0, 0, 0, 0], config.listen_port));
        let socket = UdpSocket::bind(bind_addr)
            .await
            .with_context(|| format!("failed to bind UDP port {}", config.listen_port))?;

        tracing::info!("Monitoring server listening on {}", socket.local_addr()?);

        Ok(Arc::new(Self {
            events: EventBus::new(config.event_buffer),
            config,
            socket: Arc::new(socket),
            registry: Arc::new(NodeRegistry::new()),
        }))
    }

    /// Spawns the ingress and health-check loops.
    pub fn start(self: Arc<Self>) -> ServerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut tasks = Vec::with_capacity(2);

        let server = self.clone();
        let ingress_shutdown = shutdown_rx.clone();
        tasks.push(tokio::spawn(async move {
            server.receive_loop(ingress_shutdown).await;
        }));

        let server = self.clone();
        tasks.push(tokio::spawn(async move {
            server.health_check_loop(shutdown_rx).await;
        }));

        tracing::info!("Ingress and health-check loops started");

        ServerHandle { shutdown_tx, tasks }
    }

    /// Registers a lifecycle event subscriber. Subscribe before traffic
    /// starts; events published earlier are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<NodeEvent> {
        self.events.subscribe()
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    async fn receive_loop(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        // Well above the datagram budget; anything longer is foreign traffic
        // and will fail decoding anyway.
        let mut buf = vec![0u8; 2048];

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                received = self.socket.recv_from(&mut buf) => match received {
                    Ok((len, src)) => match codec::decode(&buf[..len]) {
                        Ok(msg) => {
                            if let Err(e) = self.handle_message(msg, src).await {
                                tracing::error!("Error handling message from {}: {}", src, e);
                            }
                        }
                        Err(e) => {
                            tracing::debug!("Dropping undecodable datagram from {}: {}", src, e);
                        }
                    },
                    Err(e) if is_transient(&e) => {
                        tracing::error!("UDP receive error: {}", e);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                    Err(e) => {
                        tracing::error!("Fatal UDP receive error, stopping ingress: {}", e);
                        break;
                    }
                },
            }
        }

        tracing::info!("Ingress loop stopped");
    }

    /// Dispatches one decoded message.
    ///
    /// The previous status is captured inside `add_or_update` itself, in the
    /// same atomic step as the reset to Alive - classifying from a separate
    /// read-after-write would mistake every revival for a fresh join.
    pub(crate) async fn handle_message(&self, msg: HeartbeatMessage, src: SocketAddr) -> Result<()> {
        match msg.kind {
            MessageType::Join => {
                let outcome = self.registry.add_or_update(&msg.node_id, src, msg.metadata);

                if was_down(outcome.previous_status) {
                    tracing::info!("Node {} revived by join from {}", msg.node_id, src);
                    self.events.publish(NodeEvent::Revived(outcome.record));
                } else {
                    tracing::info!("Node {} joined from {}", msg.node_id, src);
                    self.events.publish(NodeEvent::Joined(outcome.record));
                }

                self.send_pong(msg.sequence, src).await?;
            }

            MessageType::Ping => {
                let outcome = self.registry.add_or_update(&msg.node_id, src, msg.metadata);

                if was_down(outcome.previous_status) {
                    tracing::info!("Node {} revived by ping from {}", msg.node_id, src);
                    self.events.publish(NodeEvent::Revived(outcome.record));
                } else if outcome.was_new {
                    tracing::info!("Discovered node {} via ping from {}", msg.node_id, src);
                    self.events.publish(NodeEvent::Joined(outcome.record));
                }

                self.send_pong(msg.sequence, src).await?;
            }

            MessageType::Health => {
                let outcome = self.registry.add_or_update(&msg.node_id, src, msg.metadata);

                if was_down(outcome.previous_status) {
                    tracing::info!("Node {} revived by health update", msg.node_id);
                    self.events.publish(NodeEvent::Revived(outcome.record));
                }
            }

            MessageType::Leave => {
                if let Some(record) = self.registry.remove(&msg.node_id) {
                    tracing::info!("Node {} left", msg.node_id);
                    self.events.publish(NodeEvent::Left(record));
                }
            }

            MessageType::Pong => {
                // The server does not consume its own echoes.
            }
        }

        Ok(())
    }

    async fn send_pong(&self, sequence: u64, dest: SocketAddr) -> Result<()> {
        let payload = codec::encode(&HeartbeatMessage::pong(sequence))?;
        self.socket.send_to(&payload, dest).await?;
        Ok(())
    }

    async fn health_check_loop(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.health_check_interval);

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = ticker.tick() => self.run_health_pass(Instant::now()),
            }
        }

        tracing::info!("Health-check loop stopped");
    }

    /// One pass over a registry snapshot: every node silent past the timeout
    /// collects a miss and may advance to Suspected or Dead. Decisions are
    /// based on the clock reading taken at tick start.
    pub(crate) fn run_health_pass(&self, now: Instant) {
        for record in self.registry.all() {
            let aged = self.registry.age_node(
                &record.node_id,
                self.config.heartbeat_timeout,
                self.config.suspect_threshold,
                self.config.max_missed_heartbeats,
                now,
            );

            // The node may have left between the snapshot and this step.
            let Some((snapshot, Some(transition))) = aged else {
                continue;
            };

            match transition {
                HealthTransition::Suspected => {
                    tracing::warn!(
                        "Node {} suspected ({} missed heartbeats)",
                        snapshot.node_id,
                        snapshot.missed_heartbeats
                    );
                    self.events.publish(NodeEvent::Suspected(snapshot));
                }
                HealthTransition::Died => {
                    tracing::warn!(
                        "Node {} declared dead ({} missed heartbeats)",
                        snapshot.node_id,
                        snapshot.missed_heartbeats
                    );
                    self.events.publish(NodeEvent::Died(snapshot));
                }
            }
        }
    }
}

fn was_down(status: NodeStatus) -> bool {
    matches!(status, NodeStatus::Suspected | NodeStatus::Dead)
}

fn is_transient(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::WouldBlock | ErrorKind::Interrupted | ErrorKind::ConnectionReset
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_server_binds_ephemeral_port() {
        let config = ServerConfig {
            listen_port: 0,
            ..ServerConfig::default()
        };

        let server = HeartbeatServer::bind(config)
            .await
            .expect("failed to bind server");

        assert_ne!(server.local_addr().unwrap().port(), 0);
        assert_eq!(server.registry().count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let config = ServerConfig {
            suspect_threshold: 5,
            max_missed_heartbeats: 3,
            ..ServerConfig::default()
        };

        assert!(HeartbeatServer::bind(config).await.is_err());
    }
}
