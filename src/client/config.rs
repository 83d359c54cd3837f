use anyhow::{Result, bail};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use crate::protocol::types::{MAX_METADATA_ENTRIES, MAX_NODE_ID_BYTES, SERVER_NODE_ID};

/// Settings of a monitored client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Identity reported to the server. Defaults to a random 8-character
    /// token so throwaway clients never collide.
    pub node_id: String,
    /// The monitoring server's UDP endpoint.
    pub server_addr: SocketAddr,
    /// Spacing between pings.
    pub heartbeat_interval: Duration,
    /// Metadata carried on Join and every Ping.
    pub metadata: HashMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            node_id: random_node_id(),
            server_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            heartbeat_interval: Duration::from_secs(1),
            metadata: HashMap::new(),
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.node_id.is_empty() {
            bail!("node_id must not be empty");
        }
        if self.node_id.len() > MAX_NODE_ID_BYTES {
            bail!(
                "node_id is {} bytes, maximum is {}",
                self.node_id.len(),
                MAX_NODE_ID_BYTES
            );
        }
        if self.node_id == SERVER_NODE_ID {
            bail!("node_id {:?} is reserved for the server", SERVER_NODE_ID);
        }
        if self.heartbeat_interval.is_zero() {
            bail!("heartbeat_interval must be greater than zero");
        }
        if self.metadata.len() > MAX_METADATA_ENTRIES {
            bail!(
                "metadata has {} entries, maximum is {}",
                self.metadata.len(),
                MAX_METADATA_ENTRIES
            );
        }

        Ok(())
    }
}

/// Random 8-character identity token (uuid v4 prefix).
pub fn random_node_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}
