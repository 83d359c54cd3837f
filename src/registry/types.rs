use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Liveness classification of a monitored node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeStatus {
    /// Never observed. No persisted record is ever in this state; it is only
    /// reported as the prior status when a record is first created.
    Unknown,
    /// Heartbeats are arriving inside the timeout window.
    Alive,
    /// The node has missed enough heartbeats to be suspected down.
    /// It returns to `Alive` on any inbound message, or falls to `Dead`.
    Suspected,
    /// The node is considered failed. The record is kept addressable so a
    /// later message can revive it.
    Dead,
}

/// Per-node state held by the server.
#[derive(Debug, Clone)]
pub struct NodeRecord {
    /// Unique identifier, primary key of the registry.
    pub node_id: String,
    /// Last observed source endpoint; overwritten on every inbound message.
    pub addr: SocketAddr,
    /// Current liveness classification.
    pub status: NodeStatus,
    /// Local clock reading of the most recent message from this node.
    pub last_heartbeat: Instant,
    /// Consecutive health-check misses since the last message.
    pub missed_heartbeats: u32,
    /// Most recent metadata map observed from the node.
    pub metadata: HashMap<String, String>,
}

impl NodeRecord {
    pub fn time_since_last_heartbeat(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_heartbeat)
    }
}

/// What `add_or_update` observed and produced, captured in one atomic step.
///
/// `previous_status` is the status the record held before this call
/// (`Unknown` when the record did not exist); callers classify the lifecycle
/// event from it. `record` is a snapshot of the state after the update.
#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    pub record: NodeRecord,
    pub was_new: bool,
    pub previous_status: NodeStatus,
}

/// Status advance produced by one health-check pass over a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthTransition {
    Suspected,
    Died,
}
