use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use super::types::{HealthTransition, NodeRecord, NodeStatus, UpsertOutcome};

/// Concurrent mapping node id -> record.
///
/// Wraps a `DashMap` behind update primitives so callers never touch the map
/// directly; every method is atomic with respect to concurrent callers at the
/// granularity of one record (the map's per-entry lock).
pub struct NodeRegistry {
    nodes: DashMap<String, NodeRecord>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            nodes: DashMap::new(),
        }
    }

    /// Registers an inbound message from `node_id`.
    ///
    /// Inserts a fresh Alive record if the node is unknown, otherwise
    /// overwrites the endpoint and metadata, resets the miss counter and sets
    /// the node Alive. The status held before the call is captured in the
    /// returned outcome; reading it after the update would already be too
    /// late to tell a revival from a plain refresh.
    pub fn add_or_update(
        &self,
        node_id: &str,
        addr: SocketAddr,
        metadata: HashMap<String, String>,
    ) -> UpsertOutcome {
        match self.nodes.entry(node_id.to_string()) {
            Entry::Occupied(mut occupied) => {
                let record = occupied.get_mut();
                let previous_status = record.status;

                record.addr = addr;
                record.metadata = metadata;
                record.status = NodeStatus::Alive;
                record.last_heartbeat = Instant::now();
                record.missed_heartbeats = 0;

                UpsertOutcome {
                    record: record.clone(),
                    was_new: false,
                    previous_status,
                }
            }
            Entry::Vacant(vacant) => {
                let record = NodeRecord {
                    node_id: node_id.to_string(),
                    addr,
                    status: NodeStatus::Alive,
                    last_heartbeat: Instant::now(),
                    missed_heartbeats: 0,
                    metadata,
                };
                let snapshot = record.clone();
                vacant.insert(record);

                UpsertOutcome {
                    record: snapshot,
                    was_new: true,
                    previous_status: NodeStatus::Unknown,
                }
            }
        }
    }

    /// Bumps the miss counter, returning the new count. No-op returning 0
    /// when the node is unknown.
    pub fn increment_missed(&self, node_id: &str) -> u32 {
        match self.nodes.get_mut(node_id) {
            Some(mut record) => {
                record.missed_heartbeats = record.missed_heartbeats.saturating_add(1);
                record.missed_heartbeats
            }
            None => 0,
        }
    }

    /// Overwrites the status, returning the one it replaced. No-op when the
    /// node is unknown.
    pub fn set_status(&self, node_id: &str, status: NodeStatus) -> Option<NodeStatus> {
        let mut record = self.nodes.get_mut(node_id)?;
        let previous = record.status;
        record.status = status;
        Some(previous)
    }

    /// One health-check pass over a single node, executed under the record's
    /// entry lock so an inbound message cannot interleave between the counter
    /// bump and the classification.
    ///
    /// When the node has been silent for longer than `timeout` the miss
    /// counter is incremented and the status machine advances in priority
    /// order: Dead wins over Suspected, and each transition fires at most
    /// once (a node already Dead stays silently Dead).
    pub fn age_node(
        &self,
        node_id: &str,
        timeout: Duration,
        suspect_threshold: u32,
        max_missed: u32,
        now: Instant,
    ) -> Option<(NodeRecord, Option<HealthTransition>)> {
        let mut entry = self.nodes.get_mut(node_id)?;
        let record = entry.value_mut();

        if record.time_since_last_heartbeat(now) <= timeout {
            return Some((record.clone(), None));
        }

        record.missed_heartbeats = record.missed_heartbeats.saturating_add(1);

        let transition = if record.missed_heartbeats >= max_missed
            && record.status != NodeStatus::Dead
        {
            record.status = NodeStatus::Dead;
            Some(HealthTransition::Died)
        } else if record.missed_heartbeats >= suspect_threshold
            && record.status == NodeStatus::Alive
        {
            record.status = NodeStatus::Suspected;
            Some(HealthTransition::Suspected)
        } else {
            None
        };

        Some((record.clone(), transition))
    }

    /// Removes the record, returning it if one existed. A later message from
    /// the same id starts over with a fresh record.
    pub fn remove(&self, node_id: &str) -> Option<NodeRecord> {
        self.nodes.remove(node_id).map(|(_, record)| record)
    }

    pub fn get(&self, node_id: &str) -> Option<NodeRecord> {
        self.nodes.get(node_id).map(|record| record.clone())
    }

    /// Snapshot of every record. Safe to walk while other tasks mutate the
    /// registry; records inserted or removed mid-iteration may or may not
    /// appear, but no record is ever observed half-updated.
    pub fn all(&self) -> Vec<NodeRecord> {
        self.nodes.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Snapshot filtered to nodes currently classified Alive.
    pub fn alive(&self) -> Vec<NodeRecord> {
        self.nodes
            .iter()
            .filter(|entry| entry.value().status == NodeStatus::Alive)
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.nodes.len()
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
