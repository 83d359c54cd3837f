use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reserved node identifier used by the server when answering pings.
/// Clients must not claim it for themselves.
pub const SERVER_NODE_ID: &str = "SERVER";

/// Upper bound on the UTF-8 byte length of a node identifier.
pub const MAX_NODE_ID_BYTES: usize = 128;

/// Upper bound on the number of metadata entries a message may carry.
pub const MAX_METADATA_ENTRIES: usize = 64;

/// The kind of a heartbeat message, carried on the wire as a small integer
/// code so the field survives a future change of encoding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(into = "u8", try_from = "u8")]
pub enum MessageType {
    /// Periodic liveness signal from a client.
    Ping = 1,
    /// Server response echoing a Ping's sequence number.
    Pong = 2,
    /// First message of a client announcing itself.
    Join = 3,
    /// Graceful departure; removes the sender from the registry.
    Leave = 4,
    /// Application-driven status update carrying fresh metadata.
    Health = 5,
}

impl From<MessageType> for u8 {
    fn from(kind: MessageType) -> u8 {
        kind as u8
    }
}

impl TryFrom<u8> for MessageType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(MessageType::Ping),
            2 => Ok(MessageType::Pong),
            3 => Ok(MessageType::Join),
            4 => Ok(MessageType::Leave),
            5 => Ok(MessageType::Health),
            other => Err(format!("unknown message type code {}", other)),
        }
    }
}

/// The on-wire unit: every datagram carries exactly one of these.
///
/// `sequence` is a per-origin monotonically increasing counter; a Pong echoes
/// the sequence of the Ping or Join it answers. `timestamp` is the sender's
/// wall clock in unix milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeartbeatMessage {
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub node_id: String,
    pub sequence: u64,
    pub timestamp: u64,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl HeartbeatMessage {
    /// Builds a message stamped with the current wall clock.
    pub fn new(
        kind: MessageType,
        node_id: impl Into<String>,
        sequence: u64,
        metadata: HashMap<String, String>,
    ) -> Self {
        Self {
            kind,
            node_id: node_id.into(),
            sequence,
            timestamp: now_ms(),
            metadata,
        }
    }

    /// The server's answer to a Ping or Join, echoing its sequence number.
    pub fn pong(sequence: u64) -> Self {
        Self::new(MessageType::Pong, SERVER_NODE_ID, sequence, HashMap::new())
    }
}

pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}
