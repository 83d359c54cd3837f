use anyhow::{Result, bail};

use super::types::{HeartbeatMessage, MAX_METADATA_ENTRIES, MAX_NODE_ID_BYTES};

/// Largest payload the codec will produce. Keeps every logical message inside
/// a single datagram; nothing is ever fragmented across packets.
pub const MAX_DATAGRAM_BYTES: usize = 1200;

/// Serializes a message into a datagram payload.
pub fn encode(msg: &HeartbeatMessage) -> Result<Vec<u8>> {
    validate(msg)?;

    let payload = serde_json::to_vec(msg)?;
    if payload.len() > MAX_DATAGRAM_BYTES {
        bail!(
            "encoded message is {} bytes, exceeds the {} byte datagram budget",
            payload.len(),
            MAX_DATAGRAM_BYTES
        );
    }

    Ok(payload)
}

/// Parses a datagram payload back into a message.
///
/// Any failure here means the datagram came from a foreign or broken sender;
/// callers drop the packet and carry on.
pub fn decode(payload: &[u8]) -> Result<HeartbeatMessage> {
    let msg: HeartbeatMessage = serde_json::from_slice(payload)?;
    validate(&msg)?;
    Ok(msg)
}

fn validate(msg: &HeartbeatMessage) -> Result<()> {
    if msg.node_id.is_empty() {
        bail!("node_id must not be empty");
    }
    if msg.node_id.len() > MAX_NODE_ID_BYTES {
        bail!(
            "node_id is {} bytes, maximum is {}",
            msg.node_id.len(),
            MAX_NODE_ID_BYTES
        );
    }
    if msg.metadata.len() > MAX_METADATA_ENTRIES {
        bail!(
            "metadata has {} entries, maximum is {}",
            msg.metadata.len(),
            MAX_METADATA_ENTRIES
        );
    }

    Ok(())
}
