//! Wire Protocol Module
//!
//! Defines the heartbeat message exchanged between clients and the monitoring
//! server, and the codec that maps it to and from UDP datagram payloads.
//!
//! ## Design
//! - **Self-describing encoding**: messages travel as UTF-8 JSON so that a
//!   malformed or foreign datagram fails decoding cleanly instead of being
//!   misread. Garbage is dropped by the ingress loop, never parsed into state.
//! - **Integer type codes**: the message type is carried as a small integer
//!   (1=Ping .. 5=Health) rather than a string tag, keeping the door open for
//!   denser encodings without changing the field contract.
//! - **Datagram budget**: an encoded message must fit a single datagram;
//!   the codec refuses anything over [`MAX_DATAGRAM_BYTES`].

pub mod codec;
pub mod types;

#[cfg(test)]
mod tests;
