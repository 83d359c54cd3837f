//! UDP Heartbeat Failure-Detection Service Library
//!
//! This library crate defines the core modules of the monitoring system.
//! It serves as the foundation for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! The system is composed of five loosely coupled subsystems:
//!
//! - **`protocol`**: The wire layer. Defines the heartbeat message, its
//!   small-integer type codes, and the datagram codec (JSON over UDP).
//! - **`registry`**: The server-side state layer. A concurrent map of node
//!   records with atomic per-record update primitives.
//! - **`events`**: The notification layer. A bounded broadcast bus that
//!   delivers node lifecycle events (joined, left, suspected, died, revived)
//!   to external subscribers.
//! - **`server`**: The monitoring server. Ingests datagrams, answers pings,
//!   and runs the periodic health check that ages out silent nodes.
//! - **`client`**: The monitored participant. Joins the server, emits
//!   periodic pings, consumes pongs, and leaves gracefully on shutdown.

pub mod client;
pub mod events;
pub mod protocol;
pub mod registry;
pub mod server;
