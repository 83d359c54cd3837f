//! Heartbeat Client Module
//!
//! The monitored participant. Announces itself with a Join, keeps a Ping
//! flowing every interval, and tells the server goodbye with a Leave on
//! shutdown.
//!
//! ## Behavior
//! - A shared sequence counter numbers every outgoing message, whatever its
//!   type; the server's Pong echoes the sequence it answers.
//! - The first Pong flips the client to connected and fires a `Connected`
//!   notification. A client that never hears back simply keeps pinging -
//!   the network may recover, and the server absorbs the gap through its
//!   miss counter.
//! - Health updates are application-driven: `send_health` pushes fresh
//!   metadata whenever the caller has something to report.

pub mod config;
pub mod service;
