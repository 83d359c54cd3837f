//! Monitoring Server Module
//!
//! The central failure detector. Owns the UDP socket, the node registry and
//! the event bus, and runs two independent loops against them:
//!
//! - **Ingress loop**: receives datagrams, decodes them, updates the registry
//!   and answers pings. Undecodable datagrams are dropped without side
//!   effects; the registry always stores the observed source endpoint, never
//!   an address a sender claims in its payload.
//! - **Health-check loop**: periodically walks a registry snapshot and ages
//!   out silent nodes through Alive -> Suspected -> Dead, emitting each
//!   transition at most once per cycle.
//!
//! Both loops run until a shutdown signal flips; the handle returned by
//! `start` owns that signal.

pub mod config;
pub mod service;
