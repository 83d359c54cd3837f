//! Node Registry Module
//!
//! The server-side bookkeeping for every monitored node. Both the ingress
//! loop (on every inbound message) and the health-check loop (when ageing out
//! silent nodes) mutate the same registry concurrently, so every operation is
//! atomic at the granularity of a single record.
//!
//! ## Core Mechanisms
//! - **Insert-or-update as one step**: an inbound message resets a node to
//!   Alive and reports the status it held *before* the reset, so the caller
//!   can tell a fresh join from a revival without a second lookup racing the
//!   update.
//! - **Miss counter**: the health checker increments a per-node counter while
//!   the node stays silent; any inbound message zeroes it. The counter is the
//!   sole retry surface of the design - lost datagrams are simply absorbed.
//! - **Snapshot reads**: `all()` returns cloned records that are safe to walk
//!   while other tasks keep mutating the map.

pub mod store;
pub mod types;
