//! Lifecycle Event Module
//!
//! Carries node lifecycle notifications (joined, left, suspected, died,
//! revived) from the server loops to external subscribers - load-balancer
//! updaters, failover triggers, alerting, or plain log sinks.
//!
//! ## Delivery Contract
//! - Events carry a [`NodeRecord`](crate::registry::types::NodeRecord)
//!   snapshot by value, never a live reference into the registry.
//! - Publication never blocks the ingress or health-check loops: the bus is a
//!   bounded broadcast ring. A subscriber that falls more than the buffer
//!   capacity behind loses the oldest events; the receive helper surfaces the
//!   skipped count as a warning and keeps going.
//! - Per-node ordering is preserved - each publish immediately follows the
//!   atomic registry step that produced the transition. Ordering across
//!   distinct nodes is not guaranteed.

pub mod bus;
pub mod types;

#[cfg(test)]
mod tests;
