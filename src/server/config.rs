use anyhow::{Result, bail};
use std::time::Duration;

use crate::events::bus::DEFAULT_EVENT_BUFFER;

/// Tuning knobs of the monitoring server.
///
/// The three watermarks interact as follows: a node that stays silent longer
/// than `heartbeat_timeout` collects one miss per health-check tick; at
/// `suspect_threshold` misses it is Suspected, at `max_missed_heartbeats` it
/// is Dead.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// UDP port to listen on. 0 binds an OS-assigned ephemeral port.
    pub listen_port: u16,
    /// Silence window after which a node starts collecting misses.
    pub heartbeat_timeout: Duration,
    /// Miss count at which a node becomes Suspected.
    pub suspect_threshold: u32,
    /// Miss count at which a node is declared Dead.
    pub max_missed_heartbeats: u32,
    /// Spacing between health-check passes.
    pub health_check_interval: Duration,
    /// Events retained per lagging subscriber before the oldest are dropped.
    pub event_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_port: 5000,
            heartbeat_timeout: Duration::from_secs(3),
            suspect_threshold: 2,
            max_missed_heartbeats: 3,
            health_check_interval: Duration::from_secs(1),
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.heartbeat_timeout.is_zero() {
            bail!("heartbeat_timeout must be greater than zero");
        }
        if self.health_check_interval.is_zero() {
            bail!("health_check_interval must be greater than zero");
        }
        if self.suspect_threshold < 1 {
            bail!("suspect_threshold must be at least 1");
        }
        if self.max_missed_heartbeats < self.suspect_threshold {
            bail!(
                "max_missed_heartbeats ({}) must not be below suspect_threshold ({})",
                self.max_missed_heartbeats,
                self.suspect_threshold
            );
        }
        if self.event_buffer < 1 {
            bail!("event_buffer must be at least 1");
        }

        Ok(())
    }
}
