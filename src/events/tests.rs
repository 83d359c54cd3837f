//! Event Bus Tests
//!
//! Validates delivery order, overflow behavior, and snapshot semantics of the
//! lifecycle event channel.

#[cfg(test)]
mod tests {
    use crate::events::bus::{EventBus, next_event};
    use crate::events::types::NodeEvent;
    use crate::registry::types::{NodeRecord, NodeStatus};
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::time::Instant;

    fn record(node_id: &str) -> NodeRecord {
        NodeRecord {
            node_id: node_id.to_string(),
            addr: SocketAddr::from(([127, 0, 0, 1], 9000)),
            status: NodeStatus::Alive,
            last_heartbeat: Instant::now(),
            missed_heartbeats: 0,
            metadata: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn test_events_arrive_in_publish_order() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(NodeEvent::Joined(record("node-1")));
        bus.publish(NodeEvent::Suspected(record("node-1")));
        bus.publish(NodeEvent::Died(record("node-1")));
        bus.publish(NodeEvent::Revived(record("node-1")));

        let names: Vec<&str> = [
            next_event(&mut rx).await.unwrap(),
            next_event(&mut rx).await.unwrap(),
            next_event(&mut rx).await.unwrap(),
            next_event(&mut rx).await.unwrap(),
        ]
        .iter()
        .map(|event| event.name())
        .collect::<Vec<_>>();

        assert_eq!(names, vec!["joined", "suspected", "died", "revived"]);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_a_noop() {
        let bus = EventBus::new(4);
        assert_eq!(bus.subscriber_count(), 0);

        // Must not panic or block.
        bus.publish(NodeEvent::Joined(record("node-1")));
    }

    #[tokio::test]
    async fn test_overflow_drops_oldest_and_keeps_newest() {
        let bus = EventBus::new(4);
        let mut rx = bus.subscribe();

        for i in 0..10 {
            bus.publish(NodeEvent::Joined(record(&format!("node-{}", i))));
        }

        // The helper absorbs the lag report; the first event it hands back is
        // the oldest one still retained.
        let event = next_event(&mut rx).await.unwrap();
        assert_eq!(event.record().node_id, "node-6");

        let event = next_event(&mut rx).await.unwrap();
        assert_eq!(event.record().node_id, "node-7");
    }

    #[tokio::test]
    async fn test_closed_bus_ends_the_subscription() {
        let bus = EventBus::new(4);
        let mut rx = bus.subscribe();

        bus.publish(NodeEvent::Left(record("node-1")));
        drop(bus);

        assert!(next_event(&mut rx).await.is_some());
        assert!(next_event(&mut rx).await.is_none());
    }

    #[tokio::test]
    async fn test_every_subscriber_sees_every_event() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(NodeEvent::Died(record("node-1")));

        assert_eq!(next_event(&mut rx1).await.unwrap().name(), "died");
        assert_eq!(next_event(&mut rx2).await.unwrap().name(), "died");
    }

    #[test]
    fn test_event_carries_a_value_snapshot() {
        let mut snapshot = record("node-1");
        snapshot.status = NodeStatus::Dead;
        snapshot.missed_heartbeats = 3;

        let event = NodeEvent::Died(snapshot);

        // The snapshot is frozen at publish time.
        assert_eq!(event.record().status, NodeStatus::Dead);
        assert_eq!(event.record().missed_heartbeats, 3);
    }
}
