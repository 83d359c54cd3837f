use crate::registry::types::NodeRecord;

/// A node lifecycle notification. Each variant carries a snapshot of the
/// record as it looked when the transition was decided.
#[derive(Debug, Clone)]
pub enum NodeEvent {
    /// A previously unseen node entered the registry.
    Joined(NodeRecord),
    /// A node left gracefully and its record was removed.
    Left(NodeRecord),
    /// The health checker classified a silent node as Suspected.
    Suspected(NodeRecord),
    /// The health checker classified a silent node as Dead.
    Died(NodeRecord),
    /// A message arrived from a node that was Suspected or Dead.
    Revived(NodeRecord),
}

impl NodeEvent {
    pub fn record(&self) -> &NodeRecord {
        match self {
            NodeEvent::Joined(record)
            | NodeEvent::Left(record)
            | NodeEvent::Suspected(record)
            | NodeEvent::Died(record)
            | NodeEvent::Revived(record) => record,
        }
    }

    /// Short label for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            NodeEvent::Joined(_) => "joined",
            NodeEvent::Left(_) => "left",
            NodeEvent::Suspected(_) => "suspected",
            NodeEvent::Died(_) => "died",
            NodeEvent::Revived(_) => "revived",
        }
    }
}
