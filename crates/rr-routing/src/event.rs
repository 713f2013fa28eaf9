//! Typed notifications emitted by routing components.

use rr_core::{LinkId, NodeId};

/// Something an external consumer may want to react to.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoutingEvent {
    /// The committed table for `in_link` at `node` differs from the one it
    /// replaced.  `routes` is the number of destinations now known.
    TableChanged {
        node:    NodeId,
        in_link: LinkId,
        routes:  usize,
    },
}

impl RoutingEvent {
    pub fn node(&self) -> NodeId {
        match self {
            RoutingEvent::TableChanged { node, .. } => *node,
        }
    }
}
