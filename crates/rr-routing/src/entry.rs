//! Edge records shared by every graph-based protocol.

use std::fmt;

use rr_core::{CentroidId, LinkId, NodeId};
use rr_network::Turning;

/// `true` for a usable cost: finite and strictly positive.  Everything else
/// (NaN, negative, zero, infinite) means "unreachable or not yet known".
#[inline]
pub fn cost_is_valid(cost: f32) -> bool {
    cost.is_finite() && cost > 0.0
}

// ── Target ────────────────────────────────────────────────────────────────────

/// Where a route entry leads: another junction or a terminal centroid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Target {
    Node(NodeId),
    Centroid(CentroidId),
}

impl Target {
    pub fn node(self) -> Option<NodeId> {
        match self {
            Target::Node(n) => Some(n),
            Target::Centroid(_) => None,
        }
    }

    pub fn centroid(self) -> Option<CentroidId> {
        match self {
            Target::Centroid(c) => Some(c),
            Target::Node(_) => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Node(n) => write!(f, "{n}"),
            Target::Centroid(c) => write!(f, "{c}"),
        }
    }
}

// ── RouteEntry ────────────────────────────────────────────────────────────────

/// One edge of a routing graph.
///
/// A vehicle that reaches `source` on `in_link` and leaves on `out_link`
/// arrives at `target` on `via_link` after `cost` time units.  For a
/// physical entry (one turning plus the following link) `via_link` equals
/// `out_link`; aggregated entries summarise a multi-hop path and arrive on
/// the last link of that path.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteEntry {
    pub source:   NodeId,
    pub target:   Target,
    pub in_link:  LinkId,
    pub out_link: LinkId,
    pub via_link: LinkId,
    pub cost:     f32,
}

impl RouteEntry {
    /// Entry for `turning` at `source` followed by its out-link.
    pub fn physical(source: NodeId, target: Target, turning: Turning, cost: f32) -> Self {
        Self {
            source,
            target,
            in_link:  turning.in_link,
            out_link: turning.out_link,
            via_link: turning.out_link,
            cost,
        }
    }

    #[inline]
    pub fn turning(&self) -> Turning {
        Turning::new(self.in_link, self.out_link)
    }

    #[inline]
    pub fn is_reachable(&self) -> bool {
        cost_is_valid(self.cost)
    }
}
