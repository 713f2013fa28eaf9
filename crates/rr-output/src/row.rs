//! Plain rows handed to output backends.

use rr_core::{NodeId, Tick};
use rr_routing::TableRow;

/// One destination in one junction's table at a snapshot tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutingTableRow {
    pub tick:        u64,
    pub node:        u32,
    pub in_link:     u32,
    pub destination: u32,
    pub next_hop:    u32,
    pub cost:        f32,
}

impl RoutingTableRow {
    pub fn new(tick: Tick, node: NodeId, row: TableRow) -> Self {
        Self {
            tick:        tick.0,
            node:        node.0,
            in_link:     row.in_link.0,
            destination: row.destination.0,
            next_hop:    row.next_hop.0,
            cost:        row.cost,
        }
    }
}

/// Counters for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:           u64,
    pub unix_time_secs: i64,
    /// Advertisements sent or forwarded, per recipient.
    pub messages:       u64,
    pub table_changes:  u64,
    pub failed_nodes:   u64,
}
