//! Informed search over one globally shared graph.
//!
//! The scheduler builds a single [`NetworkGraph`] from the full topology
//! with [`build_shared_graph`] and refreshes its costs from the traffic
//! model at the start of every tick with [`refresh_shared_graph`].  Each
//! junction then runs one A* search per incoming link and destination,
//! visiting destinations nearest-first.
//!
//! The estimate for a junction `n` and destination `c` is
//!
//! ```text
//! h = distance(n, c) / speed
//! ```
//!
//! where `speed` comes from [`HeuristicConfig::estimate_speed`].  The
//! default, the network's highest speed limit, never overshoots.

use rr_core::{CentroidId, NodeRng};
use rr_network::{TrafficModel, TrafficNetwork};

use crate::component::{insert_local_destinations, target_of, NodeTopology};
use crate::entry::RouteEntry;
use crate::graph::NetworkGraph;
use crate::protocol::{EstimateSpeed, HeuristicConfig, Protocol, TickContext};
use crate::search::astar;
use crate::table::RoutingTable;
use crate::{RoutingError, RoutingResult};

/// One entry per turning in `network`, with every cost unknown (NaN) until
/// the first [`refresh_shared_graph`].
pub fn build_shared_graph(network: &TrafficNetwork) -> NetworkGraph {
    let mut graph = NetworkGraph::new();
    for node in network.junctions() {
        for &turning in network.turnings(node) {
            if let Some(target) = target_of(network, turning.out_link) {
                graph.update_link_cost(RouteEntry::physical(node, target, turning, f32::NAN));
            }
        }
    }
    graph
}

/// Price every entry at current turning cost plus link delay; entries with
/// a missing measurement become NaN.
pub fn refresh_shared_graph(graph: &mut NetworkGraph, traffic: &dyn TrafficModel) {
    graph.recost(|r| {
        match (traffic.turning_cost(r.turning()), traffic.link_delay(r.out_link)) {
            (Some(turn), Some(link)) => turn + link,
            _ => f32::NAN,
        }
    });
}

pub struct Heuristic {
    /// Never `NetworkMax`; that is resolved to a fixed speed at construction.
    speed: EstimateSpeed,
    /// Every centroid, nearest first.
    destinations: Vec<CentroidId>,
}

impl Heuristic {
    pub fn new(config: HeuristicConfig, node: &NodeTopology, network: &TrafficNetwork) -> Self {
        let speed = match config.estimate_speed {
            EstimateSpeed::NetworkMax => EstimateSpeed::Fixed(network.max_speed_limit()),
            other => other,
        };
        Self {
            speed,
            destinations: network.centroids_by_distance(node.pos),
        }
    }

    pub fn estimate_speed(&self) -> EstimateSpeed {
        self.speed
    }

    pub fn destinations(&self) -> &[CentroidId] {
        &self.destinations
    }
}

impl Protocol for Heuristic {
    fn recompute(
        &mut self,
        node: &NodeTopology,
        ctx:  &TickContext<'_>,
        _rng: &mut NodeRng,
    ) -> RoutingResult<Vec<RoutingTable>> {
        let graph = ctx.shared_graph.ok_or(RoutingError::MissingSharedGraph(node.node))?;
        let network = ctx.network;
        let speed = self.speed;

        let mut tables = node.fresh_tables();
        for table in &mut tables {
            for &goal in &self.destinations {
                let goal_pos = network.centroid_pos[goal.index()];
                let estimate = |e: &RouteEntry| {
                    let Some(n) = e.target.node() else { return 0.0 };
                    let speed = match speed {
                        EstimateSpeed::Fixed(s) => s,
                        _ => network.link(e.via_link).speed_limit,
                    };
                    // Without a usable speed the search degrades to Dijkstra.
                    if !(speed.is_finite() && speed > 0.0) {
                        return 0.0;
                    }
                    (network.junction_pos[n.index()].distance(goal_pos) / speed) as f32
                };
                if let Some(reached) = astar(graph, node.node, table.in_link(), goal, estimate) {
                    table.update(goal, reached.first_hop, reached.cost);
                }
            }
        }
        insert_local_destinations(node, &mut tables, ctx);
        Ok(tables)
    }
}
