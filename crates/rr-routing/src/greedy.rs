//! Sector-based geographic forwarding.
//!
//! The full circle around the junction is cut into one equal sector per
//! outgoing link.  Out-links that lead to another junction and every
//! non-local centroid are placed in the sector(s) containing their bearing
//! from the junction; a bearing exactly on a boundary belongs to both
//! neighbouring sectors, and `0` and `2π` are the same boundary.
//!
//! Each tick, for every incoming link and every sector, the cheapest turning
//! into one of the sector's out-links becomes the route to each of the
//! sector's centroids.  Nothing is exchanged with other junctions.

use std::f64::consts::TAU;

use rr_core::{CentroidId, LinkId, NodeRng};
use rr_network::{TrafficNetwork, Turning};

use crate::component::NodeTopology;
use crate::entry::cost_is_valid;
use crate::protocol::{GreedyConfig, Protocol, TickContext};
use crate::table::RoutingTable;
use crate::RoutingResult;

/// Cost used for a turning the junction does not permit or has no
/// measurement for.
const NO_TURNING: f32 = -1.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Sector {
    pub start:     f64,
    pub end:       f64,
    pub out_links: Vec<LinkId>,
    pub centroids: Vec<CentroidId>,
}

/// `true` if `arc` lies in `[start, end]`, treating `0` and `2π` as equal.
pub fn in_sector(start: f64, end: f64, arc: f64) -> bool {
    (start <= arc && arc <= end) || (start == 0.0 && arc == TAU) || (end == TAU && arc == 0.0)
}

pub struct Greedy {
    config:  GreedyConfig,
    sectors: Vec<Sector>,
}

impl Greedy {
    pub fn new(config: GreedyConfig, node: &NodeTopology, network: &TrafficNetwork) -> Self {
        let n = node.out_links.len();
        let bounds: Vec<f64> = (0..=n)
            .map(|i| if i == n { TAU } else { i as f64 * TAU / n as f64 })
            .collect();

        let out_bearings: Vec<(LinkId, f64)> = node
            .out_links
            .iter()
            .filter_map(|&l| {
                let next = network.next_junction(l)?;
                Some((l, node.pos.bearing_to(network.junction_pos[next.index()])))
            })
            .collect();
        let centroid_bearings: Vec<(CentroidId, f64)> = network
            .centroids()
            .filter(|&c| !node.is_local_destination(c))
            .map(|c| (c, node.pos.bearing_to(network.centroid_pos[c.index()])))
            .collect();

        let sectors = bounds
            .windows(2)
            .map(|w| {
                let (start, end) = (w[0], w[1]);
                Sector {
                    start,
                    end,
                    out_links: out_bearings
                        .iter()
                        .filter(|&&(_, arc)| in_sector(start, end, arc))
                        .map(|&(l, _)| l)
                        .collect(),
                    centroids: centroid_bearings
                        .iter()
                        .filter(|&&(_, arc)| in_sector(start, end, arc))
                        .map(|&(c, _)| c)
                        .collect(),
                }
            })
            .collect();

        Self { config, sectors }
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    /// Pick the out-link of `sector` to use for traffic arriving on
    /// `in_link`.
    ///
    /// Exactly two candidates are compared directly and an exact tie is
    /// settled by a coin flip; the winner may be unusable.  With any other
    /// number of candidates the cheapest usable one wins.
    fn choose(
        sector:  &Sector,
        node:    &NodeTopology,
        in_link: LinkId,
        ctx:     &TickContext<'_>,
        rng:     &mut NodeRng,
    ) -> Option<(LinkId, f32)> {
        let cost_of = |out: LinkId| {
            let turning = Turning::new(in_link, out);
            if !node.has_turning(turning) {
                return NO_TURNING;
            }
            ctx.traffic.turning_cost(turning).unwrap_or(NO_TURNING)
        };

        match sector.out_links.as_slice() {
            &[a, b] => {
                let (ca, cb) = (cost_of(a), cost_of(b));
                if ca < cb || (ca == cb && rng.unit() <= 0.5) {
                    Some((a, ca))
                } else {
                    Some((b, cb))
                }
            }
            links => links
                .iter()
                .map(|&l| (l, cost_of(l)))
                .filter(|&(_, c)| c > 0.0)
                .min_by(|a, b| a.1.total_cmp(&b.1)),
        }
    }
}

impl Protocol for Greedy {
    fn recompute(
        &mut self,
        node: &NodeTopology,
        ctx:  &TickContext<'_>,
        rng:  &mut NodeRng,
    ) -> RoutingResult<Vec<RoutingTable>> {
        let mut tables = node.fresh_tables();
        for table in &mut tables {
            for sector in &self.sectors {
                let Some((out, cost)) = Self::choose(sector, node, table.in_link(), ctx, rng) else {
                    continue;
                };
                if !cost_is_valid(cost) {
                    continue;
                }
                for &c in &sector.centroids {
                    if table.delay(c).is_none_or(|old| cost <= old) {
                        table.insert(c, out, cost);
                    }
                }
            }
            for &(out, c) in &node.local_destinations {
                table.insert(c, out, self.config.local_destination_cost);
            }
        }
        Ok(tables)
    }
}
