//! Synthetic street grid: `W × H` signalised junctions, 200 m blocks, one
//! zone centroid hanging off every junction.
//!
//! ```text
//!  18 ── 19 ── 20 ┆ 21 ── 22 ── 23
//!  │     │     │  ┆  │     │     │
//!  12 ── 13 ── 14 ┆ 15 ── 16 ── 17
//!  │     │     │  ┆  │     │     │
//!   6 ──  7 ──  8 ┆  9 ── 10 ── 11
//!  │     │     │  ┆  │     │     │
//!   0 ━━  1 ━━  2 ┆  3 ━━  4 ━━  5      ━━ main street (two lanes, faster)
//!      region 1   ┆     region 2
//! ```

use rr_core::{CentroidId, LinkId, NodeId, Point};
use rr_network::{LinkEnd, MeasurementTable, SignalTiming, TrafficNetwork, TrafficNetworkBuilder};

pub const W: usize = 6;
pub const H: usize = 4;

const BLOCK_M:          f64 = 200.0;
const ACCESS_M:         f64 = 50.0;
const STREET_SPEED:     f64 = 8.3;  // 30 km/h
const MAIN_SPEED:       f64 = 13.9; // 50 km/h
const ACCESS_SPEED:     f64 = 5.0;

const FLOW_VEH_H:       f32 = 300.0;
const TIMING: SignalTiming = SignalTiming { green_secs: 30.0, cycle_secs: 60.0 };

pub struct Grid {
    pub network:     TrafficNetwork,
    /// Where the demo trip starts: junction 0, entered from its centroid.
    pub origin:      NodeId,
    pub origin_link: LinkId,
    /// The north-east corner's centroid.
    pub goal:        CentroidId,
    /// Eastbound links of the bottom row.
    pub main_street: Vec<LinkId>,
}

pub fn build_grid() -> anyhow::Result<Grid> {
    let mut b = TrafficNetworkBuilder::new();
    let junctions: Vec<NodeId> = (0..W * H)
        .map(|i| b.add_junction(Point::new((i % W) as f64 * BLOCK_M, (i / W) as f64 * BLOCK_M)))
        .collect();

    let mut centroids = Vec::with_capacity(junctions.len());
    let mut access = Vec::with_capacity(junctions.len());
    for (i, &j) in junctions.iter().enumerate() {
        let pos = Point::new((i % W) as f64 * BLOCK_M + ACCESS_M, (i / W) as f64 * BLOCK_M + ACCESS_M);
        let c = b.add_centroid(pos);
        access.push(b.add_link(LinkEnd::Centroid(c), LinkEnd::Junction(j), ACCESS_M, ACCESS_SPEED));
        b.add_link(LinkEnd::Junction(j), LinkEnd::Centroid(c), ACCESS_M, ACCESS_SPEED);
        centroids.push(c);
    }

    let mut main_street = Vec::new();
    for (i, &j) in junctions.iter().enumerate() {
        if i % W + 1 < W {
            let east = junctions[i + 1];
            if i / W == 0 {
                let ab = b.add_link_with_lanes(LinkEnd::Junction(j), LinkEnd::Junction(east), BLOCK_M, MAIN_SPEED, 2);
                b.add_link_with_lanes(LinkEnd::Junction(east), LinkEnd::Junction(j), BLOCK_M, MAIN_SPEED, 2);
                main_street.push(ab);
            } else {
                b.add_road(j, east, BLOCK_M, STREET_SPEED);
            }
        }
        if i / W + 1 < H {
            b.add_road(j, junctions[i + W], BLOCK_M, STREET_SPEED);
        }
    }
    for &j in &junctions {
        b.connect_all(j);
    }

    let network = b.build()?;
    Ok(Grid {
        origin:      junctions[0],
        origin_link: access[0],
        goal:        centroids[W * H - 1],
        main_street,
        network,
    })
}

/// Free-flow link delays and Webster delays on every turning.
pub fn base_traffic(network: &TrafficNetwork) -> MeasurementTable {
    let mut traffic = MeasurementTable::free_flow(network, 1.0);
    for node in network.junctions() {
        for &t in network.turnings(node) {
            let lanes = network.link(t.in_link).lanes;
            traffic.set_signalised_turning(t, FLOW_VEH_H, lanes, TIMING);
        }
    }
    traffic
}

/// Free-flow travel time of `link`.
pub fn free_flow(network: &TrafficNetwork, link: LinkId) -> f32 {
    let l = network.link(link);
    (l.length / l.speed_limit) as f32
}
