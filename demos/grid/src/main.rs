//! grid — every routing protocol on a synthetic two-region street grid.
//!
//! Runs greedy, heuristic, link-state, regional and both temporal variants
//! over the same 6 × 4 grid.  Halfway through, the main street along the
//! bottom row jams; the temporal protocols get a forecast of it a few ticks
//! early.  For each protocol the demo follows the routing tables from the
//! south-west corner to the north-east zone every tick and reports when the
//! trip first leaves the main street.
//!
//! Pass a directory as the first argument to get `routing_tables.csv` and
//! `tick_summaries.csv` per protocol.  Set `RUST_LOG=debug` for per-tick
//! logs.

mod network;

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use rr_core::{CentroidId, LinkId, NodeId, SimConfig, Tick};
use rr_network::{load_regions_reader, Element, MeasurementTable, TrafficModel, TrafficNetwork, Turning};
use rr_output::{CsvWriter, RoutingOutputObserver};
use rr_routing::{GreedyConfig, HeuristicConfig, LinkStateConfig, ProtocolConfig, RoutingComponent};
use rr_sim::{RoutingObserver, RoutingSim, RoutingSimBuilder, TickStats};

use network::{Grid, H, W, base_traffic, build_grid, free_flow};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:                  u64 = 42;
const TICK_DURATION_SECS:    u32 = 90;
const TOTAL_TICKS:           u64 = 24;
const OUTPUT_INTERVAL_TICKS: u64 = 6;
/// The main street jams at this tick.
const JAM_TICK:              u64 = 12;
/// Temporal protocols see the jam coming this many ticks early.
const FORECAST_LEAD_TICKS:   u64 = 3;
const JAM_DEGREE:            f32 = 6.0;
const FORECAST_ERROR:        f32 = 0.1;

// ── Region partition ──────────────────────────────────────────────────────────

// junction;region, west half in region 1, east half in region 2.
const REGIONS_CSV: &str = "\
0;1\n\
1;1\n\
2;1\n\
3;2\n\
4;2\n\
5;2\n\
6;1\n\
7;1\n\
8;1\n\
9;2\n\
10;2\n\
11;2\n\
12;1\n\
13;1\n\
14;1\n\
15;2\n\
16;2\n\
17;2\n\
18;1\n\
19;1\n\
20;1\n\
21;2\n\
22;2\n\
23;2\n\
";

// ── Observer ──────────────────────────────────────────────────────────────────

/// Tallies the run and forwards to the CSV observer when one is attached.
struct Tally {
    output:   Option<RoutingOutputObserver<CsvWriter>>,
    messages: u64,
    changes:  usize,
    failures: usize,
}

impl RoutingObserver for Tally {
    fn on_tick_end(&mut self, tick: Tick, stats: &TickStats) {
        self.messages += stats.messages;
        self.changes += stats.table_changes;
        self.failures += stats.failed_nodes;
        if let Some(out) = &mut self.output {
            out.on_tick_end(tick, stats);
        }
    }

    fn on_snapshot(&mut self, tick: Tick, components: &[RoutingComponent]) {
        if let Some(out) = &mut self.output {
            out.on_snapshot(tick, components);
        }
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        if let Some(out) = &mut self.output {
            out.on_sim_end(final_tick);
        }
    }
}

// ── Trip following ────────────────────────────────────────────────────────────

struct Trip {
    links: Vec<LinkId>,
    cost:  f32,
}

/// Follow next hops from `start` (entered on `in_link`) to `goal`, pricing
/// each step with current measurements.  `None` if a table has no entry or
/// the hops loop.
fn follow<T: TrafficModel>(sim: &RoutingSim<T>, start: NodeId, mut in_link: LinkId, goal: CentroidId) -> Option<Trip> {
    let net = &sim.network;
    let mut node = start;
    let mut trip = Trip { links: Vec::new(), cost: 0.0 };
    for _ in 0..=net.link_count() {
        let out = sim.next_hop(node, in_link, goal)?;
        trip.cost += sim.traffic.turning_cost(Turning::new(in_link, out))? + sim.traffic.link_delay(out)?;
        trip.links.push(out);
        match net.next_junction(out) {
            Some(next) => {
                node = next;
                in_link = out;
            }
            None => return (net.link_centroid(out) == Some(goal)).then_some(trip),
        }
    }
    None
}

// ── Scenario ──────────────────────────────────────────────────────────────────

struct Outcome {
    name:        &'static str,
    messages:    u64,
    changes:     usize,
    failures:    usize,
    /// First tick at which the trip no longer uses the main street.
    detour_tick: Option<u64>,
    final_cost:  Option<f32>,
    final_hops:  usize,
    elapsed_ms:  u128,
}

fn protocols() -> Vec<ProtocolConfig> {
    vec![
        ProtocolConfig::Greedy(GreedyConfig::default()),
        ProtocolConfig::Heuristic(HeuristicConfig::default()),
        ProtocolConfig::LinkState(LinkStateConfig::default()),
        ProtocolConfig::LinkState(LinkStateConfig::temporal()),
        ProtocolConfig::Regional(LinkStateConfig::default()),
        ProtocolConfig::Regional(LinkStateConfig::temporal()),
    ]
}

fn set_main_street_forecast(
    traffic:     &mut MeasurementTable,
    network:     &TrafficNetwork,
    main_street: &[LinkId],
    profile:     impl Fn(f32) -> Vec<(f32, f32)>,
) {
    for &l in main_street {
        traffic.set_forecast(Element::Link(l), profile(free_flow(network, l)));
        traffic.set_forecast_error(Element::Link(l), FORECAST_ERROR);
    }
}

fn run_protocol(protocol: ProtocolConfig, out_dir: Option<&Path>) -> Result<Outcome> {
    let name = protocol.name();
    let Grid { network, origin, origin_link, goal, main_street } = build_grid()?;
    let regions = load_regions_reader(Cursor::new(REGIONS_CSV))?;
    let traffic = base_traffic(&network);

    let config = SimConfig {
        start_unix_secs:       1_700_000_000,
        tick_duration_secs:    TICK_DURATION_SECS,
        total_ticks:           TOTAL_TICKS,
        seed:                  SEED,
        num_threads:           None,
        output_interval_ticks: OUTPUT_INTERVAL_TICKS,
        flood_rounds:          None,
    };

    let output = match out_dir {
        Some(dir) => {
            let dir = dir.join(name);
            std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
            Some(RoutingOutputObserver::new(CsvWriter::new(&dir)?, &config))
        }
        None => None,
    };
    let mut tally = Tally { output, messages: 0, changes: 0, failures: 0 };

    let network = Arc::new(network);
    let mut sim = RoutingSimBuilder::new(config, Arc::clone(&network), traffic, protocol)
        .regions(regions)
        .build()?;

    let jam_factor = 1.0 + JAM_DEGREE;
    let lead_secs = (FORECAST_LEAD_TICKS * TICK_DURATION_SECS as u64) as f32;

    let start = Instant::now();
    let mut detour_tick = None;
    while sim.clock.current_tick < sim.config.end_tick() {
        let now = sim.clock.current_tick.0;
        if now == JAM_TICK - FORECAST_LEAD_TICKS {
            set_main_street_forecast(&mut sim.traffic, &network, &main_street, |free| {
                vec![(0.0, free), (lead_secs, free * jam_factor)]
            });
        }
        if now == JAM_TICK {
            for &l in &main_street {
                sim.traffic.set_disturbance(l, JAM_DEGREE);
            }
            set_main_street_forecast(&mut sim.traffic, &network, &main_street, |free| {
                vec![(0.0, free * jam_factor)]
            });
        }

        sim.step(&mut tally);

        if detour_tick.is_none() && now + FORECAST_LEAD_TICKS >= JAM_TICK {
            let detoured = follow(&sim, origin, origin_link, goal)
                .is_some_and(|trip| !trip.links.iter().any(|l| main_street.contains(l)));
            if detoured {
                detour_tick = Some(now);
            }
        }
    }
    tally.on_sim_end(sim.clock.current_tick);
    let elapsed_ms = start.elapsed().as_millis();

    if let Some(e) = tally.output.as_mut().and_then(RoutingOutputObserver::take_error) {
        return Err(e).context(format!("writing output for {name}"));
    }

    let trip = follow(&sim, origin, origin_link, goal);
    Ok(Outcome {
        name,
        messages:   tally.messages,
        changes:    tally.changes,
        failures:   tally.failures,
        detour_tick,
        final_cost: trip.as_ref().map(|t| t.cost),
        final_hops: trip.as_ref().map_or(0, |t| t.links.len()),
        elapsed_ms,
    })
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let out_dir: Option<PathBuf> = std::env::args_os().nth(1).map(PathBuf::from);

    println!("=== grid — decentralised routing on a {W} × {H} street grid ===");
    println!(
        "Ticks: {TOTAL_TICKS} × {TICK_DURATION_SECS} s  |  Main street jams at tick {JAM_TICK}  |  Forecast {FORECAST_LEAD_TICKS} ticks early"
    );
    if let Some(dir) = &out_dir {
        println!("Writing CSV output under {}", dir.display());
    }
    println!();

    let mut outcomes = Vec::new();
    for protocol in protocols() {
        outcomes.push(run_protocol(protocol, out_dir.as_deref())?);
    }

    println!(
        "{:<22} {:>9} {:>9} {:>7} {:>8} {:>10} {:>5} {:>8}",
        "protocol", "messages", "changes", "failed", "detour", "trip cost", "hops", "time"
    );
    for o in &outcomes {
        let detour = o.detour_tick.map_or_else(|| "-".to_string(), |t| t.to_string());
        let cost = o.final_cost.map_or_else(|| "no route".to_string(), |c| format!("{c:.1}"));
        println!(
            "{:<22} {:>9} {:>9} {:>7} {:>8} {:>10} {:>5} {:>6}ms",
            o.name, o.messages, o.changes, o.failures, detour, cost, o.final_hops, o.elapsed_ms
        );
    }
    Ok(())
}
