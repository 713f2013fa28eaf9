//! The `RoutingSim` struct and its tick loop.

use std::sync::Arc;

use rr_core::{CentroidId, LinkId, NodeId, SimClock, SimConfig, Tick};
use rr_network::{TrafficModel, TrafficNetwork};
use rr_routing::{refresh_shared_graph, Delivery, NetworkGraph, RoutingComponent, RoutingError, TickContext};

use crate::{RoutingObserver, TickStats};

// ── RoutingSim ────────────────────────────────────────────────────────────────

/// The round-based routing scheduler.
///
/// `RoutingSim<T>` owns one [`RoutingComponent`] per junction and drives
/// every junction through the same tick:
///
/// 1. **Refresh**: re-price the shared graph from the traffic model, if any
///    junction runs the heuristic protocol.
/// 2. **Originate** (optionally parallel): each junction builds its own
///    advertisements.
/// 3. **Flood**: deliveries are grouped into per-junction inboxes and
///    handed over in rounds.  Copies forwarded in a round are delivered in
///    the next one.  Rounds continue until nothing is in flight or
///    `config.flood_rounds` is reached; leftovers carry over to the next
///    tick.
/// 4. **Recompute** (optionally parallel): each junction builds and commits
///    fresh tables.
///
/// Results of the parallel phases are applied in ascending `NodeId` order,
/// so a run is identical with and without the `parallel` feature.
///
/// A junction whose originate or recompute step fails is skipped for the
/// tick: the error goes to [`RoutingObserver::on_node_error`] and its
/// previous tables stay in place.
///
/// Create via [`RoutingSimBuilder`][crate::RoutingSimBuilder].
pub struct RoutingSim<T: TrafficModel> {
    /// Global configuration (total ticks, seed, flood rounds, …).
    pub config: SimConfig,

    pub clock: SimClock,

    /// Static topology, shared with whatever drives the traffic model.
    pub network: Arc<TrafficNetwork>,

    /// Live measurements.  Update between ticks; the scheduler only reads.
    pub traffic: T,

    /// One component per junction, indexed by `NodeId`.
    pub components: Vec<RoutingComponent>,

    /// Global graph for the heuristic protocol.  `None` when no junction
    /// needs it.
    pub shared_graph: Option<NetworkGraph>,

    /// Deliveries left over when the previous tick ran out of flood rounds.
    pub(crate) pending: Vec<Delivery>,
}

impl<T: TrafficModel> RoutingSim<T> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run from the current tick to `config.end_tick()`.
    ///
    /// Nothing here fails: a junction that cannot compute its tables is
    /// reported through [`RoutingObserver::on_node_error`].
    pub fn run<O: RoutingObserver>(&mut self, observer: &mut O) {
        while self.clock.current_tick < self.config.end_tick() {
            self.step(observer);
        }
        observer.on_sim_end(self.clock.current_tick);
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    pub fn run_ticks<O: RoutingObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.step(observer);
        }
    }

    /// Run a single tick and advance the clock.
    pub fn step<O: RoutingObserver>(&mut self, observer: &mut O) -> TickStats {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);
        let stats = self.process_tick(now, observer);
        observer.on_tick_end(now, &stats);
        if self.config.output_interval_ticks > 0
            && now.0.is_multiple_of(self.config.output_interval_ticks)
        {
            observer.on_snapshot(now, &self.components);
        }
        self.clock.advance();
        stats
    }

    pub fn component(&self, node: NodeId) -> Option<&RoutingComponent> {
        self.components.get(node.index())
    }

    /// Out-link a vehicle at `node`, arriving on `in_link`, should take
    /// towards `destination`.  `None` while no route is known.
    pub fn next_hop(&self, node: NodeId, in_link: LinkId, destination: CentroidId) -> Option<LinkId> {
        self.component(node)?.next_hop(in_link, destination)
    }

    /// Deliveries that will be handed over at the start of the next tick.
    pub fn pending(&self) -> &[Delivery] {
        &self.pending
    }

    /// Advertisements sent or forwarded by all junctions so far.
    pub fn messages_sent(&self) -> u64 {
        self.components.iter().map(RoutingComponent::messages_sent).sum()
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick<O: RoutingObserver>(&mut self, now: Tick, observer: &mut O) -> TickStats {
        let mut stats = TickStats::default();
        let n = self.components.len();

        // ── Phase 1: refresh the shared graph ─────────────────────────────
        if let Some(graph) = &mut self.shared_graph {
            refresh_shared_graph(graph, &self.traffic);
        }

        // Explicit field borrows so the borrow checker sees disjoint access.
        let ctx = TickContext {
            tick:         now,
            network:      &self.network,
            traffic:      &self.traffic,
            shared_graph: self.shared_graph.as_ref(),
        };
        let components = &mut self.components;

        // ── Phase 2: originate ────────────────────────────────────────────
        let originated = map_nodes(components, vec![(); n], |c, ()| c.originate(&ctx));

        let mut failed = vec![false; n];
        let mut in_flight = std::mem::take(&mut self.pending);
        for (i, result) in originated.into_iter().enumerate() {
            match result {
                Ok(out) => {
                    stats.messages += out.len() as u64;
                    in_flight.extend(out);
                }
                Err(e) => {
                    failed[i] = true;
                    report_failure(observer, now, NodeId(i as u32), &e);
                }
            }
        }

        // ── Phase 3: flood ────────────────────────────────────────────────
        let mut rounds = 0u32;
        while !in_flight.is_empty() && self.config.flood_rounds.is_none_or(|max| rounds < max) {
            let mut inboxes: Vec<Vec<Delivery>> = vec![Vec::new(); n];
            for d in in_flight.drain(..) {
                if let Some(inbox) = inboxes.get_mut(d.to.index()) {
                    inbox.push(d);
                }
            }

            let forwarded = map_nodes(components, inboxes, |c, inbox| {
                let mut out = Vec::new();
                for d in &inbox {
                    out.extend(c.receive(d));
                }
                out
            });
            for out in forwarded {
                stats.messages += out.len() as u64;
                in_flight.extend(out);
            }
            rounds += 1;
        }
        stats.in_flight = in_flight.len();
        self.pending = in_flight;

        // ── Phase 4: recompute ────────────────────────────────────────────
        let skip = failed.clone();
        let recomputed = map_nodes(components, skip, |c, skip| (!skip).then(|| c.recompute(&ctx)));

        for (i, result) in recomputed.into_iter().enumerate() {
            match result {
                None => {}
                Some(Ok(events)) => {
                    stats.table_changes += events.len();
                    for event in &events {
                        observer.on_routing_event(now, event);
                    }
                }
                Some(Err(e)) => {
                    failed[i] = true;
                    report_failure(observer, now, NodeId(i as u32), &e);
                }
            }
        }
        stats.failed_nodes = failed.iter().filter(|&&f| f).count();

        tracing::debug!(
            tick = %now,
            rounds,
            messages = stats.messages,
            table_changes = stats.table_changes,
            failed_nodes = stats.failed_nodes,
            in_flight = stats.in_flight,
            "tick complete"
        );
        stats
    }
}

fn report_failure<O: RoutingObserver>(
    observer: &mut O,
    now:      Tick,
    node:     NodeId,
    error:    &RoutingError,
) {
    tracing::warn!(tick = %now, node = %node, error = %error, "junction skipped this tick");
    observer.on_node_error(now, node, error);
}

/// Apply `f` to every component with its matching input.  Results come back
/// in component order.
///
/// With the `parallel` Cargo feature the calls run on Rayon's thread pool.
fn map_nodes<I, R, F>(components: &mut [RoutingComponent], inputs: Vec<I>, f: F) -> Vec<R>
where
    I: Send,
    R: Send,
    F: Fn(&mut RoutingComponent, I) -> R + Sync + Send,
{
    #[cfg(not(feature = "parallel"))]
    {
        components.iter_mut().zip(inputs).map(|(c, input)| f(c, input)).collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        components
            .par_iter_mut()
            .zip(inputs.into_par_iter())
            .map(|(c, input)| f(c, input))
            .collect()
    }
}
