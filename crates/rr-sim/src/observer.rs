//! Observer trait for progress reporting and table export.

use rr_core::{NodeId, Tick};
use rr_routing::{RoutingComponent, RoutingError, RoutingEvent};

/// Per-tick counters reported to [`RoutingObserver::on_tick_end`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Advertisements sent or forwarded this tick, counted per recipient.
    pub messages:      u64,
    /// Tables that differ from the ones they replaced.
    pub table_changes: usize,
    /// Junctions skipped this tick because of a routing error.
    pub failed_nodes:  usize,
    /// Advertisements still undelivered when the tick's flood rounds ran
    /// out.  Always `0` with unlimited rounds.
    pub in_flight:     usize,
}

/// Callbacks invoked by [`RoutingSim::run`][crate::RoutingSim::run] at key
/// points in the tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: change counter
///
/// ```rust,ignore
/// struct Changes(usize);
///
/// impl RoutingObserver for Changes {
///     fn on_routing_event(&mut self, _tick: Tick, _event: &RoutingEvent) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait RoutingObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once per committed table that changed, in ascending junction
    /// order.
    fn on_routing_event(&mut self, _tick: Tick, _event: &RoutingEvent) {}

    /// Called when a junction is skipped for this tick.  Its previous tables
    /// stay in place.
    fn on_node_error(&mut self, _tick: Tick, _node: NodeId, _error: &RoutingError) {}

    fn on_tick_end(&mut self, _tick: Tick, _stats: &TickStats) {}

    /// Called at snapshot intervals (every `config.output_interval_ticks`
    /// ticks) with every junction's component, indexed by `NodeId`.
    fn on_snapshot(&mut self, _tick: Tick, _components: &[RoutingComponent]) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`RoutingObserver`] that does nothing.
pub struct NoopObserver;

impl RoutingObserver for NoopObserver {}
