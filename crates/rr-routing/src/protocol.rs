//! Protocol selection and the per-tick strategy interface.
//!
//! A junction's protocol is picked once, at construction, from a
//! [`ProtocolConfig`].  [`ProtocolState`] holds the chosen protocol's
//! private state and dispatches the three tick phases to it.

use std::sync::Arc;

use rr_core::{NodeRng, Tick};
use rr_network::{TrafficModel, TrafficNetwork};

use crate::component::NodeTopology;
use crate::graph::NetworkGraph;
use crate::greedy::Greedy;
use crate::heuristic::Heuristic;
use crate::linkstate::{Advertisement, LinkState};
use crate::regional::Regional;
use crate::table::RoutingTable;
use crate::RoutingResult;

// ── Configs ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GreedyConfig {
    /// Cost written for centroids attached directly to the junction.
    pub local_destination_cost: f32,
}

impl Default for GreedyConfig {
    fn default() -> Self {
        Self { local_destination_cost: 1.0 }
    }
}

/// Speed the straight-line estimate divides by.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EstimateSpeed {
    /// Highest speed limit in the network.  The estimate never overshoots,
    /// so A* finds the same costs as Dijkstra.
    #[default]
    NetworkMax,
    /// A fixed speed.  Admissible only when no link is faster.
    Fixed(f64),
    /// Speed limit of the link the search arrived on.  Tighter on uniform
    /// networks but may overshoot, and A* can then settle on a longer route.
    ArrivalLink,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeuristicConfig {
    pub estimate_speed: EstimateSpeed,
}

/// Parameters of the forecast extension.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForecastConfig {
    /// Forecasts are sampled at `0, step, 2*step, ...` below `horizon`.
    pub horizon: f32,
    pub step:    f32,
    /// Consecutive samples closer than this are merged.
    pub compaction_threshold: f32,
    /// Forecast-error score from which the fixed 90/10 blend is used.
    pub max_error: f32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon:              900.0,
            step:                 90.0,
            compaction_threshold: 2.0,
            max_error:            0.9,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkStateConfig {
    /// `Some` turns on forecast-based costs.
    pub forecast: Option<ForecastConfig>,
}

impl LinkStateConfig {
    pub fn temporal() -> Self {
        Self { forecast: Some(ForecastConfig::default()) }
    }
}

/// Protocol kind plus its configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProtocolConfig {
    Greedy(GreedyConfig),
    Heuristic(HeuristicConfig),
    LinkState(LinkStateConfig),
    Regional(LinkStateConfig),
}

impl ProtocolConfig {
    pub fn name(&self) -> &'static str {
        match self {
            ProtocolConfig::Greedy(_) => "greedy",
            ProtocolConfig::Heuristic(_) => "heuristic",
            ProtocolConfig::LinkState(c) if c.forecast.is_some() => "temporal-link-state",
            ProtocolConfig::LinkState(_) => "link-state",
            ProtocolConfig::Regional(c) if c.forecast.is_some() => "temporal-regional",
            ProtocolConfig::Regional(_) => "regional",
        }
    }

    pub fn needs_regions(&self) -> bool {
        matches!(self, ProtocolConfig::Regional(_))
    }

    pub fn needs_shared_graph(&self) -> bool {
        matches!(self, ProtocolConfig::Heuristic(_))
    }
}

// ── Tick context ──────────────────────────────────────────────────────────────

/// Read-only inputs for one tick, shared by every junction.
pub struct TickContext<'a> {
    pub tick:         Tick,
    pub network:      &'a TrafficNetwork,
    pub traffic:      &'a dyn TrafficModel,
    /// Global graph for the heuristic protocol, refreshed at tick start.
    pub shared_graph: Option<&'a NetworkGraph>,
}

// ── Strategy trait ────────────────────────────────────────────────────────────

/// One routing protocol, driven once per tick.
///
/// # Phases
///
/// 1. [`originate`](Self::originate): build this junction's own
///    advertisements from current measurements.
/// 2. [`receive`](Self::receive): called for every advertisement a
///    neighbour delivers; return `true` to flood it on.
/// 3. [`recompute`](Self::recompute): build fresh tables, one per incoming
///    link in `node.in_links` order.
///
/// An error from `originate` or `recompute` skips the junction for this tick;
/// its previous tables stay in place.
pub trait Protocol: Send + Sync {
    fn originate(
        &mut self,
        _node: &NodeTopology,
        _ctx:  &TickContext<'_>,
    ) -> RoutingResult<Vec<Arc<Advertisement>>> {
        Ok(Vec::new())
    }

    fn receive(&mut self, _node: &NodeTopology, _ad: &Advertisement) -> bool {
        false
    }

    fn recompute(
        &mut self,
        node: &NodeTopology,
        ctx:  &TickContext<'_>,
        rng:  &mut NodeRng,
    ) -> RoutingResult<Vec<RoutingTable>>;
}

/// The protocol a junction runs, with its private state.
pub enum ProtocolState {
    Greedy(Greedy),
    Heuristic(Heuristic),
    LinkState(LinkState),
    Regional(Regional),
}

impl ProtocolState {
    pub fn new(config: &ProtocolConfig, node: &NodeTopology, network: &TrafficNetwork) -> Self {
        match config {
            ProtocolConfig::Greedy(c) => ProtocolState::Greedy(Greedy::new(c.clone(), node, network)),
            ProtocolConfig::Heuristic(c) => ProtocolState::Heuristic(Heuristic::new(c.clone(), node, network)),
            ProtocolConfig::LinkState(c) => ProtocolState::LinkState(LinkState::new(c.clone())),
            ProtocolConfig::Regional(c) => ProtocolState::Regional(Regional::new(c.clone())),
        }
    }

    fn inner(&mut self) -> &mut dyn Protocol {
        match self {
            ProtocolState::Greedy(p) => p,
            ProtocolState::Heuristic(p) => p,
            ProtocolState::LinkState(p) => p,
            ProtocolState::Regional(p) => p,
        }
    }
}

impl Protocol for ProtocolState {
    fn originate(&mut self, node: &NodeTopology, ctx: &TickContext<'_>) -> RoutingResult<Vec<Arc<Advertisement>>> {
        self.inner().originate(node, ctx)
    }

    fn receive(&mut self, node: &NodeTopology, ad: &Advertisement) -> bool {
        self.inner().receive(node, ad)
    }

    fn recompute(
        &mut self,
        node: &NodeTopology,
        ctx:  &TickContext<'_>,
        rng:  &mut NodeRng,
    ) -> RoutingResult<Vec<RoutingTable>> {
        self.inner().recompute(node, ctx, rng)
    }
}
