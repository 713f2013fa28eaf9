//! Dynamic measurements consumed by the routing protocols.
//!
//! The routing core only ever *reads* measurements.  The external traffic
//! simulation owns them and refreshes them between ticks; implement
//! [`TrafficModel`] over your simulator, or fill a [`MeasurementTable`].
//!
//! All costs are delays in simulation time units (seconds by convention).

use rustc_hash::FxHashMap;

use rr_core::LinkId;

use crate::network::{TrafficNetwork, Turning};
use crate::webster::{webster_delay, SignalTiming};

// ── Element ───────────────────────────────────────────────────────────────────

/// Something that carries a measured cost: a link or a turning.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Element {
    Link(LinkId),
    Turning(Turning),
}

// ── TrafficModel trait ────────────────────────────────────────────────────────

/// Read-only view of live and forecast traffic costs.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`: junctions may be processed on
/// several Rayon workers within one tick, all reading the same model.
pub trait TrafficModel: Send + Sync {
    /// Current delay for passing through `turning`, or `None` if the
    /// junction does not permit it or no value is measured.
    fn turning_cost(&self, turning: Turning) -> Option<f32>;

    /// Current travel delay along `link`, or `None` if unmeasured.
    fn link_delay(&self, link: LinkId) -> Option<f32>;

    /// Predicted cost of `element` `offset` time units from now.
    fn forecast(&self, _element: Element, _offset: f32) -> Option<f32> {
        None
    }

    /// Reliability score of the forecaster for `element` in `[0, 1]`;
    /// `0` is a perfect forecaster.  Defaults to fully unreliable.
    fn forecast_error(&self, _element: Element) -> f32 {
        1.0
    }
}

// ── MeasurementTable ──────────────────────────────────────────────────────────

/// Hash-map backed [`TrafficModel`] filled by the caller each tick.
#[derive(Clone, Debug, Default)]
pub struct MeasurementTable {
    turning_costs:   FxHashMap<Turning, f32>,
    link_delays:     FxHashMap<LinkId, f32>,
    /// Disturbance degree per link; the delay is scaled by `1 + degree`.
    disturbances:    FxHashMap<LinkId, f32>,
    /// Step profiles `(offset, cost)` sorted by offset.
    forecasts:       FxHashMap<Element, Vec<(f32, f32)>>,
    forecast_errors: FxHashMap<Element, f32>,
}

impl MeasurementTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed every link with its free-flow delay (`length / speed_limit`) and
    /// every turning with `turning_cost`.
    pub fn free_flow(network: &TrafficNetwork, turning_cost: f32) -> Self {
        let mut table = Self::new();
        for (i, link) in network.links.iter().enumerate() {
            table.set_link_delay(LinkId(i as u32), (link.length / link.speed_limit) as f32);
        }
        for node in network.junctions() {
            for &t in network.turnings(node) {
                table.set_turning_cost(t, turning_cost);
            }
        }
        table
    }

    pub fn set_turning_cost(&mut self, turning: Turning, cost: f32) {
        self.turning_costs.insert(turning, cost);
    }

    /// Derive the turning cost from a signal plan and the measured flow
    /// (vehicles per hour) with the Webster delay formula.
    pub fn set_signalised_turning(&mut self, turning: Turning, flow_veh_h: f32, lanes: u8, timing: SignalTiming) {
        self.turning_costs.insert(turning, webster_delay(flow_veh_h, lanes, timing));
    }

    pub fn remove_turning(&mut self, turning: Turning) {
        self.turning_costs.remove(&turning);
    }

    pub fn set_link_delay(&mut self, link: LinkId, delay: f32) {
        self.link_delays.insert(link, delay);
    }

    pub fn remove_link_delay(&mut self, link: LinkId) {
        self.link_delays.remove(&link);
    }

    /// Mark `link` as disturbed (incident, road works).  A degree of `0.5`
    /// makes the link 50 % slower.
    pub fn set_disturbance(&mut self, link: LinkId, degree: f32) {
        self.disturbances.insert(link, degree.max(0.0));
    }

    pub fn clear_disturbance(&mut self, link: LinkId) {
        self.disturbances.remove(&link);
    }

    /// Install a forecast as a step profile of `(offset, cost)` samples.
    /// The value at an offset is that of the last sample at or before it.
    pub fn set_forecast(&mut self, element: Element, mut profile: Vec<(f32, f32)>) {
        profile.sort_by(|a, b| a.0.total_cmp(&b.0));
        self.forecasts.insert(element, profile);
    }

    pub fn set_forecast_error(&mut self, element: Element, error: f32) {
        self.forecast_errors.insert(element, error.clamp(0.0, 1.0));
    }
}

impl TrafficModel for MeasurementTable {
    fn turning_cost(&self, turning: Turning) -> Option<f32> {
        self.turning_costs.get(&turning).copied()
    }

    fn link_delay(&self, link: LinkId) -> Option<f32> {
        let delay = *self.link_delays.get(&link)?;
        Some(match self.disturbances.get(&link) {
            Some(&degree) => delay * (1.0 + degree),
            None => delay,
        })
    }

    fn forecast(&self, element: Element, offset: f32) -> Option<f32> {
        let profile = self.forecasts.get(&element)?;
        let first = profile.first()?;
        let value = profile
            .iter()
            .take_while(|(t, _)| *t <= offset)
            .last()
            .unwrap_or(first)
            .1;
        Some(value)
    }

    fn forecast_error(&self, element: Element) -> f32 {
        self.forecast_errors.get(&element).copied().unwrap_or(1.0)
    }
}
