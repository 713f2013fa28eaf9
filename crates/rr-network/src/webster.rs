//! Webster delay for signalised turnings.
//!
//! ```text
//! S  = lanes * 1800            saturation flow (veh/h)
//! f  = green / cycle           green share
//! x  = min(M / (f * S), 0.99)  degree of saturation
//! d1 = cycle * (1 - f)^2 / (2 * (1 - M / S))
//! d2 = 1800 * x^2 / (M * (1 - x))
//! d  = 0.9 * (d1 + d2)
//! ```
//!
//! `M` is the measured flow in vehicles per hour.  Zero flow is replaced by
//! one vehicle per hour and `1 - M / S` is floored so the formula never
//! divides by zero.

/// Saturation flow of one lane in vehicles per hour.
const LANE_SATURATION_FLOW: f32 = 1_800.0;

/// Upper bound on the degree of saturation.
const MAX_SATURATION: f32 = 0.99;

/// Floor for the `1 - M / S` denominator.
const MIN_FLOW_SLACK: f32 = 0.01;

/// Floor for the green share of a cycle.
const MIN_GREEN_SHARE: f32 = 0.01;

/// Signal plan of the controller serving a turning.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalTiming {
    pub green_secs: f32,
    pub cycle_secs: f32,
}

/// Expected delay in seconds for a vehicle passing a signalised turning.
pub fn webster_delay(flow_veh_h: f32, lanes: u8, timing: SignalTiming) -> f32 {
    let flow = if flow_veh_h > 0.0 { flow_veh_h } else { 1.0 };
    let saturation_flow = lanes.max(1) as f32 * LANE_SATURATION_FLOW;
    let cycle = timing.cycle_secs.max(1.0);
    let green_share = (timing.green_secs / cycle).clamp(MIN_GREEN_SHARE, 1.0);

    let saturation = (flow / (green_share * saturation_flow)).min(MAX_SATURATION);
    let slack = (1.0 - flow / saturation_flow).max(MIN_FLOW_SLACK);

    let uniform = cycle * (1.0 - green_share).powi(2) / (2.0 * slack);
    let random = LANE_SATURATION_FLOW * saturation.powi(2) / (flow * (1.0 - saturation));

    0.9 * (uniform + random)
}
