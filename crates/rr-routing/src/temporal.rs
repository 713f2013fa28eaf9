//! Forecast-based costs for the link-state protocols.
//!
//! # Profiles
//!
//! When a junction builds an entry for turning `(in, out)`, it samples the
//! traffic model's forecasts at offsets `0, step, 2*step, ...` below the
//! horizon:
//!
//! ```text
//! turning(t) = t == 0 ? current turning cost : forecast(turning, t)
//! link(t)    = forecast(out, t + turning(t))
//! ```
//!
//! A missing or invalid forecast falls back to the current measurement.
//! Each series is compacted before it is advertised: a sample that differs
//! from the previous raw sample by more than the threshold starts a new
//! step, otherwise it is averaged into the last step.
//!
//! # Pricing
//!
//! Dijkstra reaches an entry at accumulated cost `g`, which doubles as the
//! predicted arrival time.  Each series is read at the sample whose offset is
//! nearest to `g` (no interpolation) and blended with the static cost by the
//! forecaster's error score `e`:
//!
//! ```text
//! e <  max_error:  (1 - e) * forecast + e * static
//! e >= max_error:  0.1 * forecast + 0.9 * static
//! ```

use rr_network::{Element, TrafficModel, Turning};

use crate::entry::cost_is_valid;
use crate::protocol::ForecastConfig;

/// Compacted forecasts for one turning and the link after it.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForecastProfile {
    /// `(offset, predicted cost)` steps, ascending by offset.
    pub turning:       Vec<(f32, f32)>,
    pub link:          Vec<(f32, f32)>,
    /// Costs measured when the profile was sampled.
    pub turning_cost:  f32,
    pub link_cost:     f32,
    pub turning_error: f32,
    pub link_error:    f32,
}

impl ForecastProfile {
    pub fn sample(
        traffic:      &dyn TrafficModel,
        turning:      Turning,
        turning_cost: f32,
        link_cost:    f32,
        config:       &ForecastConfig,
    ) -> Self {
        let turning_el = Element::Turning(turning);
        let link_el = Element::Link(turning.out_link);

        let mut turning_raw = Vec::new();
        let mut link_raw = Vec::new();
        for t in offsets(config) {
            let tc = if t == 0.0 {
                turning_cost
            } else {
                valid_or(traffic.forecast(turning_el, t), turning_cost)
            };
            let lc = valid_or(traffic.forecast(link_el, t + tc), link_cost);
            turning_raw.push((t, Some(tc)));
            link_raw.push((t, Some(lc)));
        }

        Self {
            turning: compact(turning_raw, config.compaction_threshold),
            link: compact(link_raw, config.compaction_threshold),
            turning_cost,
            link_cost,
            turning_error: traffic.forecast_error(turning_el),
            link_error: traffic.forecast_error(link_el),
        }
    }

    /// Blended cost of the turning plus link when reached at time `g`.
    pub fn step_cost(&self, g: f32, max_error: f32) -> f32 {
        let turning = nearest_sample(&self.turning, g).unwrap_or(self.turning_cost);
        let link = nearest_sample(&self.link, g).unwrap_or(self.link_cost);
        blend(self.turning_cost, turning, self.turning_error, max_error)
            + blend(self.link_cost, link, self.link_error, max_error)
    }
}

fn offsets(config: &ForecastConfig) -> impl Iterator<Item = f32> + '_ {
    let step = config.step.max(f32::EPSILON);
    (0..)
        .map(move |i| i as f32 * step)
        .take_while(move |&t| t < config.horizon)
}

fn valid_or(value: Option<f32>, fallback: f32) -> f32 {
    value.filter(|&v| cost_is_valid(v)).unwrap_or(fallback)
}

/// Merge consecutive samples whose values differ by at most `threshold`.
///
/// The first present sample opens the first step.  A later sample opens a
/// new step if it differs from the previous raw sample by more than
/// `threshold`; otherwise the last step's value becomes the mean of itself
/// and the sample.  Missing samples are skipped.
pub fn compact(samples: impl IntoIterator<Item = (f32, Option<f32>)>, threshold: f32) -> Vec<(f32, f32)> {
    let mut out: Vec<(f32, f32)> = Vec::new();
    let mut previous: Option<f32> = None;
    for (t, value) in samples {
        let Some(v) = value else { continue };
        match (previous, out.last_mut()) {
            (Some(p), Some(last)) if (p - v).abs() <= threshold => last.1 = (last.1 + v) / 2.0,
            _ => out.push((t, v)),
        }
        previous = Some(v);
    }
    out
}

/// Value of the sample whose offset is nearest to `at`; the earlier sample
/// wins a tie.  Samples with offset or value at or below -1 are ignored.
pub fn nearest_sample(profile: &[(f32, f32)], at: f32) -> Option<f32> {
    let mut best: Option<(f32, f32)> = None;
    for &(t, v) in profile {
        if t <= -1.0 || v <= -1.0 {
            continue;
        }
        let diff = (t - at).abs();
        if best.is_none_or(|(d, _)| diff < d) {
            best = Some((diff, v));
        }
    }
    best.map(|(_, v)| v)
}

/// Error-weighted mix of a static cost and its forecast.
pub fn blend(static_cost: f32, forecast: f32, error: f32, max_error: f32) -> f32 {
    if error < max_error {
        (1.0 - error) * forecast + error * static_cost
    } else {
        0.1 * forecast + 0.9 * static_cost
    }
}
