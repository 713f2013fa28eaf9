//! Simulation time model.
//!
//! Routing runs on a single global discrete clock.  Every junction performs
//! its protocol once per `Tick`; `SimClock` maps ticks onto wall-clock
//! seconds:
//!
//!   wall_time = start_unix_secs + tick * tick_duration_secs
//!
//! Traffic measurements are refreshed by the external model between ticks,
//! so a typical tick length is the measurement interval (default 90 s).

use std::fmt;

use crate::{CoreError, CoreResult};

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute protocol round counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// The tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Converts between tick counts and Unix wall-clock seconds.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Unix timestamp (seconds since epoch) of tick 0.
    pub start_unix_secs: i64,
    /// Real seconds represented by one tick.
    pub tick_duration_secs: u32,
    /// The current tick, advanced once per protocol round.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(start_unix_secs: i64, tick_duration_secs: u32) -> Self {
        Self {
            start_unix_secs,
            tick_duration_secs,
            current_tick: Tick::ZERO,
        }
    }

    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = self.current_tick.offset(1);
    }

    /// Simulated seconds since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> i64 {
        self.current_tick.0 as i64 * self.tick_duration_secs as i64
    }

    /// Unix timestamp of an arbitrary tick.
    #[inline]
    pub fn unix_secs_at(&self, tick: Tick) -> i64 {
        self.start_unix_secs + tick.0 as i64 * self.tick_duration_secs as i64
    }

    #[inline]
    pub fn current_unix_secs(&self) -> i64 {
        self.unix_secs_at(self.current_tick)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.elapsed_secs().max(0);
        write!(
            f,
            "{} ({:02}:{:02}:{:02})",
            self.current_tick,
            secs / 3_600,
            (secs % 3_600) / 60,
            secs % 60,
        )
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level run configuration for the routing scheduler.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Unix timestamp for tick 0.
    pub start_unix_secs: i64,

    /// Seconds per tick.  Default: 90.
    pub tick_duration_secs: u32,

    /// Total ticks to run.
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed always produces identical tables.
    pub seed: u64,

    /// Worker thread count for the `parallel` feature.  `None` uses all
    /// logical cores.
    pub num_threads: Option<usize>,

    /// Report snapshots every N ticks.  `0` disables snapshots.
    pub output_interval_ticks: u64,

    /// Advertisement delivery rounds per tick.
    ///
    /// `None` floods until no message is in flight, so a tick ends with a
    /// converged link-state view.  `Some(n)` caps the rounds; messages still
    /// queued are delivered at the start of the next tick.  Messages sent in
    /// a round are never visible before the following round.
    pub flood_rounds: Option<u32>,
}

impl SimConfig {
    /// The tick at which the run ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.start_unix_secs, self.tick_duration_secs)
    }

    /// Reject settings the scheduler cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.tick_duration_secs == 0 {
            return Err(CoreError::InvalidConfig { field: "tick_duration_secs", reason: "must be positive" });
        }
        if self.flood_rounds == Some(0) {
            return Err(CoreError::InvalidConfig {
                field:  "flood_rounds",
                reason: "must allow at least one round",
            });
        }
        if self.num_threads == Some(0) {
            return Err(CoreError::InvalidConfig { field: "num_threads", reason: "must be positive" });
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start_unix_secs:       0,
            tick_duration_secs:    90,
            total_ticks:           1,
            seed:                  0,
            num_threads:           None,
            output_interval_ticks: 1,
            flood_rounds:          None,
        }
    }
}
