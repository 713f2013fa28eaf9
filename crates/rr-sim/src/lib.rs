//! `rr-sim` — round-based scheduler for the road-routing framework.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① Refresh:     re-price the shared graph (heuristic protocol only).
//!   ② Originate:   every junction builds its own advertisements
//!                  (parallel with the `parallel` feature).
//!   ③ Flood:       repeat until nothing is in flight or flood_rounds is hit:
//!                    group deliveries by recipient
//!                    receive → accepted copies go out in the next round
//!                  leftovers are delivered first thing next tick.
//!   ④ Recompute:   every junction that did not fail builds fresh tables
//!                  and commits them; changes become RoutingEvents.
//! ```
//!
//! A junction that fails in ② or ④ (usually a missing measurement) keeps
//! its previous tables for the tick.  The error is logged and reported to
//! the observer; the run goes on.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                      |
//! |------------|-------------------------------------------------------------|
//! | `parallel` | Runs phases ②–④ per junction on Rayon's thread pool.        |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use rr_core::SimConfig;
//! use rr_network::MeasurementTable;
//! use rr_routing::{LinkStateConfig, ProtocolConfig};
//! use rr_sim::{NoopObserver, RoutingSimBuilder};
//!
//! let traffic = MeasurementTable::free_flow(&network, 5.0);
//! let mut sim = RoutingSimBuilder::new(config, network, traffic, ProtocolConfig::LinkState(LinkStateConfig::default()))
//!     .build()?;
//! sim.run(&mut NoopObserver);
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;


pub use builder::RoutingSimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, RoutingObserver, TickStats};
pub use sim::RoutingSim;
