//! `rr-core` — foundational types for the road-routing framework.
//!
//! Every other `rr-*` crate depends on this one.  It has no `rr-*`
//! dependencies and only `rand` and `thiserror` externally, plus optional
//! `serde`.
//!
//! # What lives here
//!
//! | Module    | Contents                                                |
//! |-----------|---------------------------------------------------------|
//! | [`ids`]   | `NodeId`, `LinkId`, `CentroidId`, `RegionId`            |
//! | [`geo`]   | `Point`, planar distance, bearing in `[0, 2π)`          |
//! | [`time`]  | `Tick`, `SimClock`, `SimConfig`                         |
//! | [`rng`]   | `NodeRng`, seeded per junction                          |
//! | [`error`] | `CoreError`, `CoreResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::Point;
pub use ids::{CentroidId, LinkId, NodeId, RegionId};
pub use rng::NodeRng;
pub use time::{SimClock, SimConfig, Tick};
