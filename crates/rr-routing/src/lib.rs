//! `rr-routing` — per-junction forwarding tables and the protocols that
//! compute them.
//!
//! Every junction owns one [`RoutingComponent`].  Once per tick the
//! scheduler in `rr-sim` drives it through three phases: originate
//! advertisements, receive flooded advertisements, recompute tables.  What
//! happens in each phase is decided by the junction's protocol, selected at
//! construction from a [`ProtocolConfig`].
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|---------------------------------------------------------------|
//! | [`entry`]     | `Target`, `RouteEntry`, cost validity                         |
//! | [`table`]     | `RoutingTable`, `Route`, `TableRow`                           |
//! | [`graph`]     | `NetworkGraph<E>` keyed source → target → in-link             |
//! | [`search`]    | Dijkstra and A* over a `NetworkGraph`                         |
//! | [`protocol`]  | `ProtocolConfig`, `Protocol` strategy trait, `TickContext`    |
//! | [`component`] | `RoutingComponent`, `NodeTopology`, `Delivery`                |
//! | [`event`]     | `RoutingEvent`                                                |
//! | [`greedy`]    | Sector-based geographic forwarding, no communication          |
//! | [`heuristic`] | A* over a shared global graph                                 |
//! | [`linkstate`] | Advertisements, database, flat link-state protocol            |
//! | [`regional`]  | Two-level link-state with interior and border databases       |
//! | [`temporal`]  | Forecast profiles, compaction, and forecast-blended costs     |
//! | [`error`]     | `RoutingError`, `RoutingResult<T>`                            |
//!
//! # Reading tables
//!
//! A missing table entry means "route unknown this tick", never an error:
//!
//! ```ignore
//! match component.next_hop(in_link, destination) {
//!     Some(out_link) => follow(out_link),
//!     None => wait_for_next_tick(),
//! }
//! ```
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on entries, tables, configs |

pub mod component;
pub mod entry;
pub mod error;
pub mod event;
pub mod graph;
pub mod greedy;
pub mod heuristic;
pub mod linkstate;
pub mod protocol;
pub mod regional;
pub mod search;
pub mod table;
pub mod temporal;


pub use component::{Delivery, Neighbour, NodeTopology, RoutingComponent};
pub use entry::{cost_is_valid, RouteEntry, Target};
pub use error::{RoutingError, RoutingResult};
pub use event::RoutingEvent;
pub use graph::{GraphEntry, NetworkGraph};
pub use heuristic::{build_shared_graph, refresh_shared_graph};
pub use linkstate::{Advertisement, AdvertisementScope, Database, DatabaseEntry};
pub use protocol::{
    EstimateSpeed, ForecastConfig, GreedyConfig, HeuristicConfig, LinkStateConfig, Protocol, ProtocolConfig,
    ProtocolState, TickContext,
};
pub use search::{Reached, ShortestPaths};
pub use table::{Route, RoutingTable, TableRow};
pub use temporal::ForecastProfile;
