//! `rr-network` — the traffic-network model the routing core reads from.
//!
//! Routing never mutates anything in here.  Topology is immutable once
//! built; measurements are refreshed by the external traffic simulation
//! between ticks through [`MeasurementTable`] (or any other
//! [`TrafficModel`] implementation).
//!
//! # Crate layout
//!
//! | Module      | Contents                                                     |
//! |-------------|--------------------------------------------------------------|
//! | [`network`] | `TrafficNetwork` (CSR adjacency + centroid R-tree), builder  |
//! | [`measure`] | `TrafficModel` trait, `Element`, `MeasurementTable`          |
//! | [`webster`] | Webster signalised-intersection delay                        |
//! | [`region`]  | `RegionMap`, `RegionalRole`                                  |
//! | [`loader`]  | CSV loaders for coordinates and region partitions            |
//! | [`error`]   | `NetworkError`, `NetworkResult<T>`                           |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod error;
pub mod loader;
pub mod measure;
pub mod network;
pub mod region;
pub mod webster;

#[cfg(test)]
mod tests;

pub use error::{NetworkError, NetworkResult};
pub use loader::{
    load_positions_csv, load_positions_reader, load_regions_csv, load_regions_csv_or_single,
    load_regions_reader, PositionRow,
};
pub use measure::{Element, MeasurementTable, TrafficModel};
pub use network::{Link, LinkEnd, TrafficNetwork, TrafficNetworkBuilder, Turning};
pub use region::{RegionMap, RegionalRole};
pub use webster::{webster_delay, SignalTiming};
