//! `rr-output` — routing output writers.
//!
//! | Backend | Files created                                   |
//! |---------|-------------------------------------------------|
//! | CSV     | `routing_tables.csv`, `tick_summaries.csv`      |
//!
//! Backends implement [`OutputWriter`] and are driven by
//! [`RoutingOutputObserver`], which implements `rr_sim::RoutingObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use rr_output::{CsvWriter, RoutingOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = RoutingOutputObserver::new(writer, &sim.config);
//! sim.run(&mut obs);
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use crate::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::RoutingOutputObserver;
pub use row::{RoutingTableRow, TickSummaryRow};
pub use writer::OutputWriter;
