//! The `OutputWriter` trait implemented by output backends.

use crate::{OutputResult, RoutingTableRow, TickSummaryRow};

/// Sink for routing output.
///
/// Observer callbacks cannot fail, so errors surface through
/// [`RoutingOutputObserver::take_error`][crate::RoutingOutputObserver::take_error].
pub trait OutputWriter {
    /// Write every row of one snapshot.
    fn write_tables(&mut self, rows: &[RoutingTableRow]) -> OutputResult<()>;

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Flush and close.  Calling it again is a no-op.
    fn finish(&mut self) -> OutputResult<()>;
}
