//! `RoutingOutputObserver<W>`: bridges `RoutingObserver` to an `OutputWriter`.

use rr_core::{SimClock, SimConfig, Tick};
use rr_routing::RoutingComponent;
use rr_sim::{RoutingObserver, TickStats};

use crate::row::{RoutingTableRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`RoutingObserver`] that writes every table at snapshot ticks and one
/// summary row per tick.
///
/// The first write error is kept and writing carries on; check
/// [`take_error`][Self::take_error] once `sim.run()` returns.
pub struct RoutingOutputObserver<W: OutputWriter> {
    writer:     W,
    clock:      SimClock,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> RoutingOutputObserver<W> {
    /// `config` supplies the tick → wall-clock mapping.
    pub fn new(writer: W, config: &SimConfig) -> Self {
        Self {
            writer,
            clock:      config.make_clock(),
            last_error: None,
        }
    }

    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                tracing::warn!(error = %e, "routing output write failed");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> RoutingObserver for RoutingOutputObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, stats: &TickStats) {
        let row = TickSummaryRow {
            tick:           tick.0,
            unix_time_secs: self.clock.unix_secs_at(tick),
            messages:       stats.messages,
            table_changes:  stats.table_changes as u64,
            failed_nodes:   stats.failed_nodes as u64,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, components: &[RoutingComponent]) {
        let rows: Vec<RoutingTableRow> = components
            .iter()
            .flat_map(|c| {
                let node = c.node();
                c.tables()
                    .iter()
                    .flat_map(|t| t.rows())
                    .map(move |row| RoutingTableRow::new(tick, node, row))
            })
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_tables(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
