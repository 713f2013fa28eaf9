//! CSV output backend.
//!
//! Creates two files in the output directory:
//! - `routing_tables.csv`: `tick,node,in_link,destination,next_hop,cost`
//! - `tick_summaries.csv`: `tick,unix_time_secs,messages,table_changes,failed_nodes`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{OutputResult, RoutingTableRow, TickSummaryRow};

pub const TABLES_FILE: &str = "routing_tables.csv";
pub const SUMMARIES_FILE: &str = "tick_summaries.csv";

pub struct CsvWriter {
    tables:    Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create both files in `dir` (which must exist) and write their headers.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut tables = Writer::from_path(dir.join(TABLES_FILE))?;
        tables.write_record(["tick", "node", "in_link", "destination", "next_hop", "cost"])?;

        let mut summaries = Writer::from_path(dir.join(SUMMARIES_FILE))?;
        summaries.write_record(["tick", "unix_time_secs", "messages", "table_changes", "failed_nodes"])?;

        tracing::debug!(dir = %dir.display(), "csv output opened");
        Ok(Self { tables, summaries, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_tables(&mut self, rows: &[RoutingTableRow]) -> OutputResult<()> {
        for row in rows {
            self.tables.write_record(&[
                row.tick.to_string(),
                row.node.to_string(),
                row.in_link.to_string(),
                row.destination.to_string(),
                row.next_hop.to_string(),
                row.cost.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.unix_time_secs.to_string(),
            row.messages.to_string(),
            row.table_changes.to_string(),
            row.failed_nodes.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.tables.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
