//! Integration tests for rr-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use crate::csv::{CsvWriter, SUMMARIES_FILE, TABLES_FILE};
    use crate::row::{RoutingTableRow, TickSummaryRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn headers(path: std::path::PathBuf) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }

    #[test]
    fn files_and_headers() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        assert_eq!(
            headers(dir.path().join(TABLES_FILE)),
            ["tick", "node", "in_link", "destination", "next_hop", "cost"]
        );
        assert_eq!(
            headers(dir.path().join(SUMMARIES_FILE)),
            ["tick", "unix_time_secs", "messages", "table_changes", "failed_nodes"]
        );
    }

    #[test]
    fn table_rows_read_back() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        let row = RoutingTableRow { tick: 4, node: 2, in_link: 7, destination: 1, next_hop: 9, cost: 12.5 };
        w.write_tables(&[row, RoutingTableRow { destination: 3, ..row }]).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join(TABLES_FILE)).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "4");
        assert_eq!(&rows[0][1], "2");
        assert_eq!(&rows[0][4], "9");
        assert_eq!(&rows[0][5], "12.5");
        assert_eq!(&rows[1][3], "3");
    }

    #[test]
    fn summary_rows_read_back() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&TickSummaryRow {
            tick:           3,
            unix_time_secs: 270,
            messages:       14,
            table_changes:  6,
            failed_nodes:   1,
        })
        .unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join(SUMMARIES_FILE)).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].iter().collect::<Vec<_>>(), ["3", "270", "14", "6", "1"]);
    }

    #[test]
    fn finish_is_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tmp();
        assert!(CsvWriter::new(&dir.path().join("absent")).is_err());
    }
}

#[cfg(test)]
mod observer_tests {
    use rr_core::{Point, SimConfig, Tick};
    use rr_network::{LinkEnd, MeasurementTable, TrafficNetwork, TrafficNetworkBuilder, Turning};
    use rr_routing::{LinkStateConfig, ProtocolConfig};
    use rr_sim::{RoutingObserver, RoutingSimBuilder, TickStats};
    use tempfile::TempDir;

    use crate::csv::{CsvWriter, SUMMARIES_FILE, TABLES_FILE};
    use crate::row::{RoutingTableRow, TickSummaryRow};
    use crate::writer::OutputWriter;
    use crate::{OutputError, OutputResult, RoutingOutputObserver};

    /// `(c0) --l0--> [A] --l1--> [B] --l2--> (c1)`, costs summing to 25.
    fn two_junctions() -> (TrafficNetwork, MeasurementTable) {
        let mut b = TrafficNetworkBuilder::new();
        let c0 = b.add_centroid(Point::new(-100.0, 0.0));
        let c1 = b.add_centroid(Point::new(200.0, 0.0));
        let a  = b.add_junction(Point::new(0.0, 0.0));
        let bb = b.add_junction(Point::new(100.0, 0.0));
        let l0 = b.add_link(LinkEnd::Centroid(c0), LinkEnd::Junction(a), 100.0, 10.0);
        let l1 = b.add_link(LinkEnd::Junction(a), LinkEnd::Junction(bb), 100.0, 10.0);
        let l2 = b.add_link(LinkEnd::Junction(bb), LinkEnd::Centroid(c1), 100.0, 10.0);
        b.add_turning(a, l0, l1);
        b.add_turning(bb, l1, l2);

        let mut traffic = MeasurementTable::new();
        traffic.set_turning_cost(Turning::new(l0, l1), 5.0);
        traffic.set_turning_cost(Turning::new(l1, l2), 3.0);
        traffic.set_link_delay(l0, 4.0);
        traffic.set_link_delay(l1, 10.0);
        traffic.set_link_delay(l2, 7.0);
        (b.build().unwrap(), traffic)
    }

    fn config() -> SimConfig {
        SimConfig {
            start_unix_secs:       1_000,
            tick_duration_secs:    90,
            total_ticks:           3,
            seed:                  1,
            num_threads:           Some(1),
            output_interval_ticks: 2,
            flood_rounds:          None,
        }
    }

    #[test]
    fn integration_csv() {
        let dir = TempDir::new().unwrap();
        let (net, traffic) = two_junctions();
        let mut sim = RoutingSimBuilder::new(config(), net, traffic, ProtocolConfig::LinkState(LinkStateConfig::default()))
            .build()
            .unwrap();

        let writer = CsvWriter::new(dir.path()).unwrap();
        let mut obs = RoutingOutputObserver::new(writer, &sim.config);
        sim.run(&mut obs);
        assert!(obs.take_error().is_none());

        let mut rdr = csv::Reader::from_path(dir.path().join(SUMMARIES_FILE)).unwrap();
        let summaries: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(summaries.len(), 3);
        assert_eq!(&summaries[0][1], "1000");
        assert_eq!(&summaries[2][1], "1180");
        assert_eq!(&summaries[0][2], "2");
        assert_eq!(&summaries[1][2], "0");

        // Snapshots at ticks 0 and 2; A and B each know one route.
        let mut rdr = csv::Reader::from_path(dir.path().join(TABLES_FILE)).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().any(|r| &r[0] == "0" && &r[1] == "0" && &r[5] == "25"));
        assert!(rows.iter().any(|r| &r[0] == "2" && &r[1] == "1" && &r[5] == "10"));
    }

    /// Fails every write after the first `ok` ones.
    struct Flaky {
        ok:     usize,
        writes: usize,
    }

    impl Flaky {
        fn attempt(&mut self) -> OutputResult<()> {
            self.writes += 1;
            if self.writes > self.ok {
                let kind = if self.writes == self.ok + 1 {
                    std::io::ErrorKind::StorageFull
                } else {
                    std::io::ErrorKind::BrokenPipe
                };
                return Err(std::io::Error::from(kind).into());
            }
            Ok(())
        }
    }

    impl OutputWriter for Flaky {
        fn write_tables(&mut self, _rows: &[RoutingTableRow]) -> OutputResult<()> {
            self.attempt()
        }
        fn write_tick_summary(&mut self, _row: &TickSummaryRow) -> OutputResult<()> {
            self.attempt()
        }
        fn finish(&mut self) -> OutputResult<()> {
            self.attempt()
        }
    }

    #[test]
    fn keeps_first_error_and_carries_on() {
        let mut obs = RoutingOutputObserver::new(Flaky { ok: 1, writes: 0 }, &config());
        obs.on_tick_end(Tick(0), &TickStats::default());
        obs.on_tick_end(Tick(1), &TickStats::default());
        obs.on_tick_end(Tick(2), &TickStats::default());
        obs.on_sim_end(Tick(3));

        let err = obs.take_error();
        assert!(matches!(err, Some(OutputError::Io(e)) if e.kind() == std::io::ErrorKind::StorageFull));
        assert!(obs.take_error().is_none());
        assert_eq!(obs.into_writer().writes, 4);
    }

    #[test]
    fn empty_snapshot_writes_nothing() {
        let mut obs = RoutingOutputObserver::new(Flaky { ok: 0, writes: 0 }, &config());
        obs.on_snapshot(Tick(0), &[]);
        assert!(obs.take_error().is_none());
    }
}
