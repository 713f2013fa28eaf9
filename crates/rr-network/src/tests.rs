//! Unit tests for rr-network.

#[cfg(test)]
mod helpers {
    use rr_core::{CentroidId, LinkId, NodeId, Point};

    use crate::{LinkEnd, TrafficNetwork, TrafficNetworkBuilder};

    /// Centroid 0 feeds junction A, A links to junction B, B feeds
    /// centroid 1.
    ///
    /// ```text
    /// (c0) --l0--> [A] --l1--> [B] --l2--> (c1)
    ///               ^ <--l3---
    /// ```
    pub fn line() -> (TrafficNetwork, [NodeId; 2], [CentroidId; 2], [LinkId; 4]) {
        let mut b = TrafficNetworkBuilder::new();
        let c0 = b.add_centroid(Point::new(-100.0, 0.0));
        let c1 = b.add_centroid(Point::new(200.0, 0.0));
        let a  = b.add_junction(Point::new(0.0, 0.0));
        let bb = b.add_junction(Point::new(100.0, 0.0));
        let l0 = b.add_link(LinkEnd::Centroid(c0), LinkEnd::Junction(a), 100.0, 10.0);
        let l1 = b.add_link(LinkEnd::Junction(a), LinkEnd::Junction(bb), 100.0, 10.0);
        let l2 = b.add_link(LinkEnd::Junction(bb), LinkEnd::Centroid(c1), 100.0, 10.0);
        let l3 = b.add_link(LinkEnd::Junction(bb), LinkEnd::Junction(a), 100.0, 10.0);
        b.add_turning(a, l0, l1);
        b.add_turning(bb, l1, l2);
        (b.build().unwrap(), [a, bb], [c0, c1], [l0, l1, l2, l3])
    }
}

// ── Builder & topology ────────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use rr_core::{CentroidId, LinkId, NodeId, Point};

    use super::helpers::line;
    use crate::{LinkEnd, NetworkError, TrafficNetworkBuilder, Turning};

    #[test]
    fn empty_build() {
        let net = TrafficNetworkBuilder::new().build().unwrap();
        assert_eq!(net.junction_count(), 0);
        assert_eq!(net.link_count(), 0);
        assert!(net.centroids_by_distance(Point::new(0.0, 0.0)).is_empty());
    }

    #[test]
    fn adjacency_rows() {
        let (net, [a, b], _, [l0, l1, l2, l3]) = line();
        assert_eq!(net.out_links(a), &[l1]);
        assert_eq!(net.in_links(a), &[l0, l3]);
        assert_eq!(net.out_links(b), &[l2, l3]);
        assert_eq!(net.in_links(b), &[l1]);
        assert_eq!(net.turnings(a), &[Turning::new(l0, l1)]);
        assert!(net.has_turning(b, Turning::new(l1, l2)));
        assert!(!net.has_turning(b, Turning::new(l1, l3)));
    }

    #[test]
    fn link_ends() {
        let (net, [a, b], [_, c1], [l0, l1, l2, _]) = line();
        assert_eq!(net.next_junction(l1), Some(b));
        assert_eq!(net.next_junction(l2), None);
        assert_eq!(net.link_centroid(l2), Some(c1));
        assert_eq!(net.prev_junction(l1), Some(a));
        assert_eq!(net.prev_junction(l0), None);
    }

    #[test]
    fn neighbours_are_undirected_and_deduplicated() {
        let (net, [a, b], _, _) = line();
        assert_eq!(net.neighbours(a), vec![b]);
        assert_eq!(net.neighbours(b), vec![a]);
    }

    #[test]
    fn connect_all_skips_u_turns() {
        let mut b = TrafficNetworkBuilder::new();
        let x = b.add_junction(Point::new(0.0, 0.0));
        let y = b.add_junction(Point::new(1.0, 0.0));
        let z = b.add_junction(Point::new(2.0, 0.0));
        let (xy, yx) = b.add_road(x, y, 1.0, 1.0);
        let (yz, zy) = b.add_road(y, z, 1.0, 1.0);
        b.connect_all(y);
        let net = b.build().unwrap();
        assert_eq!(net.turnings(y), &[Turning::new(xy, yz), Turning::new(zy, yx)]);
    }

    #[test]
    fn duplicate_turnings_collapse() {
        let mut b = TrafficNetworkBuilder::new();
        let x = b.add_junction(Point::new(0.0, 0.0));
        let y = b.add_junction(Point::new(1.0, 0.0));
        let z = b.add_junction(Point::new(2.0, 0.0));
        let (xy, _) = b.add_road(x, y, 1.0, 1.0);
        let (yz, _) = b.add_road(y, z, 1.0, 1.0);
        b.add_turning(y, xy, yz);
        b.add_turning(y, xy, yz);
        assert_eq!(b.build().unwrap().turnings(y).len(), 1);
    }

    #[test]
    fn unknown_junction_rejected() {
        let mut b = TrafficNetworkBuilder::new();
        let x = b.add_junction(Point::new(0.0, 0.0));
        b.add_link(LinkEnd::Junction(x), LinkEnd::Junction(NodeId(9)), 1.0, 1.0);
        assert!(matches!(b.build(), Err(NetworkError::UnknownJunction(NodeId(9)))));
    }

    #[test]
    fn unknown_centroid_rejected() {
        let mut b = TrafficNetworkBuilder::new();
        let x = b.add_junction(Point::new(0.0, 0.0));
        b.add_link(LinkEnd::Junction(x), LinkEnd::Centroid(CentroidId(0)), 1.0, 1.0);
        assert!(matches!(b.build(), Err(NetworkError::UnknownCentroid(_))));
    }

    #[test]
    fn centroid_to_centroid_link_rejected() {
        let mut b = TrafficNetworkBuilder::new();
        let c0 = b.add_centroid(Point::new(0.0, 0.0));
        let c1 = b.add_centroid(Point::new(1.0, 0.0));
        b.add_link(LinkEnd::Centroid(c0), LinkEnd::Centroid(c1), 1.0, 1.0);
        assert!(matches!(b.build(), Err(NetworkError::InvalidLink { .. })));
    }

    #[test]
    fn zero_speed_limit_rejected() {
        let mut b = TrafficNetworkBuilder::new();
        let x = b.add_junction(Point::new(0.0, 0.0));
        let y = b.add_junction(Point::new(1.0, 0.0));
        b.add_road(x, y, 1.0, 0.0);
        assert!(matches!(b.build(), Err(NetworkError::InvalidLink { .. })));
    }

    #[test]
    fn turning_must_pass_through_its_junction() {
        let mut b = TrafficNetworkBuilder::new();
        let x = b.add_junction(Point::new(0.0, 0.0));
        let y = b.add_junction(Point::new(1.0, 0.0));
        let (xy, yx) = b.add_road(x, y, 1.0, 1.0);
        b.add_turning(x, xy, yx);
        assert!(matches!(b.build(), Err(NetworkError::InvalidTurning { .. })));
    }

    #[test]
    fn turning_with_unknown_link_rejected() {
        let mut b = TrafficNetworkBuilder::new();
        let x = b.add_junction(Point::new(0.0, 0.0));
        b.add_turning(x, LinkId(0), LinkId(1));
        assert!(matches!(b.build(), Err(NetworkError::UnknownLink(LinkId(0)))));
    }

    #[test]
    fn set_position_of_unknown_junction_fails() {
        let mut b = TrafficNetworkBuilder::new();
        assert!(b.set_junction_pos(NodeId(0), Point::new(1.0, 1.0)).is_err());
        let x = b.add_junction(Point::new(0.0, 0.0));
        b.set_junction_pos(x, Point::new(5.0, 5.0)).unwrap();
        assert_eq!(b.build().unwrap().junction_pos[0], Point::new(5.0, 5.0));
    }
}

// ── Spatial index ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod spatial {
    use rr_core::{CentroidId, Point};

    use crate::TrafficNetworkBuilder;

    #[test]
    fn centroids_sorted_by_distance() {
        let mut b = TrafficNetworkBuilder::new();
        let far  = b.add_centroid(Point::new(100.0, 0.0));
        let near = b.add_centroid(Point::new(1.0, 1.0));
        let mid  = b.add_centroid(Point::new(0.0, -20.0));
        let net = b.build().unwrap();
        let origin = Point::new(0.0, 0.0);
        assert_eq!(net.centroids_by_distance(origin), vec![near, mid, far]);
        assert_eq!(net.nearest_centroid(origin), Some(near));
        assert_eq!(net.centroids().collect::<Vec<_>>(), vec![CentroidId(0), CentroidId(1), CentroidId(2)]);
    }
}

// ── Measurements ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod measure {
    use super::helpers::line;
    use crate::{Element, MeasurementTable, SignalTiming, TrafficModel, Turning};

    #[test]
    fn free_flow_seeds_links_and_turnings() {
        let (net, [a, _], _, [l0, l1, ..]) = line();
        let m = MeasurementTable::free_flow(&net, 2.0);
        assert_eq!(m.link_delay(l1), Some(10.0));
        assert_eq!(m.turning_cost(Turning::new(l0, l1)), Some(2.0));
        assert_eq!(net.turnings(a).len(), 1);
    }

    #[test]
    fn missing_values_are_none() {
        let m = MeasurementTable::new();
        let (_, _, _, [l0, l1, ..]) = line();
        assert_eq!(m.link_delay(l1), None);
        assert_eq!(m.turning_cost(Turning::new(l0, l1)), None);
    }

    #[test]
    fn disturbance_scales_delay() {
        let (_, _, _, [_, l1, ..]) = line();
        let mut m = MeasurementTable::new();
        m.set_link_delay(l1, 10.0);
        m.set_disturbance(l1, 0.5);
        assert_eq!(m.link_delay(l1), Some(15.0));
        m.clear_disturbance(l1);
        assert_eq!(m.link_delay(l1), Some(10.0));
    }

    #[test]
    fn forecast_is_a_step_profile() {
        let (_, _, _, [_, l1, ..]) = line();
        let e = Element::Link(l1);
        let mut m = MeasurementTable::new();
        assert_eq!(m.forecast(e, 0.0), None);
        m.set_forecast(e, vec![(90.0, 12.0), (0.0, 10.0)]);
        assert_eq!(m.forecast(e, 0.0), Some(10.0));
        assert_eq!(m.forecast(e, 89.0), Some(10.0));
        assert_eq!(m.forecast(e, 90.0), Some(12.0));
        assert_eq!(m.forecast(e, 5_000.0), Some(12.0));
    }

    #[test]
    fn forecast_error_defaults_to_unreliable() {
        let (_, _, _, [l0, l1, ..]) = line();
        let mut m = MeasurementTable::new();
        let t = Element::Turning(Turning::new(l0, l1));
        assert_eq!(m.forecast_error(t), 1.0);
        m.set_forecast_error(t, 0.25);
        assert_eq!(m.forecast_error(t), 0.25);
        m.set_forecast_error(t, 7.0);
        assert_eq!(m.forecast_error(t), 1.0);
    }

    #[test]
    fn signalised_turning_uses_webster() {
        let (_, _, _, [l0, l1, ..]) = line();
        let t = Turning::new(l0, l1);
        let mut m = MeasurementTable::new();
        let timing = SignalTiming { green_secs: 30.0, cycle_secs: 90.0 };
        m.set_signalised_turning(t, 300.0, 1, timing);
        assert_eq!(m.turning_cost(t), Some(crate::webster_delay(300.0, 1, timing)));
    }
}

// ── Webster ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod webster {
    use crate::{webster_delay, SignalTiming};

    const PLAN: SignalTiming = SignalTiming { green_secs: 30.0, cycle_secs: 90.0 };

    #[test]
    fn zero_flow_is_finite_and_positive() {
        let d = webster_delay(0.0, 1, PLAN);
        assert!(d.is_finite() && d > 0.0, "got {d}");
        assert_eq!(d, webster_delay(1.0, 1, PLAN));
    }

    #[test]
    fn reference_value() {
        // M = 360, S = 1800, f = 1/3, x = 0.6
        // d1 = 90 * (2/3)^2 / (2 * 0.8) = 25
        // d2 = 1800 * 0.36 / (360 * 0.4) = 4.5
        let d = webster_delay(360.0, 1, PLAN);
        assert!((d - 0.9 * 29.5).abs() < 1e-3, "got {d}");
    }

    #[test]
    fn delay_grows_with_flow() {
        let low  = webster_delay(100.0, 1, PLAN);
        let high = webster_delay(500.0, 1, PLAN);
        assert!(high > low);
    }

    #[test]
    fn oversaturated_flow_stays_finite() {
        let d = webster_delay(5_000.0, 1, PLAN);
        assert!(d.is_finite() && d > 0.0, "got {d}");
    }

    #[test]
    fn degenerate_plan_stays_finite() {
        let d = webster_delay(200.0, 0, SignalTiming { green_secs: 0.0, cycle_secs: 0.0 });
        assert!(d.is_finite() && d > 0.0, "got {d}");
    }
}

// ── Regions ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod region {
    use rr_core::{NodeId, Point, RegionId};

    use crate::{NetworkError, RegionMap, RegionalRole, TrafficNetworkBuilder};

    /// Chain 0 - 1 - 2 - 3 with regions {0,1} and {2,3}.
    fn chain() -> (crate::TrafficNetwork, RegionMap) {
        let mut b = TrafficNetworkBuilder::new();
        let n: Vec<NodeId> = (0..4).map(|i| b.add_junction(Point::new(i as f64, 0.0))).collect();
        for w in n.windows(2) {
            b.add_road(w[0], w[1], 1.0, 1.0);
        }
        let map = RegionMap::from_pairs([
            (n[0], RegionId(1)),
            (n[1], RegionId(1)),
            (n[2], RegionId(2)),
            (n[3], RegionId(2)),
        ]);
        (b.build().unwrap(), map)
    }

    #[test]
    fn roles_follow_cross_region_links() {
        let (net, map) = chain();
        assert_eq!(map.role(&net, NodeId(0)), RegionalRole::Interior);
        assert_eq!(map.role(&net, NodeId(1)), RegionalRole::Border);
        assert_eq!(map.role(&net, NodeId(2)), RegionalRole::Border);
        assert_eq!(map.role(&net, NodeId(3)), RegionalRole::Interior);
        assert_eq!(map.border_junctions(&net, RegionId(1)), vec![NodeId(1)]);
        assert_eq!(map.region_count(), 2);
    }

    #[test]
    fn single_region_has_no_border() {
        let (net, _) = chain();
        let map = RegionMap::single_region(&net);
        assert!(map.validate(&net).is_ok());
        assert!(net.junctions().all(|n| map.role(&net, n) == RegionalRole::Interior));
    }

    #[test]
    fn validate_reports_missing_junction() {
        let (net, _) = chain();
        let map = RegionMap::from_pairs([(NodeId(0), RegionId(1)), (NodeId(1), RegionId(1))]);
        assert!(matches!(map.validate(&net), Err(NetworkError::MissingRegion(NodeId(2)))));
    }
}

// ── Loaders ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Cursor;
    use std::path::Path;

    use rr_core::{NodeId, Point, RegionId};

    use crate::{
        load_positions_reader, load_regions_csv_or_single, load_regions_reader, NetworkError,
        TrafficNetworkBuilder,
    };

    #[test]
    fn positions_parse() {
        let rows = load_positions_reader(Cursor::new("0;120.5;48.0\n1; 300 ;52.25\n")).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, 0);
        assert_eq!(rows[1].pos, Point::new(300.0, 52.25));
    }

    #[test]
    fn positions_malformed_row() {
        let err = load_positions_reader(Cursor::new("0;abc;1.0\n")).unwrap_err();
        assert!(matches!(err, NetworkError::Parse(_)));
    }

    #[test]
    fn regions_parse() {
        let map = load_regions_reader(Cursor::new("0;1\n1;1\n2;2\n")).unwrap();
        assert_eq!(map.region_of(NodeId(0)), Some(RegionId(1)));
        assert_eq!(map.region_of(NodeId(2)), Some(RegionId(2)));
        assert_eq!(map.region_of(NodeId(3)), None);
    }

    #[test]
    fn reserved_region_rejected() {
        let err = load_regions_reader(Cursor::new("0;65535\n")).unwrap_err();
        assert!(matches!(err, NetworkError::Parse(_)));
    }

    #[test]
    fn missing_region_file_falls_back() {
        let mut b = TrafficNetworkBuilder::new();
        b.add_junction(Point::new(0.0, 0.0));
        b.add_junction(Point::new(1.0, 0.0));
        let net = b.build().unwrap();
        let map = load_regions_csv_or_single(Path::new("/nonexistent/regions.csv"), &net).unwrap();
        assert_eq!(map.region_of(NodeId(1)), Some(crate::region::DEFAULT_REGION));
    }
}
