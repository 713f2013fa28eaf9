//! Two-level link-state routing over a static region partition.
//!
//! # Databases
//!
//! Every junction keeps an **interior** database fed only by advertisements
//! from its own region.  A junction with a neighbour in another region is a
//! border junction and also keeps a **border** database, fed by the border
//! advertisements of every border junction in the network.
//!
//! | Advertisement | Sent by        | Carries                                                  |
//! |---------------|----------------|----------------------------------------------------------|
//! | interior      | every junction | turnings towards centroids and same-region junctions, plus virtual entries |
//! | border        | border only    | turnings into other regions, plus summary entries        |
//!
//! Interior advertisements only flood inside their region.  Border
//! advertisements flood everywhere; interior junctions forward them without
//! storing them.
//!
//! # Aggregation
//!
//! After its interior search a border junction summarises, per incoming
//! link, what it can reach inside its region: one aggregated entry per
//! reachable centroid and one per reachable border junction of the region
//! (a transit entry, arriving on the link the path actually ends on).  These
//! summaries go into its next border advertisement, so other border
//! junctions learn the region's reachability without its topology.
//!
//! In the other direction, every destination the border search reaches more
//! cheaply than the interior search (or at all) becomes a virtual entry in
//! the border junction's next interior advertisement, so interior junctions
//! can route out of the region through it.
//!
//! With every advertisement delivered within its tick, border tables are
//! complete after two ticks and interior tables after three.

use std::sync::Arc;

use rr_core::NodeRng;

use crate::component::{insert_local_destinations, NodeTopology};
use crate::entry::{RouteEntry, Target};
use crate::linkstate::advertisement::same_entries;
use crate::linkstate::{local_entries, step_cost};
use crate::linkstate::{Advertisement, AdvertisementScope, Database, DatabaseEntry, SequenceFilter};
use crate::protocol::{LinkStateConfig, Protocol, TickContext};
use crate::search::dijkstra;
use crate::table::RoutingTable;
use crate::RoutingResult;

pub struct Regional {
    config:          LinkStateConfig,
    interior:        Database,
    border:          Database,
    /// Border advertisements already forwarded by a non-border junction.
    border_filter:   SequenceFilter,
    sequence:        u64,
    last_interior:   Option<Vec<DatabaseEntry>>,
    last_border:     Option<Vec<DatabaseEntry>>,
    virtual_entries: Vec<DatabaseEntry>,
    summary_entries: Vec<DatabaseEntry>,
}

impl Regional {
    pub fn new(config: LinkStateConfig) -> Self {
        Self {
            config,
            interior:        Database::new(),
            border:          Database::new(),
            border_filter:   SequenceFilter::new(),
            sequence:        0,
            last_interior:   None,
            last_border:     None,
            virtual_entries: Vec::new(),
            summary_entries: Vec::new(),
        }
    }

    pub fn interior(&self) -> &Database {
        &self.interior
    }

    pub fn border(&self) -> &Database {
        &self.border
    }

    /// Routes out of the region, offered to interior junctions.
    pub fn virtual_entries(&self) -> &[DatabaseEntry] {
        &self.virtual_entries
    }

    /// The region's reachability, offered to other border junctions.
    pub fn summary_entries(&self) -> &[DatabaseEntry] {
        &self.summary_entries
    }

    fn stamp(
        &mut self,
        node:    &NodeTopology,
        scope:   AdvertisementScope,
        entries: Vec<DatabaseEntry>,
    ) -> Option<Arc<Advertisement>> {
        let last = match scope {
            AdvertisementScope::Border => &mut self.last_border,
            _ => &mut self.last_interior,
        };
        if last.as_deref().is_some_and(|prev| same_entries(prev, &entries)) {
            return None;
        }
        *last = Some(entries.clone());

        self.sequence += 1;
        let ad = Advertisement::new(node.node, self.sequence, scope, entries);
        tracing::debug!(node = %node.node, seq = ad.sequence, scope = ?scope, entries = ad.len(), "originating advertisement");
        match scope {
            AdvertisementScope::Border => self.border.apply(&ad),
            _ => self.interior.apply(&ad),
        };
        Some(Arc::new(ad))
    }
}

impl Protocol for Regional {
    fn originate(&mut self, node: &NodeTopology, ctx: &TickContext<'_>) -> RoutingResult<Vec<Arc<Advertisement>>> {
        let local = local_entries(node, ctx, self.config.forecast.as_ref())?;
        let same_region = |t: Target| match t {
            Target::Centroid(_) => true,
            Target::Node(n) => node.region_of_neighbour(n) == Some(node.region),
        };

        let (inside, outside): (Vec<DatabaseEntry>, Vec<DatabaseEntry>) =
            local.into_iter().partition(|e| same_region(e.route.target));

        let mut ads = Vec::new();
        let mut interior = inside;
        if node.is_border() {
            interior.extend(self.virtual_entries.iter().cloned());
        }
        ads.extend(self.stamp(node, AdvertisementScope::Interior(node.region), interior));

        if node.is_border() {
            let mut border = outside;
            border.extend(self.summary_entries.iter().cloned());
            ads.extend(self.stamp(node, AdvertisementScope::Border, border));
        }
        Ok(ads)
    }

    fn receive(&mut self, node: &NodeTopology, ad: &Advertisement) -> bool {
        match ad.scope {
            AdvertisementScope::Interior(region) => region == node.region && self.interior.apply(ad),
            AdvertisementScope::Border if node.is_border() => self.border.apply(ad),
            AdvertisementScope::Border => self.border_filter.accept(ad.originator, ad.sequence),
            AdvertisementScope::Flat => false,
        }
    }

    fn recompute(
        &mut self,
        node: &NodeTopology,
        ctx:  &TickContext<'_>,
        _rng: &mut NodeRng,
    ) -> RoutingResult<Vec<RoutingTable>> {
        let forecast = self.config.forecast.as_ref();
        let mut tables = node.fresh_tables();

        if !node.is_border() {
            for table in &mut tables {
                let paths = dijkstra(
                    self.interior.graph(),
                    node.node,
                    table.in_link(),
                    |_| false,
                    |e, g| step_cost(e, g, forecast),
                );
                for (c, reached) in paths.centroids {
                    table.update(c, reached.first_hop, reached.cost);
                }
            }
            insert_local_destinations(node, &mut tables, ctx);
            return Ok(tables);
        }

        let mut summaries = Vec::new();
        let mut virtuals = Vec::new();
        for table in &mut tables {
            let in_link = table.in_link();
            let phys = dijkstra(
                self.interior.graph(),
                node.node,
                in_link,
                |e| e.aggregated,
                |e, g| step_cost(e, g, forecast),
            );
            for (&c, reached) in &phys.centroids {
                table.update(c, reached.first_hop, reached.cost);
            }

            let bord = dijkstra(
                self.border.graph(),
                node.node,
                in_link,
                |_| false,
                |e, g| step_cost(e, g, forecast),
            );
            for (c, reached) in bord.centroids {
                table.update(c, reached.first_hop, reached.cost);
            }

            for (&c, reached) in &phys.centroids {
                summaries.push(DatabaseEntry::aggregated(RouteEntry {
                    source:   node.node,
                    target:   Target::Centroid(c),
                    in_link,
                    out_link: reached.first_hop,
                    via_link: reached.first_hop,
                    cost:     reached.cost,
                }));
            }
            let borders: Vec<_> = self.border.graph().sources().filter(|&n| n != node.node).collect();
            for (&(n, arrival), reached) in &phys.nodes {
                if borders.contains(&n) {
                    summaries.push(DatabaseEntry::aggregated(RouteEntry {
                        source:   node.node,
                        target:   Target::Node(n),
                        in_link,
                        out_link: reached.first_hop,
                        via_link: arrival,
                        cost:     reached.cost,
                    }));
                }
            }

            for (c, route) in table.iter() {
                let inside = phys.centroids.get(&c).map(|r| r.cost);
                if inside.is_none_or(|cost| route.cost < cost) {
                    virtuals.push(DatabaseEntry::aggregated(RouteEntry {
                        source:   node.node,
                        target:   Target::Centroid(c),
                        in_link,
                        out_link: route.next_hop,
                        via_link: route.next_hop,
                        cost:     route.cost,
                    }));
                }
            }
        }

        self.summary_entries = summaries;
        self.virtual_entries = virtuals;
        insert_local_destinations(node, &mut tables, ctx);
        Ok(tables)
    }
}
