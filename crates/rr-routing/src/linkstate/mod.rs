//! Flat link-state routing.
//!
//! Each tick a junction
//!
//! 1. describes its turnings (turning cost plus the following link's delay)
//!    in an [`Advertisement`] and floods it, but only on the first tick or
//!    when that description changed;
//! 2. applies every newer advertisement it receives to its [`Database`] and
//!    floods it on to every neighbour except the sender;
//! 3. runs Dijkstra over its database once per incoming link.
//!
//! With the forecast extension enabled, each entry also carries a
//! [`ForecastProfile`](crate::ForecastProfile) and Dijkstra prices it at the
//! predicted arrival time (see [`temporal`](crate::temporal)).

pub mod advertisement;
pub mod database;

use std::sync::Arc;

use rr_core::NodeRng;
use rr_network::Element;

use crate::component::{insert_local_destinations, target_of, NodeTopology};
use crate::entry::{cost_is_valid, RouteEntry};
use crate::protocol::{ForecastConfig, LinkStateConfig, Protocol, TickContext};
use crate::search::dijkstra;
use crate::table::RoutingTable;
use crate::temporal::ForecastProfile;
use crate::{RoutingError, RoutingResult};

pub use advertisement::{Advertisement, AdvertisementScope, DatabaseEntry, SequenceFilter};
pub use database::Database;

use advertisement::same_entries;

pub struct LinkState {
    config:     LinkStateConfig,
    database:   Database,
    sequence:   u64,
    /// Content of the last advertisement sent.
    last_local: Option<Vec<DatabaseEntry>>,
}

impl LinkState {
    pub fn new(config: LinkStateConfig) -> Self {
        Self {
            config,
            database:   Database::new(),
            sequence:   0,
            last_local: None,
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl Protocol for LinkState {
    fn originate(&mut self, node: &NodeTopology, ctx: &TickContext<'_>) -> RoutingResult<Vec<Arc<Advertisement>>> {
        let entries = local_entries(node, ctx, self.config.forecast.as_ref())?;
        if self.last_local.as_deref().is_some_and(|prev| same_entries(prev, &entries)) {
            return Ok(Vec::new());
        }

        self.sequence += 1;
        let ad = Advertisement::new(node.node, self.sequence, AdvertisementScope::Flat, entries.clone());
        tracing::debug!(node = %node.node, seq = ad.sequence, entries = ad.len(), "originating advertisement");
        self.database.apply(&ad);
        self.last_local = Some(entries);
        Ok(vec![Arc::new(ad)])
    }

    fn receive(&mut self, _node: &NodeTopology, ad: &Advertisement) -> bool {
        ad.scope == AdvertisementScope::Flat && self.database.apply(ad)
    }

    fn recompute(
        &mut self,
        node: &NodeTopology,
        ctx:  &TickContext<'_>,
        _rng: &mut NodeRng,
    ) -> RoutingResult<Vec<RoutingTable>> {
        let mut tables = node.fresh_tables();
        let forecast = self.config.forecast.as_ref();
        for table in &mut tables {
            let paths = dijkstra(
                self.database.graph(),
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
        Ok(tables)
    }
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Cost of traversing `entry` when reached at accumulated cost `g`.
pub(crate) fn step_cost(entry: &DatabaseEntry, g: f32, forecast: Option<&ForecastConfig>) -> f32 {
    match (forecast, &entry.forecast) {
        (Some(cfg), Some(profile)) if !entry.aggregated => profile.step_cost(g, cfg.max_error),
        _ => entry.route.cost,
    }
}

/// One physical entry per turning at `node`, priced at turning cost plus
/// the delay of the out-link.
///
/// Fails if the traffic model lacks either value for a turning; entries
/// whose summed cost is invalid are left out.
pub(crate) fn local_entries(
    node:     &NodeTopology,
    ctx:      &TickContext<'_>,
    forecast: Option<&ForecastConfig>,
) -> RoutingResult<Vec<DatabaseEntry>> {
    let mut entries = Vec::with_capacity(node.turnings.len());
    for &turning in &node.turnings {
        let Some(target) = target_of(ctx.network, turning.out_link) else { continue };
        let turning_cost = ctx.traffic.turning_cost(turning).ok_or(RoutingError::MissingMeasurement {
            node:    node.node,
            element: Element::Turning(turning),
        })?;
        let link_cost = ctx.traffic.link_delay(turning.out_link).ok_or(RoutingError::MissingMeasurement {
            node:    node.node,
            element: Element::Link(turning.out_link),
        })?;
        let cost = turning_cost + link_cost;
        if !cost_is_valid(cost) {
            continue;
        }

        let mut entry = DatabaseEntry::physical(RouteEntry::physical(node.node, target, turning, cost));
        if let Some(cfg) = forecast {
            let profile = ForecastProfile::sample(ctx.traffic, turning, turning_cost, link_cost, cfg);
            entry.forecast = Some(Arc::new(profile));
        }
        entries.push(entry);
    }
    Ok(entries)
}
