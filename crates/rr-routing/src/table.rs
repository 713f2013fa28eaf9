//! Per-incoming-link forwarding tables.

use std::collections::BTreeMap;

use rr_core::{CentroidId, LinkId};

use crate::entry::cost_is_valid;

/// Best known way to a destination.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    pub next_hop: LinkId,
    pub cost:     f32,
}

/// Flat export of one table entry.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableRow {
    pub in_link:     LinkId,
    pub next_hop:    LinkId,
    pub destination: CentroidId,
    pub cost:        f32,
}

/// Destination → (next hop, cost) for traffic arriving on `in_link`.
///
/// Absence of a destination means "no known route".  Entries with an
/// invalid cost or next hop are never stored.  Iteration is in ascending
/// destination order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutingTable {
    in_link: LinkId,
    routes:  BTreeMap<CentroidId, Route>,
}

impl RoutingTable {
    pub fn new(in_link: LinkId) -> Self {
        Self { in_link, routes: BTreeMap::new() }
    }

    #[inline]
    pub fn in_link(&self) -> LinkId {
        self.in_link
    }

    pub fn reset(&mut self) {
        self.routes.clear();
    }

    pub fn next_hop(&self, destination: CentroidId) -> Option<LinkId> {
        self.routes.get(&destination).map(|r| r.next_hop)
    }

    pub fn delay(&self, destination: CentroidId) -> Option<f32> {
        self.routes.get(&destination).map(|r| r.cost)
    }

    /// [`delay`](Self::delay) with NaN for an unknown destination.
    pub fn delay_or_nan(&self, destination: CentroidId) -> f32 {
        self.delay(destination).unwrap_or(f32::NAN)
    }

    pub fn route(&self, destination: CentroidId) -> Option<Route> {
        self.routes.get(&destination).copied()
    }

    /// Store the route, replacing any existing one.  Returns `false` and
    /// leaves the table untouched for invalid data.
    pub fn insert(&mut self, destination: CentroidId, next_hop: LinkId, cost: f32) -> bool {
        if !is_data_valid(destination, next_hop, cost) {
            return false;
        }
        self.routes.insert(destination, Route { next_hop, cost });
        true
    }

    /// Store the route only if the destination is new or `cost` is strictly
    /// lower than the current one.  Returns whether the table changed.
    pub fn update(&mut self, destination: CentroidId, next_hop: LinkId, cost: f32) -> bool {
        if !is_data_valid(destination, next_hop, cost) {
            return false;
        }
        match self.routes.get(&destination) {
            Some(existing) if existing.cost <= cost => false,
            _ => {
                self.routes.insert(destination, Route { next_hop, cost });
                true
            }
        }
    }

    pub fn remove(&mut self, destination: CentroidId) -> Option<Route> {
        self.routes.remove(&destination)
    }

    pub fn contains(&self, destination: CentroidId) -> bool {
        self.routes.contains_key(&destination)
    }

    pub fn destinations(&self) -> impl Iterator<Item = CentroidId> + '_ {
        self.routes.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CentroidId, Route)> + '_ {
        self.routes.iter().map(|(&d, &r)| (d, r))
    }

    pub fn rows(&self) -> impl Iterator<Item = TableRow> + '_ {
        self.routes.iter().map(|(&destination, r)| TableRow {
            in_link: self.in_link,
            next_hop: r.next_hop,
            destination,
            cost: r.cost,
        })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[inline]
fn is_data_valid(destination: CentroidId, next_hop: LinkId, cost: f32) -> bool {
    destination.is_valid() && next_hop.is_valid() && cost_is_valid(cost)
}
