use std::sync::Arc;

use rustc_hash::FxHashMap;

use rr_core::{NodeId, RegionId};

use crate::entry::RouteEntry;
use crate::graph::GraphEntry;
use crate::temporal::ForecastProfile;

/// Which database an advertisement feeds and how far it floods.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AdvertisementScope {
    /// Flat link-state: every junction.
    Flat,
    /// Regional interior database: junctions of one region only.
    Interior(RegionId),
    /// Regional border database: flooded everywhere, stored by border
    /// junctions only.
    Border,
}

/// A route entry tagged with the sequence number of the advertisement that
/// carried it.
#[derive(Clone, Debug, PartialEq)]
pub struct DatabaseEntry {
    pub route:      RouteEntry,
    pub sequence:   u64,
    /// Summarises a multi-hop path rather than one turning and link.
    pub aggregated: bool,
    /// Time-indexed costs, present under the forecast extension.
    pub forecast:   Option<Arc<ForecastProfile>>,
}

impl DatabaseEntry {
    pub fn physical(route: RouteEntry) -> Self {
        Self { route, sequence: 0, aggregated: false, forecast: None }
    }

    pub fn aggregated(route: RouteEntry) -> Self {
        Self { route, sequence: 0, aggregated: true, forecast: None }
    }

    /// Equal apart from the sequence number.
    pub fn same_content(&self, other: &DatabaseEntry) -> bool {
        self.route == other.route && self.aggregated == other.aggregated && self.forecast == other.forecast
    }
}

impl GraphEntry for DatabaseEntry {
    #[inline]
    fn route(&self) -> &RouteEntry {
        &self.route
    }

    #[inline]
    fn route_mut(&mut self) -> &mut RouteEntry {
        &mut self.route
    }
}

/// A junction's description of its local costs.  Immutable once sent;
/// neighbours share it through an `Arc`.
#[derive(Clone, Debug, PartialEq)]
pub struct Advertisement {
    pub originator: NodeId,
    pub sequence:   u64,
    pub scope:      AdvertisementScope,
    pub entries:    Vec<DatabaseEntry>,
}

impl Advertisement {
    /// Stamp `entries` with `sequence`.
    pub fn new(originator: NodeId, sequence: u64, scope: AdvertisementScope, mut entries: Vec<DatabaseEntry>) -> Self {
        for e in &mut entries {
            e.sequence = sequence;
        }
        Self { originator, sequence, scope, entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `true` if both lists carry the same entries in the same order, ignoring
/// sequence numbers.
pub(crate) fn same_entries(a: &[DatabaseEntry], b: &[DatabaseEntry]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_content(y))
}

/// Last sequence number seen per originator.
#[derive(Clone, Debug, Default)]
pub struct SequenceFilter {
    last: FxHashMap<NodeId, u64>,
}

impl SequenceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `sequence` for `originator` if it is newer than the last one
    /// seen.  Returns whether it was.
    pub fn accept(&mut self, originator: NodeId, sequence: u64) -> bool {
        match self.last.get(&originator) {
            Some(&last) if sequence <= last => false,
            _ => {
                self.last.insert(originator, sequence);
                true
            }
        }
    }

    pub fn last(&self, originator: NodeId) -> Option<u64> {
        self.last.get(&originator).copied()
    }
}
