//! Three-level routing graph.
//!
//! ```text
//! source junction ─► (target, via_link) ─► in_link ─► entry
//! ```
//!
//! The heuristic protocol shares one graph built from the full topology;
//! every link-state junction keeps its own graph of received entries (see
//! [`Database`](crate::Database)).  The inner levels are ordered maps so
//! iteration order, and with it every search result, is reproducible.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;

use rr_core::{CentroidId, LinkId, NodeId};

use crate::entry::{cost_is_valid, RouteEntry, Target};

/// Anything stored in a [`NetworkGraph`]: a route entry plus whatever the
/// owning protocol attaches to it.
pub trait GraphEntry: Clone + Send + Sync {
    fn route(&self) -> &RouteEntry;
    fn route_mut(&mut self) -> &mut RouteEntry;
}

impl GraphEntry for RouteEntry {
    #[inline]
    fn route(&self) -> &RouteEntry {
        self
    }

    #[inline]
    fn route_mut(&mut self) -> &mut RouteEntry {
        self
    }
}

type TargetKey = (Target, LinkId);
type SourceEntries<E> = BTreeMap<TargetKey, BTreeMap<LinkId, E>>;

#[derive(Clone, Debug)]
pub struct NetworkGraph<E = RouteEntry> {
    sources: FxHashMap<NodeId, SourceEntries<E>>,
    len:     usize,
}

impl<E> Default for NetworkGraph<E> {
    fn default() -> Self {
        Self { sources: FxHashMap::default(), len: 0 }
    }
}

impl<E: GraphEntry> NetworkGraph<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.sources.clear();
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert `entry`, replacing the entry with the same
    /// `(source, target, via_link, in_link)` key.  Returns the replaced entry.
    pub fn update_link_cost(&mut self, entry: E) -> Option<E> {
        let r = *entry.route();
        let old = self
            .sources
            .entry(r.source)
            .or_default()
            .entry((r.target, r.via_link))
            .or_default()
            .insert(r.in_link, entry);
        if old.is_none() {
            self.len += 1;
        }
        old
    }

    pub fn get(&self, source: NodeId, target: Target, via_link: LinkId, in_link: LinkId) -> Option<&E> {
        self.sources.get(&source)?.get(&(target, via_link))?.get(&in_link)
    }

    /// The cheapest reachable entry from `source` (entered on `in_link`)
    /// leading directly to `target`, over all arrival links.
    pub fn next_hop(&self, source: NodeId, target: Target, in_link: LinkId) -> Option<&E> {
        let by_target = self.sources.get(&source)?;
        by_target
            .range((target, LinkId(0))..=(target, LinkId::INVALID))
            .filter_map(|(_, by_in)| by_in.get(&in_link))
            .filter(|e| e.route().is_reachable())
            .min_by(|a, b| a.route().cost.total_cmp(&b.route().cost))
    }

    /// Every entry leaving `source` for traffic that arrived on `in_link`.
    pub fn entries_from(&self, source: NodeId, in_link: LinkId) -> impl Iterator<Item = &E> + '_ {
        self.sources
            .get(&source)
            .into_iter()
            .flat_map(move |by_target| by_target.values().filter_map(move |by_in| by_in.get(&in_link)))
    }

    /// Every entry whose source is `source`.
    pub fn entries_of(&self, source: NodeId) -> impl Iterator<Item = &E> + '_ {
        self.sources
            .get(&source)
            .into_iter()
            .flat_map(|by_target| by_target.values().flat_map(|by_in| by_in.values()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> + '_ {
        self.sources
            .values()
            .flat_map(|by_target| by_target.values().flat_map(|by_in| by_in.values()))
    }

    /// Drop every entry of `source`.  Returns how many were removed.
    pub fn remove_source(&mut self, source: NodeId) -> usize {
        let removed = self
            .sources
            .remove(&source)
            .map_or(0, |by_target| by_target.values().map(BTreeMap::len).sum());
        self.len -= removed;
        removed
    }

    /// Overwrite the cost of every entry with `cost_of(entry)`.
    pub fn recost(&mut self, mut cost_of: impl FnMut(&RouteEntry) -> f32) {
        for by_target in self.sources.values_mut() {
            for by_in in by_target.values_mut() {
                for e in by_in.values_mut() {
                    let cost = cost_of(e.route());
                    e.route_mut().cost = cost;
                }
            }
        }
    }

    /// Centroids that appear as a target of at least one reachable entry.
    pub fn centroids(&self) -> BTreeSet<CentroidId> {
        self.iter()
            .map(GraphEntry::route)
            .filter(|r| cost_is_valid(r.cost))
            .filter_map(|r| r.target.centroid())
            .collect()
    }

    pub fn sources(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.sources.keys().copied()
    }
}
