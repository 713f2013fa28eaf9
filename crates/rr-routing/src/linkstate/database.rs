use rr_core::NodeId;

use crate::graph::NetworkGraph;
use crate::linkstate::advertisement::{Advertisement, DatabaseEntry, SequenceFilter};

/// A junction's private link-state view, built only from advertisements.
///
/// An advertisement replaces everything previously known from its
/// originator, but only if its sequence number is newer than the last one
/// applied; anything else is ignored.  Applying the same advertisement twice
/// therefore changes nothing the second time.
#[derive(Clone, Debug, Default)]
pub struct Database {
    graph: NetworkGraph<DatabaseEntry>,
    seen:  SequenceFilter,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph(&self) -> &NetworkGraph<DatabaseEntry> {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn last_sequence(&self, originator: NodeId) -> Option<u64> {
        self.seen.last(originator)
    }

    /// Apply `ad` if it is newer than anything seen from its originator.
    /// Returns whether it was applied.
    pub fn apply(&mut self, ad: &Advertisement) -> bool {
        if !self.seen.accept(ad.originator, ad.sequence) {
            return false;
        }
        self.graph.remove_source(ad.originator);

        for entry in &ad.entries {
            let r = &entry.route;
            if let Some(existing) = self.graph.get(r.source, r.target, r.via_link, r.in_link) {
                if existing.sequence > entry.sequence {
                    continue;
                }
                // Two entries for one key in the same advertisement: keep the cheaper.
                if existing.sequence == entry.sequence && existing.route.cost <= r.cost {
                    continue;
                }
            }
            self.graph.update_link_cost(entry.clone());
        }
        true
    }
}
