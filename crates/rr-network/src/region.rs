//! Static partition of junctions into routing regions.
//!
//! A junction is a **border** junction if any junction it shares a link
//! with (in either direction) belongs to a different region; otherwise it
//! is **interior**.  The regional protocols bound interior flooding to one
//! region and let border junctions bridge regions.

use rr_core::{NodeId, RegionId};

use crate::{NetworkError, NetworkResult, TrafficNetwork};

/// Region assigned to every junction when no partition is supplied.
pub const DEFAULT_REGION: RegionId = RegionId(1);

/// Role of a junction within its region.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegionalRole {
    Interior,
    Border,
}

/// Junction → region assignment.  Indexed by `NodeId`; unassigned
/// junctions hold `RegionId::INVALID`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionMap {
    regions: Vec<RegionId>,
}

impl RegionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put every junction of `network` into [`DEFAULT_REGION`].
    pub fn single_region(network: &TrafficNetwork) -> Self {
        Self { regions: vec![DEFAULT_REGION; network.junction_count()] }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (NodeId, RegionId)>) -> Self {
        let mut map = Self::new();
        for (node, region) in pairs {
            map.assign(node, region);
        }
        map
    }

    pub fn assign(&mut self, node: NodeId, region: RegionId) {
        if node.index() >= self.regions.len() {
            self.regions.resize(node.index() + 1, RegionId::INVALID);
        }
        self.regions[node.index()] = region;
    }

    pub fn region_of(&self, node: NodeId) -> Option<RegionId> {
        self.regions.get(node.index()).copied().filter(|r| r.is_valid())
    }

    /// Fail with [`NetworkError::MissingRegion`] on the first junction of
    /// `network` without an assignment.
    pub fn validate(&self, network: &TrafficNetwork) -> NetworkResult<()> {
        match network.junctions().find(|&n| self.region_of(n).is_none()) {
            Some(node) => Err(NetworkError::MissingRegion(node)),
            None => Ok(()),
        }
    }

    pub fn role(&self, network: &TrafficNetwork, node: NodeId) -> RegionalRole {
        let own = self.region_of(node);
        let foreign = network
            .neighbours(node)
            .into_iter()
            .any(|n| self.region_of(n) != own);
        if foreign { RegionalRole::Border } else { RegionalRole::Interior }
    }

    /// Border junctions of `region`, ascending.
    pub fn border_junctions(&self, network: &TrafficNetwork, region: RegionId) -> Vec<NodeId> {
        network
            .junctions()
            .filter(|&n| self.region_of(n) == Some(region))
            .filter(|&n| self.role(network, n) == RegionalRole::Border)
            .collect()
    }

    /// Number of distinct regions in use.
    pub fn region_count(&self) -> usize {
        let mut seen: Vec<RegionId> = self.regions.iter().copied().filter(|r| r.is_valid()).collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }
}
