//! Traffic-network topology and builder.
//!
//! # Data layout
//!
//! Links and centroids are indexed by their ids.  Per-junction adjacency is
//! stored in **Compressed Sparse Row (CSR)** form, one row-pointer array per
//! relation:
//!
//! ```text
//! out_links[ out_start[n] .. out_start[n+1] ]   links leaving junction n
//! in_links [ in_start[n]  .. in_start[n+1]  ]   links entering junction n
//! turnings [ turn_start[n] .. turn_start[n+1] ] (in, out) pairs through n
//! ```
//!
//! Rows are sorted by link id so iteration order is stable across runs.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over centroid positions answers "all centroids
//! ordered by distance from a point" without a full sort per query.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use rr_core::{CentroidId, LinkId, NodeId, Point};

use crate::{NetworkError, NetworkResult};

// ── Topology value types ──────────────────────────────────────────────────────

/// One end of a directed link.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LinkEnd {
    Junction(NodeId),
    Centroid(CentroidId),
}

/// A directed road section.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Link {
    pub from:        LinkEnd,
    pub to:          LinkEnd,
    /// Length in network distance units.
    pub length:      f64,
    /// Free-flow speed limit in distance units per time unit.
    pub speed_limit: f64,
    pub lanes:       u8,
}

/// A permitted movement through a junction from `in_link` to `out_link`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Turning {
    pub in_link:  LinkId,
    pub out_link: LinkId,
}

impl Turning {
    #[inline]
    pub fn new(in_link: LinkId, out_link: LinkId) -> Self {
        Self { in_link, out_link }
    }
}

// ── R-tree centroid entry ─────────────────────────────────────────────────────

#[derive(Clone)]
struct CentroidEntry {
    point: [f64; 2],
    id:    CentroidId,
}

impl RTreeObject for CentroidEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for CentroidEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── TrafficNetwork ────────────────────────────────────────────────────────────

/// Immutable road topology shared by every routing component.
///
/// Do not construct directly; use [`TrafficNetworkBuilder`].
pub struct TrafficNetwork {
    /// Position of each junction.  Indexed by `NodeId`.
    pub junction_pos: Vec<Point>,
    /// Position of each centroid.  Indexed by `CentroidId`.
    pub centroid_pos: Vec<Point>,
    /// Link records.  Indexed by `LinkId`.
    pub links:        Vec<Link>,

    out_start:  Vec<u32>,
    out_links:  Vec<LinkId>,
    in_start:   Vec<u32>,
    in_links:   Vec<LinkId>,
    turn_start: Vec<u32>,
    turnings:   Vec<Turning>,

    centroid_idx: RTree<CentroidEntry>,
}

impl TrafficNetwork {
    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn junction_count(&self) -> usize {
        self.junction_pos.len()
    }

    pub fn centroid_count(&self) -> usize {
        self.centroid_pos.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Highest speed limit of any link; 0 for a network without links.
    pub fn max_speed_limit(&self) -> f64 {
        self.links.iter().map(|l| l.speed_limit).fold(0.0, f64::max)
    }

    pub fn junctions(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.junction_pos.len()).map(|i| NodeId(i as u32))
    }

    pub fn centroids(&self) -> impl Iterator<Item = CentroidId> + '_ {
        (0..self.centroid_pos.len()).map(|i| CentroidId(i as u32))
    }

    pub fn contains_junction(&self, node: NodeId) -> bool {
        node.index() < self.junction_pos.len()
    }

    // ── Adjacency ─────────────────────────────────────────────────────────

    #[inline]
    pub fn out_links(&self, node: NodeId) -> &[LinkId] {
        csr_row(&self.out_start, &self.out_links, node)
    }

    #[inline]
    pub fn in_links(&self, node: NodeId) -> &[LinkId] {
        csr_row(&self.in_start, &self.in_links, node)
    }

    #[inline]
    pub fn turnings(&self, node: NodeId) -> &[Turning] {
        csr_row(&self.turn_start, &self.turnings, node)
    }

    pub fn has_turning(&self, node: NodeId, turning: Turning) -> bool {
        self.turnings(node).binary_search(&turning).is_ok()
    }

    #[inline]
    pub fn link(&self, link: LinkId) -> &Link {
        &self.links[link.index()]
    }

    /// The junction `link` leads to, or `None` if it ends at a centroid.
    pub fn next_junction(&self, link: LinkId) -> Option<NodeId> {
        match self.links[link.index()].to {
            LinkEnd::Junction(n) => Some(n),
            LinkEnd::Centroid(_) => None,
        }
    }

    /// The centroid `link` leads to, or `None` if it ends at a junction.
    pub fn link_centroid(&self, link: LinkId) -> Option<CentroidId> {
        match self.links[link.index()].to {
            LinkEnd::Centroid(c) => Some(c),
            LinkEnd::Junction(_) => None,
        }
    }

    /// The junction `link` starts at, or `None` if it leaves a centroid.
    pub fn prev_junction(&self, link: LinkId) -> Option<NodeId> {
        match self.links[link.index()].from {
            LinkEnd::Junction(n) => Some(n),
            LinkEnd::Centroid(_) => None,
        }
    }

    /// Junctions adjacent to `node` through a link in either direction,
    /// sorted and without duplicates.
    pub fn neighbours(&self, node: NodeId) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = self
            .out_links(node)
            .iter()
            .filter_map(|&l| self.next_junction(l))
            .chain(self.in_links(node).iter().filter_map(|&l| self.prev_junction(l)))
            .filter(|&n| n != node)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Every centroid ordered by ascending Euclidean distance from `pos`.
    pub fn centroids_by_distance(&self, pos: Point) -> Vec<CentroidId> {
        self.centroid_idx
            .nearest_neighbor_iter(&pos.to_array())
            .map(|e| e.id)
            .collect()
    }

    pub fn nearest_centroid(&self, pos: Point) -> Option<CentroidId> {
        self.centroid_idx.nearest_neighbor(&pos.to_array()).map(|e| e.id)
    }
}

#[inline]
fn csr_row<'a, T>(start: &[u32], data: &'a [T], node: NodeId) -> &'a [T] {
    let lo = start[node.index()] as usize;
    let hi = start[node.index() + 1] as usize;
    &data[lo..hi]
}

// ── TrafficNetworkBuilder ─────────────────────────────────────────────────────

/// Construct a [`TrafficNetwork`] incrementally, then call
/// [`build`](Self::build).
///
/// # Example
///
/// ```
/// use rr_core::Point;
/// use rr_network::{LinkEnd, TrafficNetworkBuilder};
///
/// let mut b = TrafficNetworkBuilder::new();
/// let src = b.add_centroid(Point::new(-100.0, 0.0));
/// let dst = b.add_centroid(Point::new(200.0, 0.0));
/// let a   = b.add_junction(Point::new(0.0, 0.0));
/// let c   = b.add_junction(Point::new(100.0, 0.0));
/// let l0  = b.add_link(LinkEnd::Centroid(src), LinkEnd::Junction(a), 100.0, 10.0);
/// let l1  = b.add_link(LinkEnd::Junction(a), LinkEnd::Junction(c), 100.0, 10.0);
/// let l2  = b.add_link(LinkEnd::Junction(c), LinkEnd::Centroid(dst), 100.0, 10.0);
/// b.add_turning(a, l0, l1);
/// b.add_turning(c, l1, l2);
/// let net = b.build().unwrap();
/// assert_eq!(net.turnings(a).len(), 1);
/// ```
pub struct TrafficNetworkBuilder {
    junctions: Vec<Point>,
    centroids: Vec<Point>,
    links:     Vec<Link>,
    turnings:  Vec<(NodeId, Turning)>,
}

impl TrafficNetworkBuilder {
    pub fn new() -> Self {
        Self {
            junctions: Vec::new(),
            centroids: Vec::new(),
            links:     Vec::new(),
            turnings:  Vec::new(),
        }
    }

    /// Add a junction and return its `NodeId` (sequential from 0).
    pub fn add_junction(&mut self, pos: Point) -> NodeId {
        let id = NodeId(self.junctions.len() as u32);
        self.junctions.push(pos);
        id
    }

    /// Add a centroid and return its `CentroidId` (sequential from 0).
    pub fn add_centroid(&mut self, pos: Point) -> CentroidId {
        let id = CentroidId(self.centroids.len() as u32);
        self.centroids.push(pos);
        id
    }

    /// Add a single-lane directed link.
    pub fn add_link(&mut self, from: LinkEnd, to: LinkEnd, length: f64, speed_limit: f64) -> LinkId {
        self.add_link_with_lanes(from, to, length, speed_limit, 1)
    }

    pub fn add_link_with_lanes(
        &mut self,
        from:        LinkEnd,
        to:          LinkEnd,
        length:      f64,
        speed_limit: f64,
        lanes:       u8,
    ) -> LinkId {
        let id = LinkId(self.links.len() as u32);
        self.links.push(Link { from, to, length, speed_limit, lanes });
        id
    }

    /// Convenience: two opposing junction-to-junction links.  Returns
    /// `(a→b, b→a)`.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, length: f64, speed_limit: f64) -> (LinkId, LinkId) {
        let ab = self.add_link(LinkEnd::Junction(a), LinkEnd::Junction(b), length, speed_limit);
        let ba = self.add_link(LinkEnd::Junction(b), LinkEnd::Junction(a), length, speed_limit);
        (ab, ba)
    }

    pub fn add_turning(&mut self, junction: NodeId, in_link: LinkId, out_link: LinkId) {
        self.turnings.push((junction, Turning::new(in_link, out_link)));
    }

    /// Permit every movement through `junction` except a U-turn back onto a
    /// link that returns to where the incoming link came from.
    pub fn connect_all(&mut self, junction: NodeId) {
        let here = LinkEnd::Junction(junction);
        let ins: Vec<(LinkId, LinkEnd)> = self
            .links
            .iter()
            .enumerate()
            .filter(|(_, l)| l.to == here)
            .map(|(i, l)| (LinkId(i as u32), l.from))
            .collect();
        let outs: Vec<(LinkId, LinkEnd)> = self
            .links
            .iter()
            .enumerate()
            .filter(|(_, l)| l.from == here)
            .map(|(i, l)| (LinkId(i as u32), l.to))
            .collect();
        for &(in_link, origin) in &ins {
            for &(out_link, dest) in &outs {
                if origin != dest {
                    self.add_turning(junction, in_link, out_link);
                }
            }
        }
    }

    /// Move a junction added earlier (used by the coordinate loader).
    pub fn set_junction_pos(&mut self, node: NodeId, pos: Point) -> NetworkResult<()> {
        let slot = self
            .junctions
            .get_mut(node.index())
            .ok_or(NetworkError::UnknownJunction(node))?;
        *slot = pos;
        Ok(())
    }

    pub fn set_centroid_pos(&mut self, centroid: CentroidId, pos: Point) -> NetworkResult<()> {
        let slot = self
            .centroids
            .get_mut(centroid.index())
            .ok_or(NetworkError::UnknownCentroid(centroid))?;
        *slot = pos;
        Ok(())
    }

    pub fn junction_count(&self) -> usize { self.junctions.len() }
    pub fn centroid_count(&self) -> usize { self.centroids.len() }
    pub fn link_count(&self) -> usize { self.links.len() }

    /// Validate references, build the CSR rows, and bulk-load the centroid
    /// R-tree.
    pub fn build(self) -> NetworkResult<TrafficNetwork> {
        let n = self.junctions.len();

        // ── Validate links ────────────────────────────────────────────────
        for (i, link) in self.links.iter().enumerate() {
            let id = LinkId(i as u32);
            for end in [link.from, link.to] {
                match end {
                    LinkEnd::Junction(j) if j.index() >= n => {
                        return Err(NetworkError::UnknownJunction(j));
                    }
                    LinkEnd::Centroid(c) if c.index() >= self.centroids.len() => {
                        return Err(NetworkError::UnknownCentroid(c));
                    }
                    _ => {}
                }
            }
            if matches!((link.from, link.to), (LinkEnd::Centroid(_), LinkEnd::Centroid(_))) {
                return Err(NetworkError::InvalidLink { link: id, reason: "joins two centroids" });
            }
            if link.from == link.to {
                return Err(NetworkError::InvalidLink { link: id, reason: "is a self-loop" });
            }
            if !(link.length.is_finite() && link.length >= 0.0) {
                return Err(NetworkError::InvalidLink { link: id, reason: "has a negative or non-finite length" });
            }
            if !(link.speed_limit.is_finite() && link.speed_limit > 0.0) {
                return Err(NetworkError::InvalidLink { link: id, reason: "has a non-positive speed limit" });
            }
        }

        // ── Validate turnings ─────────────────────────────────────────────
        for &(junction, t) in &self.turnings {
            if junction.index() >= n {
                return Err(NetworkError::UnknownJunction(junction));
            }
            for l in [t.in_link, t.out_link] {
                if l.index() >= self.links.len() {
                    return Err(NetworkError::UnknownLink(l));
                }
            }
            let here = LinkEnd::Junction(junction);
            if self.links[t.in_link.index()].to != here || self.links[t.out_link.index()].from != here {
                return Err(NetworkError::InvalidTurning {
                    junction,
                    in_link:  t.in_link,
                    out_link: t.out_link,
                });
            }
        }

        // ── CSR rows ──────────────────────────────────────────────────────
        let mut outs: Vec<(NodeId, LinkId)> = Vec::new();
        let mut ins:  Vec<(NodeId, LinkId)> = Vec::new();
        for (i, link) in self.links.iter().enumerate() {
            if let LinkEnd::Junction(j) = link.from {
                outs.push((j, LinkId(i as u32)));
            }
            if let LinkEnd::Junction(j) = link.to {
                ins.push((j, LinkId(i as u32)));
            }
        }
        let (out_start, out_links) = build_csr(n, outs);
        let (in_start, in_links)   = build_csr(n, ins);
        let (turn_start, turnings) = build_csr(n, self.turnings);

        let entries: Vec<CentroidEntry> = self
            .centroids
            .iter()
            .enumerate()
            .map(|(i, &pos)| CentroidEntry { point: pos.to_array(), id: CentroidId(i as u32) })
            .collect();

        Ok(TrafficNetwork {
            junction_pos: self.junctions,
            centroid_pos: self.centroids,
            links:        self.links,
            out_start,
            out_links,
            in_start,
            in_links,
            turn_start,
            turnings,
            centroid_idx: RTree::bulk_load(entries),
        })
    }
}

impl Default for TrafficNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Sort `(row, value)` pairs, drop duplicates, and produce a CSR row
/// pointer plus the flattened values.
fn build_csr<T: Ord + Copy>(rows: usize, mut pairs: Vec<(NodeId, T)>) -> (Vec<u32>, Vec<T>) {
    pairs.sort_unstable();
    pairs.dedup();

    let mut start = vec![0u32; rows + 1];
    for (row, _) in &pairs {
        start[row.index() + 1] += 1;
    }
    for i in 1..=rows {
        start[i] += start[i - 1];
    }
    debug_assert_eq!(start[rows] as usize, pairs.len());

    (start, pairs.into_iter().map(|(_, v)| v).collect())
}
