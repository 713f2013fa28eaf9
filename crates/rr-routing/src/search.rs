//! Shortest-path searches over a [`NetworkGraph`].
//!
//! # Search state
//!
//! Costs depend on the turning taken at every junction, so a search state
//! is a `(junction, arrival link)` pair rather than a bare junction.  The
//! start state is `(source, in_link)` at cost zero; expanding a state walks
//! [`NetworkGraph::entries_from`].  Centroids are terminal: they are
//! recorded but never expanded.
//!
//! # Queue discipline
//!
//! Both searches use a `BinaryHeap` of `Reverse((cost, seq, state))`.  A
//! state is pushed only when its cost strictly improves, and popped entries
//! whose cost is above the best known one are skipped; this is equivalent to
//! removing the stale queue entry.  `seq` is an insertion counter, so equal
//! costs come out in FIFO order and the first path found is kept.

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap};

use rustc_hash::FxHashMap;

use rr_core::{CentroidId, LinkId, NodeId};

use crate::entry::{cost_is_valid, Target};
use crate::graph::{GraphEntry, NetworkGraph};

/// Total order over `f32` costs for use as a heap key.
#[derive(Copy, Clone, Debug, PartialEq)]
struct OrdCost(f32);

impl Eq for OrdCost {}

impl PartialOrd for OrdCost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrdCost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

type State = (NodeId, LinkId);

/// Cost and first hop of the best path to something.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Reached {
    pub cost:      f32,
    /// Out-link taken at the source junction.
    pub first_hop: LinkId,
}

/// Result of a one-to-all search from `(source, in_link)`.
#[derive(Clone, Debug, Default)]
pub struct ShortestPaths {
    pub centroids: BTreeMap<CentroidId, Reached>,
    /// Junction states `(junction, arrival link)` other than the start.
    pub nodes:     BTreeMap<(NodeId, LinkId), Reached>,
}

/// One-to-all Dijkstra from `source` entered on `in_link`.
///
/// `skip` hides entries from the search.  `step_cost(entry, g)` returns the
/// cost of traversing `entry` when it is reached at accumulated cost `g`;
/// invalid step costs make the entry unusable.
pub fn dijkstra<E, S, C>(
    graph:         &NetworkGraph<E>,
    source:        NodeId,
    in_link:       LinkId,
    skip:          S,
    mut step_cost: C,
) -> ShortestPaths
where
    E: GraphEntry,
    S: Fn(&E) -> bool,
    C: FnMut(&E, f32) -> f32,
{
    let start: State = (source, in_link);
    let mut best: FxHashMap<State, Reached> = FxHashMap::default();
    let mut centroids: BTreeMap<CentroidId, Reached> = BTreeMap::new();
    let mut heap: BinaryHeap<Reverse<(OrdCost, u64, State)>> = BinaryHeap::new();
    let mut seq = 0u64;

    best.insert(start, Reached { cost: 0.0, first_hop: LinkId::INVALID });
    heap.push(Reverse((OrdCost(0.0), seq, start)));

    while let Some(Reverse((OrdCost(g), _, state))) = heap.pop() {
        let Some(&here) = best.get(&state) else { continue };
        // Skip stale heap entries.
        if g > here.cost {
            continue;
        }

        for e in graph.entries_from(state.0, state.1) {
            if skip(e) {
                continue;
            }
            let step = step_cost(e, g);
            if !cost_is_valid(step) {
                continue;
            }
            let r = e.route();
            let reached = Reached {
                cost:      g + step,
                first_hop: if state == start { r.out_link } else { here.first_hop },
            };
            match r.target {
                Target::Centroid(c) => {
                    let better = centroids.get(&c).is_none_or(|old| reached.cost < old.cost);
                    if better {
                        centroids.insert(c, reached);
                    }
                }
                Target::Node(n) => {
                    let next = (n, r.via_link);
                    let better = best.get(&next).is_none_or(|old| reached.cost < old.cost);
                    if better {
                        best.insert(next, reached);
                        seq += 1;
                        heap.push(Reverse((OrdCost(reached.cost), seq, next)));
                    }
                }
            }
        }
    }

    best.remove(&start);
    ShortestPaths { centroids, nodes: best.into_iter().collect() }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Open {
    Junction(State),
    Goal,
}

/// A* from `source` entered on `in_link` to the single centroid `goal`.
///
/// `heuristic(entry)` estimates the remaining cost once `entry` has been
/// taken to a junction; it must not overestimate for the result to be
/// optimal.  States are reopened when a cheaper path to them turns up, so an
/// admissible but inconsistent estimate is still exact.  Entry costs are
/// used as-is.
pub fn astar<E, H>(
    graph:     &NetworkGraph<E>,
    source:    NodeId,
    in_link:   LinkId,
    goal:      CentroidId,
    heuristic: H,
) -> Option<Reached>
where
    E: GraphEntry,
    H: Fn(&E) -> f32,
{
    let start: State = (source, in_link);
    let mut g_cost: FxHashMap<State, f32> = FxHashMap::default();
    // State → (predecessor state, out-link taken at the predecessor).
    let mut pred: FxHashMap<State, (State, LinkId)> = FxHashMap::default();
    let mut goal_cost = f32::INFINITY;
    let mut goal_pred: Option<(State, LinkId)> = None;
    let mut open: BinaryHeap<Reverse<(OrdCost, u64, Open)>> = BinaryHeap::new();
    let mut seq = 0u64;

    g_cost.insert(start, 0.0);
    open.push(Reverse((OrdCost(0.0), seq, Open::Junction(start))));

    while let Some(Reverse((_, _, item))) = open.pop() {
        let state = match item {
            Open::Goal => break,
            Open::Junction(s) => s,
        };
        let g = g_cost.get(&state).copied().unwrap_or(f32::INFINITY);

        for e in graph.entries_from(state.0, state.1) {
            let r = e.route();
            if !cost_is_valid(r.cost) {
                continue;
            }
            let new_g = g + r.cost;
            match r.target {
                Target::Centroid(c) if c == goal => {
                    if new_g < goal_cost {
                        goal_cost = new_g;
                        goal_pred = Some((state, r.out_link));
                        seq += 1;
                        open.push(Reverse((OrdCost(new_g), seq, Open::Goal)));
                    }
                }
                Target::Centroid(_) => {}
                Target::Node(n) => {
                    let next = (n, r.via_link);
                    let better = g_cost.get(&next).is_none_or(|&old| new_g < old);
                    if better {
                        g_cost.insert(next, new_g);
                        pred.insert(next, (state, r.out_link));
                        seq += 1;
                        let f = new_g + heuristic(e).max(0.0);
                        open.push(Reverse((OrdCost(f), seq, Open::Junction(next))));
                    }
                }
            }
        }
    }

    let (mut state, mut first_hop) = goal_pred?;
    while state != start {
        let &(prev, out_link) = pred.get(&state)?;
        first_hop = out_link;
        state = prev;
    }
    Some(Reached { cost: goal_cost, first_hop })
}
