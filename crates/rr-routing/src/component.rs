//! The per-junction routing component.

use std::sync::Arc;

use rr_core::{CentroidId, LinkId, NodeId, NodeRng, Point, RegionId};
use rr_network::region::DEFAULT_REGION;
use rr_network::{NetworkError, RegionMap, RegionalRole, TrafficModel, TrafficNetwork, Turning};

use crate::entry::{cost_is_valid, Target};
use crate::event::RoutingEvent;
use crate::linkstate::{Advertisement, AdvertisementScope};
use crate::protocol::{Protocol, ProtocolConfig, ProtocolState, TickContext};
use crate::table::RoutingTable;
use crate::{RoutingError, RoutingResult};

// ── NodeTopology ──────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Neighbour {
    pub node:   NodeId,
    pub region: RegionId,
}

/// Static view of one junction, captured once at construction.
#[derive(Clone, Debug)]
pub struct NodeTopology {
    pub node:      NodeId,
    pub pos:       Point,
    /// One routing table per entry, in this order.
    pub in_links:  Vec<LinkId>,
    pub out_links: Vec<LinkId>,
    /// Sorted.
    pub turnings:  Vec<Turning>,
    /// Out-links that end at a centroid, with that centroid.
    pub local_destinations: Vec<(LinkId, CentroidId)>,
    pub neighbours: Vec<Neighbour>,
    pub region:    RegionId,
    pub role:      RegionalRole,
}

impl NodeTopology {
    /// Capture `node` from `network`.  Without a region map every junction
    /// sits in [`DEFAULT_REGION`] and is interior.
    pub fn new(network: &TrafficNetwork, node: NodeId, regions: Option<&RegionMap>) -> RoutingResult<Self> {
        if !network.contains_junction(node) {
            return Err(NetworkError::UnknownJunction(node).into());
        }

        let region_of = |n: NodeId| -> RoutingResult<RegionId> {
            match regions {
                Some(map) => map.region_of(n).ok_or(RoutingError::MissingRegion(n)),
                None => Ok(DEFAULT_REGION),
            }
        };

        let region = region_of(node)?;
        let neighbours = network
            .neighbours(node)
            .into_iter()
            .map(|n| Ok(Neighbour { node: n, region: region_of(n)? }))
            .collect::<RoutingResult<Vec<_>>>()?;
        let role = match regions {
            Some(map) => map.role(network, node),
            None => RegionalRole::Interior,
        };

        let out_links = network.out_links(node).to_vec();
        let local_destinations = out_links
            .iter()
            .filter_map(|&l| network.link_centroid(l).map(|c| (l, c)))
            .collect();

        Ok(Self {
            node,
            pos: network.junction_pos[node.index()],
            in_links: network.in_links(node).to_vec(),
            out_links,
            turnings: network.turnings(node).to_vec(),
            local_destinations,
            neighbours,
            region,
            role,
        })
    }

    pub fn is_border(&self) -> bool {
        self.role == RegionalRole::Border
    }

    pub fn in_link_index(&self, link: LinkId) -> Option<usize> {
        self.in_links.iter().position(|&l| l == link)
    }

    pub fn has_turning(&self, turning: Turning) -> bool {
        self.turnings.binary_search(&turning).is_ok()
    }

    pub fn local_destination(&self, out_link: LinkId) -> Option<CentroidId> {
        self.local_destinations
            .iter()
            .find(|(l, _)| *l == out_link)
            .map(|&(_, c)| c)
    }

    pub fn is_local_destination(&self, centroid: CentroidId) -> bool {
        self.local_destinations.iter().any(|&(_, c)| c == centroid)
    }

    pub fn region_of_neighbour(&self, node: NodeId) -> Option<RegionId> {
        self.neighbours.iter().find(|n| n.node == node).map(|n| n.region)
    }

    /// Empty tables, one per incoming link.
    pub fn fresh_tables(&self) -> Vec<RoutingTable> {
        self.in_links.iter().map(|&l| RoutingTable::new(l)).collect()
    }

    /// Neighbours an advertisement of `scope` is flooded to, minus `except`.
    pub fn recipients(&self, scope: AdvertisementScope, except: Option<NodeId>) -> Vec<NodeId> {
        self.neighbours
            .iter()
            .filter(|n| Some(n.node) != except)
            .filter(|n| match scope {
                AdvertisementScope::Interior(region) => n.region == region,
                AdvertisementScope::Flat | AdvertisementScope::Border => true,
            })
            .map(|n| n.node)
            .collect()
    }
}

/// What `out_link` leads to.
pub(crate) fn target_of(network: &TrafficNetwork, out_link: LinkId) -> Option<Target> {
    network
        .next_junction(out_link)
        .map(Target::Node)
        .or_else(|| network.link_centroid(out_link).map(Target::Centroid))
}

/// Write every directly attached centroid into every table whose in-link can
/// turn onto it, at measured turning cost plus link delay.  A link without a
/// delay measurement is priced at its free-flow travel time.
pub(crate) fn insert_local_destinations(node: &NodeTopology, tables: &mut [RoutingTable], ctx: &TickContext<'_>) {
    for table in tables.iter_mut() {
        for &(out_link, centroid) in &node.local_destinations {
            let turning = Turning::new(table.in_link(), out_link);
            if !node.has_turning(turning) {
                continue;
            }
            let Some(turn) = ctx.traffic.turning_cost(turning) else {
                continue;
            };
            let link = ctx.traffic.link_delay(out_link).unwrap_or_else(|| {
                let l = ctx.network.link(out_link);
                (l.length / l.speed_limit) as f32
            });
            if cost_is_valid(turn) {
                table.insert(centroid, out_link, turn + link);
            }
        }
    }
}

// ── Delivery ──────────────────────────────────────────────────────────────────

/// One advertisement in flight between neighbouring junctions.  The
/// advertisement itself is shared and never mutated after sending.
#[derive(Clone, Debug)]
pub struct Delivery {
    pub from: NodeId,
    pub to:   NodeId,
    pub ad:   Arc<Advertisement>,
}

// ── RoutingComponent ──────────────────────────────────────────────────────────

/// A junction's routing state: its tables, its protocol, and its RNG.
pub struct RoutingComponent {
    topology:      NodeTopology,
    tables:        Vec<RoutingTable>,
    protocol:      ProtocolState,
    protocol_name: &'static str,
    rng:           NodeRng,
    messages_sent: u64,
}

impl RoutingComponent {
    /// Build the component for `node`.  Regional protocols need `regions`
    /// to cover the junction and all its neighbours.
    pub fn new(
        network: &TrafficNetwork,
        node:    NodeId,
        config:  &ProtocolConfig,
        regions: Option<&RegionMap>,
        seed:    u64,
    ) -> RoutingResult<Self> {
        let regions = if config.needs_regions() {
            Some(regions.ok_or(RoutingError::MissingRegion(node))?)
        } else {
            None
        };
        let topology = NodeTopology::new(network, node, regions)?;
        let protocol = ProtocolState::new(config, &topology, network);
        Ok(Self {
            tables: topology.fresh_tables(),
            protocol,
            protocol_name: config.name(),
            rng: NodeRng::new(seed, node),
            messages_sent: 0,
            topology,
        })
    }

    #[inline]
    pub fn node(&self) -> NodeId {
        self.topology.node
    }

    pub fn topology(&self) -> &NodeTopology {
        &self.topology
    }

    pub fn protocol(&self) -> &ProtocolState {
        &self.protocol
    }

    pub fn protocol_name(&self) -> &'static str {
        self.protocol_name
    }

    /// Tables in `topology().in_links` order.
    pub fn tables(&self) -> &[RoutingTable] {
        &self.tables
    }

    pub fn table(&self, in_link: LinkId) -> Option<&RoutingTable> {
        self.topology.in_link_index(in_link).map(|i| &self.tables[i])
    }

    pub fn next_hop(&self, in_link: LinkId, destination: CentroidId) -> Option<LinkId> {
        self.table(in_link)?.next_hop(destination)
    }

    pub fn delay(&self, in_link: LinkId, destination: CentroidId) -> Option<f32> {
        self.table(in_link)?.delay(destination)
    }

    /// Advertisements this junction has sent or forwarded so far.
    pub fn messages_sent(&self) -> u64 {
        self.messages_sent
    }

    // ── Tick phases ───────────────────────────────────────────────────────

    /// Phase 1: originate this tick's own advertisements.
    pub fn originate(&mut self, ctx: &TickContext<'_>) -> RoutingResult<Vec<Delivery>> {
        let ads = self.protocol.originate(&self.topology, ctx)?;
        let mut out = Vec::new();
        for ad in ads {
            out.extend(self.address(ad, None));
        }
        Ok(out)
    }

    /// Phase 2: take one delivered advertisement.  Returns the copies to
    /// flood on; stale and own advertisements are dropped silently.
    pub fn receive(&mut self, delivery: &Delivery) -> Vec<Delivery> {
        if delivery.ad.originator == self.topology.node {
            return Vec::new();
        }
        if !self.protocol.receive(&self.topology, &delivery.ad) {
            tracing::trace!(
                node = %self.topology.node,
                originator = %delivery.ad.originator,
                seq = delivery.ad.sequence,
                "advertisement discarded"
            );
            return Vec::new();
        }
        self.address(Arc::clone(&delivery.ad), Some(delivery.from))
    }

    /// Phase 3: recompute and commit tables.  Returns an event for every
    /// table that changed.  On error nothing is committed.
    pub fn recompute(&mut self, ctx: &TickContext<'_>) -> RoutingResult<Vec<RoutingEvent>> {
        let fresh = self.protocol.recompute(&self.topology, ctx, &mut self.rng)?;
        debug_assert_eq!(fresh.len(), self.tables.len());

        let events: Vec<RoutingEvent> = self
            .tables
            .iter()
            .zip(&fresh)
            .filter(|(old, new)| old != new)
            .map(|(_, new)| RoutingEvent::TableChanged {
                node:    self.topology.node,
                in_link: new.in_link(),
                routes:  new.len(),
            })
            .collect();
        self.tables = fresh;
        Ok(events)
    }

    /// Run all three phases for an isolated junction: originate, take
    /// `inbox`, recompute.  Returns the outgoing deliveries and the events.
    pub fn perform_protocol(
        &mut self,
        ctx:   &TickContext<'_>,
        inbox: &[Delivery],
    ) -> RoutingResult<(Vec<Delivery>, Vec<RoutingEvent>)> {
        let mut outgoing = self.originate(ctx)?;
        for d in inbox {
            outgoing.extend(self.receive(d));
        }
        let events = self.recompute(ctx)?;
        Ok((outgoing, events))
    }

    fn address(&mut self, ad: Arc<Advertisement>, except: Option<NodeId>) -> Vec<Delivery> {
        let from = self.topology.node;
        let out: Vec<Delivery> = self
            .topology
            .recipients(ad.scope, except)
            .into_iter()
            .map(|to| Delivery { from, to, ad: Arc::clone(&ad) })
            .collect();
        self.messages_sent += out.len() as u64;
        out
    }
}
