//! Fluent builder for constructing a [`RoutingSim`].

use std::sync::Arc;

use rr_core::SimConfig;
use rr_network::{RegionMap, TrafficModel, TrafficNetwork};
use rr_routing::{build_shared_graph, ProtocolConfig, RoutingComponent};

use crate::{RoutingSim, SimError, SimResult};

/// Fluent builder for [`RoutingSim<T>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: total ticks, seed, flood rounds, ...
/// - the [`TrafficNetwork`] handle, shared with the traffic simulator
/// - `T: TrafficModel`: live measurements, refreshed externally between ticks
/// - the [`ProtocolConfig`] every junction runs
///
/// # Optional inputs
///
/// | Method          | Default                                   |
/// |-----------------|-------------------------------------------|
/// | `.protocols(v)` | The protocol given to `new` everywhere    |
/// | `.regions(map)` | None; required by the regional protocol   |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = RoutingSimBuilder::new(config, network, traffic, ProtocolConfig::LinkState(Default::default()))
///     .build()?;
/// sim.run(&mut NoopObserver);
/// ```
pub struct RoutingSimBuilder<T: TrafficModel> {
    config:    SimConfig,
    network:   Arc<TrafficNetwork>,
    traffic:   T,
    protocol:  ProtocolConfig,
    protocols: Option<Vec<ProtocolConfig>>,
    regions:   Option<RegionMap>,
}

impl<T: TrafficModel> RoutingSimBuilder<T> {
    pub fn new(
        config:   SimConfig,
        network:  impl Into<Arc<TrafficNetwork>>,
        traffic:  T,
        protocol: ProtocolConfig,
    ) -> Self {
        Self {
            config,
            network: network.into(),
            traffic,
            protocol,
            protocols: None,
            regions:   None,
        }
    }

    /// One protocol per junction, indexed by `NodeId` (must be length
    /// `junction_count`).
    pub fn protocols(mut self, protocols: Vec<ProtocolConfig>) -> Self {
        self.protocols = Some(protocols);
        self
    }

    /// Static region partition.  Must cover every junction when any junction
    /// runs the regional protocol.
    pub fn regions(mut self, regions: RegionMap) -> Self {
        self.regions = Some(regions);
        self
    }

    /// Validate inputs, create one routing component per junction and, if
    /// any junction needs it, the shared graph.
    pub fn build(self) -> SimResult<RoutingSim<T>> {
        let junctions = self.network.junction_count();

        self.config.validate()?;

        let protocols = match self.protocols {
            Some(p) => {
                if p.len() != junctions {
                    return Err(SimError::CountMismatch {
                        expected: junctions,
                        got:      p.len(),
                        what:     "protocols",
                    });
                }
                p
            }
            None => vec![self.protocol; junctions],
        };

        // ── Regions ───────────────────────────────────────────────────────
        if protocols.iter().any(ProtocolConfig::needs_regions) {
            let Some(regions) = &self.regions else {
                return Err(SimError::Config("the regional protocol needs a region map".into()));
            };
            regions.validate(&self.network)?;
        }

        // ── Components ────────────────────────────────────────────────────
        let components = self
            .network
            .junctions()
            .zip(&protocols)
            .map(|(node, protocol)| {
                RoutingComponent::new(&self.network, node, protocol, self.regions.as_ref(), self.config.seed)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let shared_graph = protocols
            .iter()
            .any(ProtocolConfig::needs_shared_graph)
            .then(|| build_shared_graph(&self.network));

        #[cfg(feature = "parallel")]
        if let Some(threads) = self.config.num_threads {
            if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(threads).build_global() {
                tracing::debug!(error = %e, "global thread pool already initialised");
            }
        }

        tracing::info!(
            junctions,
            protocol = protocols.first().map_or("none", ProtocolConfig::name),
            shared_graph = shared_graph.is_some(),
            "routing simulation built"
        );

        Ok(RoutingSim {
            clock:        self.config.make_clock(),
            config:       self.config,
            network:      self.network,
            traffic:      self.traffic,
            components,
            shared_graph,
            pending:      Vec::new(),
        })
    }
}
