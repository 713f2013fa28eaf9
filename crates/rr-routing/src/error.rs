use thiserror::Error;

use rr_core::NodeId;
use rr_network::{Element, NetworkError};

#[derive(Debug, Error)]
pub enum RoutingError {
    /// The traffic model has no value for a link or turning the junction
    /// needs this tick.  The junction keeps its previous tables.
    #[error("junction {node}: no measurement for {element:?}")]
    MissingMeasurement { node: NodeId, element: Element },

    #[error("junction {0} is not assigned to a region")]
    MissingRegion(NodeId),

    #[error("junction {0}: heuristic protocol needs the shared network graph")]
    MissingSharedGraph(NodeId),

    #[error(transparent)]
    Network(#[from] NetworkError),
}

pub type RoutingResult<T> = Result<T, RoutingError>;
