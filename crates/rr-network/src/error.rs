//! Network-model error type.

use thiserror::Error;

use rr_core::{CentroidId, LinkId, NodeId};

/// Errors produced while building or loading the network model.
///
/// All of these are configuration-time failures: a network that fails to
/// build cannot be routed on.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("junction {0} not found in network")]
    UnknownJunction(NodeId),

    #[error("centroid {0} not found in network")]
    UnknownCentroid(CentroidId),

    #[error("link {0} not found in network")]
    UnknownLink(LinkId),

    #[error("link {link} is invalid: {reason}")]
    InvalidLink { link: LinkId, reason: &'static str },

    #[error("turning {in_link} -> {out_link} does not pass through junction {junction}")]
    InvalidTurning {
        junction: NodeId,
        in_link:  LinkId,
        out_link: LinkId,
    },

    #[error("junction {0} has no region assignment")]
    MissingRegion(NodeId),

    #[error("network parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
