use rr_core::CoreError;
use rr_network::NetworkError;
use rr_routing::RoutingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("{what} length {got} does not match junction count {expected}")]
    CountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("routing setup error: {0}")]
    Routing(#[from] RoutingError),
}

pub type SimResult<T> = Result<T, SimError>;
