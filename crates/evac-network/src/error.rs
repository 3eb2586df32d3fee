//! Network-subsystem error type.

use thiserror::Error;

use evac_core::{CoreError, NodeId, TravelMode};

/// Errors produced by `evac-network`.
///
/// None of these escape the tick loop: a failed route search becomes an
/// empty path, and a failed provider becomes the synthetic grid.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("no {mode} edge from {from} to {to}")]
    EdgeNotFound { mode: TravelMode, from: NodeId, to: NodeId },

    #[error("topology provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
