use evac_core::{AgentId, CoreError, NodeId, TravelMode};
use thiserror::Error;

/// Setup-time errors.  The tick loop itself cannot fail.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("agent {agent}: {node} is not in the {mode} graph")]
    NodeNotInGraph {
        agent: AgentId,
        node:  NodeId,
        mode:  TravelMode,
    },

    #[error("agent id {0} is used more than once")]
    DuplicateAgent(AgentId),
}

pub type SimResult<T> = Result<T, SimError>;
