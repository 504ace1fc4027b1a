//! Error type shared by the simulator, the algorithms, and the driver.

use crate::types::{NodeId, Role};

/// Errors reported to the caller. None of them are retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    /// Node id was never assigned or has already left the market.
    #[error("node {0} is not in the market")]
    UnknownNode(NodeId),
    /// Node exists but is still pending (wait countdown not yet elapsed).
    #[error("node {0} is pending, not active")]
    NodeNotActive(NodeId),
    #[error("node {id} is a {actual:?}, expected a {expected:?}")]
    RoleMismatch {
        id: NodeId,
        expected: Role,
        actual: Role,
    },
    /// `remove_matching` called on a buyer/seller pair with no edge between them.
    #[error("no edge between buyer {buyer} and seller {seller}")]
    MissingMatch { buyer: NodeId, seller: NodeId },
    #[error("batch period must be positive")]
    InvalidBatchPeriod,
    #[error("auction increment must be positive and finite, got {0}")]
    InvalidEpsilon(f64),
    #[error("unknown algorithm {0:?}")]
    UnknownAlgorithm(String),
    #[error("unknown weight function {0:?}")]
    UnknownWeight(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SimError {
    /// True for caller/simulator desynchronization errors (as opposed to a
    /// missing match or a configuration problem).
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            SimError::UnknownNode(_) | SimError::NodeNotActive(_) | SimError::RoleMismatch { .. }
        )
    }
}
