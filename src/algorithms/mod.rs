//! Online matching algorithms.
//!
//! Every strategy implements [`MatchingAlgorithm`]: it reads the current
//! [`Simulator`] state and returns the (buyer, seller) pairs to commit now. The
//! caller realizes them with [`Simulator::remove_matching`]; algorithms never
//! mutate the market.
//!
//! [`Algorithm`] is the tagged variant the experiment driver dispatches on.

pub mod batching;
pub mod deferred;
pub mod greedy;

pub use batching::Batching;
pub use deferred::{DeferredAcceptance, DEFAULT_EPSILON};
pub use greedy::Greedy;

use crate::error::SimError;
use crate::simulator::Simulator;
use crate::types::{Match, NodeId};

/// Contract shared by all online matching strategies.
pub trait MatchingAlgorithm {
    /// Pairs to commit at the simulator's current time. No buyer or seller
    /// appears twice.
    fn compute_matching(&mut self, sim: &Simulator) -> Result<Vec<Match>, SimError>;

    /// Short name used in logs and reports.
    fn name(&self) -> &str;
}

/// Concrete strategies, dispatched by the driver.
#[derive(Clone, Debug)]
pub enum Algorithm {
    Greedy(Greedy),
    DeferredAcceptance(DeferredAcceptance),
    Batching(Batching),
}

impl Algorithm {
    /// Builds a strategy from its name (`greedy` or `deferred`), optionally
    /// wrapped in [`Batching`] with the given period.
    pub fn from_name(name: &str, batch: Option<u64>) -> Result<Self, SimError> {
        let inner = match name.trim().to_ascii_lowercase().as_str() {
            "greedy" => Algorithm::Greedy(Greedy::new()),
            "deferred" | "deferred_acceptance" | "dda" => {
                Algorithm::DeferredAcceptance(DeferredAcceptance::new())
            }
            other => return Err(SimError::UnknownAlgorithm(other.to_string())),
        };
        match batch {
            Some(period) => Ok(Algorithm::Batching(Batching::new(inner, period)?)),
            None => Ok(inner),
        }
    }
}

impl MatchingAlgorithm for Algorithm {
    fn compute_matching(&mut self, sim: &Simulator) -> Result<Vec<Match>, SimError> {
        match self {
            Algorithm::Greedy(alg) => alg.compute_matching(sim),
            Algorithm::DeferredAcceptance(alg) => alg.compute_matching(sim),
            Algorithm::Batching(alg) => alg.compute_matching(sim),
        }
    }

    fn name(&self) -> &str {
        match self {
            Algorithm::Greedy(alg) => alg.name(),
            Algorithm::DeferredAcceptance(alg) => alg.name(),
            Algorithm::Batching(alg) => alg.name(),
        }
    }
}

/// Fails if an id taken from the active sets is not an active node.
pub(crate) fn ensure_active(sim: &Simulator, id: NodeId) -> Result<(), SimError> {
    match sim.node(id) {
        Some(node) if node.in_market => Ok(()),
        Some(_) => Err(SimError::NodeNotActive(id)),
        None => Err(SimError::UnknownNode(id)),
    }
}

/// Highest-scoring active seller for `buyer`, where score is edge weight minus
/// `price(seller)`. Ties go to the earliest seller; NaN or infinite scores are
/// never chosen. `None` if the buyer has no eligible seller.
pub(crate) fn best_seller<P>(sim: &Simulator, buyer: NodeId, price: P) -> Option<(NodeId, f64)>
where
    P: Fn(NodeId) -> f64,
{
    let mut best: Option<(NodeId, f64)> = None;
    for (seller, weight) in sim.seller_edges(buyer) {
        let score = weight - price(seller);
        if !score.is_finite() {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((seller, score)),
        }
    }
    best
}

/// Emits (buyer, seller) for every active critical seller that holds a buyer,
/// in seller arrival order.
pub(crate) fn commit_critical_sellers<A>(sim: &Simulator, assigned: A) -> Result<Vec<Match>, SimError>
where
    A: Fn(NodeId) -> Option<NodeId>,
{
    let mut matches = Vec::new();
    for &seller in sim.sellers() {
        if !sim.is_critical(seller)? {
            continue;
        }
        if let Some(buyer) = assigned(seller) {
            matches.push(Match::new(buyer, seller));
        }
    }
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::squared_distance;

    #[test]
    fn from_name_builds_each_strategy() {
        assert!(matches!(
            Algorithm::from_name("greedy", None).unwrap(),
            Algorithm::Greedy(_)
        ));
        assert!(matches!(
            Algorithm::from_name("Deferred", None).unwrap(),
            Algorithm::DeferredAcceptance(_)
        ));
        let batched = Algorithm::from_name("greedy", Some(3)).unwrap();
        assert!(matches!(batched, Algorithm::Batching(_)));
        assert_eq!(batched.name(), "batching(greedy, 3)");
    }

    #[test]
    fn from_name_rejects_unknown_and_zero_batch() {
        assert_eq!(
            Algorithm::from_name("postponed", None).unwrap_err(),
            SimError::UnknownAlgorithm("postponed".into())
        );
        assert_eq!(
            Algorithm::from_name("greedy", Some(0)).unwrap_err(),
            SimError::InvalidBatchPeriod
        );
    }

    #[test]
    fn best_seller_prefers_earliest_on_tie() {
        let mut sim = Simulator::new(squared_distance);
        let b = sim.add_node((0.0, 0.0), 2, true, 0);
        let s1 = sim.add_node((1.0, 0.0), 2, false, 0);
        let _s2 = sim.add_node((0.0, 1.0), 2, false, 0);
        assert_eq!(best_seller(&sim, b, |_| 0.0), Some((s1, 1.0)));
    }

    #[test]
    fn best_seller_skips_non_finite_scores() {
        let mut sim = Simulator::new(|_, _, s: crate::types::Position, _| {
            if s.x == 0.0 {
                f64::NAN
            } else {
                s.x
            }
        });
        let b = sim.add_node((0.0, 0.0), 2, true, 0);
        let _nan = sim.add_node((0.0, 0.0), 2, false, 0);
        let s = sim.add_node((0.5, 0.0), 2, false, 0);
        assert_eq!(best_seller(&sim, b, |_| 0.0), Some((s, 0.5)));
        assert_eq!(best_seller(&sim, b, |_| f64::INFINITY), None);
    }

    #[test]
    fn best_seller_none_without_sellers() {
        let mut sim = Simulator::new(squared_distance);
        let b = sim.add_node((0.0, 0.0), 2, true, 0);
        assert_eq!(best_seller(&sim, b, |_| 0.0), None);
    }
}
