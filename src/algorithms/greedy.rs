//! Greedy threshold matching.
//!
//! Each active buyer, in arrival order, bids for its highest-weight seller. The
//! bid wins if it beats the best weight that seller has seen so far; the previous
//! holder is dropped with no reassignment. Critical sellers holding a buyer are
//! committed.

use super::{best_seller, commit_critical_sellers, ensure_active, MatchingAlgorithm};
use crate::error::SimError;
use crate::simulator::Simulator;
use crate::types::{Match, NodeId};
use log::debug;
use std::collections::BTreeMap;

/// Greedy strategy. State is rebuilt on every call and kept for inspection.
#[derive(Clone, Debug, Default)]
pub struct Greedy {
    /// Seller -> best weight seen. Absent means 0.
    price: BTreeMap<NodeId, f64>,
    /// Seller -> currently assigned buyer.
    assigned: BTreeMap<NodeId, NodeId>,
}

impl Greedy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Best weight seen for `seller` in the last call (0.0 if none).
    pub fn price(&self, seller: NodeId) -> f64 {
        self.price.get(&seller).copied().unwrap_or(0.0)
    }

    /// Buyer assigned to `seller` in the last call.
    pub fn assigned_buyer(&self, seller: NodeId) -> Option<NodeId> {
        self.assigned.get(&seller).copied()
    }

    fn reset(&mut self) {
        self.price.clear();
        self.assigned.clear();
    }
}

impl MatchingAlgorithm for Greedy {
    fn compute_matching(&mut self, sim: &Simulator) -> Result<Vec<Match>, SimError> {
        self.reset();
        for &buyer in sim.buyers() {
            ensure_active(sim, buyer)?;
            let Some((seller, weight)) = best_seller(sim, buyer, |_| 0.0) else {
                continue;
            };
            if weight - self.price(seller) > 0.0 {
                if let Some(prev) = self.assigned.insert(seller, buyer) {
                    debug!("greedy displaced buyer={} seller={}", prev, seller);
                }
                self.price.insert(seller, weight);
            }
        }
        let matches = commit_critical_sellers(sim, |s| self.assigned_buyer(s))?;
        debug!("greedy t={} committed={}", sim.time(), matches.len());
        Ok(matches)
    }

    fn name(&self) -> &str {
        "greedy"
    }
}
