//! Dynamic deferred acceptance via an ascending auction.
//!
//! Buyers, in arrival order, bid for the seller maximizing `weight - price`. A
//! winning bid raises that seller's price by `epsilon` and displaces the previous
//! tentative buyer, who immediately bids again. The chain stops when the bidder
//! has no seller with positive profit or nobody was displaced. Prices only rise
//! and are bounded by the largest edge weight, so every chain terminates.
//! Critical sellers holding a tentative buyer are then committed.

use super::{best_seller, commit_critical_sellers, ensure_active, MatchingAlgorithm};
use crate::error::SimError;
use crate::simulator::Simulator;
use crate::types::{Match, NodeId};
use log::{debug, trace};
use std::collections::BTreeMap;

/// Default price increment per winning bid.
pub const DEFAULT_EPSILON: f64 = 1e-3;

/// Deferred-acceptance strategy. Prices and tentative matches are rebuilt from
/// the current market on every call and kept for inspection afterwards.
#[derive(Clone, Debug)]
pub struct DeferredAcceptance {
    epsilon: f64,
    /// Seller -> price. Absent means 0.
    price: BTreeMap<NodeId, f64>,
    /// Seller -> tentatively matched buyer.
    tentative: BTreeMap<NodeId, NodeId>,
    /// Buyer -> profit of its last bid. Absent means 0.
    marginal_profit: BTreeMap<NodeId, f64>,
    /// Winning bids placed during the last call.
    rounds: u64,
}

impl Default for DeferredAcceptance {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            price: BTreeMap::new(),
            tentative: BTreeMap::new(),
            marginal_profit: BTreeMap::new(),
            rounds: 0,
        }
    }
}

impl DeferredAcceptance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a custom price increment. Must be positive and finite.
    pub fn with_epsilon(epsilon: f64) -> Result<Self, SimError> {
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(SimError::InvalidEpsilon(epsilon));
        }
        Ok(Self {
            epsilon,
            ..Self::default()
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn price(&self, seller: NodeId) -> f64 {
        self.price.get(&seller).copied().unwrap_or(0.0)
    }

    pub fn tentative_buyer(&self, seller: NodeId) -> Option<NodeId> {
        self.tentative.get(&seller).copied()
    }

    pub fn marginal_profit(&self, buyer: NodeId) -> f64 {
        self.marginal_profit.get(&buyer).copied().unwrap_or(0.0)
    }

    /// Number of winning bids (price increments) in the last call.
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    fn reset(&mut self) {
        self.price.clear();
        self.tentative.clear();
        self.marginal_profit.clear();
        self.rounds = 0;
    }

    /// Runs the displacement chain started by `buyer`.
    fn auction(&mut self, sim: &Simulator, buyer: NodeId) {
        let mut bidder = buyer;
        loop {
            let Some((seller, profit)) = best_seller(sim, bidder, |s| self.price(s)) else {
                return;
            };
            self.marginal_profit.insert(bidder, profit);
            if !(profit > 0.0) {
                return;
            }
            let displaced = self.tentative.insert(seller, bidder);
            *self.price.entry(seller).or_insert(0.0) += self.epsilon;
            self.rounds += 1;
            trace!(
                "auction bid buyer={} seller={} profit={} price={}",
                bidder,
                seller,
                profit,
                self.price(seller)
            );
            match displaced {
                Some(prev) => bidder = prev,
                None => return,
            }
        }
    }
}

impl MatchingAlgorithm for DeferredAcceptance {
    fn compute_matching(&mut self, sim: &Simulator) -> Result<Vec<Match>, SimError> {
        self.reset();
        for &buyer in sim.buyers() {
            ensure_active(sim, buyer)?;
            self.auction(sim, buyer);
        }
        let matches = commit_critical_sellers(sim, |s| self.tentative_buyer(s))?;
        debug!(
            "deferred acceptance t={} rounds={} committed={}",
            sim.time(),
            self.rounds,
            matches.len()
        );
        Ok(matches)
    }

    fn name(&self) -> &str {
        "deferred"
    }
}
