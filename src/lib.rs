//! # Dynamic Matching
//!
//! Deterministic simulator of a two-sided market whose buyers and sellers arrive
//! and depart over time, plus online algorithms that must commit matches without
//! knowing future arrivals.
//!
//! ## Entry point
//!
//! Use [`Simulator`] to hold the market: [`Simulator::add_node`],
//! [`Simulator::advance`], and [`Simulator::remove_matching`]. Any
//! [`MatchingAlgorithm`] ([`Greedy`], [`DeferredAcceptance`], [`Batching`])
//! reads it each step and returns the pairs to commit.
//!
//! ## Example
//!
//! ```rust
//! use dynamic_matching::{squared_distance, Greedy, Match, MatchingAlgorithm, Simulator};
//!
//! let mut sim = Simulator::new(squared_distance);
//! let buyer = sim.add_node((0.0, 0.0), 2, true, 0);
//! let seller = sim.add_node((1.0, 1.0), 2, false, 0);
//! let mut greedy = Greedy::new();
//! assert!(greedy.compute_matching(&sim).unwrap().is_empty());
//!
//! sim.advance(false);
//! let matches = greedy.compute_matching(&sim).unwrap();
//! assert_eq!(matches, vec![Match::new(buyer, seller)]);
//! assert_eq!(sim.remove_matching(buyer, seller).unwrap(), 2.0);
//! ```
//!
//! ## Experiments
//!
//! [`Driver`] generates seeded random arrivals and runs the step loop;
//! [`compare`] runs several algorithms over the same arrival streams.

pub mod algorithms;
pub mod compare;
pub mod config;
pub mod driver;
pub mod error;
pub mod market;
pub mod simulator;
pub mod types;

pub use algorithms::{Algorithm, Batching, DeferredAcceptance, Greedy, MatchingAlgorithm, DEFAULT_EPSILON};
pub use compare::{compare, RunSummary};
pub use config::RunConfig;
pub use driver::{DiscardRecord, Driver, DriverConfig, MatchRecord, RunReport};
pub use error::SimError;
pub use market::{MarketGraph, Node};
pub use simulator::{AdvanceReport, EdgeSnapshot, MarketSnapshot, Simulator, DEFAULT_CRITICAL_THRESHOLD};
pub use types::{
    distance_over_departure, inverse_squared_distance, squared_distance, Match, NodeId, Position, Role,
    WeightFn, WeightKind,
};
