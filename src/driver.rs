//! Experiment driver: random arrivals, matching, and bookkeeping.
//!
//! Deterministic and configurable: same config (including seed) ⇒ same arrivals,
//! and therefore the same [`RunReport`] for a given algorithm.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use log::{debug, info};

use crate::algorithms::MatchingAlgorithm;
use crate::error::SimError;
use crate::simulator::Simulator;

/// Configuration for random node arrivals. Ranges are inclusive.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DriverConfig {
    /// RNG seed. Same seed ⇒ same arrival stream.
    pub seed: u64,
    /// Probability (0.0..=1.0) that any nodes arrive in a given step.
    pub p_node: f64,
    /// Number of nodes added in a step with arrivals.
    pub min_to_add: u32,
    pub max_to_add: u32,
    /// Probability (0.0..=1.0) that an arriving node is a buyer.
    pub p_buyer: f64,
    /// Positions are integer grid points in `[0, width] x [0, height]`.
    pub width: f64,
    pub height: f64,
    /// Departure countdown ~ N(mean, std), rounded, at least 1.
    pub departure_mean: f64,
    pub departure_std: f64,
    /// Wait countdown for every arriving node (0 = visible immediately).
    pub wait_delay: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            p_node: 0.2,
            min_to_add: 1,
            max_to_add: 1,
            p_buyer: 0.5,
            width: 10.0,
            height: 10.0,
            departure_mean: 3.0,
            departure_std: 1.0,
            wait_delay: 0,
        }
    }
}

impl DriverConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if !(0.0..=1.0).contains(&self.p_node) {
            return Err(SimError::InvalidConfig(format!("p_node {} not in [0, 1]", self.p_node)));
        }
        if !(0.0..=1.0).contains(&self.p_buyer) {
            return Err(SimError::InvalidConfig(format!("p_buyer {} not in [0, 1]", self.p_buyer)));
        }
        if self.min_to_add > self.max_to_add {
            return Err(SimError::InvalidConfig(format!(
                "min_to_add {} exceeds max_to_add {}",
                self.min_to_add, self.max_to_add
            )));
        }
        if !(self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0) {
            return Err(SimError::InvalidConfig("grid size must be finite and non-negative".into()));
        }
        Ok(())
    }
}

/// One committed match as realized by the driver.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MatchRecord {
    pub step: u64,
    pub buyer: crate::types::NodeId,
    pub seller: crate::types::NodeId,
    pub weight: f64,
}

/// Nodes that expired unmatched at the end of one step.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DiscardRecord {
    pub step: u64,
    pub buyers: usize,
    pub sellers: usize,
}

/// Everything one [`Driver::run`] observed.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RunReport {
    pub matches: Vec<MatchRecord>,
    pub discarded: Vec<DiscardRecord>,
}

impl RunReport {
    pub fn total_weight(&self) -> f64 {
        self.matches.iter().map(|m| m.weight).sum()
    }

    pub fn discarded_buyers(&self) -> usize {
        self.discarded.iter().map(|d| d.buyers).sum()
    }

    pub fn discarded_sellers(&self) -> usize {
        self.discarded.iter().map(|d| d.sellers).sum()
    }
}

/// Seeded arrival generator plus the step loop. Create with [`Driver::new`].
pub struct Driver {
    rng: StdRng,
    config: DriverConfig,
    departure: Normal<f64>,
}

impl Driver {
    /// Builds a driver. Returns `Err` if the config is out of range.
    pub fn new(config: DriverConfig) -> Result<Self, SimError> {
        config.validate()?;
        let departure = Normal::new(config.departure_mean, config.departure_std)
            .map_err(|e| SimError::InvalidConfig(format!("departure distribution: {e}")))?;
        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            departure,
        })
    }

    /// Resets `sim` and runs `num_steps` steps: maybe add nodes, compute the
    /// matching, realize every match, advance.
    pub fn run<A>(&mut self, algorithm: &mut A, sim: &mut Simulator, num_steps: u64) -> Result<RunReport, SimError>
    where
        A: MatchingAlgorithm + ?Sized,
    {
        sim.reset();
        let mut report = RunReport::default();
        for step in 0..num_steps {
            let added = self.maybe_add_nodes(sim);
            if added > 0 {
                debug!("step={} added {} node(s)", step, added);
            }
            for m in algorithm.compute_matching(sim)? {
                let weight = sim.remove_matching(m.buyer, m.seller)?;
                report.matches.push(MatchRecord {
                    step,
                    buyer: m.buyer,
                    seller: m.seller,
                    weight,
                });
            }
            let expired = sim.advance(false);
            report.discarded.push(DiscardRecord {
                step,
                buyers: expired.buyers_removed(),
                sellers: expired.sellers_removed(),
            });
        }
        info!(
            "run finished algorithm={} steps={} matches={} weight={} discarded_buyers={} discarded_sellers={}",
            algorithm.name(),
            num_steps,
            report.matches.len(),
            report.total_weight(),
            report.discarded_buyers(),
            report.discarded_sellers()
        );
        Ok(report)
    }

    /// Adds this step's random arrivals. Returns how many nodes were added.
    pub fn maybe_add_nodes(&mut self, sim: &mut Simulator) -> u32 {
        if self.rng.gen::<f64>() >= self.config.p_node {
            return 0;
        }
        let count = self
            .rng
            .gen_range(self.config.min_to_add..=self.config.max_to_add);
        for _ in 0..count {
            let x = self.rng.gen_range(0.0..=self.config.width).round();
            let y = self.rng.gen_range(0.0..=self.config.height).round();
            let departure = self.departure.sample(&mut self.rng).round().max(1.0) as u32;
            let is_buyer = self.rng.gen::<f64>() < self.config.p_buyer;
            sim.add_node((x, y), departure, is_buyer, self.config.wait_delay);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::{Algorithm, DeferredAcceptance, Greedy};
    use crate::types::inverse_squared_distance;

    fn init_log() {
        let _ = env_logger::try_init();
    }

    fn busy_config(seed: u64) -> DriverConfig {
        DriverConfig {
            seed,
            p_node: 1.0,
            min_to_add: 1,
            max_to_add: 3,
            ..Default::default()
        }
    }

    #[test]
    fn same_seed_same_report() {
        init_log();
        let mut sim = Simulator::new(inverse_squared_distance);
        let r1 = Driver::new(busy_config(7))
            .unwrap()
            .run(&mut Greedy::new(), &mut sim, 50)
            .unwrap();
        let r2 = Driver::new(busy_config(7))
            .unwrap()
            .run(&mut Greedy::new(), &mut sim, 50)
            .unwrap();
        assert_eq!(r1, r2);
        assert_eq!(r1.discarded.len(), 50);
        assert!(!r1.matches.is_empty());
    }

    #[test]
    fn every_node_is_matched_expired_or_still_present() {
        init_log();
        let mut sim = Simulator::new(inverse_squared_distance);
        let mut alg = Algorithm::DeferredAcceptance(DeferredAcceptance::new());
        let report = Driver::new(busy_config(3))
            .unwrap()
            .run(&mut alg, &mut sim, 40)
            .unwrap();
        let created = sim.last_node_id().map(|id| id.0 as usize + 1).unwrap_or(0);
        let accounted = 2 * report.matches.len()
            + report.discarded_buyers()
            + report.discarded_sellers()
            + sim.node_count();
        assert_eq!(created, accounted);
    }

    #[test]
    fn zero_probability_adds_nothing() {
        init_log();
        let mut sim = Simulator::new(inverse_squared_distance);
        let config = DriverConfig {
            p_node: 0.0,
            ..Default::default()
        };
        let report = Driver::new(config)
            .unwrap()
            .run(&mut Greedy::new(), &mut sim, 20)
            .unwrap();
        assert!(report.matches.is_empty());
        assert_eq!(sim.node_count(), 0);
        assert_eq!(report.total_weight(), 0.0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let bad = DriverConfig {
            min_to_add: 4,
            max_to_add: 2,
            ..Default::default()
        };
        assert!(matches!(Driver::new(bad), Err(SimError::InvalidConfig(_))));
        let bad = DriverConfig {
            departure_std: -1.0,
            ..Default::default()
        };
        assert!(matches!(Driver::new(bad), Err(SimError::InvalidConfig(_))));
        let bad = DriverConfig {
            width: f64::INFINITY,
            ..Default::default()
        };
        assert!(matches!(Driver::new(bad), Err(SimError::InvalidConfig(_))));
        let bad = DriverConfig {
            height: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(Driver::new(bad), Err(SimError::InvalidConfig(_))));
        let bad = DriverConfig {
            p_buyer: 1.5,
            ..Default::default()
        };
        assert!(Driver::new(bad).is_err());
    }

    #[test]
    fn departures_are_at_least_one() {
        let config = DriverConfig {
            p_node: 1.0,
            departure_mean: -5.0,
            departure_std: 0.0,
            ..Default::default()
        };
        let mut driver = Driver::new(config).unwrap();
        let mut sim = Simulator::new(inverse_squared_distance);
        for _ in 0..10 {
            driver.maybe_add_nodes(&mut sim);
        }
        assert_eq!(sim.node_count(), 10);
        assert!(sim.snapshot().nodes.iter().all(|n| n.departure == 1));
    }
}
