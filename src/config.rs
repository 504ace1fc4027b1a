//! Configuration from environment variables.
//!
//! Unset or unparsable variables fall back to defaults. Driver knobs:
//! `SEED`, `P_NODE`, `MIN_TO_ADD`, `MAX_TO_ADD`, `P_BUYER`, `WIDTH`, `HEIGHT`,
//! `DEPARTURE_MEAN`, `DEPARTURE_STD`, `WAIT_DELAY`. Run knobs: `STEPS`, `RUNS`,
//! `ALGORITHMS` (comma-separated, e.g. `greedy,deferred`), `BATCH`, `WEIGHT`.

use std::str::FromStr;

use crate::algorithms::Algorithm;
use crate::driver::DriverConfig;
use crate::error::SimError;
use crate::types::WeightKind;

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl DriverConfig {
    /// Loads arrival settings from the environment over [`DriverConfig::default`].
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            seed: env_or("SEED", d.seed),
            p_node: env_or("P_NODE", d.p_node),
            min_to_add: env_or("MIN_TO_ADD", d.min_to_add),
            max_to_add: env_or("MAX_TO_ADD", d.max_to_add),
            p_buyer: env_or("P_BUYER", d.p_buyer),
            width: env_or("WIDTH", d.width),
            height: env_or("HEIGHT", d.height),
            departure_mean: env_or("DEPARTURE_MEAN", d.departure_mean),
            departure_std: env_or("DEPARTURE_STD", d.departure_std),
            wait_delay: env_or("WAIT_DELAY", d.wait_delay),
        }
    }
}

/// What the comparison binary runs.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    pub steps: u64,
    /// Independent runs per algorithm; run `i` uses seed `driver.seed + i`.
    pub runs: u64,
    pub algorithms: Vec<String>,
    pub batch: Option<u64>,
    pub weight: WeightKind,
    pub driver: DriverConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            steps: 100,
            runs: 10,
            algorithms: vec!["greedy".into(), "deferred".into()],
            batch: None,
            weight: WeightKind::InverseSquaredDistance,
            driver: DriverConfig::default(),
        }
    }
}

impl RunConfig {
    /// Loads from the environment. Returns `Err` for an unknown weight or
    /// algorithm name, or an out-of-range driver setting.
    pub fn from_env() -> Result<Self, SimError> {
        let d = Self::default();
        let algorithms = std::env::var("ALGORITHMS")
            .ok()
            .map(|s| parse_list(&s))
            .filter(|list| !list.is_empty())
            .unwrap_or(d.algorithms);
        let weight = match std::env::var("WEIGHT") {
            Ok(name) => WeightKind::from_name(&name)?,
            Err(_) => d.weight,
        };
        let batch = std::env::var("BATCH").ok().and_then(|s| s.trim().parse().ok());
        let config = Self {
            steps: env_or("STEPS", d.steps),
            runs: env_or("RUNS", d.runs),
            algorithms,
            batch,
            weight,
            driver: DriverConfig::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks every algorithm name resolves and the driver settings are in range.
    pub fn validate(&self) -> Result<(), SimError> {
        for name in &self.algorithms {
            Algorithm::from_name(name, self.batch)?;
        }
        self.driver.validate()
    }
}

fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}
