//! Side-by-side comparison of algorithms over identical arrival streams.

use crate::algorithms::{Algorithm, MatchingAlgorithm};
use crate::config::RunConfig;
use crate::driver::{Driver, DriverConfig};
use crate::error::SimError;
use crate::simulator::Simulator;

/// Totals for one algorithm across all runs. Serialized as one JSON line by the binary.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RunSummary {
    pub algorithm: String,
    pub runs: u64,
    pub steps: u64,
    pub matches: usize,
    pub total_weight: f64,
    pub mean_weight_per_run: f64,
    pub discarded_buyers: usize,
    pub discarded_sellers: usize,
}

/// Runs every configured algorithm `config.runs` times. Run `i` of every
/// algorithm sees the same arrivals (seed `driver.seed + i`).
pub fn compare(config: &RunConfig) -> Result<Vec<RunSummary>, SimError> {
    let mut summaries = Vec::with_capacity(config.algorithms.len());
    for name in &config.algorithms {
        let mut algorithm = Algorithm::from_name(name, config.batch)?;
        let mut sim = Simulator::with_weight_fn(config.weight.weight_fn());
        let mut summary = RunSummary {
            algorithm: algorithm.name().to_string(),
            runs: config.runs,
            steps: config.steps,
            matches: 0,
            total_weight: 0.0,
            mean_weight_per_run: 0.0,
            discarded_buyers: 0,
            discarded_sellers: 0,
        };
        for run in 0..config.runs {
            let driver_config = DriverConfig {
                seed: config.driver.seed.wrapping_add(run),
                ..config.driver.clone()
            };
            let report = Driver::new(driver_config)?.run(&mut algorithm, &mut sim, config.steps)?;
            summary.matches += report.matches.len();
            summary.total_weight += report.total_weight();
            summary.discarded_buyers += report.discarded_buyers();
            summary.discarded_sellers += report.discarded_sellers();
        }
        if config.runs > 0 {
            summary.mean_weight_per_run = summary.total_weight / config.runs as f64;
        }
        summaries.push(summary);
    }
    Ok(summaries)
}
