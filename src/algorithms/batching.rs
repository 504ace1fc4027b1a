//! Periodic batching wrapper.
//!
//! Delegates to an inner strategy only when the simulator time is a multiple of
//! the batch period (e.g. every `d + 1` steps); otherwise commits nothing.

use super::{Algorithm, MatchingAlgorithm};
use crate::error::SimError;
use crate::simulator::Simulator;
use crate::types::Match;

#[derive(Clone, Debug)]
pub struct Batching {
    inner: Box<Algorithm>,
    batch: u64,
    name: String,
}

impl Batching {
    /// Wraps `inner`. Returns `Err` if `batch` is zero.
    pub fn new(inner: Algorithm, batch: u64) -> Result<Self, SimError> {
        if batch == 0 {
            return Err(SimError::InvalidBatchPeriod);
        }
        let name = format!("batching({}, {})", inner.name(), batch);
        Ok(Self {
            inner: Box::new(inner),
            batch,
            name,
        })
    }

    pub fn batch(&self) -> u64 {
        self.batch
    }

    pub fn inner(&self) -> &Algorithm {
        &self.inner
    }
}

impl MatchingAlgorithm for Batching {
    fn compute_matching(&mut self, sim: &Simulator) -> Result<Vec<Match>, SimError> {
        if sim.time() % self.batch == 0 {
            self.inner.compute_matching(sim)
        } else {
            Ok(Vec::new())
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
