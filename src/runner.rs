use crate::error::ExperimentError;
use crate::refine::{ClusterResult, Init, Refiner};
use crate::seeding::select_seeds;
use ndarray::{Array2, ArrayView2};
use rand_chacha::ChaCha8Rng;
use std::fmt;

/// How a trial obtains its initial centers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStrategy {
    /// Uniform random selection of k data points
    Standard,

    /// k-means++ distance-weighted seeding
    Seeded,
}

impl InitStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            InitStrategy::Standard => "standard",
            InitStrategy::Seeded => "seeded",
        }
    }
}

impl fmt::Display for InitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Runs one clustering trial against a refinement primitive.
///
/// The runner owns no state beyond the refiner itself; every call is an
/// independent trial driven by the caller-supplied RNG.
pub struct ClusteringRunner<R: Refiner> {
    refiner: R,
}

impl<R: Refiner> ClusteringRunner<R> {
    pub fn new(refiner: R) -> Self {
        Self { refiner }
    }

    /// Run one trial with the given initialization strategy.
    ///
    /// For `Seeded`, a fresh k-means++ seed selection precedes refinement.
    /// For `Standard`, random initialization is left to the refiner.
    ///
    /// # Errors
    ///
    /// Invalid inputs fail fast; a refiner failure (non-convergence,
    /// degenerate input) is surfaced as-is, never retried.
    pub fn run(
        &self,
        data: &ArrayView2<f64>,
        k: usize,
        strategy: InitStrategy,
        rng: &mut ChaCha8Rng,
    ) -> Result<ClusterResult, ExperimentError> {
        match strategy {
            InitStrategy::Seeded => {
                let seeds = select_seeds(data, k, rng)?;
                self.refiner.refine(data, Init::Centers(seeds), rng)
            }
            InitStrategy::Standard => self.refiner.refine(data, Init::Random, rng),
        }
    }

    /// Run one trial starting from explicit centers, e.g. the known true
    /// generating centers of a synthetic dataset for a ground-truth baseline.
    pub fn run_with_centers(
        &self,
        data: &ArrayView2<f64>,
        centers: Array2<f64>,
        rng: &mut ChaCha8Rng,
    ) -> Result<ClusterResult, ExperimentError> {
        self.refiner.refine(data, Init::Centers(centers), rng)
    }

    pub fn refiner(&self) -> &R {
        &self.refiner
    }
}
