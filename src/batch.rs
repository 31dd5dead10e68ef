use crate::config::ExperimentConfig;
use crate::distance::validate_dataset;
use crate::error::ExperimentError;
use crate::refine::{ClusterResult, Refiner};
use crate::runner::{ClusteringRunner, InitStrategy};
use ndarray::ArrayView2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, warn};

/// A trial that did not produce a result, kept for failure-rate accounting
#[derive(Debug, Clone)]
pub struct TrialFailure {
    /// Index of the trial within the batch
    pub trial: usize,
    pub error: ExperimentError,
}

/// The accumulated outcome of one batch of independent trials.
///
/// Failed trials are recorded separately, never silently dropped or retried,
/// so failure rates stay visible in aggregate results. Record order carries
/// no meaning; the statistics computed over a batch are order-independent.
#[derive(Debug, Clone)]
pub struct TrialBatch {
    /// Initialization strategy every trial in this batch used
    pub strategy: InitStrategy,

    /// Successful trial outcomes
    pub records: Vec<ClusterResult>,

    /// Failed trials, excluded from statistics but counted
    pub failures: Vec<TrialFailure>,
}

impl TrialBatch {
    /// Total number of trials attempted
    pub fn n_trials(&self) -> usize {
        self.records.len() + self.failures.len()
    }

    /// Number of trials that failed
    pub fn n_failed(&self) -> usize {
        self.failures.len()
    }

    /// True when no trial succeeded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Objective scores of the successful trials
    pub fn scores(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.total_within_ss).collect()
    }
}

/// Runs many independent clustering trials and accumulates their outcomes.
///
/// Trials are embarrassingly parallel: the only shared state is the
/// read-only dataset, and each trial draws from its own RNG stream derived
/// from the base seed and trial index, so parallel trials never correlate.
pub struct BatchExperimentRunner<R: Refiner + Sync> {
    runner: ClusteringRunner<R>,
    config: ExperimentConfig,
}

impl<R: Refiner + Sync> BatchExperimentRunner<R> {
    pub fn new(refiner: R, config: ExperimentConfig) -> Self {
        Self {
            runner: ClusteringRunner::new(refiner),
            config,
        }
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Execute `config.n_trials` independent trials with the given strategy.
    ///
    /// Each seeded trial performs its own fresh k-means++ selection; no
    /// seeding state is shared between trials. A failed trial is recorded in
    /// the batch and the remaining trials proceed.
    ///
    /// # Errors
    ///
    /// Fails fast with `InvalidInput` before any trial runs when the dataset
    /// or k is malformed, or when `n_trials` is zero.
    pub fn run_batch(
        &self,
        data: &ArrayView2<f64>,
        strategy: InitStrategy,
    ) -> Result<TrialBatch, ExperimentError> {
        validate_dataset(data)?;

        if self.config.k == 0 || self.config.k > data.nrows() {
            return Err(ExperimentError::InvalidInput(format!(
                "k ({}) must be in 1..={}",
                self.config.k,
                data.nrows()
            )));
        }

        if self.config.n_trials == 0 {
            return Err(ExperimentError::InvalidInput(
                "n_trials must be greater than 0".to_string(),
            ));
        }

        let n_trials = self.config.n_trials;
        let outcomes: Vec<(usize, Result<ClusterResult, ExperimentError>)> = (0..n_trials)
            .into_par_iter()
            .map(|trial| {
                let mut rng = trial_rng(self.config.seed, trial);
                let outcome = self.runner.run(data, self.config.k, strategy, &mut rng);
                (trial, outcome)
            })
            .collect();

        let mut batch = TrialBatch {
            strategy,
            records: Vec::with_capacity(self.config.n_trials),
            failures: Vec::new(),
        };

        for (trial, outcome) in outcomes {
            match outcome {
                Ok(record) => batch.records.push(record),
                Err(error) => batch.failures.push(TrialFailure { trial, error }),
            }
        }

        if !batch.failures.is_empty() {
            warn!(
                strategy = %strategy,
                n_failed = batch.failures.len(),
                n_trials = self.config.n_trials,
                "batch completed with failed trials"
            );
        } else {
            debug!(
                strategy = %strategy,
                n_trials = self.config.n_trials,
                "batch completed"
            );
        }

        Ok(batch)
    }

    /// Access the underlying single-trial runner, e.g. for a ground-truth
    /// baseline run with known centers.
    pub fn runner(&self) -> &ClusteringRunner<R> {
        &self.runner
    }

    /// RNG for a one-off run outside the batch, on the stream after all
    /// trial streams.
    pub fn baseline_rng(&self) -> ChaCha8Rng {
        trial_rng(self.config.seed, self.config.n_trials)
    }
}

/// Derive an independent RNG for one trial from the base seed.
///
/// The trial index is mixed in with a fixed odd multiplier so that
/// consecutive trials land on widely separated seeds.
fn trial_rng(seed: u64, trial: usize) -> ChaCha8Rng {
    let mixed = seed ^ (trial as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    ChaCha8Rng::seed_from_u64(mixed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refine::LloydRefiner;
    use ndarray::Array2;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;

    fn runner_with(config: ExperimentConfig) -> BatchExperimentRunner<LloydRefiner> {
        let refiner = LloydRefiner::from_config(&config);
        BatchExperimentRunner::new(refiner, config)
    }

    #[test]
    fn test_run_batch_collects_all_trials() {
        let data = Array2::random((200, 4), Uniform::new(-1.0f64, 1.0));
        let config = ExperimentConfig::new(3)
            .with_n_trials(16)
            .with_max_iters(300)
            .with_tol(1e-4)
            .with_seed(7);

        let batch = runner_with(config)
            .run_batch(&data.view(), InitStrategy::Seeded)
            .unwrap();

        assert_eq!(batch.strategy, InitStrategy::Seeded);
        assert_eq!(batch.n_trials(), 16);
        assert!(batch.n_failed() == 0, "unexpected failures: {:?}", batch.failures);
        assert_eq!(batch.scores().len(), 16);
    }

    #[test]
    fn test_trials_are_independently_randomized() {
        let data = Array2::random((150, 4), Uniform::new(-1.0f64, 1.0));
        let config = ExperimentConfig::new(4)
            .with_n_trials(8)
            .with_max_iters(300)
            .with_tol(1e-4)
            .with_seed(1);

        let batch = runner_with(config)
            .run_batch(&data.view(), InitStrategy::Standard)
            .unwrap();

        // Independent random inits on uniform data essentially never land on
        // identical local optima across all trials.
        let scores = batch.scores();
        let all_equal = scores.windows(2).all(|w| (w[0] - w[1]).abs() < 1e-12);
        assert!(!all_equal, "all trials produced identical scores");
    }

    #[test]
    fn test_batch_reproducible_with_same_seed() {
        let data = Array2::random((150, 4), Uniform::new(-1.0f64, 1.0));

        let make = || {
            let config = ExperimentConfig::new(3)
                .with_n_trials(6)
                .with_max_iters(300)
                .with_tol(1e-4)
                .with_seed(12345);
            runner_with(config)
        };

        let b1 = make().run_batch(&data.view(), InitStrategy::Seeded).unwrap();
        let b2 = make().run_batch(&data.view(), InitStrategy::Seeded).unwrap();

        assert_eq!(b1.scores(), b2.scores());
    }

    #[test]
    fn test_failed_trials_are_recorded_not_dropped() {
        let data = Array2::random((200, 4), Uniform::new(-1.0f64, 1.0));
        // One iteration with a tight tolerance cannot converge
        let config = ExperimentConfig::new(4)
            .with_n_trials(8)
            .with_max_iters(1)
            .with_tol(1e-12);

        let batch = runner_with(config)
            .run_batch(&data.view(), InitStrategy::Standard)
            .unwrap();

        assert_eq!(batch.n_trials(), 8);
        assert_eq!(batch.n_failed(), 8);
        assert!(batch.is_empty());
        for failure in &batch.failures {
            assert!(matches!(
                failure.error,
                ExperimentError::DidNotConverge { .. }
            ));
        }
    }

    #[test]
    fn test_invalid_inputs_fail_before_running() {
        let data = Array2::random((5, 2), Uniform::new(-1.0f64, 1.0));

        let config = ExperimentConfig::new(10).with_n_trials(4);
        assert!(matches!(
            runner_with(config).run_batch(&data.view(), InitStrategy::Seeded),
            Err(ExperimentError::InvalidInput(_))
        ));

        let config = ExperimentConfig::new(2).with_n_trials(0);
        assert!(matches!(
            runner_with(config).run_batch(&data.view(), InitStrategy::Seeded),
            Err(ExperimentError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_trial_rng_streams_differ() {
        use rand::Rng;

        let mut a = trial_rng(0, 0);
        let mut b = trial_rng(0, 1);

        let xs: Vec<u64> = (0..4).map(|_| a.gen()).collect();
        let ys: Vec<u64> = (0..4).map(|_| b.gen()).collect();
        assert_ne!(xs, ys);
    }
}
