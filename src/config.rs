/// Configuration for a batch clustering experiment
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    /// Number of clusters
    pub k: usize,

    /// Number of independent trials per batch
    pub n_trials: usize,

    /// Maximum number of refinement iterations per trial
    pub max_iters: usize,

    /// Convergence tolerance for the refinement primitive. When the total
    /// centroid shift drops below this threshold the trial stops early.
    /// Set to a negative value to disable the shift test entirely; the
    /// trial then always runs `max_iters` iterations and succeeds.
    pub tol: f64,

    /// Base random seed. Each trial derives its own independent RNG stream
    /// from this seed and the trial index.
    pub seed: u64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            k: 8,
            n_trials: 100,
            max_iters: 100,
            tol: 1e-6,
            seed: 0,
        }
    }
}

impl ExperimentConfig {
    /// Create a new configuration with the specified number of clusters
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    /// Set the number of trials per batch
    pub fn with_n_trials(mut self, n_trials: usize) -> Self {
        self.n_trials = n_trials;
        self
    }

    /// Set the maximum number of refinement iterations
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Set the convergence tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the base random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
