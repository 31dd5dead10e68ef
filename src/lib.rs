//! # kmeanspp-trials
//!
//! k-means++ seeding and a batch-trial harness for characterizing the
//! outcome distribution of randomized clustering runs, built on ndarray.
//!
//! ## Features
//!
//! - **Vectorized k-means++ seeding**: distance-weighted selection of
//!   initial centers with a single broadcast pass per chosen center
//! - **Batch trials**: many independent randomized runs executed in
//!   parallel with rayon, each on its own RNG stream
//! - **Strategy comparison**: five-number summaries and ground-truth
//!   ratio comparisons of "standard" (uniform random) versus "seeded"
//!   (k-means++) initialization
//! - **Pluggable refinement**: the iterative Lloyd's-algorithm primitive
//!   sits behind the [`Refiner`] trait; a bounded-iteration implementation
//!   is provided
//!
//! ## Example
//!
//! ```rust
//! use kmeanspp_trials::{
//!     summarize, BatchExperimentRunner, ExperimentConfig, InitStrategy, LloydRefiner,
//! };
//! use ndarray::Array2;
//! use ndarray_rand::rand_distr::Uniform;
//! use ndarray_rand::RandomExt;
//!
//! let data = Array2::random((300, 8), Uniform::new(-1.0f64, 1.0));
//!
//! let config = ExperimentConfig::new(4)
//!     .with_n_trials(20)
//!     .with_max_iters(300)
//!     .with_tol(1e-4)
//!     .with_seed(42);
//!
//! let runner = BatchExperimentRunner::new(LloydRefiner::from_config(&config), config);
//! let batch = runner.run_batch(&data.view(), InitStrategy::Seeded).unwrap();
//!
//! let summary = summarize(&batch).unwrap();
//! println!("{}", summary);
//! assert!(summary.min <= summary.max);
//! ```

mod batch;
mod config;
mod distance;
mod error;
mod refine;
mod runner;
mod seeding;
mod stats;

pub use batch::{BatchExperimentRunner, TrialBatch, TrialFailure};
pub use config::ExperimentConfig;
pub use distance::{merge_nearest, squared_distances};
pub use error::ExperimentError;
pub use refine::{ClusterResult, Init, LloydRefiner, Refiner};
pub use runner::{ClusteringRunner, InitStrategy};
pub use seeding::select_seeds;
pub use stats::{compare_to_ground_truth, summarize, GroundTruthComparison, SummaryStatistics};
