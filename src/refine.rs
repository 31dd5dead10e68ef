use crate::config::ExperimentConfig;
use crate::distance::{
    assign_nearest, compute_center_shift, compute_squared_norms, validate_dataset,
};
use crate::error::ExperimentError;
use ndarray::{Array1, Array2, ArrayView2};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// How the refinement primitive obtains its starting centers
#[derive(Debug, Clone)]
pub enum Init {
    /// Pick k data points uniformly at random
    Random,

    /// Start from an explicit k x d centers matrix (k-means++ seeds or
    /// known ground-truth centers)
    Centers(Array2<f64>),
}

/// Normalized outcome of one refinement run
#[derive(Debug, Clone)]
pub struct ClusterResult {
    /// Final cluster centers (k x d)
    pub centers: Array2<f64>,

    /// Cluster label for each data point, in [0, k)
    pub assignments: Array1<usize>,

    /// Sum over all points of the squared distance to their assigned center
    pub total_within_ss: f64,

    /// Number of refinement iterations performed
    pub n_iterations: usize,
}

/// The iterative refinement capability the experiment harness runs against.
///
/// `LloydRefiner` is the provided implementation; anything that refines a
/// dataset from a starting configuration down to final centers can stand in.
pub trait Refiner {
    fn refine(
        &self,
        data: &ArrayView2<f64>,
        init: Init,
        rng: &mut ChaCha8Rng,
    ) -> Result<ClusterResult, ExperimentError>;
}

/// Lloyd's algorithm: alternate nearest-center assignment and center
/// recomputation until the total center shift drops below `tol` or
/// `max_iters` is reached.
#[derive(Debug, Clone)]
pub struct LloydRefiner {
    /// Number of clusters for random initialization
    pub k: usize,

    /// Iteration cap
    pub max_iters: usize,

    /// Convergence tolerance on the summed center shift. Negative disables
    /// the shift test; the run then performs `max_iters` iterations and
    /// succeeds unconditionally.
    pub tol: f64,
}

impl LloydRefiner {
    pub fn new(k: usize, max_iters: usize, tol: f64) -> Self {
        Self { k, max_iters, tol }
    }

    pub fn from_config(config: &ExperimentConfig) -> Self {
        Self::new(config.k, config.max_iters, config.tol)
    }
}

impl Refiner for LloydRefiner {
    /// Run Lloyd's algorithm to convergence.
    ///
    /// # Errors
    ///
    /// * `InvalidInput` if the dataset is malformed, k is out of range, or
    ///   explicit centers do not match the dataset dimensionality.
    /// * `DidNotConverge` if `tol >= 0` and the center shift never dropped
    ///   below it within `max_iters` iterations. The iteration cap is the
    ///   batch harness's guard against a trial blocking the whole batch.
    fn refine(
        &self,
        data: &ArrayView2<f64>,
        init: Init,
        rng: &mut ChaCha8Rng,
    ) -> Result<ClusterResult, ExperimentError> {
        validate_dataset(data)?;

        let n_samples = data.nrows();
        let n_features = data.ncols();

        let mut centers = match init {
            Init::Random => {
                if self.k == 0 {
                    return Err(ExperimentError::InvalidInput(
                        "k must be greater than 0".to_string(),
                    ));
                }
                if n_samples < self.k {
                    return Err(ExperimentError::InvalidInput(format!(
                        "Number of samples ({}) is less than k ({})",
                        n_samples, self.k
                    )));
                }
                random_centers(data, self.k, rng)
            }
            Init::Centers(centers) => {
                if centers.nrows() == 0 || centers.nrows() > n_samples {
                    return Err(ExperimentError::InvalidInput(format!(
                        "Initial centers count ({}) must be in 1..={}",
                        centers.nrows(),
                        n_samples
                    )));
                }
                if centers.ncols() != n_features {
                    return Err(ExperimentError::InvalidInput(format!(
                        "Initial centers have {} features, dataset has {}",
                        centers.ncols(),
                        n_features
                    )));
                }
                centers
            }
        };

        let k = centers.nrows();
        let data_norms = compute_squared_norms(data);

        let mut n_iterations = 0;
        let mut converged = false;

        for iteration in 0..self.max_iters {
            n_iterations = iteration + 1;

            let center_norms = compute_squared_norms(&centers.view());
            let (labels, _) = assign_nearest(
                data,
                &data_norms.view(),
                &centers.view(),
                &center_norms.view(),
            );

            // Recompute each center as the mean of its assigned points
            let mut cluster_sums: Array2<f64> = Array2::zeros((k, n_features));
            let mut cluster_counts: Array1<f64> = Array1::zeros(k);

            for (i, &label) in labels.iter().enumerate() {
                cluster_counts[label] += 1.0;
                for j in 0..n_features {
                    cluster_sums[[label, j]] += data[[i, j]];
                }
            }

            let prev_centers = centers.clone();
            let mut empty_clusters = Vec::new();

            for cluster_idx in 0..k {
                let count = cluster_counts[cluster_idx];
                if count > 0.0 {
                    for j in 0..n_features {
                        centers[[cluster_idx, j]] = cluster_sums[[cluster_idx, j]] / count;
                    }
                } else {
                    empty_clusters.push(cluster_idx);
                }
            }

            // Reinitialize empty clusters from random data points
            if !empty_clusters.is_empty() {
                let indices: Vec<usize> = (0..n_samples).collect();
                let random_indices: Vec<usize> = indices
                    .choose_multiple(rng, empty_clusters.len())
                    .cloned()
                    .collect();

                for (i, &cluster_idx) in empty_clusters.iter().enumerate() {
                    let data_idx = random_indices[i];
                    for j in 0..n_features {
                        centers[[cluster_idx, j]] = data[[data_idx, j]];
                    }
                }

                debug!(
                    n_reinitialized = empty_clusters.len(),
                    iteration = iteration + 1,
                    "reinitialized empty clusters"
                );
            }

            let shift = compute_center_shift(&prev_centers.view(), &centers.view());
            debug!(
                iteration = iteration + 1,
                max_iters = self.max_iters,
                shift,
                "refinement iteration"
            );

            if self.tol >= 0.0 && shift < self.tol {
                converged = true;
                break;
            }
        }

        if self.tol >= 0.0 && !converged {
            return Err(ExperimentError::DidNotConverge {
                iterations: n_iterations,
            });
        }

        // Final assignment pass against the settled centers, which also
        // yields the within-cluster sum of squares
        let center_norms = compute_squared_norms(&centers.view());
        let (assignments, distances) = assign_nearest(
            data,
            &data_norms.view(),
            &centers.view(),
            &center_norms.view(),
        );
        let total_within_ss = distances.sum();

        Ok(ClusterResult {
            centers,
            assignments,
            total_within_ss,
            n_iterations,
        })
    }
}

/// Pick k distinct data points uniformly at random as starting centers
fn random_centers(data: &ArrayView2<f64>, k: usize, rng: &mut ChaCha8Rng) -> Array2<f64> {
    let n_samples = data.nrows();
    let n_features = data.ncols();

    let indices: Vec<usize> = (0..n_samples).collect();
    let selected: Vec<usize> = indices.choose_multiple(rng, k).cloned().collect();

    let mut centers = Array2::zeros((k, n_features));
    for (center_idx, &data_idx) in selected.iter().enumerate() {
        centers.row_mut(center_idx).assign(&data.row(data_idx));
    }

    centers
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use rand::SeedableRng;

    #[test]
    fn test_random_centers_are_data_rows() {
        let data = Array2::random((100, 8), Uniform::new(-1.0f64, 1.0));
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let centers = random_centers(&data.view(), 5, &mut rng);

        assert_eq!(centers.nrows(), 5);
        assert_eq!(centers.ncols(), 8);
        for row in centers.rows() {
            assert!(data.rows().into_iter().any(|r| r == row));
        }
    }

    #[test]
    fn test_lloyd_basic_random_init() {
        let data = Array2::random((400, 8), Uniform::new(-1.0f64, 1.0));
        let refiner = LloydRefiner::new(5, 200, 1e-4);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let result = refiner.refine(&data.view(), Init::Random, &mut rng).unwrap();

        assert_eq!(result.centers.nrows(), 5);
        assert_eq!(result.centers.ncols(), 8);
        assert_eq!(result.assignments.len(), 400);
        assert!(result.total_within_ss >= 0.0);
        assert!(result.n_iterations >= 1);

        for &label in result.assignments.iter() {
            assert!(label < 5);
        }
    }

    #[test]
    fn test_lloyd_with_explicit_centers() {
        // Two obvious groups; starting on their members must converge to
        // their means.
        let data = array![
            [0.0f64, 0.0],
            [0.0, 2.0],
            [10.0, 10.0],
            [10.0, 12.0]
        ];
        let init = array![[0.0f64, 0.0], [10.0, 10.0]];

        let refiner = LloydRefiner::new(2, 50, 1e-9);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let result = refiner
            .refine(&data.view(), Init::Centers(init), &mut rng)
            .unwrap();

        assert_relative_eq!(result.centers[[0, 0]], 0.0, epsilon = 1e-9);
        assert_relative_eq!(result.centers[[0, 1]], 1.0, epsilon = 1e-9);
        assert_relative_eq!(result.centers[[1, 0]], 10.0, epsilon = 1e-9);
        assert_relative_eq!(result.centers[[1, 1]], 11.0, epsilon = 1e-9);

        // Each group contributes 2 * 1^2
        assert_relative_eq!(result.total_within_ss, 4.0, epsilon = 1e-9);
        assert_eq!(result.assignments.to_vec(), vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_lloyd_k_one_center_is_mean() {
        let data = Array2::random((100, 4), Uniform::new(-1.0f64, 1.0));
        let refiner = LloydRefiner::new(1, 50, 1e-9);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = refiner.refine(&data.view(), Init::Random, &mut rng).unwrap();

        let mean = data.mean_axis(ndarray::Axis(0)).unwrap();
        for j in 0..4 {
            assert_relative_eq!(result.centers[[0, j]], mean[j], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_lloyd_iteration_cap_is_a_failure() {
        let data = Array2::random((300, 6), Uniform::new(-1.0f64, 1.0));
        let refiner = LloydRefiner::new(4, 1, 1e-12);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let result = refiner.refine(&data.view(), Init::Random, &mut rng);
        assert!(matches!(
            result,
            Err(ExperimentError::DidNotConverge { iterations: 1 })
        ));
    }

    #[test]
    fn test_lloyd_negative_tol_always_succeeds() {
        let data = Array2::random((200, 4), Uniform::new(-1.0f64, 1.0));
        let refiner = LloydRefiner::new(3, 5, -1.0);
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        let result = refiner.refine(&data.view(), Init::Random, &mut rng).unwrap();
        assert_eq!(result.n_iterations, 5);
    }

    #[test]
    fn test_lloyd_insufficient_data() {
        let data = Array2::random((3, 4), Uniform::new(-1.0f64, 1.0));
        let refiner = LloydRefiner::new(10, 50, 1e-6);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        assert!(matches!(
            refiner.refine(&data.view(), Init::Random, &mut rng),
            Err(ExperimentError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_lloyd_center_dimension_mismatch() {
        let data = Array2::random((50, 4), Uniform::new(-1.0f64, 1.0));
        let init = Array2::random((3, 7), Uniform::new(-1.0f64, 1.0));
        let refiner = LloydRefiner::new(3, 50, 1e-6);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        assert!(matches!(
            refiner.refine(&data.view(), Init::Centers(init), &mut rng),
            Err(ExperimentError::InvalidInput(_))
        ));
    }
}
