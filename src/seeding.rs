use crate::distance::{merge_nearest, squared_distances, validate_dataset};
use crate::error::ExperimentError;
use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::warn;

/// Select `k` initial cluster centers from `data` using k-means++ seeding.
///
/// The first center is chosen uniformly at random among the rows of `data`.
/// Each subsequent center is a data row sampled with probability proportional
/// to its squared distance to the nearest already-chosen center, so points far
/// from every existing center are favored. Already-chosen points carry zero
/// weight and are not re-selected while any positive weight remains.
///
/// Costs O(k * n * d): one full distance pass per chosen center. The payoff is
/// markedly better refinement quality than uniform random initialization.
///
/// # Errors
///
/// Returns `ExperimentError::InvalidInput` if `k` is 0, `k` exceeds the number
/// of rows, or the dataset is empty or contains non-finite values.
pub fn select_seeds(
    data: &ArrayView2<f64>,
    k: usize,
    rng: &mut ChaCha8Rng,
) -> Result<Array2<f64>, ExperimentError> {
    validate_dataset(data)?;

    let n_samples = data.nrows();
    let n_features = data.ncols();

    if k == 0 {
        return Err(ExperimentError::InvalidInput(
            "k must be greater than 0".to_string(),
        ));
    }

    if k > n_samples {
        return Err(ExperimentError::InvalidInput(format!(
            "Cannot select {} centers from {} points",
            k, n_samples
        )));
    }

    let mut centers = Array2::zeros((k, n_features));

    // First center: uniform random pick
    let first = rng.gen_range(0..n_samples);
    centers.row_mut(0).assign(&data.row(first));

    if k == 1 {
        return Ok(centers);
    }

    // Squared distance from every point to its nearest chosen center so far
    let mut nearest = squared_distances(data, &data.row(first));

    for l in 1..k {
        let idx = sample_weighted(&nearest.view(), rng);
        centers.row_mut(l).assign(&data.row(idx));

        // The vector is not consulted after the final pick
        if l + 1 < k {
            let dists = squared_distances(data, &data.row(idx));
            merge_nearest(&mut nearest, &dists.view());
        }
    }

    Ok(centers)
}

/// Sample one index with probability proportional to its weight.
///
/// If every weight is zero (duplicate points exhausted the distinct-point
/// supply), sampling falls back to a uniform pick over all points rather than
/// dividing by a zero total. The event is logged since it indicates duplicate
/// points or k exceeding the distinct-point count.
fn sample_weighted(weights: &ArrayView1<f64>, rng: &mut ChaCha8Rng) -> usize {
    let total: f64 = weights.sum();

    if total <= 0.0 {
        warn!(
            n_points = weights.len(),
            "all sampling weights are zero; falling back to uniform selection"
        );
        return rng.gen_range(0..weights.len());
    }

    // Draw a threshold in [0, total) and walk the cumulative sum
    let threshold: f64 = rng.gen_range(0.0..total);
    let mut cumsum = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumsum += w;
        if cumsum > threshold {
            return i;
        }
    }

    // Floating-point round-off can leave the threshold unreached
    weights.len() - 1
}
