use crate::error::ExperimentError;
use ndarray::{Array1, ArrayView1, ArrayView2, Axis, Zip};
use rayon::prelude::*;

/// Compute the squared Euclidean distance from every row of `data` to a
/// single reference point, in one vectorized pass.
///
/// The reference is broadcast across all rows: subtract, square element-wise,
/// then sum across the feature axis. No explicit per-point loop.
#[inline]
pub fn squared_distances(data: &ArrayView2<f64>, center: &ArrayView1<f64>) -> Array1<f64> {
    let diff = data - center;
    diff.mapv_into(|v| v * v).sum_axis(Axis(1))
}

/// Merge a freshly computed distance vector into the running nearest-center
/// distances, taking the element-wise minimum in place.
///
/// This is what keeps the nearest-center distances monotonically
/// non-increasing as more centers are chosen.
#[inline]
pub fn merge_nearest(nearest: &mut Array1<f64>, candidate: &ArrayView1<f64>) {
    Zip::from(nearest).and(candidate).for_each(|best, &cand| {
        if cand < *best {
            *best = cand;
        }
    });
}

/// Compute squared L2 norms for each row of a 2D array
/// Returns a 1D array where each element is the squared norm of the corresponding row
#[inline]
pub fn compute_squared_norms(data: &ArrayView2<f64>) -> Array1<f64> {
    let n_samples = data.nrows();
    let mut norms = Array1::zeros(n_samples);

    // Parallel computation of row norms
    norms
        .as_slice_mut()
        .expect("freshly allocated array is contiguous")
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, norm)| {
            let row = data.row(i);
            *norm = row.dot(&row);
        });

    norms
}

/// Assign each data point to its nearest center.
///
/// Uses the identity: ||x - c||^2 = ||x||^2 + ||c||^2 - 2*x.c
/// with the cross terms computed as a single matrix multiplication.
///
/// # Returns
/// * labels - index of the nearest center for each point (n,)
/// * distances - squared distance to that center, clamped at zero (n,)
pub fn assign_nearest(
    data: &ArrayView2<f64>,
    data_norms: &ArrayView1<f64>,
    centers: &ArrayView2<f64>,
    center_norms: &ArrayView1<f64>,
) -> (Array1<usize>, Array1<f64>) {
    let n_samples = data.nrows();
    let k = centers.nrows();

    // Compute x.c for all pairs: (n, d) x (d, k) -> (n, k)
    let dot_products = data.dot(&centers.t());

    let mut labels = Array1::zeros(n_samples);
    let mut distances = Array1::from_elem(n_samples, f64::INFINITY);

    labels
        .as_slice_mut()
        .expect("freshly allocated array is contiguous")
        .par_iter_mut()
        .zip(
            distances
                .as_slice_mut()
                .expect("freshly allocated array is contiguous")
                .par_iter_mut(),
        )
        .enumerate()
        .for_each(|(i, (label, best_dist))| {
            let x_norm = data_norms[i];

            for j in 0..k {
                let dist = x_norm + center_norms[j] - 2.0 * dot_products[[i, j]];

                if dist < *best_dist {
                    *best_dist = dist;
                    *label = j;
                }
            }

            // The norm identity can go slightly negative for coincident points
            if *best_dist < 0.0 {
                *best_dist = 0.0;
            }
        });

    (labels, distances)
}

/// Compute center shift (sum of L2 norms of center movements)
pub fn compute_center_shift(old_centers: &ArrayView2<f64>, new_centers: &ArrayView2<f64>) -> f64 {
    let k = old_centers.nrows();

    (0..k)
        .into_par_iter()
        .map(|i| {
            let old_c = old_centers.row(i);
            let new_c = new_centers.row(i);

            let mut diff_sq = 0.0f64;
            for j in 0..old_c.len() {
                let d = new_c[j] - old_c[j];
                diff_sq += d * d;
            }
            diff_sq.sqrt()
        })
        .sum()
}

/// Validate that a dataset is non-empty and contains only finite values.
pub(crate) fn validate_dataset(data: &ArrayView2<f64>) -> Result<(), ExperimentError> {
    if data.nrows() == 0 || data.ncols() == 0 {
        return Err(ExperimentError::InvalidInput(
            "dataset must be non-empty".to_string(),
        ));
    }

    if data.iter().any(|v| !v.is_finite()) {
        return Err(ExperimentError::InvalidInput(
            "dataset contains non-finite values".to_string(),
        ));
    }

    Ok(())
}
