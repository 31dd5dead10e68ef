//! Binary for comparing standard and k-means++ initialization head to head.
//!
//! Generates a synthetic 2-D dataset of three well-separated Gaussian blobs,
//! runs a batch of independent trials per strategy, and prints the summary
//! statistics of each batch next to a ground-truth baseline obtained by
//! refining from the true generating centers.
//!
//! Usage: `compare-init <points-per-cluster> <sigma> <n-trials> <seed>`

use kmeanspp_trials::{
    compare_to_ground_truth, summarize, BatchExperimentRunner, ExperimentConfig, InitStrategy,
    LloydRefiner,
};
use ndarray::{array, Array2};
use ndarray_rand::rand_distr::Normal;
use ndarray_rand::RandomExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 5 {
        eprintln!(
            "Usage: {} <points-per-cluster> <sigma> <n-trials> <seed>",
            args[0]
        );
        std::process::exit(1);
    }

    let points_per_cluster: usize = args[1].parse()?;
    let sigma: f64 = args[2].parse()?;
    let n_trials: usize = args[3].parse()?;
    let seed: u64 = args[4].parse()?;

    let true_centers = array![[0.0f64, 0.0], [60.0, 0.0], [0.0, 60.0]];
    let k = true_centers.nrows();
    let n_samples = k * points_per_cluster;

    // Gaussian blobs around the true centers
    let mut data_rng = ChaCha8Rng::seed_from_u64(seed);
    let noise = Array2::random_using((n_samples, 2), Normal::new(0.0, sigma)?, &mut data_rng);
    let mut data = Array2::zeros((n_samples, 2));
    for c in 0..k {
        for i in 0..points_per_cluster {
            let row = c * points_per_cluster + i;
            for j in 0..2 {
                data[[row, j]] = true_centers[[c, j]] + noise[[row, j]];
            }
        }
    }

    eprintln!(
        "Dataset: {} points, {} clusters, sigma = {}",
        n_samples, k, sigma
    );

    let config = ExperimentConfig::new(k)
        .with_n_trials(n_trials)
        .with_max_iters(300)
        .with_tol(1e-6)
        .with_seed(seed);

    let runner = BatchExperimentRunner::new(LloydRefiner::from_config(&config), config);

    // Ground-truth baseline: refine starting from the true generating centers
    let mut rng = runner.baseline_rng();
    let truth = runner
        .runner()
        .run_with_centers(&data.view(), true_centers, &mut rng)?;
    println!(
        "ground truth: total_within_ss = {:.4} ({} iterations)",
        truth.total_within_ss, truth.n_iterations
    );

    for strategy in [InitStrategy::Standard, InitStrategy::Seeded] {
        let batch = runner.run_batch(&data.view(), strategy)?;
        let summary = summarize(&batch)?;
        let cmp = compare_to_ground_truth(&batch, &truth)?;

        println!("{}", summary);
        println!(
            "  failed trials: {}/{}",
            batch.n_failed(),
            batch.n_trials()
        );
        println!(
            "  within 1% of ground truth: {:.1}%  worse by >50%: {:.1}%  worst ratio: {:.2}",
            100.0 * cmp.fraction_within(0.01),
            100.0 * cmp.fraction_exceeding(0.5),
            cmp.worst()
        );
    }

    Ok(())
}
