use crate::batch::TrialBatch;
use crate::error::ExperimentError;
use crate::refine::ClusterResult;
use crate::runner::InitStrategy;
use std::fmt;

/// Five-number summary of the objective scores in one batch
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStatistics {
    /// Strategy the summarized batch was run with
    pub strategy: InitStrategy,

    /// Number of successful trials the summary covers
    pub n_trials: usize,

    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

impl fmt::Display for SummaryStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>8} (n={}): min={:.4} p25={:.4} median={:.4} p75={:.4} max={:.4}",
            self.strategy, self.n_trials, self.min, self.p25, self.median, self.p75, self.max
        )
    }
}

/// Per-trial comparison of a batch against a ground-truth baseline run
#[derive(Debug, Clone)]
pub struct GroundTruthComparison {
    /// Objective score of the ground-truth run
    pub baseline: f64,

    /// trial score / baseline score, one entry per successful trial.
    /// 1.0 means the trial matched the baseline exactly; larger is worse.
    pub ratios: Vec<f64>,
}

impl GroundTruthComparison {
    /// Fraction of trials whose score is within `rel_tol` of the baseline
    pub fn fraction_within(&self, rel_tol: f64) -> f64 {
        if self.ratios.is_empty() {
            return 0.0;
        }
        let hits = self
            .ratios
            .iter()
            .filter(|&&r| (r - 1.0).abs() <= rel_tol)
            .count();
        hits as f64 / self.ratios.len() as f64
    }

    /// Fraction of trials exceeding the baseline by more than `margin`
    /// (e.g. 0.5 counts trials at least 50% worse than the baseline)
    pub fn fraction_exceeding(&self, margin: f64) -> f64 {
        if self.ratios.is_empty() {
            return 0.0;
        }
        let hits = self.ratios.iter().filter(|&&r| r > 1.0 + margin).count();
        hits as f64 / self.ratios.len() as f64
    }

    /// Worst observed trial-to-baseline ratio
    pub fn worst(&self) -> f64 {
        self.ratios.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b))
    }
}

/// Compute {min, p25, median, p75, max} over the total within-cluster sum of
/// squares of the successful trials in `batch`.
///
/// Pure aggregation: the batch is not mutated and repeated calls yield
/// identical results.
///
/// # Errors
///
/// `ExperimentError::EmptyBatch` when the batch has no successful records.
pub fn summarize(batch: &TrialBatch) -> Result<SummaryStatistics, ExperimentError> {
    let mut scores = batch.scores();
    if scores.is_empty() {
        return Err(ExperimentError::EmptyBatch);
    }

    scores.sort_by(|a, b| a.total_cmp(b));
    let n = scores.len();

    Ok(SummaryStatistics {
        strategy: batch.strategy,
        n_trials: n,
        min: scores[0],
        p25: percentile(&scores, 0.25),
        median: percentile(&scores, 0.50),
        p75: percentile(&scores, 0.75),
        max: scores[n - 1],
    })
}

/// Report, per trial, the ratio of the trial's objective score to the
/// ground-truth baseline score. Quantifies how often and how badly a
/// strategy underperforms the known-optimal baseline.
///
/// # Errors
///
/// `EmptyBatch` when the batch has no successful records; `InvalidInput`
/// when the baseline score is not positive (ratios would be undefined).
pub fn compare_to_ground_truth(
    batch: &TrialBatch,
    ground_truth: &ClusterResult,
) -> Result<GroundTruthComparison, ExperimentError> {
    if batch.records.is_empty() {
        return Err(ExperimentError::EmptyBatch);
    }

    let baseline = ground_truth.total_within_ss;
    if !baseline.is_finite() || baseline <= 0.0 {
        return Err(ExperimentError::InvalidInput(format!(
            "Ground-truth score must be positive, got {}",
            baseline
        )));
    }

    let ratios = batch
        .records
        .iter()
        .map(|r| r.total_within_ss / baseline)
        .collect();

    Ok(GroundTruthComparison { baseline, ratios })
}

/// Linearly interpolated percentile over an ascending-sorted slice
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let pos = q * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;

    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}
