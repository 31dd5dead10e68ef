use thiserror::Error;

/// Error types for seeding and batch-trial experiments
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExperimentError {
    /// The inputs are malformed: k out of range, empty dataset, or
    /// non-finite values
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The refinement primitive hit its iteration cap before the centroid
    /// shift dropped below the configured tolerance
    #[error("Refinement did not converge within {iterations} iterations")]
    DidNotConverge { iterations: usize },

    /// Statistics were requested over a batch with no successful trials
    #[error("Trial batch contains no successful records")]
    EmptyBatch,
}
