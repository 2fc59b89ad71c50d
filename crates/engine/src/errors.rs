use thiserror::Error;

/// Per-symbol failure inside a cycle. None of these abort the cycle or
/// the dispatcher; each becomes a failed activity-log entry for the one
/// symbol it hit, and the next cycle starts clean.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("market data fetch failed: {0}")]
    Fetch(anyhow::Error),

    #[error("signal evaluation failed: {0}")]
    Evaluation(String),

    #[error("trade preparation failed: {0}")]
    Preparation(anyhow::Error),

    #[error("order submission failed: {0}")]
    Submission(anyhow::Error),
}
