use common::models::Signal;

/// Pure strategy function: an ordered series of closing prices (oldest
/// first) in, a directional signal out. No side effects; identical input
/// must produce identical output. Any implementation satisfying this
/// shape can drive the dispatcher.
pub trait SignalEvaluator: Send + Sync {
    fn evaluate(&self, closes: &[f64]) -> anyhow::Result<Signal>;
}
