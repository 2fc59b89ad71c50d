pub mod combined;
pub mod evaluator;

pub use combined::CombinedEvaluator;
pub use evaluator::SignalEvaluator;
