//! Training and model-revival seams.
//!
//! The orchestrator drives these two traits and never sees what is
//! inside a model blob. [`crate::tabular`] ships reference
//! implementations; a neural backend would plug in here.

use gambit_core::Result;
use gambit_mcts::Evaluator;
use gambit_selfplay::TrainingExample;

/// Fits a model to self-play examples.
pub trait Trainer: Send + Sync {
    /// Returns the trained model as an opaque blob for the store.
    fn train(&self, examples: &[TrainingExample]) -> Result<Vec<u8>>;
}

/// Turns stored blobs back into live evaluators.
pub trait EvaluatorFactory: Send + Sync {
    /// Evaluator used before any model has been trained.
    fn initial(&self) -> Box<dyn Evaluator + Send + Sync>;

    /// Revive a blob produced by the matching [`Trainer`].
    fn build(&self, bytes: &[u8]) -> Result<Box<dyn Evaluator + Send + Sync>>;
}
