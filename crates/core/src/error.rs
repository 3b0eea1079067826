use thiserror::Error;

use crate::Move;

/// Errors surfaced across the search and training pipeline.
#[derive(Error, Debug)]
pub enum GambitError {
    #[error("Illegal move: {0}")]
    IllegalMove(Move),

    #[error("No legal moves available")]
    NoLegalMoves,

    #[error("Evaluator failure: {0}")]
    Evaluator(String),

    #[error("A training run is already in progress")]
    AlreadyRunning,

    #[error("Serialization failure: {0}")]
    Serialization(String),
}

/// Convenience Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, GambitError>;
