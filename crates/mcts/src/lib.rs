//! PUCT Monte Carlo tree search over a pluggable rules oracle.
//!
//! The engine is generic over three seams:
//!
//! - **`gambit_core::Game`**: move generation, outcomes, encodings
//! - **`Evaluator`**: priors and values for encoded positions
//! - **`rand::Rng`**: root noise and temperature sampling
//!
//! Each engine owns an arena tree rebuilt per search and a fingerprint-keyed
//! inference cache that persists across searches.
//!
//! # Example
//!
//! ```
//! use gambit_core::Game;
//! use gambit_mcts::games::TicTacToe;
//! use gambit_mcts::{Mcts, MctsConfig, UniformEvaluator};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let game = TicTacToe;
//! let mut mcts = Mcts::new(
//!     MctsConfig::with_simulations(100),
//!     UniformEvaluator,
//!     ChaCha8Rng::seed_from_u64(42),
//! );
//!
//! let result = mcts.search(&game, &game.initial_position(), 0.0).unwrap();
//! assert_eq!(result.visit_counts.len(), 9);
//! println!("best move {} value {:.2}", result.best_move, result.root_value);
//! ```

pub mod cache;
pub mod config;
pub mod evaluator;
pub mod games;
mod node;
mod search;
mod tree;

pub use cache::{CacheStats, InferenceCache};
pub use config::MctsConfig;
pub use evaluator::{
    renormalized_priors, validate_evaluation, Evaluation, Evaluator, FixedEvaluator,
    UniformEvaluator,
};
pub use search::{Mcts, SearchResult};
