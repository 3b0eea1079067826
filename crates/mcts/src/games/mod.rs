//! Fixture rules oracles for exercising the search engine.
//!
//! Real deployments plug in an external oracle; these three are small,
//! fully specified games used across the workspace's tests.

pub mod promotion;
pub mod race;
pub mod tictactoe;

pub use promotion::{PromotionPuzzle, PuzzleState};
pub use race::{Race, RaceState};
pub use tictactoe::{TicTacToe, TicTacToeState};
