//! Self-play data generation and head-to-head model evaluation.
//!
//! [`generator`] plays games against itself and records (position,
//! visit distribution, outcome) triples for training. [`arbiter`] pits
//! a challenger evaluator against the reigning champion and tallies the
//! result. [`record`] holds the MessagePack on-disk format.

pub mod arbiter;
pub mod generator;
pub mod record;

pub use arbiter::{play_match, EvaluationTally, MatchConfig, DEFAULT_PROMOTION_THRESHOLD};
pub use generator::{generate_games, play_game, sparse_policy, SelfPlayConfig};
pub use record::{read_record, write_record, GameRecord, TrainingExample};
