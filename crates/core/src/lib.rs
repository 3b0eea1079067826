//! Gambit Core - shared types and the rules-oracle contract.
//!
//! This crate holds everything the search engine, self-play generator, and
//! pipeline orchestrator agree on: the compact [`Move`] value type and its
//! policy-index mapping, the [`Game`] trait a rules oracle implements, the
//! [`Outcome`] of a finished game, and the crate-wide error taxonomy.
//!
//! # Types
//!
//! - [`Game`] - Rules-oracle trait (legality, terminal detection, encoding)
//! - [`Move`] / [`Square`] / [`Promotion`] - compact move identity
//! - [`Outcome`] / [`Color`] - game results and sides
//! - [`GambitError`] / [`Result`] - error taxonomy

mod error;
mod game;
mod types;

pub use error::{GambitError, Result};
pub use game::{ensure_legal, Game, Outcome};
pub use types::{Color, Move, Promotion, Square, POLICY_SIZE};
