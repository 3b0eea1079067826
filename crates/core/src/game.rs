use serde::{Deserialize, Serialize};

use crate::{Color, GambitError, Move, Result};

/// Final result of a finished game.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Outcome {
    WhiteWins,
    BlackWins,
    Draw,
}

impl Outcome {
    /// The winning side, if any.
    #[inline]
    pub const fn winner(self) -> Option<Color> {
        match self {
            Outcome::WhiteWins => Some(Color::White),
            Outcome::BlackWins => Some(Color::Black),
            Outcome::Draw => None,
        }
    }

    /// Scalar score from `color`'s perspective: +1 win, -1 loss, 0 draw.
    #[inline]
    pub fn score_for(self, color: Color) -> f32 {
        match self.winner() {
            Some(w) if w == color => 1.0,
            Some(_) => -1.0,
            None => 0.0,
        }
    }
}

/// The rules-oracle contract the search engine builds on.
///
/// Implementations own legality, terminal detection, and position encoding;
/// the search never inspects positions directly. Positions are immutable:
/// [`Game::apply`] produces a new one and rejects moves outside the legal
/// set. The oracle must list legal moves in a stable order per position,
/// since that order drives the search's documented tie-breaks.
pub trait Game: Clone + Send + Sync {
    /// An opaque position handle (board state plus whatever rights and
    /// counters the rules need).
    type Position: Clone + Send;

    /// Returns the starting position.
    fn initial_position(&self) -> Self::Position;

    /// Returns all legal moves, in a stable order.
    fn legal_moves(&self, pos: &Self::Position) -> Vec<Move>;

    /// Applies a move, returning the resulting position.
    ///
    /// Fails with [`GambitError::IllegalMove`] if the move is not in the
    /// legal set; the input position is untouched either way.
    fn apply(&self, pos: &Self::Position, mv: Move) -> Result<Self::Position>;

    /// The side to move in this position.
    fn side_to_move(&self, pos: &Self::Position) -> Color;

    /// Declared outcome, or `None` while the game is still running.
    fn outcome(&self, pos: &Self::Position) -> Option<Outcome>;

    /// Whether the game has ended.
    #[inline]
    fn is_terminal(&self, pos: &Self::Position) -> bool {
        self.outcome(pos).is_some()
    }

    /// Encodes the position as a fixed-size feature vector for the
    /// evaluator. The layout is per-game but must be stable; the chess
    /// oracle uses 14 planes of 64 squares (12 piece-occupancy planes, a
    /// side-to-move plane, and an aggregated castling-rights plane at 0.25
    /// per remaining right).
    fn encode(&self, pos: &Self::Position) -> Vec<f32>;

    /// Canonical string key for this position, identical for
    /// transpositions. Used by the inference cache.
    fn fingerprint(&self, pos: &Self::Position) -> String;
}

/// Helper for oracle implementations: membership check before applying.
pub fn ensure_legal<G: Game>(game: &G, pos: &G::Position, mv: Move) -> Result<()> {
    if game.legal_moves(pos).contains(&mv) {
        Ok(())
    } else {
        Err(GambitError::IllegalMove(mv))
    }
}
