//! A draw-free counting race.
//!
//! Players alternate adding 1 or 2 to their own counter; the first to reach
//! the target wins. Every game ends with a winner, which makes this the
//! fixture for match-symmetry checks where draws would blur the arithmetic.

use gambit_core::{ensure_legal, Color, Game, Move, Outcome, Result, Square};

/// Race rules oracle. The default target is 5.
#[derive(Clone, Copy, Debug)]
pub struct Race {
    target: u8,
}

impl Race {
    pub fn new(target: u8) -> Self {
        assert!(target > 0, "race target must be positive");
        Self { target }
    }

    /// The move that advances the mover's counter by `step` (1 or 2).
    pub fn advance(step: u8) -> Move {
        Move::new(Square::new_unchecked(0), Square::new_unchecked(step))
    }
}

impl Default for Race {
    fn default() -> Self {
        Self::new(5)
    }
}

/// Both counters plus the side to move.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RaceState {
    white: u8,
    black: u8,
    to_move: Color,
}

impl RaceState {
    /// Counter for `color`.
    pub fn score(&self, color: Color) -> u8 {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }
}

impl Game for Race {
    type Position = RaceState;

    fn initial_position(&self) -> Self::Position {
        RaceState {
            white: 0,
            black: 0,
            to_move: Color::White,
        }
    }

    fn legal_moves(&self, position: &Self::Position) -> Vec<Move> {
        if self.outcome(position).is_some() {
            return Vec::new();
        }
        vec![Self::advance(1), Self::advance(2)]
    }

    fn apply(&self, position: &Self::Position, mv: Move) -> Result<Self::Position> {
        ensure_legal(self, position, mv)?;
        let step = mv.to.index() as u8;
        let mut next = *position;
        match position.to_move {
            Color::White => next.white += step,
            Color::Black => next.black += step,
        }
        next.to_move = position.to_move.opponent();
        Ok(next)
    }

    fn side_to_move(&self, position: &Self::Position) -> Color {
        position.to_move
    }

    fn outcome(&self, position: &Self::Position) -> Option<Outcome> {
        if position.white >= self.target {
            Some(Outcome::WhiteWins)
        } else if position.black >= self.target {
            Some(Outcome::BlackWins)
        } else {
            None
        }
    }

    fn encode(&self, position: &Self::Position) -> Vec<f32> {
        let target = self.target as f32;
        vec![
            position.white as f32 / target,
            position.black as f32 / target,
            if position.to_move == Color::White {
                1.0
            } else {
                0.0
            },
        ]
    }

    fn fingerprint(&self, position: &Self::Position) -> String {
        format!(
            "{}-{} {}",
            position.white,
            position.black,
            match position.to_move {
                Color::White => 'w',
                Color::Black => 'b',
            }
        )
    }
}
