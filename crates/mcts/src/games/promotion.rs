//! A one-ply promotion puzzle.
//!
//! White has exactly the four promotions of the a-pawn; only the queen
//! wins, everything else is a draw. All four moves share one policy index,
//! so this fixture exercises the promotion collision end to end: equal
//! priors in, value signal out.

use gambit_core::{ensure_legal, Color, Game, Move, Outcome, Promotion, Result, Square};

// File a, ranks 7 and 8.
const A7: Square = Square::new_unchecked(48);
const A8: Square = Square::new_unchecked(56);

/// Promotion puzzle rules oracle.
#[derive(Clone, Copy, Debug, Default)]
pub struct PromotionPuzzle;

impl PromotionPuzzle {
    /// The promotion move for `piece`.
    pub fn promote(piece: Promotion) -> Move {
        Move::promotion(A7, A8, piece)
    }
}

/// Before or after the single move.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PuzzleState {
    Start,
    Done(Promotion),
}

impl Game for PromotionPuzzle {
    type Position = PuzzleState;

    fn initial_position(&self) -> Self::Position {
        PuzzleState::Start
    }

    fn legal_moves(&self, position: &Self::Position) -> Vec<Move> {
        match position {
            PuzzleState::Start => Promotion::ALL.iter().map(|&p| Self::promote(p)).collect(),
            PuzzleState::Done(_) => Vec::new(),
        }
    }

    fn apply(&self, position: &Self::Position, mv: Move) -> Result<Self::Position> {
        ensure_legal(self, position, mv)?;
        match mv.promotion {
            Some(piece) => Ok(PuzzleState::Done(piece)),
            None => Err(gambit_core::GambitError::IllegalMove(mv)),
        }
    }

    fn side_to_move(&self, position: &Self::Position) -> Color {
        match position {
            PuzzleState::Start => Color::White,
            PuzzleState::Done(_) => Color::Black,
        }
    }

    fn outcome(&self, position: &Self::Position) -> Option<Outcome> {
        match position {
            PuzzleState::Start => None,
            PuzzleState::Done(Promotion::Queen) => Some(Outcome::WhiteWins),
            PuzzleState::Done(_) => Some(Outcome::Draw),
        }
    }

    fn encode(&self, position: &Self::Position) -> Vec<f32> {
        match position {
            PuzzleState::Start => vec![1.0, 0.0],
            PuzzleState::Done(piece) => vec![0.0, 1.0 + *piece as u8 as f32],
        }
    }

    fn fingerprint(&self, position: &Self::Position) -> String {
        match position {
            PuzzleState::Start => "start".to_string(),
            PuzzleState::Done(piece) => format!("done-{}", piece.symbol()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gambit_core::GambitError;

    #[test]
    fn test_four_legal_promotions() {
        let game = PromotionPuzzle;
        let moves = game.legal_moves(&game.initial_position());

        assert_eq!(moves.len(), 4);
        let first = moves[0].policy_index();
        for mv in &moves {
            assert_eq!(mv.policy_index(), first);
        }
        // Same index, still four distinct moves.
        assert_eq!(
            moves.iter().collect::<std::collections::HashSet<_>>().len(),
            4
        );
    }

    #[test]
    fn test_only_the_queen_wins() {
        let game = PromotionPuzzle;
        let start = game.initial_position();

        let queen = game
            .apply(&start, PromotionPuzzle::promote(Promotion::Queen))
            .unwrap();
        assert_eq!(game.outcome(&queen), Some(Outcome::WhiteWins));

        let rook = game
            .apply(&start, PromotionPuzzle::promote(Promotion::Rook))
            .unwrap();
        assert_eq!(game.outcome(&rook), Some(Outcome::Draw));
    }

    #[test]
    fn test_bare_pawn_push_is_illegal() {
        let game = PromotionPuzzle;
        let mv = Move::new(
            Square::from_coords(0, 6).unwrap(),
            Square::from_coords(0, 7).unwrap(),
        );
        assert!(matches!(
            game.apply(&game.initial_position(), mv),
            Err(GambitError::IllegalMove(_))
        ));
    }

    #[test]
    fn test_game_ends_after_one_ply() {
        let game = PromotionPuzzle;
        let done = game
            .apply(
                &game.initial_position(),
                PromotionPuzzle::promote(Promotion::Knight),
            )
            .unwrap();

        assert!(game.is_terminal(&done));
        assert!(game.legal_moves(&done).is_empty());
        assert_eq!(game.side_to_move(&done), Color::Black);
    }
}
