//! Tic-tac-toe rules oracle for exercising the search engine.
//!
//! Small enough to reason about by hand, rich enough to have wins, draws,
//! and forced defenses. White plays X, Black plays O. A cell move uses the
//! same square for `from` and `to`, which keeps every cell on a distinct
//! policy index.

use gambit_core::{ensure_legal, Color, Game, Move, Outcome, Result, Square};
use std::fmt;

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2], // top row
    [3, 4, 5], // middle row
    [6, 7, 8], // bottom row
    [0, 3, 6], // left column
    [1, 4, 7], // center column
    [2, 5, 8], // right column
    [0, 4, 8], // main diagonal
    [2, 4, 6], // anti-diagonal
];

/// Board state: 9 cells in row-major order plus the side to move.
///
/// ```text
/// 0 | 1 | 2
/// ---------
/// 3 | 4 | 5
/// ---------
/// 6 | 7 | 8
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TicTacToeState {
    cells: [Option<Color>; 9],
    to_move: Color,
}

impl TicTacToeState {
    /// Empty board, White (X) to move.
    pub fn new() -> Self {
        Self {
            cells: [None; 9],
            to_move: Color::White,
        }
    }

    /// Occupant of a cell, if any.
    pub fn cell(&self, index: usize) -> Option<Color> {
        self.cells.get(index).copied().flatten()
    }

    /// Player with three in a line, if any.
    pub fn winner(&self) -> Option<Color> {
        for line in LINES {
            if let Some(color) = self.cells[line[0]] {
                if self.cells[line[1]] == Some(color) && self.cells[line[2]] == Some(color) {
                    return Some(color);
                }
            }
        }
        None
    }

    fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_some())
    }
}

impl Default for TicTacToeState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TicTacToeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            if row > 0 {
                writeln!(f, "---------")?;
            }
            for col in 0..3 {
                if col > 0 {
                    write!(f, " | ")?;
                }
                match self.cells[row * 3 + col] {
                    Some(Color::White) => write!(f, "X")?,
                    Some(Color::Black) => write!(f, "O")?,
                    None => write!(f, ".")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Tic-tac-toe rules oracle.
#[derive(Clone, Copy, Debug, Default)]
pub struct TicTacToe;

impl TicTacToe {
    /// The move that claims `cell` (0-8).
    pub fn cell_move(cell: usize) -> Move {
        let square = Square::new_unchecked(cell as u8);
        Move::new(square, square)
    }
}

impl Game for TicTacToe {
    type Position = TicTacToeState;

    fn initial_position(&self) -> Self::Position {
        TicTacToeState::new()
    }

    fn legal_moves(&self, position: &Self::Position) -> Vec<Move> {
        if position.winner().is_some() {
            return Vec::new();
        }
        position
            .cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(i, _)| Self::cell_move(i))
            .collect()
    }

    fn apply(&self, position: &Self::Position, mv: Move) -> Result<Self::Position> {
        ensure_legal(self, position, mv)?;
        let mut next = position.clone();
        next.cells[mv.from.index() as usize] = Some(position.to_move);
        next.to_move = position.to_move.opponent();
        Ok(next)
    }

    fn side_to_move(&self, position: &Self::Position) -> Color {
        position.to_move
    }

    fn outcome(&self, position: &Self::Position) -> Option<Outcome> {
        match position.winner() {
            Some(Color::White) => Some(Outcome::WhiteWins),
            Some(Color::Black) => Some(Outcome::BlackWins),
            None if position.is_full() => Some(Outcome::Draw),
            None => None,
        }
    }

    /// 19 floats: a White plane, a Black plane, and a side-to-move flag.
    fn encode(&self, position: &Self::Position) -> Vec<f32> {
        let mut planes = vec![0.0; 19];
        for (i, cell) in position.cells.iter().enumerate() {
            match cell {
                Some(Color::White) => planes[i] = 1.0,
                Some(Color::Black) => planes[9 + i] = 1.0,
                None => {}
            }
        }
        if position.to_move == Color::White {
            planes[18] = 1.0;
        }
        planes
    }

    fn fingerprint(&self, position: &Self::Position) -> String {
        let mut key = String::with_capacity(11);
        for cell in &position.cells {
            key.push(match cell {
                Some(Color::White) => 'x',
                Some(Color::Black) => 'o',
                None => '.',
            });
        }
        key.push(' ');
        key.push(match position.to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gambit_core::GambitError;

    fn play(moves: &[usize]) -> TicTacToeState {
        let game = TicTacToe;
        let mut position = game.initial_position();
        for &cell in moves {
            position = game.apply(&position, TicTacToe::cell_move(cell)).unwrap();
        }
        position
    }

    #[test]
    fn test_initial_position() {
        let game = TicTacToe;
        let position = game.initial_position();

        assert_eq!(game.side_to_move(&position), Color::White);
        assert!(position.winner().is_none());
        assert!(!game.is_terminal(&position));
        assert_eq!(game.legal_moves(&position).len(), 9);
    }

    #[test]
    fn test_apply_places_and_alternates() {
        let game = TicTacToe;
        let position = game
            .apply(&game.initial_position(), TicTacToe::cell_move(4))
            .unwrap();

        assert_eq!(position.cell(4), Some(Color::White));
        assert_eq!(game.side_to_move(&position), Color::Black);
        assert_eq!(game.legal_moves(&position).len(), 8);
    }

    #[test]
    fn test_occupied_cell_is_illegal() {
        let game = TicTacToe;
        let position = play(&[4]);

        let result = game.apply(&position, TicTacToe::cell_move(4));
        assert!(matches!(result, Err(GambitError::IllegalMove(_))));
    }

    #[test]
    fn test_malformed_move_is_illegal() {
        let game = TicTacToe;
        // A cell move must use the same square twice.
        let mv = Move::new(Square::new(0).unwrap(), Square::new(8).unwrap());
        let result = game.apply(&game.initial_position(), mv);
        assert!(matches!(result, Err(GambitError::IllegalMove(_))));
    }

    #[test]
    fn test_white_wins_top_row() {
        let game = TicTacToe;
        // X: 0, 1, 2. O: 3, 4.
        let position = play(&[0, 3, 1, 4, 2]);

        assert_eq!(position.winner(), Some(Color::White));
        assert_eq!(game.outcome(&position), Some(Outcome::WhiteWins));
        assert!(game.legal_moves(&position).is_empty());
    }

    #[test]
    fn test_black_wins_anti_diagonal() {
        let game = TicTacToe;
        // O: 2, 4, 6. X: 0, 1, 3.
        let position = play(&[0, 2, 1, 4, 3, 6]);

        assert_eq!(position.winner(), Some(Color::Black));
        assert_eq!(game.outcome(&position), Some(Outcome::BlackWins));
    }

    #[test]
    fn test_draw_on_full_board() {
        let game = TicTacToe;
        // X O X / X X O / O X O
        let position = play(&[0, 1, 2, 5, 3, 6, 4, 8, 7]);

        assert!(position.winner().is_none());
        assert_eq!(game.outcome(&position), Some(Outcome::Draw));
        assert!(game.is_terminal(&position));
    }

    #[test]
    fn test_cell_moves_have_distinct_policy_indices() {
        let mut indices: Vec<usize> = (0..9)
            .map(|cell| TicTacToe::cell_move(cell).policy_index())
            .collect();
        indices.dedup();
        assert_eq!(indices.len(), 9);
    }

    #[test]
    fn test_encode_planes() {
        let game = TicTacToe;
        let position = play(&[0, 4]);

        let encoding = game.encode(&position);
        assert_eq!(encoding.len(), 19);
        assert_eq!(encoding[0], 1.0); // White at 0
        assert_eq!(encoding[9 + 4], 1.0); // Black at 4
        assert_eq!(encoding[18], 1.0); // White to move again
    }

    #[test]
    fn test_fingerprint_tracks_position_and_mover() {
        let game = TicTacToe;
        assert_eq!(game.fingerprint(&game.initial_position()), "......... w");

        let position = play(&[0, 4]);
        assert_eq!(game.fingerprint(&position), "x...o.... w");
    }
}
