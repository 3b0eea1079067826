use std::fmt;

use serde::{Deserialize, Serialize};

/// Size of the flat policy vector the evaluator produces.
///
/// Moves map into it as `from * 64 + to`, so every from/to pair has one
/// entry and promotion moves for the same pair share theirs.
pub const POLICY_SIZE: usize = 4096;

/// The side to move.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Returns the other side.
    #[inline]
    pub const fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

/// A board square (0-63) using rank-major ordering.
/// a1=0, b1=1, ..., h1=7, a2=8, ..., h8=63
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Square(u8);

impl Square {
    /// Creates a square from index, returning None if out of range.
    #[inline]
    pub const fn new(index: u8) -> Option<Self> {
        if index < 64 {
            Some(Square(index))
        } else {
            None
        }
    }

    /// Creates a square from index, panicking if out of range.
    /// Use only when index is known to be valid.
    #[inline]
    pub const fn new_unchecked(index: u8) -> Self {
        debug_assert!(index < 64);
        Square(index)
    }

    /// Creates a square from file (0-7) and rank (0-7).
    #[inline]
    pub const fn from_coords(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && rank < 8 {
            Some(Square(rank * 8 + file))
        } else {
            None
        }
    }

    /// Returns the file (0-7, where 0 = a-file).
    #[inline]
    pub const fn file(self) -> u8 {
        self.0 % 8
    }

    /// Returns the rank (0-7, where 0 = rank 1).
    #[inline]
    pub const fn rank(self) -> u8 {
        self.0 / 8
    }

    /// Returns the square index (0-63).
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            (b'a' + self.file()) as char,
            (b'1' + self.rank()) as char
        )
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Square({self})")
    }
}

/// Piece a pawn promotes to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Promotion {
    Knight,
    Bishop,
    Rook,
    Queen,
}

impl Promotion {
    /// All promotion choices, in the order the rules oracle lists them.
    pub const ALL: [Promotion; 4] = [
        Promotion::Knight,
        Promotion::Bishop,
        Promotion::Rook,
        Promotion::Queen,
    ];

    /// Lowercase piece letter used in coordinate notation.
    pub const fn symbol(self) -> char {
        match self {
            Promotion::Knight => 'n',
            Promotion::Bishop => 'b',
            Promotion::Rook => 'r',
            Promotion::Queen => 'q',
        }
    }
}

/// A move as a (from, to, optional promotion) triple.
///
/// `Move` is a small `Copy` value and is used directly as a map key.
/// For policy lookups it flattens to [`Move::policy_index`]; that mapping
/// ignores the promotion piece, so the four promotion moves sharing a
/// from/to pair also share a policy entry. Callers renormalize priors over
/// the legal set, which leaves those siblings with equal priors.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Promotion>,
}

impl Move {
    /// Creates a move without a promotion.
    #[inline]
    pub const fn new(from: Square, to: Square) -> Self {
        Move {
            from,
            to,
            promotion: None,
        }
    }

    /// Creates a promotion move.
    #[inline]
    pub const fn promotion(from: Square, to: Square, piece: Promotion) -> Self {
        Move {
            from,
            to,
            promotion: Some(piece),
        }
    }

    /// Flat policy-vector index for this move: `from * 64 + to`.
    ///
    /// Always below [`POLICY_SIZE`].
    #[inline]
    pub const fn policy_index(self) -> usize {
        self.from.index() * 64 + self.to.index()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(piece) = self.promotion {
            write!(f, "{}", piece.symbol())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({self})")
    }
}
