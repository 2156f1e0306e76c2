//! The `chess` module holds the board representation, move generation and the rules of the game.
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::ops;
use std::fmt;
use std::str::FromStr;
use std::convert::TryFrom;

/// Converts between a coordinate type and its index through the type's `ALL` table.
macro_rules! index_conversions {
    ($t:ident) => {
        impl TryFrom<usize> for $t {
            type Error = TryFromIntError;

            fn try_from(value: usize) -> Result<Self, Self::Error> {
                $t::ALL.get(value).copied().ok_or(TryFromIntError)
            }
        }

        impl From<$t> for usize {
            fn from(value: $t) -> Self {
                value as Self
            }
        }
    };
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Which side a piece or player is on, based on the color of the pieces for that side.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    /// The number of colors
    pub const COUNT: usize = 2;

    /// Both colors, `White` first
    pub const ALL: [Color; Color::COUNT] = [Color::White, Color::Black];
}

impl ops::Not for Color {
    type Output = Color;

    /// Returns the opposite color
    ///
    /// # Example
    /// ```
    /// use cep::chess::Color;
    /// assert_eq!(!Color::White, Color::Black);
    /// assert_eq!(!Color::Black, Color::White);
    /// ```
    fn not(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => f.pad("w"),
            Color::Black => f.pad("b"),
        }
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "w" => Ok(Color::White),
            "b" => Ok(Color::Black),
            _   => Err(ParseColorError),
        }
    }
}

index_conversions!(Color);

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The type of a chess piece
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Piece {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl Piece {
    /// The number of piece types
    pub const COUNT: usize = Piece::King as usize + 1;

    /// All piece types, from least to most valuable
    pub const ALL: [Piece; Piece::COUNT] = [
        Piece::Pawn, Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen, Piece::King
    ];

    /// Returns the material value of the piece in centipawns. The king has no material value.
    pub fn value(self) -> i32 {
        PIECE_VALUES[self as usize]
    }

    /// Returns the letter used for the piece in FEN: uppercase for `White`, lowercase for
    /// `Black`.
    pub fn to_char(self, color: Color) -> char {
        let c = match self {
            Piece::Pawn => 'P',
            Piece::Knight => 'N',
            Piece::Bishop => 'B',
            Piece::Rook => 'R',
            Piece::Queen => 'Q',
            Piece::King => 'K',
        };

        if color == Color::White { c } else { c.to_ascii_lowercase() }
    }
}

const PIECE_VALUES: [i32; Piece::COUNT] = [ 100, 300, 320, 500, 915, 0 ];

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Piece::Pawn => "P",
            Piece::Knight => "N",
            Piece::Bishop => "B",
            Piece::Rook => "R",
            Piece::Queen => "Q",
            Piece::King => "K",
        })
    }
}

impl FromStr for Piece {
    type Err = ParsePieceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P"|"p" => Ok(Piece::Pawn),
            "N"|"n" => Ok(Piece::Knight),
            "B"|"b" => Ok(Piece::Bishop),
            "R"|"r" => Ok(Piece::Rook),
            "Q"|"q" => Ok(Piece::Queen),
            "K"|"k" => Ok(Piece::King),
            _       => Err(ParsePieceError),
        }
    }
}

index_conversions!(Piece);

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Vertical column of the board, labeled from left to right from `White`'s perspective as
/// `A` through `H`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum File {
    A = 0, B = 1, C = 2, D = 3, E = 4, F = 5, G = 6, H = 7,
}

impl File {
    /// The number of files
    pub const COUNT: usize = File::H as usize + 1;

    #[allow(missing_docs)]
    pub const ALL: [File; File::COUNT] = [
        File::A, File::B, File::C, File::D, File::E, File::F, File::G, File::H,
    ];
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = (b'a' + *self as u8) as char;
        fmt::Display::fmt(&c, f)
    }
}

impl FromStr for File {
    type Err = ParseFileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.as_bytes() {
            [c @ b'a'..=b'h'] => Ok(File::try_from((c - b'a') as usize).expect("INFALLIBLE")),
            [c @ b'A'..=b'H'] => Ok(File::try_from((c - b'A') as usize).expect("INFALLIBLE")),
            _ => Err(ParseFileError),
        }
    }
}

index_conversions!(File);

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Horizontal row of the board, labeled from nearest to farthest from `White`'s perspective
/// as `R1` through `R8`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Rank {
    R1 = 0, R2 = 1, R3 = 2, R4 = 3, R5 = 4, R6 = 5, R7 = 6, R8 = 7,
}

impl Rank {
    /// The number of ranks
    pub const COUNT: usize = Rank::R8 as usize + 1;

    #[allow(missing_docs)]
    pub const ALL: [Rank; Rank::COUNT] = [
        Rank::R1, Rank::R2, Rank::R3, Rank::R4, Rank::R5, Rank::R6, Rank::R7, Rank::R8,
    ];
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = (b'1' + *self as u8) as char;
        fmt::Display::fmt(&c, f)
    }
}

impl FromStr for Rank {
    type Err = ParseRankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.as_bytes() {
            [c @ b'1'..=b'8'] => Ok(Rank::try_from((c - b'1') as usize).expect("INFALLIBLE")),
            _ => Err(ParseRankError),
        }
    }
}

index_conversions!(Rank);

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A specific square on the board, numbered rank by rank starting from `A1`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum Square {
    A1 = 0o00, B1 = 0o01, C1 = 0o02, D1 = 0o03, E1 = 0o04, F1 = 0o05, G1 = 0o06, H1 = 0o07,
    A2 = 0o10, B2 = 0o11, C2 = 0o12, D2 = 0o13, E2 = 0o14, F2 = 0o15, G2 = 0o16, H2 = 0o17,
    A3 = 0o20, B3 = 0o21, C3 = 0o22, D3 = 0o23, E3 = 0o24, F3 = 0o25, G3 = 0o26, H3 = 0o27,
    A4 = 0o30, B4 = 0o31, C4 = 0o32, D4 = 0o33, E4 = 0o34, F4 = 0o35, G4 = 0o36, H4 = 0o37,
    A5 = 0o40, B5 = 0o41, C5 = 0o42, D5 = 0o43, E5 = 0o44, F5 = 0o45, G5 = 0o46, H5 = 0o47,
    A6 = 0o50, B6 = 0o51, C6 = 0o52, D6 = 0o53, E6 = 0o54, F6 = 0o55, G6 = 0o56, H6 = 0o57,
    A7 = 0o60, B7 = 0o61, C7 = 0o62, D7 = 0o63, E7 = 0o64, F7 = 0o65, G7 = 0o66, H7 = 0o67,
    A8 = 0o70, B8 = 0o71, C8 = 0o72, D8 = 0o73, E8 = 0o74, F8 = 0o75, G8 = 0o76, H8 = 0o77,
}

impl Square {
    /// The number of squares
    pub const COUNT: usize = Square::H8 as usize + 1;

    /// Every square, in index order
    #[rustfmt::skip]
    pub const ALL: [Square; Square::COUNT] = {
        use Square::*;
        [
            A1, B1, C1, D1, E1, F1, G1, H1,
            A2, B2, C2, D2, E2, F2, G2, H2,
            A3, B3, C3, D3, E3, F3, G3, H3,
            A4, B4, C4, D4, E4, F4, G4, H4,
            A5, B5, C5, D5, E5, F5, G5, H5,
            A6, B6, C6, D6, E6, F6, G6, H6,
            A7, B7, C7, D7, E7, F7, G7, H7,
            A8, B8, C8, D8, E8, F8, G8, H8,
        ]
    };

    /// Returns a square from its file and rank
    pub fn from_coord(file: File, rank: Rank) -> Square {
        Square::try_from(((rank as usize) << 3) + file as usize).expect("INFALLIBLE")
    }

    /// Returns the square's file
    pub fn file(self) -> File {
        File::try_from((self as usize) & 7).expect("INFALLIBLE")
    }

    /// Returns the square's rank
    pub fn rank(self) -> Rank {
        Rank::try_from((self as usize) >> 3).expect("INFALLIBLE")
    }

    /// Returns the square on the same file at the opposite rank (`E2` becomes `E7`), which is
    /// where `Black` sees a square that `White` sees as `self`.
    pub fn mirror(self) -> Square {
        Square::try_from((self as usize) ^ 0o70).expect("INFALLIBLE")
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{}{}", self.file(), self.rank()))
    }
}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == 2 && s.is_char_boundary(1) {
            Ok(Square::from_coord(s[0..1].parse()?, s[1..2].parse()?))
        } else {
            Err(ParseSquareError)
        }
    }
}

index_conversions!(Square);

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Builds the process-wide hash key tables. The tables are also built on first use, and calling
/// this more than once has no further effect.
pub fn init() {
    position::zobrist::init();
}

pub mod error;
pub use error::{Error, TryFromIntError};
pub use error::{ParseColorError, ParsePieceError, ParseFileError, ParseRankError, ParseSquareError};

pub mod bitboard;
pub use bitboard::Bitboard;

pub mod moves;
pub use moves::{Move, MoveList, ScoredMove, MAX_MOVES};

mod position;
pub use position::{Position, PositionBuilder, START_FEN, MAX_DEPTH, MAX_GAME_PLIES};
pub use position::{WHITE_KING_SIDE, WHITE_QUEEN_SIDE, BLACK_KING_SIDE, BLACK_QUEEN_SIDE};
pub use position::zobrist::Zobrist;
pub use position::pawn_attacks;

pub mod game;
pub mod variations;

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;
    use super::*;

    #[test]
    fn color_conversions() {
        assert_eq!(format!("{}", Color::White), "w");
        assert_eq!("b".parse::<Color>(), Ok(Color::Black));
        assert!("x".parse::<Color>().is_err());
        assert_eq!(Color::try_from(1), Ok(Color::Black));
        assert!(Color::try_from(2).is_err());
    }

    #[test]
    fn piece_conversions() {
        for (i, piece) in Piece::ALL.iter().enumerate() {
            assert_eq!(usize::from(*piece), i);
            assert_eq!(Piece::try_from(i), Ok(*piece));
            assert_eq!(piece.to_string().parse::<Piece>(), Ok(*piece));
        }
        assert_eq!("q".parse::<Piece>(), Ok(Piece::Queen));
        assert!(Piece::try_from(6).is_err());
        assert_eq!(Piece::King.to_char(Color::Black), 'k');
    }

    #[test]
    fn piece_values() {
        assert_eq!(Piece::Pawn.value(), 100);
        assert_eq!(Piece::Knight.value(), 300);
        assert_eq!(Piece::Bishop.value(), 320);
        assert_eq!(Piece::Rook.value(), 500);
        assert_eq!(Piece::Queen.value(), 915);
        assert_eq!(Piece::King.value(), 0);
    }

    #[test]
    fn squares_are_numbered_by_rank() {
        assert_eq!(Square::A1 as usize, 0);
        assert_eq!(Square::H1 as usize, 7);
        assert_eq!(Square::A2 as usize, 8);
        assert_eq!(Square::H8 as usize, 63);
        assert_eq!(Square::from_coord(File::D, Rank::R4), Square::D4);
        assert_eq!(Square::E2.mirror(), Square::E7);
        assert_eq!(Square::H8.mirror(), Square::H1);
    }

    #[test]
    fn file_and_rank_methods_match_from_coord() {
        for i in 0..Square::COUNT {
            let s = Square::try_from(i).unwrap();
            assert_eq!(Square::from_coord(s.file(), s.rank()), s);
            assert_eq!(format!("{}", s), format!("{}{}", s.file(), s.rank()));
            assert_eq!(format!("{}", s).parse::<Square>().unwrap(), s);
        }
        assert!(Square::try_from(Square::COUNT).is_err());
    }

    #[test]
    fn square_parse_errors() {
        assert!("a".parse::<Square>().is_err());
        assert!("a9".parse::<Square>().is_err());
        assert!("x1".parse::<Square>().is_err());
        assert!("a1x".parse::<Square>().is_err());
        assert!("é1".parse::<Square>().is_err());
    }
}
