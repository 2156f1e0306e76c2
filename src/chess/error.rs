//! Defines the error types needed by the chess module
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Error type used by methods in the `chess` module
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// Cannot parse string
    ParseError,
    /// Failed to convert an integer to an another type
    TryFromIntError,
    /// The move is not available in the position or leaves the king in check
    IllegalMove,
    /// Player can capture opponent's king
    KingCapturable,
    /// Missing king or multiple kings of the same color
    InvalidKingCount,
    /// Pawn on first or last rank
    InvalidPawnRank,
    /// Castling flags aren't valid for this position
    InvalidCastlingFlags,
    /// En-passant square without capturable pawn
    MissingEnPassantPawn,
    /// En-passant square is occupied
    EnPassantSquareOccupied,
    /// Half-move clock or move number too large
    InvalidMoveCounter,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::ParseError => "cannot parse string",
            Error::TryFromIntError => "integer out of range",
            Error::IllegalMove => "illegal move",
            Error::KingCapturable => "king is under attack on opponent's move",
            Error::InvalidKingCount => "missing king or multiple kings of the same color",
            Error::InvalidPawnRank => "pawn on first or last rank",
            Error::InvalidCastlingFlags => "castling flags aren't valid for this position",
            Error::MissingEnPassantPawn => "en-passant square without capturable pawn",
            Error::EnPassantSquareOccupied => "en-passant square is occupied",
            Error::InvalidMoveCounter => "half-move clock or move number out of range",
        };
        f.pad(msg)
    }
}

impl std::error::Error for Error { }

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Result type used by methods in the `chess` module
pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Integer out of range for the target type
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TryFromIntError;

impl From<TryFromIntError> for Error {
    fn from(_: TryFromIntError) -> Error {
        Error::TryFromIntError
    }
}

macro_rules! parse_error {
    ($name:ident, $what:literal) => {
        #[doc = "Error returned when a string is not a valid "]
        #[doc = $what]
        #[derive(Debug, Copy, Clone, PartialEq, Eq)]
        pub struct $name;

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(concat!("invalid ", $what))
            }
        }

        impl std::error::Error for $name { }

        impl From<$name> for Error {
            fn from(_: $name) -> Error {
                Error::ParseError
            }
        }
    };
}

parse_error!(ParseColorError, "color");
parse_error!(ParsePieceError, "piece");
parse_error!(ParseFileError, "file");
parse_error!(ParseRankError, "rank");
parse_error!(ParseSquareError, "square");

impl From<ParseFileError> for ParseSquareError {
    fn from(_: ParseFileError) -> ParseSquareError {
        ParseSquareError
    }
}

impl From<ParseRankError> for ParseSquareError {
    fn from(_: ParseRankError) -> ParseSquareError {
        ParseSquareError
    }
}
