//! Contains the packed move representation and the move list filled by the move generator
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use std::convert::TryFrom;
use super::*;

/// Maximum number of moves a `MoveList` can hold
pub const MAX_MOVES: usize = 256;

const FROM_SHIFT: u32 = 0;
const TO_SHIFT: u32 = 6;
const CAPTURED_SHIFT: u32 = 12;
const PROMOTION_SHIFT: u32 = 15;
const PIECE_SHIFT: u32 = 18;

const SQUARE_MASK: u32 = 0x3f;
const PIECE_MASK: u32 = 0x7;

const DOUBLE_PUSH: u32 = 1 << 21;
const EN_PASSANT: u32 = 1 << 22;
const CASTLE: u32 = 1 << 23;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A pseudo-legal move packed into a single integer.
///
/// A `Move` holds everything needed to make and take back the move: origin, destination, the
/// moving piece, the captured piece and the promotion piece (if any), and whether the move is a
/// two-square pawn advance, an en passant capture, or castling. The move is not tied to a
/// position, so it may leave the mover in check. `Position::make_move` is the final legality
/// test.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move(u32);

fn pack_piece(piece: Option<Piece>) -> u32 {
    piece.map_or(0, |p| p as u32 + 1)
}

fn unpack_piece(bits: u32) -> Option<Piece> {
    match bits & PIECE_MASK {
        0 => None,
        n => Piece::try_from(n as usize - 1).ok(),
    }
}

impl Move {
    /// Creates a quiet move of `piece` from `from` to `to`
    pub fn new(piece: Piece, from: Square, to: Square) -> Move {
        Move((from as u32) << FROM_SHIFT
            | (to as u32) << TO_SHIFT
            | (piece as u32) << PIECE_SHIFT)
    }

    /// Returns the same move, capturing `captured`
    pub fn with_capture(self, captured: Piece) -> Move {
        Move(self.0 & !(PIECE_MASK << CAPTURED_SHIFT)
            | pack_piece(Some(captured)) << CAPTURED_SHIFT)
    }

    /// Returns the same move, promoting to `piece`
    pub fn with_promotion(self, piece: Piece) -> Move {
        Move(self.0 & !(PIECE_MASK << PROMOTION_SHIFT)
            | pack_piece(Some(piece)) << PROMOTION_SHIFT)
    }

    /// Returns the same move, marked as a two-square pawn advance
    pub fn with_double_push(self) -> Move {
        Move(self.0 | DOUBLE_PUSH)
    }

    /// Returns the same move, marked as an en passant capture of a pawn
    pub fn with_en_passant(self) -> Move {
        Move(self.with_capture(Piece::Pawn).0 | EN_PASSANT)
    }

    /// Returns the same move, marked as castling
    pub fn with_castle(self) -> Move {
        Move(self.0 | CASTLE)
    }

    /// Returns the origin of the moved piece
    pub fn from(self) -> Square {
        Square::try_from(((self.0 >> FROM_SHIFT) & SQUARE_MASK) as usize).expect("INFALLIBLE")
    }

    /// Returns the destination of the moved piece
    pub fn to(self) -> Square {
        Square::try_from(((self.0 >> TO_SHIFT) & SQUARE_MASK) as usize).expect("INFALLIBLE")
    }

    /// Returns the moved piece
    pub fn piece(self) -> Piece {
        Piece::try_from(((self.0 >> PIECE_SHIFT) & PIECE_MASK) as usize).unwrap_or(Piece::Pawn)
    }

    /// Returns the captured piece, if any
    pub fn captured(self) -> Option<Piece> {
        unpack_piece(self.0 >> CAPTURED_SHIFT)
    }

    /// Returns the piece a pawn is promoted to, if any
    pub fn promotion(self) -> Option<Piece> {
        unpack_piece(self.0 >> PROMOTION_SHIFT)
    }

    /// Returns `true` for captures, including en passant
    pub fn is_capture(self) -> bool {
        self.0 & (PIECE_MASK << CAPTURED_SHIFT) != 0
    }

    /// Returns `true` for promotions
    pub fn is_promotion(self) -> bool {
        self.0 & (PIECE_MASK << PROMOTION_SHIFT) != 0
    }

    #[allow(missing_docs)]
    pub fn is_double_push(self) -> bool {
        self.0 & DOUBLE_PUSH != 0
    }

    #[allow(missing_docs)]
    pub fn is_en_passant(self) -> bool {
        self.0 & EN_PASSANT != 0
    }

    #[allow(missing_docs)]
    pub fn is_castle(self) -> bool {
        self.0 & CASTLE != 0
    }
}

impl fmt::Display for Move {
    /// Writes the move in coordinate notation (`e7e8q`). The alternate form (`{:#}`) writes the
    /// moving piece in front and castling as `0-0` or `0-0-0`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let promotion = self.promotion()
            .map_or(String::new(), |p| p.to_char(Color::Black).to_string());

        let s = if f.alternate() {
            if self.is_castle() {
                match self.to().file() {
                    File::G => "0-0".to_string(),
                    _ => "0-0-0".to_string(),
                }
            } else {
                format!("{}{}{}{}", self.piece(), self.from(), self.to(), promotion)
            }
        } else {
            format!("{}{}{}", self.from(), self.to(), promotion)
        };

        f.pad(&s)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A move together with the score used to order the search
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ScoredMove {
    /// The move
    pub mv: Move,
    /// Higher scores are searched first
    pub score: i32,
}

/// A fixed-capacity list of generated moves, in generation order until `select_next` reorders it
#[derive(Copy, Clone)]
pub struct MoveList {
    moves: [ScoredMove; MAX_MOVES],
    len: usize,
}

impl MoveList {
    /// Creates an empty move list
    pub fn new() -> MoveList {
        MoveList {
            moves: [ScoredMove { mv: Move(0), score: 0 }; MAX_MOVES],
            len: 0,
        }
    }

    /// Appends a move with its ordering score
    pub fn push(&mut self, mv: Move, score: i32) {
        debug_assert!(self.len < MAX_MOVES);
        if self.len < MAX_MOVES {
            self.moves[self.len] = ScoredMove { mv, score };
            self.len += 1;
        }
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the entry at index `i`
    pub fn get(&self, i: usize) -> Option<ScoredMove> {
        self.as_slice().get(i).copied()
    }

    /// Returns `true` if `mv` is in the list
    pub fn contains(&self, mv: Move) -> bool {
        self.as_slice().iter().any(|m| m.mv == mv)
    }

    /// Swaps the highest scoring entry among those at index `i` or later into index `i`, and
    /// returns its move. Only the moves actually searched ever get sorted.
    pub fn select_next(&mut self, i: usize) -> Option<Move> {
        if i >= self.len {
            return None;
        }

        let mut best = i;
        for j in i + 1..self.len {
            if self.moves[j].score > self.moves[best].score {
                best = j;
            }
        }
        self.moves.swap(i, best);

        Some(self.moves[i].mv)
    }

    /// Returns the entries as a slice
    pub fn as_slice(&self) -> &[ScoredMove] {
        &self.moves[..self.len]
    }

    /// Iterates over the moves
    pub fn iter(&self) -> impl Iterator<Item = Move> + '_ {
        self.as_slice().iter().map(|m| m.mv)
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MoveList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice().iter()).finish()
    }
}
