//! Contains a builder for `Position`
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use crate::chess::error::Result;
use super::*;

/// Largest move number accepted, well beyond any real game
const MAX_MOVE_NUMBER: usize = 100_000;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A builder for `Position`. Nothing is checked until `validate` is called.
#[derive(Clone)]
#[allow(missing_debug_implementations)]
pub struct PositionBuilder {
    board: [ Option<(Color, Piece)>; Square::COUNT ],
    turn: Color,
    castling: u8,
    ep_square: Option<Square>,
    draw_plies: usize,
    move_num: usize,
}

impl PositionBuilder {
    /// Creates a new, empty `PositionBuilder`
    pub fn new() -> Self {
        PositionBuilder {
            board: [ None; Square::COUNT ],
            turn: White,
            castling: 0,
            ep_square: None,
            draw_plies: 0,
            move_num: 1,
        }
    }

    /// Sets the piece at `square`
    pub fn piece(&mut self, color: Color, piece: Piece, square: Square) -> &mut Self {
        self.board[square as usize] = Some((color, piece));
        self
    }

    /// Clears the piece at `square`
    pub fn clear(&mut self, square: Square) -> &mut Self {
        self.board[square as usize] = None;
        self
    }

    /// Sets the turn to `color`
    pub fn turn(&mut self, color: Color) -> &mut Self {
        self.turn = color;
        self
    }

    /// Grants the castling rights in `flags` (`WHITE_KING_SIDE`, etc.)
    pub fn castling(&mut self, flags: u8) -> &mut Self {
        self.castling |= flags & 0xf;
        self
    }

    /// Sets or clears the en-passant square
    pub fn en_passant_square(&mut self, square: Option<Square>) -> &mut Self {
        self.ep_square = square;
        self
    }

    /// Sets the number of plies that count toward the 50-move rule. A ply is a move by one player,
    /// so two plies would be one move by each player.
    pub fn draw_plies(&mut self, plies: usize) -> &mut Self {
        self.draw_plies = plies;
        self
    }

    /// Sets the full move number
    pub fn move_number(&mut self, num: usize) -> &mut Self {
        self.move_num = num;
        self
    }

    /// Validates legality and returns a `Position`
    pub fn validate(&self) -> Result<Position> {
        use Error::*;

        if self.move_num > MAX_MOVE_NUMBER || self.draw_plies > 2 * MAX_MOVE_NUMBER {
            return Err(InvalidMoveCounter);
        }

        let mut pos = Position::empty_board();

        for (i, piece) in self.board.iter().enumerate() {
            if let Some((color, piece)) = piece {
                pos.put_piece(*color, *piece, Square::try_from(i)?);
            }
        }

        pos.turn = self.turn;
        pos.castling = self.castling;
        pos.ep_square = self.ep_square;
        pos.draw_plies = self.draw_plies;
        pos.game_ply = 2 * self.move_num.saturating_sub(1)
            + if self.turn == Black { 1 } else { 0 };

        // validate position legality
        for &c in &[White, Black] {
            // Step 1: verify exactly one king per side
            if pos.occupied_by_piece(c, King).len() != 1 {
                return Err(InvalidKingCount);
            }
            // Step 2: no pawns on ranks 1 and 8
            if pos.occupied_by_piece(c, Pawn)
                .intersects(Bitboard::from(Rank::R1) | Rank::R8.into()) {
                return Err(InvalidPawnRank);
            }
        }
        // Step 3: opponent's king is not attacked
        if let Some(king) = pos.king_location(!pos.turn) {
            if pos.is_attacked(king, pos.turn) {
                return Err(KingCapturable);
            }
        }
        // Step 4: if there is an EP square, it must be empty and there must be a pawn to capture
        if let Some(ep_square) = pos.ep_square {
            if pos.piece_at(ep_square).is_some() {
                return Err(EnPassantSquareOccupied);
            }
            let forward = if pos.turn == White { bitboard::NORTH } else { bitboard::SOUTH };
            if !pos.occupied_by_piece(!pos.turn, Pawn).shift(forward).contains(ep_square) {
                return Err(MissingEnPassantPawn);
            }
        }
        // Step 5: if castling rights exist, king and rook must be in the correct squares
        let homes = [
            (WHITE_KING_SIDE, White, Square::E1, Square::H1),
            (WHITE_QUEEN_SIDE, White, Square::E1, Square::A1),
            (BLACK_KING_SIDE, Black, Square::E8, Square::H8),
            (BLACK_QUEEN_SIDE, Black, Square::E8, Square::A8),
        ];
        for &(flag, c, king, rook) in homes.iter() {
            if pos.castling & flag != 0
                && !(pos.occupied_by_piece(c, King).contains(king)
                    && pos.occupied_by_piece(c, Rook).contains(rook)) {
                return Err(InvalidCastlingFlags);
            }
        }

        pos.zobrist = pos.calc_zobrist();
        debug_assert!(pos.check());

        Ok(pos)
    }
}

impl Default for PositionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
