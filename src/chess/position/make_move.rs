//! Making and taking back moves
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use crate::chess::error::Result;
use super::*;

/// Castling rights kept when a piece moves from or to each square
#[rustfmt::skip]
const CASTLE_PERM: [u8; Square::COUNT] = [
    13, 15, 15, 15, 12, 15, 15, 14,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
     7, 15, 15, 15,  3, 15, 15, 11,
];

/// Returns the rook's origin and destination for a castling move with the king landing on `to`
fn castle_rook(to: Square) -> (Square, Square) {
    match to {
        Square::G1 => (Square::H1, Square::F1),
        Square::C1 => (Square::A1, Square::D1),
        Square::G8 => (Square::H8, Square::F8),
        _ => (Square::A8, Square::D8),
    }
}

/// Returns the square of the pawn taken by an en passant capture
fn ep_victim(mv: Move) -> Square {
    Square::from_coord(mv.to().file(), mv.from().rank())
}

impl Position {
    fn push_undo(&mut self, mv: Option<Move>) {
        self.history.push(Undo {
            mv,
            castling: self.castling,
            ep_square: self.ep_square,
            draw_plies: self.draw_plies,
            zobrist: self.zobrist,
        });
        self.ply += 1;
        self.game_ply += 1;
    }

    fn set_ep_square(&mut self, ep_square: Option<Square>) {
        if let Some(sq) = self.ep_square {
            self.zobrist.toggle_ep_square(sq);
        }
        self.ep_square = ep_square;
        if let Some(sq) = self.ep_square {
            self.zobrist.toggle_ep_square(sq);
        }
    }

    /// Makes a pseudo-legal move generated for this position. If the move leaves the mover's king
    /// in check it is taken back again and `false` is returned, leaving the position exactly as it
    /// was.
    pub fn make_move(&mut self, mv: Move) -> bool {
        debug_assert!(self.check());

        let us = self.turn;
        let (from, to, piece) = (mv.from(), mv.to(), mv.piece());

        self.push_undo(Some(mv));

        if mv.is_castle() {
            let (rook_from, rook_to) = castle_rook(to);
            self.take_piece(us, Rook, rook_from);
            self.put_piece(us, Rook, rook_to);
        }

        self.draw_plies += 1;

        if let Some(victim) = mv.captured() {
            self.draw_plies = 0;
            let sq = if mv.is_en_passant() { ep_victim(mv) } else { to };
            self.take_piece(!us, victim, sq);
        }

        self.take_piece(us, piece, from);
        self.put_piece(us, mv.promotion().unwrap_or(piece), to);

        if piece == Pawn {
            self.draw_plies = 0;
        }

        let castling = self.castling & CASTLE_PERM[from as usize] & CASTLE_PERM[to as usize];
        if castling != self.castling {
            self.zobrist.toggle_castling(self.castling);
            self.castling = castling;
            self.zobrist.toggle_castling(self.castling);
        }

        self.set_ep_square(if mv.is_double_push() {
            Square::try_from((from as usize + to as usize) / 2).ok()
        } else {
            None
        });

        self.zobrist.toggle_turn();
        self.turn = !us;

        if let Some(king) = self.king_location(us) {
            if self.is_attacked(king, self.turn) {
                self.unmake_move();
                return false;
            }
        }

        debug_assert!(self.check());
        true
    }

    /// Takes back the last move, or null move. Does nothing if there is no move to take back.
    pub fn unmake_move(&mut self) {
        let undo = match self.history.pop() {
            Some(undo) => undo,
            None => return,
        };

        self.ply = self.ply.saturating_sub(1);
        self.game_ply = self.game_ply.saturating_sub(1);
        self.turn = !self.turn;

        if let Some(mv) = undo.mv {
            let us = self.turn;

            self.take_piece(us, mv.promotion().unwrap_or(mv.piece()), mv.to());
            self.put_piece(us, mv.piece(), mv.from());

            if mv.is_castle() {
                let (rook_from, rook_to) = castle_rook(mv.to());
                self.take_piece(us, Rook, rook_to);
                self.put_piece(us, Rook, rook_from);
            } else if let Some(victim) = mv.captured() {
                let sq = if mv.is_en_passant() { ep_victim(mv) } else { mv.to() };
                self.put_piece(!us, victim, sq);
            }
        }

        self.castling = undo.castling;
        self.ep_square = undo.ep_square;
        self.draw_plies = undo.draw_plies;
        self.zobrist = undo.zobrist;

        debug_assert!(self.check());
    }

    /// Passes the turn to the opponent without moving. Must not be used while in check.
    pub fn make_null_move(&mut self) {
        debug_assert!(!self.in_check());
        debug_assert!(self.history.last().map_or(true, |undo| undo.mv.is_some()),
            "null moves in a row");

        self.push_undo(None);
        self.draw_plies += 1;
        self.set_ep_square(None);
        self.zobrist.toggle_turn();
        self.turn = !self.turn;
    }

    /// Takes back a null move
    pub fn unmake_null_move(&mut self) {
        debug_assert!(self.history.last().map_or(false, |undo| undo.mv.is_none()));
        self.unmake_move();
    }

    /// Returns `true` if `mv` is a legal move in this position
    pub fn move_exists(&mut self, mv: Move) -> bool {
        if !self.generate_moves().contains(mv) {
            return false;
        }
        if self.make_move(mv) {
            self.unmake_move();
            true
        } else {
            false
        }
    }

    /// Finds the generated move matching coordinate notation such as `e2e4` or `a7a8q`. The move
    /// may still leave the mover in check.
    pub fn parse_move(&self, s: &str) -> Result<Move> {
        let s = s.trim();
        if !s.is_ascii() || s.len() < 4 || s.len() > 5 {
            return Err(Error::ParseError);
        }

        let from: Square = s[0..2].parse()?;
        let to: Square = s[2..4].parse()?;
        let promotion = match s.get(4..) {
            Some("") | None => None,
            Some(p) => match p.parse()? {
                Pawn | King => return Err(Error::ParseError),
                piece => Some(piece),
            },
        };

        self.generate_moves().iter()
            .find(|mv| mv.from() == from && mv.to() == to && mv.promotion() == promotion)
            .ok_or(Error::IllegalMove)
    }
}
