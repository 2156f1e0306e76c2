//! Contains the `Position`: the board as a set of bitboards, the state needed for the rules of the
//! game, and the history needed to take moves back.
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::convert::TryFrom;
use super::*;

use Color::*;
use Piece::*;

pub mod zobrist;
mod builder;
mod fen;
mod attacks;
mod movegen;
mod make_move;

pub use builder::PositionBuilder;
pub use fen::START_FEN;
pub use attacks::pawn_attacks;
use zobrist::Zobrist;

/// Deepest search ply for which killer moves are kept
pub const MAX_DEPTH: usize = 80;
/// Number of plies the history is sized for up front
pub const MAX_GAME_PLIES: usize = 1024;

/// White may castle on the king side
pub const WHITE_KING_SIDE: u8 = 0x1;
/// White may castle on the queen side
pub const WHITE_QUEEN_SIDE: u8 = 0x2;
/// Black may castle on the king side
pub const BLACK_KING_SIDE: u8 = 0x4;
/// Black may castle on the queen side
pub const BLACK_QUEEN_SIDE: u8 = 0x8;

/// Everything needed to take back one move
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Undo {
    /// `None` for a null move
    mv: Option<Move>,
    castling: u8,
    ep_square: Option<Square>,
    draw_plies: usize,
    zobrist: Zobrist,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A representation of the arrangement of pieces on the board at a given point in the game, as well
/// as castling availability, en passant legality, and the moves that led here.
///
/// Moves are made and taken back in place. Bitboards, material and the Zobrist key are all kept up
/// to date incrementally by `make_move` and `unmake_move`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    occ_by_piece: [[Bitboard; Piece::COUNT]; Color::COUNT],
    occ_by_type: [Bitboard; Piece::COUNT],
    occ_by_color: [Bitboard; Color::COUNT],
    occ_squares: Bitboard,

    turn: Color,
    castling: u8,
    ep_square: Option<Square>,
    draw_plies: usize,

    ply: usize,
    game_ply: usize,

    material: [i32; Color::COUNT],
    zobrist: Zobrist,

    history: Vec<Undo>,
    killers: [[Option<Move>; MAX_DEPTH]; 2],
}

impl Position {
    /// Returns the standard starting position
    pub fn new() -> Position {
        START_FEN.parse().expect("INFALLIBLE")
    }

    /// Returns a position with an empty board
    fn empty_board() -> Position {
        Position {
            occ_by_piece: [[Bitboard::new(); Piece::COUNT]; Color::COUNT],
            occ_by_type: [Bitboard::new(); Piece::COUNT],
            occ_by_color: [Bitboard::new(); Color::COUNT],
            occ_squares: Bitboard::new(),
            turn: White,
            castling: 0,
            ep_square: None,
            draw_plies: 0,
            ply: 0,
            game_ply: 0,
            material: [0; Color::COUNT],
            zobrist: Zobrist::new(),
            history: Vec::with_capacity(MAX_GAME_PLIES),
            killers: [[None; MAX_DEPTH]; 2],
        }
    }

    /// Returns the color whose turn it is
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Returns the castling flags (`WHITE_KING_SIDE`, etc.) that are still available
    pub fn castling(&self) -> u8 {
        self.castling
    }

    /// Returns the square a pawn skipped over on the last move, if it was a two-square advance
    pub fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    /// Returns the number of plies which count toward the fifty move rule
    pub fn draw_plies(&self) -> usize {
        self.draw_plies
    }

    /// Returns the number of plies made since the root of the current search
    pub fn ply(&self) -> usize {
        self.ply
    }

    /// Returns the number of plies played since the start of the game
    pub fn game_ply(&self) -> usize {
        self.game_ply
    }

    /// Returns the full move number, as used in FEN
    pub fn move_number(&self) -> usize {
        self.game_ply / 2 + 1
    }

    /// Returns the summed piece values of `color`
    pub fn material(&self, color: Color) -> i32 {
        self.material[color as usize]
    }

    /// Return the position's Zobrist key
    pub fn zobrist(&self) -> Zobrist {
        self.zobrist
    }

    /// Returns all occupied squares
    pub fn occupied(&self) -> Bitboard {
        self.occ_squares
    }

    /// Returns the squares occupied by `color`
    pub fn occupied_by(&self, color: Color) -> Bitboard {
        self.occ_by_color[color as usize]
    }

    /// Returns the squares occupied by pieces of type `piece` of either color
    pub fn occupied_by_type(&self, piece: Piece) -> Bitboard {
        self.occ_by_type[piece as usize]
    }

    /// Returns the squares occupied by `piece` of `color`
    pub fn occupied_by_piece(&self, color: Color, piece: Piece) -> Bitboard {
        self.occ_by_piece[color as usize][piece as usize]
    }

    /// Returns the color and type of piece, if any, at the given location
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        if !self.occ_squares.contains(sq) {
            return None;
        }

        let color = if self.occ_by_color[White as usize].contains(sq) { White } else { Black };
        Piece::ALL.iter()
            .find(|&&p| self.occ_by_piece[color as usize][p as usize].contains(sq))
            .map(|&p| (color, p))
    }

    /// Returns the square where the king of the given color is located
    pub fn king_location(&self, c: Color) -> Option<Square> {
        self.occ_by_piece[c as usize][King as usize].peek()
    }

    /// Returns `true` if the color to move is in check
    pub fn in_check(&self) -> bool {
        match self.king_location(self.turn) {
            Some(sq) => self.is_attacked(sq, !self.turn),
            None => false,
        }
    }

    /// Returns `true` if `color` has a piece other than pawns and its king
    pub fn has_big_piece(&self, color: Color) -> bool {
        let c = color as usize;
        !(self.occ_by_color[c]
            ^ self.occ_by_piece[c][Pawn as usize]
            ^ self.occ_by_piece[c][King as usize]).is_empty()
    }

    /// Returns `true` if a draw by the fifty move rule can be claimed
    pub fn fifty_moves(&self) -> bool {
        self.draw_plies >= 100
    }

    /// Hashes of the earlier positions which can still repeat: those since the last capture or
    /// pawn move, except the one just before the last move, where the other side was to move.
    fn repeatable(&self) -> impl Iterator<Item = Zobrist> + '_ {
        let end = self.history.len().saturating_sub(1);
        let start = self.history.len().saturating_sub(self.draw_plies).min(end);
        self.history[start..end].iter().map(|u| u.zobrist)
    }

    /// Returns `true` if the current position occurred before
    pub fn is_repetition(&self) -> bool {
        let key = self.zobrist;
        self.repeatable().any(|k| k == key)
    }

    /// Returns the number of earlier occurrences of the current position
    pub fn repetitions(&self) -> usize {
        let key = self.zobrist;
        self.repeatable().filter(|&k| k == key).count()
    }

    /// Returns the moves which led to this position, oldest first. Null moves are skipped.
    pub fn moves_played(&self) -> impl Iterator<Item = Move> + '_ {
        self.history.iter().filter_map(|u| u.mv)
    }

    /// Returns the killer moves at the current search ply
    pub fn killers(&self) -> [Option<Move>; 2] {
        match self.killers[0].get(self.ply) {
            Some(&first) => [first, self.killers[1][self.ply]],
            None => [None, None],
        }
    }

    /// Records `mv` as having caused a beta cutoff at the current search ply
    pub fn store_killer(&mut self, mv: Move) {
        let ply = self.ply;
        if let Some(&first) = self.killers[0].get(ply) {
            if first != Some(mv) {
                self.killers[1][ply] = first;
                self.killers[0][ply] = Some(mv);
            }
        }
    }

    /// Makes the current position the root of a new search
    pub fn clear_search_state(&mut self) {
        self.ply = 0;
        self.killers = [[None; MAX_DEPTH]; 2];
    }

    /// Sets a piece on the board, updating bitboards, material and the hash key
    fn put_piece(&mut self, color: Color, piece: Piece, sq: Square) {
        let (c, p) = (color as usize, piece as usize);
        self.occ_by_piece[c][p].insert(sq);
        self.occ_by_type[p].insert(sq);
        self.occ_by_color[c].insert(sq);
        self.occ_squares.insert(sq);
        self.material[c] += piece.value();
        self.zobrist.toggle_piece(color, piece, sq);
    }

    /// Clears a piece from the board, updating bitboards, material and the hash key
    fn take_piece(&mut self, color: Color, piece: Piece, sq: Square) {
        let (c, p) = (color as usize, piece as usize);
        self.occ_by_piece[c][p].remove(sq);
        self.occ_by_type[p].remove(sq);
        self.occ_by_color[c].remove(sq);
        self.occ_squares.remove(sq);
        self.material[c] -= piece.value();
        self.zobrist.toggle_piece(color, piece, sq);
    }

    /// Computes the hash key from scratch
    fn calc_zobrist(&self) -> Zobrist {
        let mut key = Zobrist::new();

        for &color in &[White, Black] {
            for &piece in Piece::ALL.iter() {
                for sq in self.occupied_by_piece(color, piece) {
                    key.toggle_piece(color, piece, sq);
                }
            }
        }
        if let Some(sq) = self.ep_square {
            key.toggle_ep_square(sq);
        }
        key.toggle_castling(self.castling);
        if self.turn == White {
            key.toggle_turn();
        }

        key
    }

    /// Verifies that the derived bitboards, material and hash key agree with the piece
    /// bitboards. Only used in debug assertions.
    pub fn check(&self) -> bool {
        let mut by_color = [Bitboard::new(); Color::COUNT];
        let mut material = [0; Color::COUNT];
        let mut seen = Bitboard::new();

        for c in 0..Color::COUNT {
            for &piece in Piece::ALL.iter() {
                let bb = self.occ_by_piece[c][piece as usize];
                if bb.intersects(seen) {
                    return false;
                }
                seen |= bb;
                by_color[c] |= bb;
                material[c] += bb.len() as i32 * piece.value();
            }
        }

        Piece::ALL.iter().all(|&p| {
            self.occ_by_type[p as usize]
                == self.occ_by_piece[White as usize][p as usize]
                    | self.occ_by_piece[Black as usize][p as usize]
        })
            && by_color == self.occ_by_color
            && self.occ_squares == by_color[0] | by_color[1]
            && material == self.material
            && self.zobrist == self.calc_zobrist()
    }

    /// Renders the board for a terminal, along with the state that is not visible on the board
    pub fn diagram(&self) -> String {
        let mut s = String::from("    A B C D E F G H\n");

        for r in (0..Rank::COUNT).rev() {
            s += &format!("\n{:<4}", r + 1);
            for f in 0..File::COUNT {
                let sq = Square::from_coord(
                    File::try_from(f).expect("INFALLIBLE"),
                    Rank::try_from(r).expect("INFALLIBLE"),
                );
                match self.piece_at(sq) {
                    Some((color, piece)) => s.push(piece.to_char(color)),
                    None => s.push('.'),
                }
                s.push(' ');
            }
        }

        let flag = |bit: u8, c: char| if self.castling & bit != 0 { c } else { '-' };
        s += &format!("\n\n{} to move", if self.turn == White { "White" } else { "Black" });
        s += &format!("\nCastle: {}{}{}{}",
            flag(WHITE_KING_SIDE, 'K'), flag(WHITE_QUEEN_SIDE, 'Q'),
            flag(BLACK_KING_SIDE, 'k'), flag(BLACK_QUEEN_SIDE, 'q'));
        s += &format!("\nEn Passant: {}",
            self.ep_square.map_or("-".to_string(), |sq| sq.to_string()));
        s += &format!("\nHash: {:X}\nFiftyMoves: {} (ply)\n", self.zobrist, self.draw_plies);

        s
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_position() {
        let pos = Position::new();
        assert!(pos.check());
        assert_eq!(pos.turn(), White);
        assert_eq!(pos.castling(), 0xf);
        assert_eq!(pos.material(White), 8 * 100 + 2 * 300 + 2 * 320 + 2 * 500 + 915);
        assert_eq!(pos.material(White), pos.material(Black));
        assert_eq!(pos.occupied().len(), 32);
        assert_eq!(pos.occupied_by_type(Pawn).len(), 16);
        assert_eq!(pos.piece_at(Square::E1), Some((White, King)));
        assert_eq!(pos.piece_at(Square::D8), Some((Black, Queen)));
        assert_eq!(pos.piece_at(Square::E4), None);
        assert_eq!(pos.king_location(Black), Some(Square::E8));
        assert!(!pos.in_check());
        assert!(pos.has_big_piece(White));
        assert_eq!(pos.move_number(), 1);
    }

    #[test]
    fn killers() {
        let mut pos = Position::new();
        let a = Move::new(Knight, Square::G1, Square::F3);
        let b = Move::new(Knight, Square::B1, Square::C3);

        pos.store_killer(a);
        pos.store_killer(a);
        assert_eq!(pos.killers(), [Some(a), None]);
        pos.store_killer(b);
        assert_eq!(pos.killers(), [Some(b), Some(a)]);

        pos.clear_search_state();
        assert_eq!(pos.killers(), [None, None]);
    }

    #[test]
    fn diagram() {
        let d = Position::new().diagram();
        assert!(d.starts_with("    A B C D E F G H\n\n8   r n b q k b n r"));
        assert!(d.contains("White to move"));
        assert!(d.contains("Castle: KQkq"));
        assert!(d.contains("En Passant: -"));
    }
}
