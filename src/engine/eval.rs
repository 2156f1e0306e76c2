//! Static evaluation of a position.
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use std::ops;
use std::convert::TryFrom;
use lazy_static::lazy_static;
use crate::chess::{Color, Piece, Rank, Square, Bitboard, Position, MAX_DEPTH, pawn_attacks};
use crate::chess::bitboard::{self, Step};
use Color::*;
use Piece::*;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Score, in centipawns, from the point of view of one side
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(i32);

impl Score {
    /// Score of a position in which the side to move is already mated
    pub const MATE: i32 = 10_000;

    /// Returns a score greater than any score the search can produce
    pub fn infinity() -> Self {
        Score(30_000)
    }
    /// Returns the score for a draw
    pub fn draw() -> Self {
        Score(0)
    }
    /// Returns the score for checkmating in `ply` plies from the root
    pub fn mates_in(ply: usize) -> Self {
        Score(Self::MATE - ply as i32)
    }
    /// Returns the score for being checkmated in `ply` plies from the root
    pub fn mated_in(ply: usize) -> Self {
        Score(-Self::MATE + ply as i32)
    }
    /// Returns `true` if the score announces a forced mate for either side
    pub fn is_mate(self) -> bool {
        self.0.abs() >= Self::MATE - 2 * MAX_DEPTH as i32 && self.0.abs() <= Self::MATE
    }
}

impl ops::Neg for Score {
    type Output = Score;

    fn neg(self) -> Self {
        Score(-self.0)
    }
}

impl ops::Add<i32> for Score {
    type Output = Score;

    fn add(self, rhs: i32) -> Self {
        Score(self.0 + rhs)
    }
}

impl ops::Sub<i32> for Score {
    type Output = Score;

    fn sub(self, rhs: i32) -> Self {
        Score(self.0 - rhs)
    }
}

impl From<i32> for Score {
    fn from(val: i32) -> Self {
        Score(val)
    }
}

impl From<Score> for i32 {
    fn from(val: Score) -> Self {
        val.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

const END_MATERIAL: i32 = 1500;
const NO_QUEEN_END_MATERIAL: i32 = 2000;

const PASSED_PAWN: [i32; Rank::COUNT] = [ 0, 5, 10, 20, 35, 60, 100, 200 ];
const ISOLATED_PAWN: i32 = -15;
const OPEN_ROOK: i32 = 20;
const SEMI_OPEN_ROOK: i32 = 8;
const OPEN_QUEEN: i32 = 4;
const SEMI_OPEN_QUEEN: i32 = 2;
const KING_SHELTER: i32 = 3;
const BISHOP_PAIR: i32 = 15;
const CLOSED_KNIGHT: i32 = 10;
const CLOSED_BISHOP: i32 = -10;
const CLOSED_ROOK: i32 = -10;
const USELESS_PIECE: i32 = -12;
const SEMI_USELESS_PIECE: i32 = -6;
const OUTPOST: i32 = 12;
const SIDE_OUTPOST: i32 = 4;

/// Ranks 3 to 6; a game with nine or more pawns there counts as closed
const CENTRE_RANKS: u64 = 0x0000_ffff_ffff_0000;
/// Squares on which a supported minor piece counts as an outpost, seen from White
const OUTPOST_SQUARES: u64 = 0x00ff_ffff_0000_0000;
const CENTRE_OUTPOST_SQUARES: u64 = 0x003c_3c3c_0000_0000;

// Piece-square tables from White's point of view, rank 1 first. Black looks them up through
// `Square::mirror`.
#[rustfmt::skip]
const PAWN_TABLE: [i32; Square::COUNT] = [
      0,   0,   0,   0,   0,   0,   0,   0,
     10,  10,   0, -10, -10,   0,  10,  10,
      5,   0,   0,   5,   5,   0,   0,   5,
      0,   0,  10,  20,  20,  10,   0,   0,
      5,   5,   5,  10,  10,   5,   5,   5,
     10,  10,  10,  20,  20,  10,  10,  10,
     20,  20,  20,  30,  30,  20,  20,  20,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const PAWN_END_TABLE: [i32; Square::COUNT] = [
      0,   0,   0,   0,   0,   0,   0,   0,
      7,   7,   0, -10, -10,   0,   7,   7,
      5,   2,   0,   4,   4,   0,   2,   5,
      4,   3,  10,  10,  10,  10,   3,   4,
      8,   8,  12,  14,  14,  12,   8,   8,
     15,  18,  20,  24,  24,  15,  15,  15,
     24,  24,  24,  34,  34,  24,  24,  24,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const KNIGHT_TABLE: [i32; Square::COUNT] = [
      0, -10,   0,   0,   0,   0, -10,   0,
      0,   0,   0,   5,   5,   0,   0,   0,
      0,   0,   9,  10,  10,   9,   0,   0,
      0,   0,  10,  20,  20,  10,   5,   0,
      5,  10,  15,  20,  20,  15,  10,   5,
      5,  10,  10,  20,  20,  10,  10,   5,
      0,   0,   5,  10,  10,   5,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const BISHOP_TABLE: [i32; Square::COUNT] = [
      0,   0, -10,   0,   0, -10,   0,   0,
      0,   6,   0,   7,   7,   0,   6,   0,
      0,   0,  10,  15,  15,  10,   0,   0,
      0,  10,  15,  18,  18,  15,  10,   0,
      0,  10,  15,  18,  18,  15,  10,   0,
      0,   0,  10,  15,  15,  10,   0,   0,
      0,   0,   0,  10,  10,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const ROOK_TABLE: [i32; Square::COUNT] = [
     -4,   0,   8,  10,  10,   8,   0,  -4,
      0,   0,   8,  10,  10,   8,   0,   0,
      0,   0,   8,  10,  10,   8,   0,   0,
      0,   0,   8,  10,  10,   8,   0,   0,
      0,   0,   8,  10,  10,   8,   0,   0,
      0,   0,   8,  10,  10,   8,   0,   0,
     15,  15,  15,  15,  15,  15,  15,  15,
      0,   0,   8,  10,  10,   8,   0,   0,
];

#[rustfmt::skip]
const KING_TABLE: [i32; Square::COUNT] = [
      0,   5,  20, -10,   0, -10,  20,   5,
    -15, -15, -15, -15, -15, -15, -15, -15,
    -60, -60, -60, -60, -60, -60, -60, -60,
    -60, -60, -60, -60, -60, -60, -60, -60,
    -60, -60, -60, -60, -60, -60, -60, -60,
    -60, -60, -60, -60, -60, -60, -60, -60,
    -60, -60, -60, -60, -60, -60, -60, -60,
    -60, -60, -60, -60, -60, -60, -60, -60,
];

#[rustfmt::skip]
const KING_END_TABLE: [i32; Square::COUNT] = [
    -40, -10,   0,   0,   0,   0, -10, -40,
    -10,   0,   5,   5,   5,   5,   0, -10,
      0,   5,  10,  15,  15,  10,   5,   0,
      0,   5,  15,  20,  20,  15,   5,   0,
      0,   5,  15,  20,  20,  15,   5,   0,
      0,   5,  10,  15,  15,  10,   5,   0,
    -10,   0,   5,   5,   5,   5,   0, -10,
    -40, -10,   0,   0,   0,   0, -10, -40,
];

struct Masks {
    /// Squares on the files next to the square's file
    isolated: [Bitboard; Square::COUNT],
    /// Squares which must be free of enemy pawns for a pawn to be passed
    passed: [[Bitboard; Square::COUNT]; Color::COUNT],
    /// Squares from which enemy pawns could still chase a piece away
    outpost: [[Bitboard; Square::COUNT]; Color::COUNT],
}

impl Masks {
    fn new() -> Masks {
        let mut masks = Masks {
            isolated: [Bitboard::new(); Square::COUNT],
            passed: [[Bitboard::new(); Square::COUNT]; Color::COUNT],
            outpost: [[Bitboard::new(); Square::COUNT]; Color::COUNT],
        };

        for i in 0..Square::COUNT {
            let sq = Square::try_from(i).expect("INFALLIBLE");
            let file = Bitboard::from(sq.file());
            let adjacent = file.shift(bitboard::EAST) | file.shift(bitboard::WEST);

            let rank = sq.rank() as usize;
            let ahead = |range: ops::Range<usize>| range
                .map(|r| Bitboard::from(Rank::try_from(r).expect("INFALLIBLE")))
                .fold(Bitboard::new(), |acc, r| acc | r);
            let above = ahead(rank + 1 .. Rank::COUNT);
            let below = ahead(0 .. rank);

            masks.isolated[i] = adjacent;
            masks.passed[White as usize][i] = (file | adjacent) & above;
            masks.passed[Black as usize][i] = (file | adjacent) & below;
            masks.outpost[White as usize][i] = adjacent & above;
            masks.outpost[Black as usize][i] = adjacent & below;
        }

        masks
    }
}

lazy_static! {
    static ref MASKS: Masks = Masks::new();
}

/// Builds the evaluation masks. They are also built on first use; calling this again does nothing.
pub fn init() {
    lazy_static::initialize(&MASKS);
}

/// Things about the position that the evaluation of each side needs to know
struct Context {
    pawns: Bitboard,
    closed: bool,
}

/// Returns the index into a White piece-square table for a piece of `color` on `sq`
fn table_index(sq: Square, color: Color) -> usize {
    match color {
        White => sq as usize,
        Black => sq.mirror() as usize,
    }
}

/// Returns the distance in ranks a pawn of `color` on `sq` has come from its own back rank
fn relative_rank(sq: Square, color: Color) -> usize {
    match color {
        White => sq.rank() as usize,
        Black => Rank::COUNT - 1 - sq.rank() as usize,
    }
}

/// Returns `true` if `color` should use the end-game tables for its pawns and king, which depends
/// on the material the opponent has left.
fn is_end_game(pos: &Position, color: Color) -> bool {
    let material = pos.material(!color);
    material <= END_MATERIAL
        || (pos.occupied_by_piece(!color, Queen).is_empty() && material <= NO_QUEEN_END_MATERIAL)
}

fn open_file_bonus(pos: &Position, ctx: &Context, sq: Square, color: Color, open: i32, semi: i32)
-> i32 {
    let file = Bitboard::from(sq.file());
    if !file.intersects(ctx.pawns) {
        open
    } else if !file.intersects(pos.occupied_by_piece(color, Pawn)) {
        semi
    } else {
        0
    }
}

fn outpost_bonus(pos: &Position, sq: Square, color: Color, supported: Bitboard) -> i32 {
    let enemy_pawns = pos.occupied_by_piece(!color, Pawn);
    if MASKS.outpost[color as usize][sq as usize].intersects(enemy_pawns) || !supported.contains(sq) {
        return 0;
    }

    let relative = Bitboard::from(Square::try_from(table_index(sq, color)).expect("INFALLIBLE"));
    if relative.intersects(Bitboard::from(CENTRE_OUTPOST_SQUARES)) {
        OUTPOST
    } else if relative.intersects(Bitboard::from(OUTPOST_SQUARES)) {
        SIDE_OUTPOST
    } else {
        0
    }
}

/// Evaluates everything except material for the pieces of one side
fn side_score(pos: &Position, ctx: &Context, color: Color) -> i32 {
    let mut score = 0;
    let own_pawns = pos.occupied_by_piece(color, Pawn);
    let enemy_pawns = pos.occupied_by_piece(!color, Pawn);
    let supported = pawn_attacks(own_pawns, color);
    let unsafe_squares = pawn_attacks(enemy_pawns, !color);
    let end_game = is_end_game(pos, color);

    for sq in own_pawns {
        let i = table_index(sq, color);
        score += if end_game { PAWN_END_TABLE[i] } else { PAWN_TABLE[i] };

        if !MASKS.passed[color as usize][sq as usize].intersects(enemy_pawns) {
            score += PASSED_PAWN[relative_rank(sq, color)];
        }
        if !MASKS.isolated[sq as usize].intersects(own_pawns) {
            score += ISOLATED_PAWN;
        }
    }

    for sq in pos.occupied_by_piece(color, Knight) {
        score += KNIGHT_TABLE[table_index(sq, color)];
        if ctx.closed {
            score += CLOSED_KNIGHT;
        }
        score += outpost_bonus(pos, sq, color, supported);
        if !pos.knight_can_move(sq, color, !unsafe_squares) {
            score += USELESS_PIECE;
        }
    }

    let bishops = pos.occupied_by_piece(color, Bishop);
    if bishops.len() > 1 {
        score += BISHOP_PAIR;
    }
    for sq in bishops {
        score += BISHOP_TABLE[table_index(sq, color)];
        if ctx.closed {
            score += CLOSED_BISHOP;
        }
        score += outpost_bonus(pos, sq, color, supported);
        score += match pos.bishop_mobility(sq, color) {
            0 => USELESS_PIECE,
            1 => SEMI_USELESS_PIECE,
            _ => 0,
        };
    }

    for sq in pos.occupied_by_piece(color, Rook) {
        if pos.material(!color) > END_MATERIAL {
            score += ROOK_TABLE[table_index(sq, color)];
        }
        score += open_file_bonus(pos, ctx, sq, color, OPEN_ROOK, SEMI_OPEN_ROOK);
        if ctx.closed {
            score += CLOSED_ROOK;
        }
    }

    for sq in pos.occupied_by_piece(color, Queen) {
        score += open_file_bonus(pos, ctx, sq, color, OPEN_QUEEN, SEMI_OPEN_QUEEN);
    }

    if let Some(sq) = pos.king_location(color) {
        let i = table_index(sq, color);
        if end_game {
            score += KING_END_TABLE[i];
        } else {
            score += KING_TABLE[i];

            let shelter: [Step; 3] = match color {
                White => [bitboard::NORTH_WEST, bitboard::NORTH, bitboard::NORTH_EAST],
                Black => [bitboard::SOUTH_EAST, bitboard::SOUTH, bitboard::SOUTH_WEST],
            };
            let king = Bitboard::from(sq);
            let own = pos.occupied_by(color);
            for &step in shelter.iter() {
                if king.shift(step).intersects(own) {
                    score += KING_SHELTER;
                }
            }
        }
    }

    score
}

/// Returns `true` for the pawnless, queenless endings which are theoretical draws
fn material_draw(pos: &Position) -> bool {
    let count = |color, piece| pos.occupied_by_piece(color, piece).len();
    let minors = |color| count(color, Knight) + count(color, Bishop);

    if pos.occupied_by_type(Rook).is_empty() {
        if pos.occupied_by_type(Bishop).is_empty() {
            count(White, Knight) < 3 && count(Black, Knight) < 3
        } else if pos.occupied_by_type(Knight).is_empty() {
            (count(White, Bishop) as isize - count(Black, Bishop) as isize).abs() < 2
        } else {
            let weak = |color| (count(color, Knight) < 3 && count(color, Bishop) == 0)
                || (count(color, Bishop) == 1 && count(color, Knight) == 0);
            weak(White) && weak(Black)
        }
    } else if count(White, Rook) == 1 && count(Black, Rook) == 1 {
        minors(White) < 2 && minors(Black) < 2
    } else if count(White, Rook) == 1 && count(Black, Rook) == 0 && minors(White) == 0 {
        minors(Black) == 1 || minors(Black) == 2
    } else if count(Black, Rook) == 1 && count(White, Rook) == 0 && minors(Black) == 0 {
        minors(White) == 1 || minors(White) == 2
    } else {
        false
    }
}

/// Returns `true` if `color` can no longer win, so that a side which is behind against it can
/// still expect a draw
fn cannot_win(pos: &Position, color: Color) -> bool {
    let count = |piece| pos.occupied_by_piece(color, piece).len();
    if count(Pawn) > 0 || count(Queen) > 0 || count(Rook) > 0 {
        return false;
    }
    count(Knight) + count(Bishop) < 2 || (count(Bishop) == 0 && count(Knight) < 3)
}

/// Evaluates `pos` in centipawns from White's point of view.
pub fn evaluate(pos: &Position) -> Score {
    let pawns = pos.occupied_by_type(Pawn);

    if pawns.is_empty() && pos.occupied_by_type(Queen).is_empty() && material_draw(pos) {
        return Score::draw();
    }

    let ctx = Context {
        pawns,
        closed: (pawns & Bitboard::from(CENTRE_RANKS)).len() >= 9,
    };

    let score = pos.material(White) - pos.material(Black)
        + side_score(pos, &ctx, White)
        - side_score(pos, &ctx, Black);

    // the side to move is behind, but the opponent has too little left to win
    let us = pos.turn();
    let ours = if us == White { score } else { -score };
    if ours < 0 && cannot_win(pos, !us) {
        return Score::draw();
    }

    Score(score)
}

/// Evaluates `pos` from the point of view of the side to move.
pub fn evaluate_for_mover(pos: &Position) -> Score {
    match pos.turn() {
        White => evaluate(pos),
        Black => -evaluate(pos),
    }
}
