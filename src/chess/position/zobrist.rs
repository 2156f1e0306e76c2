//! Contains the Zobrist hash key of a position and the random numbers it is built from
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use lazy_static::lazy_static;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use super::super::*;

const SEED: u64 = 0x00c0_ffee_d00d_f00d;

struct Keys {
    pieces: [[[u64; Square::COUNT]; Piece::COUNT]; Color::COUNT],
    ep_file: [u64; File::COUNT],
    castling: [u64; 16],
    white_to_move: u64,
}

lazy_static! {
    static ref KEYS: Keys = {
        let mut rng = StdRng::seed_from_u64(SEED);
        let mut keys = Keys {
            pieces: [[[0; Square::COUNT]; Piece::COUNT]; Color::COUNT],
            ep_file: [0; File::COUNT],
            castling: [0; 16],
            white_to_move: 0,
        };

        for key in keys.pieces.iter_mut().flat_map(|c| c.iter_mut()).flat_map(|p| p.iter_mut()) {
            *key = rng.gen();
        }
        for key in keys.ep_file.iter_mut().chain(keys.castling.iter_mut()) {
            *key = rng.gen();
        }
        keys.white_to_move = rng.gen();

        keys
    };
}

/// Builds the key tables. Calling it more than once has no further effect.
pub fn init() {
    lazy_static::initialize(&KEYS);
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A 64-bit hash key generated from a position
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Hash)]
pub struct Zobrist(u64);

impl Zobrist {
    /// Creates a new zobrist key
    pub fn new() -> Zobrist {
        Zobrist(0)
    }

    /// Toggles piece placement
    pub fn toggle_piece(&mut self, c: Color, p: Piece, sq: Square) {
        self.0 ^= KEYS.pieces[c as usize][p as usize][sq as usize];
    }

    /// Toggles an en passant square
    pub fn toggle_ep_square(&mut self, sq: Square) {
        self.0 ^= KEYS.ep_file[sq.file() as usize];
    }

    /// Toggles the complete set of castling flags
    pub fn toggle_castling(&mut self, flags: u8) {
        self.0 ^= KEYS.castling[(flags & 0xf) as usize];
    }

    /// Toggles whose turn it is. The key is present while white is to move.
    pub fn toggle_turn(&mut self) {
        self.0 ^= KEYS.white_to_move;
    }
}

impl fmt::Display for Zobrist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::UpperHex for Zobrist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

impl fmt::LowerHex for Zobrist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl From<Zobrist> for u64 {
    /// Allows using the key to get a hash table index
    fn from(key: Zobrist) -> u64 {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_cancel() {
        let mut key = Zobrist::new();
        key.toggle_piece(Color::White, Piece::Knight, Square::G1);
        key.toggle_castling(0xf);
        key.toggle_ep_square(Square::E3);
        assert_ne!(key, Zobrist::new());

        key.toggle_ep_square(Square::E6);
        key.toggle_castling(0xf);
        key.toggle_piece(Color::White, Piece::Knight, Square::G1);
        assert_eq!(key, Zobrist::new());
    }

    #[test]
    fn keys_are_distinct() {
        let mut a = Zobrist::new();
        let mut b = Zobrist::new();
        a.toggle_piece(Color::White, Piece::Pawn, Square::E4);
        b.toggle_piece(Color::Black, Piece::Pawn, Square::E4);
        assert_ne!(a, b);
        assert_ne!(u64::from(a), 0);
    }
}
