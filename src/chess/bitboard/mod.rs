//! Provides a set-of-squares representation of the pieces on the board and the single-step shifts
//! used to move every member of a set at once.
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::convert::TryInto;
use std::iter::FusedIterator;
use std::iter::{FromIterator, Extend};
use std::ops;
use std::fmt;
use super::*;

/// Every square except those on the A file
pub const NO_A_FILE: Bitboard = Bitboard(0xfefe_fefe_fefe_fefe);
/// Every square except those on the H file
pub const NO_H_FILE: Bitboard = Bitboard(0x7f7f_7f7f_7f7f_7f7f);
/// Every square except those on the A and B files
pub const NO_AB_FILE: Bitboard = Bitboard(0xfcfc_fcfc_fcfc_fcfc);
/// Every square except those on the G and H files
pub const NO_GH_FILE: Bitboard = Bitboard(0x3f3f_3f3f_3f3f_3f3f);
/// The whole board
pub const ALL_SQUARES: Bitboard = Bitboard(0xffff_ffff_ffff_ffff);

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A set of squares with each bit representing one square
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Hash)]
pub struct Bitboard(u64);

impl Bitboard {
    /// Creates a new, empty bitboard
    pub fn new() -> Bitboard {
        Default::default()
    }

    /// Returns the number of squares in the bitboard
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns `true` if the bitboard is empty
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the bitboard contains `sq`
    pub fn contains(self, sq: Square) -> bool {
        self.intersects(sq.into())
    }

    /// Returns `true` if `self` intersects `other`
    pub fn intersects(self, other: Bitboard) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns `true` if `self` does not intersect `other`
    pub fn is_disjoint(self, other: Bitboard) -> bool {
        self.0 & other.0 == 0
    }

    /// Adds a square to the bitboard if it is not already present
    pub fn insert(&mut self, sq: Square) {
        *self |= sq.into();
    }

    /// Removes a square from the bitboard if it is present
    pub fn remove(&mut self, sq: Square) {
        *self &= !Bitboard::from(sq);
    }

    /// Toggles a square in the bitboard
    pub fn toggle(&mut self, sq: Square) {
        *self ^= sq.into();
    }

    /// Removes the lowest square from the bitboard and returns it
    pub fn pop(&mut self) -> Option<Square> {
        let sq = self.peek();
        self.0 &= self.0.wrapping_sub(1);
        sq
    }

    /// Returns the lowest square, which is the one that would be removed by `pop`
    pub fn peek(self) -> Option<Square> {
        if self.0 != 0 {
            Some((self.0.trailing_zeros() as usize).try_into().expect("INFALLIBLE"))
        } else {
            None
        }
    }

    /// Moves every square one `step`. Squares that would leave the board (including those that
    /// would wrap around to the other edge) are dropped.
    pub fn shift(self, step: Step) -> Bitboard {
        let bits = if step.shift > 0 {
            self.0 << step.shift
        } else {
            self.0 >> -step.shift
        };

        Bitboard(bits & step.mask.0)
    }
}

impl ops::Not for Bitboard {
    type Output = Self;

    fn not(self) -> Self::Output {
        Bitboard(!self.0)
    }
}

/// Implements a binary operator and its assigning form by applying it to the bits.
macro_rules! bit_op {
    ($op:ident, $f:ident, $op_assign:ident, $f_assign:ident) => {
        impl ops::$op for Bitboard {
            type Output = Self;

            fn $f(self, rhs: Self) -> Self::Output {
                Bitboard(ops::$op::$f(self.0, rhs.0))
            }
        }

        impl ops::$op_assign for Bitboard {
            fn $f_assign(&mut self, rhs: Self) {
                ops::$op_assign::$f_assign(&mut self.0, rhs.0)
            }
        }
    };
}

bit_op!(BitAnd, bitand, BitAndAssign, bitand_assign);
bit_op!(BitOr, bitor, BitOrAssign, bitor_assign);
bit_op!(BitXor, bitxor, BitXorAssign, bitxor_assign);

/// Formats the bits as a number. `Display` uses lowercase hex.
macro_rules! number_fmt {
    ($($trait:ident => $as:ident),*) => {
        $(
            impl fmt::$trait for Bitboard {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    fmt::$as::fmt(&self.0, f)
                }
            }
        )*
    };
}

number_fmt!(Display => LowerHex, LowerHex => LowerHex, UpperHex => UpperHex, Octal => Octal,
    Binary => Binary);

impl From<u64> for Bitboard {
    fn from(val: u64) -> Bitboard {
        Bitboard(val)
    }
}

impl From<Bitboard> for u64 {
    fn from(bb: Bitboard) -> u64 {
        bb.0
    }
}

impl From<Square> for Bitboard {
    fn from(sq: Square) -> Bitboard {
        Bitboard(1 << sq as u64)
    }
}

impl From<File> for Bitboard {
    fn from(f: File) -> Bitboard {
        Bitboard(0x0101_0101_0101_0101 << f as u64)
    }
}

impl From<Rank> for Bitboard {
    fn from(r: Rank) -> Bitboard {
        Bitboard(0x0000_0000_0000_00ff << (8 * r as u64))
    }
}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self)
    }
}

impl FromIterator<Square> for Bitboard {
    fn from_iter<I: IntoIterator<Item=Square>>(iter: I) -> Self {
        let mut bd = Bitboard::new();
        bd.extend(iter);
        bd
    }
}

impl Extend<Square> for Bitboard {
    fn extend<I: IntoIterator<Item=Square>>(&mut self, iter: I) {
        for sq in iter {
            self.insert(sq);
        }
    }
}

/// Iterator over the squares of a `Bitboard`, lowest square first
#[derive(Debug, Copy, Clone)]
pub struct IntoIter(Bitboard);

impl Iterator for IntoIter {
    type Item = Square;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.0.len();
        (len, Some(len))
    }
}

impl ExactSizeIterator for IntoIter { }

impl FusedIterator for IntoIter { }

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A one-square move in a fixed direction, expressed as a bit shift together with the mask that
/// removes squares which wrapped around the edge of the board.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Step {
    shift: i8,
    mask: Bitboard,
}

impl Step {
    const fn new(shift: i8, mask: Bitboard) -> Step {
        Step { shift, mask }
    }
}

#[allow(missing_docs)]
pub const NORTH: Step = Step::new(8, ALL_SQUARES);
#[allow(missing_docs)]
pub const SOUTH: Step = Step::new(-8, ALL_SQUARES);
#[allow(missing_docs)]
pub const EAST: Step = Step::new(1, NO_A_FILE);
#[allow(missing_docs)]
pub const WEST: Step = Step::new(-1, NO_H_FILE);
#[allow(missing_docs)]
pub const NORTH_EAST: Step = Step::new(9, NO_A_FILE);
#[allow(missing_docs)]
pub const NORTH_WEST: Step = Step::new(7, NO_H_FILE);
#[allow(missing_docs)]
pub const SOUTH_EAST: Step = Step::new(-7, NO_A_FILE);
#[allow(missing_docs)]
pub const SOUTH_WEST: Step = Step::new(-9, NO_H_FILE);

/// The eight knight jumps
pub const KNIGHT_STEPS: [Step; 8] = [
    Step::new(6, NO_GH_FILE),
    Step::new(15, NO_H_FILE),
    Step::new(17, NO_A_FILE),
    Step::new(10, NO_AB_FILE),
    Step::new(-6, NO_AB_FILE),
    Step::new(-15, NO_A_FILE),
    Step::new(-17, NO_H_FILE),
    Step::new(-10, NO_GH_FILE),
];

/// The bishop directions
pub const DIAGONAL_STEPS: [Step; 4] = [ NORTH_WEST, NORTH_EAST, SOUTH_EAST, SOUTH_WEST ];

/// The rook directions
pub const ORTHOGONAL_STEPS: [Step; 4] = [ EAST, NORTH, WEST, SOUTH ];

/// The king steps
pub const KING_STEPS: [Step; 8] = [
    NORTH_WEST, NORTH_EAST, SOUTH_EAST, SOUTH_WEST, EAST, NORTH, WEST, SOUTH
];
