//! Attack detection and the mobility probes used by the evaluation
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use super::*;
use bitboard::*;

/// Returns the squares attacked by the pawns in `pawns` if they belong to `color`
pub fn pawn_attacks(pawns: Bitboard, color: Color) -> Bitboard {
    match color {
        White => pawns.shift(NORTH_WEST) | pawns.shift(NORTH_EAST),
        Black => pawns.shift(SOUTH_WEST) | pawns.shift(SOUTH_EAST),
    }
}

impl Position {
    /// Returns `true` if `sq` is attacked (or defended) by a piece of color `by`
    pub fn is_attacked(&self, sq: Square, by: Color) -> bool {
        let target = Bitboard::from(sq);

        // pawns
        if pawn_attacks(self.occupied_by_piece(by, Pawn), by).intersects(target) {
            return true;
        }

        // sliding pieces, walked outward from `sq` until the first blocker
        let queens = self.occupied_by_piece(by, Queen);
        let sliders = [
            (&DIAGONAL_STEPS, self.occupied_by_piece(by, Bishop) | queens),
            (&ORTHOGONAL_STEPS, self.occupied_by_piece(by, Rook) | queens),
        ];
        for (steps, attackers) in sliders.iter() {
            if attackers.is_empty() {
                continue;
            }
            for &step in steps.iter() {
                let mut b = target.shift(step);
                while !b.is_empty() {
                    if b.intersects(*attackers) {
                        return true;
                    }
                    if b.intersects(self.occ_squares) {
                        break;
                    }
                    b = b.shift(step);
                }
            }
        }

        // leapers
        let knights = self.occupied_by_piece(by, Knight);
        if KNIGHT_STEPS.iter().any(|&s| target.shift(s).intersects(knights)) {
            return true;
        }
        let king = self.occupied_by_piece(by, King);
        KING_STEPS.iter().any(|&s| target.shift(s).intersects(king))
    }

    /// Returns `true` if a knight of `color` on `sq` has a destination which is not occupied by
    /// its own pieces and is inside `safe` (usually the squares not attacked by enemy pawns)
    pub fn knight_can_move(&self, sq: Square, color: Color, safe: Bitboard) -> bool {
        let from = Bitboard::from(sq);
        let open = !self.occupied_by(color) & safe;
        KNIGHT_STEPS.iter().any(|&s| from.shift(s).intersects(open))
    }

    /// Probes how freely a bishop of `color` on `sq` can move: 2 if it can go at least two squares
    /// along some diagonal, 1 if it can only take single steps, and 0 if it is shut in.
    pub fn bishop_mobility(&self, sq: Square, color: Color) -> usize {
        let from = Bitboard::from(sq);
        let own = self.occupied_by(color);
        let mut mobility = 0;

        for &step in DIAGONAL_STEPS.iter() {
            let first = from.shift(step);
            if first.is_empty() || first.intersects(own) {
                continue;
            }
            mobility = 1;

            let second = first.shift(step);
            if !first.intersects(self.occ_squares) && !second.is_empty()
                && !second.intersects(own) {
                return 2;
            }
        }

        mobility
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attacked_by(pos: &Position, color: Color) -> Bitboard {
        (0..Square::COUNT)
            .map(|i| Square::try_from(i).unwrap())
            .filter(|&sq| pos.is_attacked(sq, color))
            .collect()
    }

    #[test]
    fn lone_rook() {
        let pos: Position = "k7/8/8/8/3R4/8/8/7K b - - 0 1".parse().unwrap();
        let kings: Position = "k7/8/8/8/8/8/8/7K b - - 0 1".parse().unwrap();
        let rook = attacked_by(&pos, White) & !attacked_by(&kings, White);

        let lines = (Bitboard::from(File::D) | Rank::R4.into()) & !Bitboard::from(Square::D4);
        assert_eq!(lines.len(), 14);
        assert_eq!(rook, lines);
    }

    #[test]
    fn blocked_rook() {
        let pos: Position = "k7/8/8/8/3RN3/8/8/7K b - - 0 1".parse().unwrap();
        assert!(pos.is_attacked(Square::E4, White));
        assert!(!pos.is_attacked(Square::F4, White));
        assert!(!pos.is_attacked(Square::G4, White));
        assert!(!pos.is_attacked(Square::H4, White));
        assert!(pos.is_attacked(Square::A4, White));
        assert!(pos.is_attacked(Square::D8, White));
    }

    #[test]
    fn pawns_and_leapers() {
        let pos: Position = "4k3/8/8/3p4/8/1N6/8/4K3 w - - 0 1".parse().unwrap();
        assert!(pos.is_attacked(Square::C4, Black));
        assert!(pos.is_attacked(Square::E4, Black));
        assert!(!pos.is_attacked(Square::D4, Black));
        assert!(pos.is_attacked(Square::D4, White));
        assert!(pos.is_attacked(Square::A1, White));
        assert!(pos.is_attacked(Square::D7, Black));
        assert!(pos.is_attacked(Square::F2, White));

        // no wrapping from the H file to the A file
        let pos: Position = "4k3/8/8/8/7P/8/8/4K3 w - - 0 1".parse().unwrap();
        assert!(pos.is_attacked(Square::G5, White));
        assert!(!pos.is_attacked(Square::A6, White));
    }

    #[test]
    fn mobility_probes() {
        let pos = Position::new();
        let safe = !pawn_attacks(pos.occupied_by_piece(Black, Pawn), Black);
        assert!(pos.knight_can_move(Square::B1, White, safe));
        assert_eq!(pos.bishop_mobility(Square::C1, White), 0);

        let pos: Position = "4k3/8/8/8/8/8/1P1P4/2B1K3 w - - 0 1".parse().unwrap();
        assert_eq!(pos.bishop_mobility(Square::C1, White), 0);
        let pos: Position = "4k3/8/8/8/8/4P3/1P6/2B1K3 w - - 0 1".parse().unwrap();
        assert_eq!(pos.bishop_mobility(Square::C1, White), 1);
        let pos: Position = "4k3/8/8/8/8/8/1P6/2B1K3 w - - 0 1".parse().unwrap();
        assert_eq!(pos.bishop_mobility(Square::C1, White), 2);
    }
}
