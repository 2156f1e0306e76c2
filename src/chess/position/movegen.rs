//! Pseudo-legal move generation
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use super::*;
use bitboard::*;

/// Ordering bonus of every capture, on top of victim value minus a hundredth of the attacker value
pub const CAPTURE_SCORE: i32 = 1_000_000;
/// Ordering bonus of a non-capturing promotion, on top of the value of the new piece
pub const PROMOTION_SCORE: i32 = 999_800;
/// Ordering score of the most recent killer move at the current ply
pub const FIRST_KILLER_SCORE: i32 = 800_000;
/// Ordering score of the older killer move at the current ply
pub const SECOND_KILLER_SCORE: i32 = 750_000;

/// Pieces a pawn may promote to, in the order they are generated
const PROMOTIONS: [Piece; 4] = [ Queen, Knight, Rook, Bishop ];

struct Castle {
    flag: u8,
    king_to: Square,
    between: &'static [Square],
    path: [Square; 3],
}

const CASTLES: [[Castle; 2]; Color::COUNT] = [
    [
        Castle {
            flag: WHITE_KING_SIDE, king_to: Square::G1,
            between: &[Square::F1, Square::G1],
            path: [Square::E1, Square::F1, Square::G1],
        },
        Castle {
            flag: WHITE_QUEEN_SIDE, king_to: Square::C1,
            between: &[Square::B1, Square::C1, Square::D1],
            path: [Square::E1, Square::D1, Square::C1],
        },
    ],
    [
        Castle {
            flag: BLACK_KING_SIDE, king_to: Square::G8,
            between: &[Square::F8, Square::G8],
            path: [Square::E8, Square::F8, Square::G8],
        },
        Castle {
            flag: BLACK_QUEEN_SIDE, king_to: Square::C8,
            between: &[Square::B8, Square::C8, Square::D8],
            path: [Square::E8, Square::D8, Square::C8],
        },
    ],
];

/// Scores a capture so that valuable victims taken by cheap attackers come first
pub fn capture_score(victim: Piece, attacker: Piece) -> i32 {
    victim.value() - attacker.value() / 100 + CAPTURE_SCORE
}

impl Position {
    /// Generates all pseudo-legal moves for the side to move. Some of them may leave the mover in
    /// check; `make_move` rejects those.
    pub fn generate_moves(&self) -> MoveList {
        self.generate(false)
    }

    /// Generates the moves searched by the quiescence search: captures (en passant included),
    /// promotions, and pawn advances to the seventh rank.
    pub fn generate_captures(&self) -> MoveList {
        self.generate(true)
    }

    fn generate(&self, captures_only: bool) -> MoveList {
        let mut list = MoveList::new();
        let us = self.turn;
        let them = self.occupied_by(!us);
        let empty = !self.occ_squares;
        let killers = self.killers();

        let quiet = |list: &mut MoveList, mv: Move| {
            let score = if killers[0] == Some(mv) {
                FIRST_KILLER_SCORE
            } else if killers[1] == Some(mv) {
                SECOND_KILLER_SCORE
            } else {
                0
            };
            list.push(mv, score);
        };
        let capture = |list: &mut MoveList, mv: Move, to: Square| {
            if let Some((_, victim)) = self.piece_at(to) {
                let mv = mv.with_capture(victim);
                list.push(mv, capture_score(victim, mv.piece()));
            }
        };

        // knights and the king
        let leapers = [(Knight, &KNIGHT_STEPS), (King, &KING_STEPS)];
        for &(piece, steps) in leapers.iter() {
            for from in self.occupied_by_piece(us, piece) {
                for &step in steps.iter() {
                    if let Some(to) = Bitboard::from(from).shift(step).peek() {
                        if them.contains(to) {
                            capture(&mut list, Move::new(piece, from, to), to);
                        } else if empty.contains(to) && !captures_only {
                            quiet(&mut list, Move::new(piece, from, to));
                        }
                    }
                }
            }
        }

        // sliding pieces
        let sliders = [
            (Bishop, &DIAGONAL_STEPS[..]),
            (Rook, &ORTHOGONAL_STEPS[..]),
            (Queen, &KING_STEPS[..]),
        ];
        for &(piece, steps) in sliders.iter() {
            for from in self.occupied_by_piece(us, piece) {
                for &step in steps {
                    let mut b = Bitboard::from(from).shift(step);
                    while let Some(to) = b.peek() {
                        if them.contains(to) {
                            capture(&mut list, Move::new(piece, from, to), to);
                            break;
                        } else if !empty.contains(to) {
                            break;
                        }
                        if !captures_only {
                            quiet(&mut list, Move::new(piece, from, to));
                        }
                        b = b.shift(step);
                    }
                }
            }
        }

        // pawns
        let (forward, attacks, start, late) = match us {
            White => (NORTH, [NORTH_WEST, NORTH_EAST], Rank::R2, [Rank::R6, Rank::R7]),
            Black => (SOUTH, [SOUTH_EAST, SOUTH_WEST], Rank::R7, [Rank::R3, Rank::R2]),
        };
        let legal_ep = Bitboard::from(Rank::R3) | Rank::R6.into();
        let ep = self.ep_square.map_or(Bitboard::new(), Bitboard::from) & legal_ep;
        for from in self.occupied_by_piece(us, Pawn) {
            let promotes = from.rank() == late[1];
            let pawn = Bitboard::from(from);

            if let Some(to) = (pawn.shift(forward) & empty).peek() {
                let mv = Move::new(Pawn, from, to);
                if promotes {
                    for &p in PROMOTIONS.iter() {
                        list.push(mv.with_promotion(p), PROMOTION_SCORE + p.value());
                    }
                } else if !captures_only || from.rank() == late[0] {
                    quiet(&mut list, mv);
                }

                if from.rank() == start && !captures_only {
                    if let Some(to) = (pawn.shift(forward).shift(forward) & empty).peek() {
                        quiet(&mut list, Move::new(Pawn, from, to).with_double_push());
                    }
                }
            }

            for &step in attacks.iter() {
                if let Some(to) = pawn.shift(step).peek() {
                    if them.contains(to) {
                        if promotes {
                            for &p in PROMOTIONS.iter() {
                                capture(&mut list, Move::new(Pawn, from, to).with_promotion(p), to);
                            }
                        } else {
                            capture(&mut list, Move::new(Pawn, from, to), to);
                        }
                    } else if ep.contains(to) {
                        list.push(Move::new(Pawn, from, to).with_en_passant(),
                                  capture_score(Pawn, Pawn));
                    }
                }
            }
        }

        // castling
        if !captures_only {
            for castle in CASTLES[us as usize].iter() {
                if self.castling & castle.flag != 0
                    && castle.between.iter().all(|&sq| empty.contains(sq))
                    && castle.path.iter().all(|&sq| !self.is_attacked(sq, !us)) {
                    quiet(&mut list,
                          Move::new(King, castle.path[0], castle.king_to).with_castle());
                }
            }
        }

        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legal_count(fen: &str) -> usize {
        let mut pos: Position = fen.parse().unwrap();
        let list = pos.generate_moves();
        list.iter().filter(|&mv| {
            let legal = pos.make_move(mv);
            if legal {
                pos.unmake_move();
            }
            legal
        }).count()
    }

    #[test]
    fn start_position() {
        assert_eq!(Position::new().generate_moves().len(), 20);
        assert_eq!(legal_count(START_FEN), 20);
        assert_eq!(legal_count(
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"), 20);
        assert!(Position::new().generate_captures().is_empty());
    }

    #[test]
    fn promotions_and_en_passant() {
        let pos: Position = "1n2k3/P7/8/3pP3/8/8/8/4K3 w - d6 0 2".parse().unwrap();
        let list = pos.generate_moves();
        let promos: Vec<_> = list.iter().filter(|m| m.is_promotion()).collect();
        assert_eq!(promos.len(), 8);
        assert_eq!(promos.iter().filter(|m| m.is_capture()).count(), 4);
        assert!(list.contains(Move::new(Pawn, Square::E5, Square::D6).with_en_passant()));

        let caps = pos.generate_captures();
        assert_eq!(caps.len(), 9);
        assert!(caps.iter().all(|m| m.is_capture() || m.is_promotion()));
    }

    #[test]
    fn castling() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let list = fen.parse::<Position>().unwrap().generate_moves();
        assert_eq!(list.iter().filter(|m| m.is_castle()).count(), 2);

        // f1 attacked: no king side castling
        let list = "r3kr2/8/8/8/8/8/8/R3K2R w KQq - 0 1".parse::<Position>().unwrap()
            .generate_moves();
        assert_eq!(list.iter().filter(|m| m.is_castle()).count(), 1);

        // b1 occupied: no queen side castling, even though b1 need not be safe
        let list = "r3k2r/8/8/8/8/8/8/RN2K2R w KQ - 0 1".parse::<Position>().unwrap()
            .generate_moves();
        assert_eq!(list.iter().filter(|m| m.is_castle()).count(), 1);
    }

    #[test]
    fn ordering_scores() {
        let pos: Position = "4k3/8/8/3q4/4P3/8/8/4K2Q w - - 0 1".parse().unwrap();
        let list = pos.generate_moves();
        let pxq = list.as_slice().iter()
            .find(|m| m.mv == Move::new(Pawn, Square::E4, Square::D5).with_capture(Queen))
            .unwrap();
        assert_eq!(pxq.score, 915 - 1 + CAPTURE_SCORE);
        assert!(list.as_slice().iter().filter(|m| !m.mv.is_capture()).all(|m| m.score == 0));
    }

    #[test]
    fn killer_scores() {
        let mut pos = Position::new();
        let first = Move::new(Knight, Square::G1, Square::F3);
        let second = Move::new(Knight, Square::B1, Square::C3);
        pos.store_killer(second);
        pos.store_killer(first);

        let list = pos.generate_moves();
        for m in list.as_slice() {
            let expected = if m.mv == first {
                FIRST_KILLER_SCORE
            } else if m.mv == second {
                SECOND_KILLER_SCORE
            } else {
                0
            };
            assert_eq!(m.score, expected, "{:#}", m.mv);
        }
        assert_eq!(FIRST_KILLER_SCORE, 800_000);
        assert_eq!(SECOND_KILLER_SCORE, 750_000);
    }

    #[test]
    fn promotion_scores() {
        let pos: Position = "1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        let list = pos.generate_moves();
        for &p in PROMOTIONS.iter() {
            let push = Move::new(Pawn, Square::A7, Square::A8).with_promotion(p);
            let m = list.as_slice().iter().find(|m| m.mv == push).unwrap();
            assert_eq!(m.score, PROMOTION_SCORE + p.value());

            let capture = Move::new(Pawn, Square::A7, Square::B8)
                .with_promotion(p).with_capture(Knight);
            let m = list.as_slice().iter().find(|m| m.mv == capture).unwrap();
            assert_eq!(m.score, capture_score(Knight, Pawn));
        }

        // promotions to a queen or rook outrank taking a knight with the pawn
        let mut list = pos.generate_captures();
        assert_eq!(list.select_next(0),
                   Some(Move::new(Pawn, Square::A7, Square::A8).with_promotion(Queen)));
        assert_eq!(list.select_next(1),
                   Some(Move::new(Pawn, Square::A7, Square::A8).with_promotion(Rook)));
        assert!(list.select_next(2).unwrap().is_capture());
    }
}
