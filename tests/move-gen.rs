//! Tests the move generator against known variation counts
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use cep::chess::{variations, Position};

fn count(fen: &str, depth: usize) -> usize {
    println!("\n{}", fen);
    let mut pos: Position = fen.parse().unwrap();
    let before = pos.clone();

    let count = variations::count(&mut pos, depth);
    println!("Depth {} total:\t{:12}", depth, count);
    assert_eq!(pos, before, "position not restored after counting");

    count
}

fn check_all(cases: &[(&str, usize)], depth: usize) {
    for &(fen, expected) in cases {
        assert_eq!(count(fen, depth), expected, "{}", fen);
    }
}

mod standard {
    use super::count;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    #[test]
    fn start_position() {
        assert_eq!(count(START, 4), 197_281);
    }

    #[test]
    #[ignore]
    fn start_position_deep() {
        assert_eq!(count(START, 6), 119_060_324);
    }

    #[test]
    fn kiwipete() {
        assert_eq!(count(KIWIPETE, 3), 97_862);
    }

    #[test]
    #[ignore]
    fn kiwipete_deep() {
        assert_eq!(count(KIWIPETE, 5), 193_690_690);
    }

    #[test]
    fn rook_endgame() {
        assert_eq!(count("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", 5), 674_624);
    }

    #[test]
    fn promotions_and_castling() {
        assert_eq!(
            count("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1", 4),
            422_333
        );
        assert_eq!(
            count("r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1", 4),
            422_333
        );
    }

    #[test]
    fn discovered_checks() {
        assert_eq!(count("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8", 3), 62_379);
    }

    #[test]
    fn middle_game() {
        assert_eq!(
            count("r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10", 3),
            89_890
        );
    }
}

#[test]
fn castling() {
    check_all(&[
        ("4k3/8/8/8/8/8/8/4K2R w K - 0 1", 764_643),
        ("4k3/8/8/8/8/8/8/R3K3 w Q - 0 1", 846_648),
        ("4k2r/8/8/8/8/8/8/4K3 w k - 0 1", 899_442),
        ("r3k3/8/8/8/8/8/8/4K3 w q - 0 1", 1_001_523),
        ("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1", 2_788_982),
        ("r3k2r/8/8/8/8/8/8/4K3 w kq - 0 1", 3_517_770),
        ("8/8/8/8/8/8/6k1/4K2R w K - 0 1", 185_867),
        ("8/8/8/8/8/8/1k6/R3K3 w Q - 0 1", 413_018),
        ("4k2r/6K1/8/8/8/8/8/8 w k - 0 1", 179_869),
        ("r3k3/1K6/8/8/8/8/8/8 w q - 0 1", 367_724),
        ("4k3/8/8/8/8/8/8/4K2R b K - 0 1", 899_442),
        ("4k3/8/8/8/8/8/8/R3K3 b Q - 0 1", 1_001_523),
        ("4k2r/8/8/8/8/8/8/4K3 b k - 0 1", 764_643),
        ("r3k3/8/8/8/8/8/8/4K3 b q - 0 1", 846_648),
    ], 6);
}

#[test]
#[ignore]
fn castling_both_sides() {
    check_all(&[
        ("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", 179_862_938),
        ("r3k2r/8/8/8/8/8/8/1R2K2R w Kkq - 0 1", 195_629_489),
        ("r3k2r/8/8/8/8/8/8/2R1K2R w Kkq - 0 1", 184_411_439),
        ("r3k2r/8/8/8/8/8/8/R3K1R1 w Qkq - 0 1", 189_224_276),
        ("1r2k2r/8/8/8/8/8/8/R3K2R w KQk - 0 1", 198_328_929),
        ("2r1k2r/8/8/8/8/8/8/R3K2R w KQk - 0 1", 185_959_088),
        ("r3k1r1/8/8/8/8/8/8/R3K2R w KQq - 0 1", 190_755_813),
        ("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1", 179_862_938),
    ], 6);
}

#[test]
fn knights() {
    check_all(&[
        ("8/1k6/8/5N2/8/4n3/8/2K5 w - - 0 1", 2_594_412),
        ("K7/8/2n5/1n6/8/8/8/k6N w - - 0 1", 588_695),
        ("k7/8/2N5/1N6/8/8/8/K6n w - - 0 1", 688_780),
        ("8/1k6/8/5N2/8/4n3/8/2K5 b - - 0 1", 3_147_566),
        ("K7/8/2n5/1n6/8/8/8/k6N b - - 0 1", 688_780),
        ("k7/8/2N5/1N6/8/8/8/K6n b - - 0 1", 588_695),
    ], 6);
}

#[test]
fn sliders() {
    check_all(&[
        ("k7/B7/1B6/1B6/8/8/8/K6b w - - 0 1", 7_881_673),
        ("K7/b7/1b6/1b6/8/8/8/k6B w - - 0 1", 7_382_896),
        ("6kq/8/8/8/8/8/8/7K w - - 0 1", 391_507),
        ("6KQ/8/8/8/8/8/8/7k b - - 0 1", 391_507),
        ("K7/8/8/3Q4/4q3/8/8/7k w - - 0 1", 3_370_175),
        ("6qk/8/8/8/8/8/8/7K b - - 0 1", 419_369),
    ], 6);
}

#[test]
#[ignore]
fn rooks() {
    check_all(&[
        ("7k/RR6/8/8/8/8/rr6/7K w - - 0 1", 44_956_585),
        ("R6r/8/8/2K5/5k2/8/8/r6R w - - 0 1", 525_169_084),
        ("R6r/8/8/2K5/5k2/8/8/r6R b - - 0 1", 524_966_748),
    ], 6);
}

#[test]
fn pawns() {
    check_all(&[
        ("8/8/8/8/8/K7/P7/k7 w - - 0 1", 6_249),
        ("K7/p7/k7/8/8/8/8/8 w - - 0 1", 2_343),
        ("8/2k1p3/3pP3/3P2K1/8/8/8/8 w - - 0 1", 34_834),
        ("8/2k1p3/3pP3/3P2K1/8/8/8/8 b - - 0 1", 34_822),
        ("8/8/8/8/8/4k3/4P3/4K3 w - - 0 1", 11_848),
        ("8/8/3k4/3p4/3P4/3K4/8/8 w - - 0 1", 53_138),
        ("8/3k4/3p4/8/3P4/3K4/8/8 w - - 0 1", 157_093),
        ("k7/8/3p4/8/3P4/8/8/7K b - - 0 1", 21_104),
        ("7k/3p4/8/8/3P4/8/8/K7 b - - 0 1", 32_167),
        ("k7/8/8/7p/6P1/8/8/K7 w - - 0 1", 41_874),
        ("k7/8/8/3p4/4p3/8/8/7K b - - 0 1", 22_579),
        ("k7/7p/8/8/8/8/6P1/K7 w - - 0 1", 55_338),
        ("3k4/3pp3/8/8/8/8/3PP3/3K4 w - - 0 1", 199_002),
    ], 6);
}

#[test]
fn promotions() {
    check_all(&[
        ("8/Pk6/8/8/8/8/6Kp/8 w - - 0 1", 1_030_499),
        ("8/Pk6/8/8/8/8/6Kp/8 b - - 0 1", 1_030_499),
    ], 6);
}

#[test]
#[ignore]
fn promotions_with_captures() {
    check_all(&[
        ("n1n5/1Pk5/8/8/8/8/5Kp1/5N1N w - - 0 1", 37_665_329),
        ("8/PPPk4/8/8/8/8/4Kppp/8 w - - 0 1", 28_859_283),
        ("n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1", 71_179_139),
    ], 6);
}
