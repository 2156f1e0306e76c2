//! Detection of the end of the game
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::fmt;
use super::*;
use Piece::*;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The ways a game can end
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameResult {
    /// Black is checkmated
    WhiteMates,
    /// White is checkmated
    BlackMates,
    /// The side to move has no legal move but is not in check
    Stalemate,
    /// More than a hundred plies without a capture or pawn move
    FiftyMoves,
    /// The same position occurred three times
    Repetition,
    /// Neither side can possibly mate
    InsufficientMaterial,
}

impl GameResult {
    /// Returns the score in PGN form: `1-0`, `0-1` or `1/2-1/2`
    pub fn score(self) -> &'static str {
        match self {
            GameResult::WhiteMates => "1-0",
            GameResult::BlackMates => "0-1",
            _ => "1/2-1/2",
        }
    }

    /// Returns the reason for the result, as shown in braces after the score
    pub fn reason(self) -> &'static str {
        match self {
            GameResult::WhiteMates => "white mates",
            GameResult::BlackMates => "black mates",
            GameResult::Stalemate => "stalemate",
            GameResult::FiftyMoves => "fifty move rule",
            GameResult::Repetition => "3-fold repetition",
            GameResult::InsufficientMaterial => "insufficient material",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{} {{{}}}", self.score(), self.reason()))
    }
}

/// Returns `true` if there is enough material on the board for either side to mate
pub fn enough_material(pos: &Position) -> bool {
    if !(pos.occupied_by_type(Pawn) | pos.occupied_by_type(Queen) | pos.occupied_by_type(Rook))
        .is_empty() {
        return true;
    }

    let bishops = pos.occupied_by_type(Bishop).len();
    let knights = pos.occupied_by_type(Knight).len();
    bishops > 1 || knights > 1 || (bishops > 0 && knights > 0)
}

/// Returns `true` if the side to move has at least one legal move
pub fn has_legal_move(pos: &mut Position) -> bool {
    for mv in pos.generate_moves().iter() {
        if pos.make_move(mv) {
            pos.unmake_move();
            return true;
        }
    }
    false
}

/// Returns the result if the game is over in `pos`, or `None` if it goes on
pub fn result(pos: &mut Position) -> Option<GameResult> {
    if pos.draw_plies() > 100 {
        return Some(GameResult::FiftyMoves);
    }
    if pos.repetitions() + 1 >= 3 {
        return Some(GameResult::Repetition);
    }
    if !enough_material(pos) {
        return Some(GameResult::InsufficientMaterial);
    }
    if has_legal_move(pos) {
        return None;
    }

    if pos.in_check() {
        match pos.turn() {
            Color::White => Some(GameResult::BlackMates),
            Color::Black => Some(GameResult::WhiteMates),
        }
    } else {
        Some(GameResult::Stalemate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_of(fen: &str) -> Option<GameResult> {
        result(&mut fen.parse().unwrap())
    }

    #[test]
    fn results() {
        assert_eq!(result_of(START_FEN), None);
        assert_eq!(result_of("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3"),
                   Some(GameResult::BlackMates));
        assert_eq!(result_of("6k1/5ppp/8/8/8/8/8/R5K1 b - - 0 1"), None);
        assert_eq!(result_of("R5k1/5ppp/8/8/8/8/8/6K1 b - - 0 1"),
                   Some(GameResult::WhiteMates));
        assert_eq!(result_of("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1"), Some(GameResult::Stalemate));
        assert_eq!(result_of("7k/8/6K1/8/8/8/8/2N5 b - - 0 1"),
                   Some(GameResult::InsufficientMaterial));
        assert_eq!(result_of("7k/8/6K1/8/8/8/8/2NB4 b - - 0 1"), None);
        assert_eq!(result_of("7k/8/6K1/8/8/8/8/R7 b - - 101 80"), Some(GameResult::FiftyMoves));
    }

    #[test]
    fn repetition() {
        let mut pos = Position::new();
        for _ in 0..2 {
            for mv in &["g1f3", "g8f6", "f3g1", "f6g8"] {
                assert_eq!(result(&mut pos), None);
                let mv = pos.parse_move(mv).unwrap();
                assert!(pos.make_move(mv));
            }
        }
        assert_eq!(result(&mut pos), Some(GameResult::Repetition));
    }

    #[test]
    fn display() {
        assert_eq!(GameResult::WhiteMates.to_string(), "1-0 {white mates}");
        assert_eq!(GameResult::BlackMates.to_string(), "0-1 {black mates}");
        assert_eq!(GameResult::Stalemate.to_string(), "1/2-1/2 {stalemate}");
    }
}
