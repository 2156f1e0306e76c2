//! Reading and writing positions in Forsyth-Edwards Notation
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::str::FromStr;
use std::fmt;
use super::*;

/// The standard starting position
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl FromStr for Position {
    type Err = Error;

    /// Parses a FEN string. The half move clock and move number may be left out.
    fn from_str(s: &str) -> Result<Position, Error> {
        let mut builder = PositionBuilder::new();
        let mut fields = s.split_whitespace();

        // parse the board
        let board = fields.next().ok_or(Error::ParseError)?;
        let mut r = Rank::COUNT;
        for row in board.split('/') {
            r = r.checked_sub(1).ok_or(Error::ParseError)?;
            let mut f = 0;
            for c in row.chars() {
                match c {
                    '1'..='8' => f += c as usize - '0' as usize,
                    _ if f >= File::COUNT => return Err(Error::ParseError),
                    _ => {
                        let color = if c.is_ascii_uppercase() { White } else { Black };
                        let piece: Piece = c.to_string().parse()?;
                        builder.piece(color, piece,
                            Square::from_coord(File::try_from(f)?, Rank::try_from(r)?));
                        f += 1;
                    }
                }
                if f > File::COUNT {
                    return Err(Error::ParseError);
                }
            }
            if f != File::COUNT {
                return Err(Error::ParseError);
            }
        }
        if r != 0 {
            return Err(Error::ParseError);
        }

        // parse the turn
        builder.turn(fields.next().ok_or(Error::ParseError)?.parse()?);

        // parse the castling flags
        match fields.next() {
            Some("-") => {},
            Some(castling_flags) => {
                for c in castling_flags.chars() {
                    builder.castling(match c {
                        'K' => WHITE_KING_SIDE,
                        'Q' => WHITE_QUEEN_SIDE,
                        'k' => BLACK_KING_SIDE,
                        'q' => BLACK_QUEEN_SIDE,
                        _ => return Err(Error::ParseError),
                    });
                }
            },
            None => return Err(Error::ParseError),
        }

        // parse en passant square
        match fields.next() {
            Some("-") => {},
            Some(ep_square) => { builder.en_passant_square(Some(ep_square.parse()?)); },
            None => return Err(Error::ParseError),
        }

        // parse half move clock and move number, if present
        if let Some(plies) = fields.next() {
            builder.draw_plies(plies.parse().map_err(|_| Error::ParseError)?);
        }
        if let Some(move_num) = fields.next() {
            builder.move_number(move_num.parse().map_err(|_| Error::ParseError)?);
        }

        builder.validate()
    }
}

impl Position {
    /// Converts the position to a FEN string
    pub fn to_fen(&self) -> String {
        // the board
        let mut board = String::new();
        for r in (0..Rank::COUNT).rev() {
            let mut empty = 0;
            for f in 0..File::COUNT {
                let sq = Square::from_coord(
                    File::try_from(f).expect("INFALLIBLE"),
                    Rank::try_from(r).expect("INFALLIBLE"),
                );
                match self.piece_at(sq) {
                    Some((c, p)) => {
                        if empty > 0 {
                            board += &empty.to_string();
                            empty = 0;
                        }
                        board.push(p.to_char(c));
                    },
                    None => empty += 1,
                }
            }
            if empty > 0 {
                board += &empty.to_string();
            }
            if r > 0 {
                board.push('/');
            }
        }

        // castling rights
        let mut castling: String = [
            (WHITE_KING_SIDE, 'K'), (WHITE_QUEEN_SIDE, 'Q'),
            (BLACK_KING_SIDE, 'k'), (BLACK_QUEEN_SIDE, 'q'),
        ].iter().filter(|(flag, _)| self.castling & flag != 0).map(|&(_, c)| c).collect();
        if castling.is_empty() {
            castling.push('-');
        }

        // en passant square
        let ep_square = match self.ep_square {
            Some(sq) => sq.to_string(),
            None => "-".to_string(),
        };

        format!("{} {} {} {} {} {}", board, self.turn, castling, ep_square,
                                     self.draw_plies, self.move_number())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let fens = [
            START_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq c6 0 2",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 b - - 13 37",
        ];
        for fen in fens.iter() {
            let pos: Position = fen.parse().unwrap();
            assert_eq!(&pos.to_fen(), fen);
            assert_eq!(&pos.to_string(), fen);
        }
    }

    #[test]
    fn optional_counters() {
        let pos: Position = "4k3/8/8/8/8/8/8/4K3 b - -".parse().unwrap();
        assert_eq!(pos.draw_plies(), 0);
        assert_eq!(pos.move_number(), 1);
        assert_eq!(pos.game_ply(), 1);
    }

    #[test]
    fn bad_fens() {
        let bad = [
            "",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1",
            "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNX w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQxq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq z9 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - x 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w",
        ];
        for fen in bad.iter() {
            assert_eq!(fen.parse::<Position>(), Err(Error::ParseError), "{}", fen);
        }
        assert_eq!("8/8/8/8/8/8/8/4K3 w - - 0 1".parse::<Position>(),
                   Err(Error::InvalidKingCount));
        assert_eq!("4k3/8/8/8/8/8/8/4K3 w - - 0 18446744073709551615".parse::<Position>(),
                   Err(Error::InvalidMoveCounter));
        assert_eq!("4k3/8/8/8/8/8/8/4K3 w - - 18446744073709551615 1".parse::<Position>(),
                   Err(Error::InvalidMoveCounter));
    }
}
