//! The Transposition Table
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::cmp::max;
use std::convert::TryFrom;
use std::mem::size_of;
use crate::chess::{Move, Position, Zobrist};
use crate::engine::Score;

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Indicates how the score in a transposition table entry relates to the true score.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Bound {
    /// No move raised alpha; the true score is at most the stored one
    Alpha,
    /// A move failed high; the true score is at least the stored one
    Beta,
    /// The stored score is exact
    Exact,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// An entry in the transposition table.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HashEntry {
    zobrist: Zobrist,
    best_move: Option<Move>,
    depth: u8,
    bound: Bound,
    score: Score,
}

impl HashEntry {
    /// The full key, which tells apart positions sharing a slot
    pub fn zobrist(&self) -> Zobrist {
        self.zobrist
    }

    #[allow(missing_docs)]
    pub fn best_move(&self) -> Option<Move> {
        self.best_move
    }

    /// Remaining depth of the search that stored the entry
    pub fn depth(&self) -> usize {
        self.depth as usize
    }

    #[allow(missing_docs)]
    pub fn bound(&self) -> Bound {
        self.bound
    }

    /// The stored score, relative to the node the entry was stored for
    pub fn score(&self) -> Score {
        self.score
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The result of looking up a position in the transposition table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Probe {
    /// A score that can be returned without searching, if the entry was deep enough and its bound
    /// allows it
    pub score: Option<Score>,
    /// The best move stored for the position, for move ordering
    pub best_move: Option<Move>,
}

/// Converts a mate score from distance-to-root to distance-to-node
fn to_node(score: Score, ply: usize) -> Score {
    if !score.is_mate() {
        score
    } else if score > Score::draw() {
        score + ply as i32
    } else {
        score - ply as i32
    }
}

/// Converts a mate score from distance-to-node back to distance-to-root
fn to_root(score: Score, ply: usize) -> Score {
    if !score.is_mate() {
        score
    } else if score > Score::draw() {
        score - ply as i32
    } else {
        score + ply as i32
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// A single-slot, always-replace transposition table.
#[derive(Debug)]
pub struct HashTable(Vec<Option<HashEntry>>);

impl HashTable {
    /// Table size used when nothing else is configured, in bytes
    pub const DEFAULT_SIZE: usize = 32 << 20;

    /// Largest table size accepted from a client or the config file, in megabytes
    pub const MAX_SIZE_MB: usize = 4096;

    /// Creates a table that uses about `size` bytes
    pub fn new(size: usize) -> HashTable {
        let len = max(1, size / size_of::<Option<HashEntry>>());
        HashTable(vec![None; len])
    }

    /// Returns the number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the table cannot hold any entry. Never the case.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the approximate memory used by the table, in bytes
    pub fn size(&self) -> usize {
        self.0.len() * size_of::<Option<HashEntry>>()
    }

    fn index(&self, zobrist: Zobrist) -> usize {
        (u64::from(zobrist) % self.0.len() as u64) as usize
    }

    /// Returns the entry stored for `zobrist`, if any
    pub fn get(&self, zobrist: Zobrist) -> Option<HashEntry> {
        match self.0[self.index(zobrist)] {
            Some(entry) if entry.zobrist == zobrist => Some(entry),
            _ => None,
        }
    }

    /// Stores the result of searching the position with hash `zobrist` at search ply `ply`,
    /// replacing whatever was in its slot.
    pub fn store(&mut self,
        zobrist: Zobrist, best_move: Option<Move>,
        depth: usize, score: Score, bound: Bound, ply: usize)
    {
        let index = self.index(zobrist);
        self.0[index] = Some(HashEntry {
            zobrist,
            best_move,
            depth: u8::try_from(depth).unwrap_or(u8::max_value()),
            bound,
            score: to_node(score, ply),
        });
    }

    /// Looks up the position with hash `zobrist` for a search of `depth` with the window
    /// `alpha`..`beta` at search ply `ply`.
    pub fn probe(&self, zobrist: Zobrist, depth: usize, alpha: Score, beta: Score, ply: usize)
    -> Probe {
        let entry = match self.get(zobrist) {
            Some(entry) => entry,
            None => return Probe::default(),
        };

        let mut probe = Probe { score: None, best_move: entry.best_move };
        if entry.depth() >= depth {
            let score = to_root(entry.score, ply);
            probe.score = match entry.bound {
                Bound::Exact => Some(score),
                Bound::Alpha if score <= alpha => Some(alpha),
                Bound::Beta if score >= beta => Some(beta),
                _ => None,
            };
        }

        probe
    }

    /// Returns the best move stored for `zobrist`, if the entry holds an exact score
    pub fn pv_move(&self, zobrist: Zobrist) -> Option<Move> {
        match self.get(zobrist) {
            Some(entry) if entry.bound == Bound::Exact => entry.best_move,
            _ => None,
        }
    }

    /// Follows the exact entries from `pos` to build the principal variation, up to `depth` moves
    /// long. `pos` is the same again on return.
    pub fn pv_line(&self, pos: &mut Position, depth: usize) -> Vec<Move> {
        let mut line = Vec::with_capacity(depth);

        while line.len() < depth {
            match self.pv_move(pos.zobrist()) {
                Some(mv) if pos.generate_moves().contains(mv) && pos.make_move(mv) => {
                    line.push(mv);
                },
                _ => break,
            }
        }
        for _ in 0..line.len() {
            pos.unmake_move();
        }

        line
    }

    /// Removes every entry
    pub fn clear(&mut self) {
        for entry in self.0.iter_mut() {
            *entry = None;
        }
    }
}

impl Default for HashTable {
    fn default() -> Self {
        HashTable::new(Self::DEFAULT_SIZE)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> HashTable {
        HashTable::new(1 << 20)
    }

    #[test]
    fn sizes() {
        let table = HashTable::new(HashTable::DEFAULT_SIZE);
        assert!(table.size() <= HashTable::DEFAULT_SIZE);
        assert!(table.size() > HashTable::DEFAULT_SIZE / 2);
        assert_eq!(HashTable::new(0).len(), 1);
    }

    #[test]
    fn exact_entries() {
        let mut table = table();
        let pos = Position::new();
        let z = pos.zobrist();
        let (alpha, beta) = (-Score::infinity(), Score::infinity());

        table.store(z, None, 5, Score::from(37), Bound::Exact, 0);
        assert_eq!(table.probe(z, 5, alpha, beta, 0).score, Some(Score::from(37)));
        assert_eq!(table.probe(z, 1, alpha, beta, 0).score, Some(Score::from(37)));
        assert_eq!(table.probe(z, 6, alpha, beta, 0).score, None);

        let mut other = pos.clone();
        assert!(other.make_move(other.parse_move("e2e4").unwrap()));
        assert_eq!(table.probe(other.zobrist(), 0, alpha, beta, 0), Probe::default());
    }

    #[test]
    fn bounds() {
        let mut table = table();
        let pos = Position::new();
        let z = pos.zobrist();
        let mv = pos.parse_move("g1f3").unwrap();
        let s = Score::from;

        table.store(z, Some(mv), 3, s(50), Bound::Beta, 0);
        assert_eq!(table.probe(z, 3, s(0), s(40), 0).score, Some(s(40)));
        assert_eq!(table.probe(z, 3, s(0), s(60), 0).score, None);
        assert_eq!(table.probe(z, 3, s(0), s(60), 0).best_move, Some(mv));
        assert_eq!(table.probe(z, 4, s(0), s(40), 0), Probe { score: None, best_move: Some(mv) });

        table.store(z, None, 3, s(-50), Bound::Alpha, 0);
        assert_eq!(table.probe(z, 3, s(-40), s(60), 0).score, Some(s(-40)));
        assert_eq!(table.probe(z, 3, s(-60), s(60), 0).score, None);
        assert_eq!(table.pv_move(z), None);
    }

    #[test]
    fn mate_scores_are_relative_to_node() {
        let mut table = table();
        let z = Position::new().zobrist();
        let (alpha, beta) = (-Score::infinity(), Score::infinity());

        // mate found 3 plies from the root, stored at ply 1 (mate in 2 from there)
        table.store(z, None, 4, Score::mates_in(3), Bound::Exact, 1);
        assert_eq!(table.get(z).unwrap().score(), Score::mates_in(2));
        assert_eq!(table.probe(z, 4, alpha, beta, 1).score, Some(Score::mates_in(3)));
        assert_eq!(table.probe(z, 4, alpha, beta, 5).score, Some(Score::mates_in(7)));

        table.store(z, None, 4, Score::mated_in(4), Bound::Exact, 2);
        assert_eq!(table.probe(z, 4, alpha, beta, 0).score, Some(Score::mated_in(2)));
    }

    #[test]
    fn principal_variation() {
        let mut table = table();
        let mut pos = Position::new();
        let moves = ["e2e4", "e7e5", "g1f3"];

        for m in moves.iter() {
            let mv = pos.parse_move(m).unwrap();
            table.store(pos.zobrist(), Some(mv), 1, Score::draw(), Bound::Exact, 0);
            assert!(pos.make_move(mv));
        }
        // a move that isn't legal where it is stored ends the line
        let bogus = Position::new().parse_move("d2d4").unwrap();
        table.store(pos.zobrist(), Some(bogus), 1, Score::draw(), Bound::Exact, 0);
        for _ in 0..moves.len() {
            pos.unmake_move();
        }

        let start = pos.clone();
        let line: Vec<String> = table.pv_line(&mut pos, 10).iter().map(|m| m.to_string()).collect();
        assert_eq!(line, moves);
        assert_eq!(pos, start);
        assert_eq!(table.pv_line(&mut pos, 2).len(), 2);

        table.clear();
        assert!(table.pv_line(&mut pos, 10).is_empty());
    }
}
