//! The engine
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::cmp::{max, min};
use std::time::{Duration, Instant};
use log::debug;
use crate::chess::{Position, Move, MAX_DEPTH};
use crate::protocol::{Protocol, SearchAction, SearchLimits};

mod eval;
pub use eval::{Score, evaluate, evaluate_for_mover};

pub mod hash;
use hash::HashTable;

mod search;

/// The search samples the clock and the input once per this many nodes
const CHECK_INTERVAL: u64 = 0x1000;

/// A new iteration is started only if this many times the last one still fits in the time left
const ITERATION_FACTOR: u32 = 7;

/// Builds the evaluation tables. They are also built on first use.
pub fn init() {
    eval::init();
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Thinking output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thinking {
    score: Score,
    depth: usize,
    time: Duration,
    nodes: u64,
    fail_high: u64,
    fail_high_first: u64,
    pv: Vec<Move>,
}

impl Thinking {
    fn new() -> Self {
        Thinking {
            score: -Score::infinity(),
            depth: 0,
            time: Duration::from_secs(0),
            nodes: 0,
            fail_high: 0,
            fail_high_first: 0,
            pv: Vec::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_pv(score: Score, depth: usize, nodes: u64, pv: Vec<Move>) -> Self {
        Thinking { score, depth, nodes, pv, ..Thinking::new() }
    }

    /// Returns the estimated score for the principal variation, from the point of view of the side
    /// to move.
    pub fn score(&self) -> Score {
        self.score
    }

    /// Returns the search depth that was reached.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the amount of time used for the search.
    pub fn time(&self) -> Duration {
        self.time
    }

    /// Returns the time used in centiseconds, as xboard expects it.
    pub fn centiseconds(&self) -> u64 {
        self.time.as_millis() as u64 / 10
    }

    /// Returns the number of nodes searched.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Returns the percentage of beta cutoffs that came from the first move searched, a measure
    /// of how well moves were ordered.
    pub fn efficiency(&self) -> u64 {
        if self.fail_high == 0 {
            0
        } else {
            100 * self.fail_high_first / self.fail_high
        }
    }

    /// Returns the principal variation.
    pub fn pv(&self) -> &[Move] {
        &self.pv
    }

    /// Returns the best move found in the search.
    pub fn best_move(&self) -> Option<Move> {
        self.pv.first().copied()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// The engine
#[derive(Debug)]
pub struct Engine<T> where T: Protocol {
    protocol: T,
    table: HashTable,
    hash_size: usize,

    start_time: Instant,
    stop_time: Option<Instant>,
    stop: bool,
    abort: bool,

    nodes: u64,
    fail_high: u64,
    fail_high_first: u64,
}

impl<T> Engine<T> where T: Protocol {
    /// Creates a new Engine.
    pub fn new(protocol: T) -> Self {
        let hash_size = protocol.hash_size();
        Engine {
            protocol,
            table: HashTable::new(hash_size),
            hash_size,
            start_time: Instant::now(),
            stop_time: None,
            stop: false,
            abort: false,
            nodes: 0,
            fail_high: 0,
            fail_high_first: 0,
        }
    }

    /// Returns the protocol the engine talks through.
    pub fn protocol(&self) -> &T {
        &self.protocol
    }

    /// Stops the engine, giving back its protocol.
    pub fn into_protocol(self) -> T {
        self.protocol
    }

    /// Returns the transposition table.
    pub fn table(&self) -> &HashTable {
        &self.table
    }

    /// Runs the engine until the protocol tells it to exit.
    pub fn run(&mut self) {
        while self.protocol.wait_for_search() {
            let hash_size = self.protocol.hash_size();
            if hash_size != self.hash_size {
                debug!("resizing hash table to {} bytes", hash_size);
                self.table = HashTable::new(hash_size);
                self.hash_size = hash_size;
            }

            let mut pos = self.protocol.position().clone();
            let limits = self.protocol.limits();

            if let Some(thinking) = self.think(&mut pos, limits) {
                self.protocol.send_move(&thinking);
            }
        }
    }

    /// Searches `pos` with iterative deepening and returns the result of the deepest iteration
    /// that completed. Returns `None` if the search was aborted.
    ///
    /// If no iteration completed, the first legal move is returned so that there is always a move
    /// to play when one exists.
    pub fn think(&mut self, pos: &mut Position, limits: SearchLimits) -> Option<Thinking> {
        self.start_time = Instant::now();
        self.stop_time = limits.time.and_then(|time| self.start_time.checked_add(time));
        self.stop = false;
        self.abort = false;
        self.nodes = 0;
        self.fail_high = 0;
        self.fail_high_first = 0;
        pos.clear_search_state();

        debug!("searching: {}", pos);

        let mut thinking = Thinking::new();
        let max_depth = max(1, min(limits.depth, MAX_DEPTH - 1));

        for depth in 1..=max_depth {
            let iteration_start = Instant::now();
            let score = self.alpha_beta(pos, -Score::infinity(), Score::infinity(), depth, true);
            let iteration_time = iteration_start.elapsed();

            if self.stop {
                break;
            }

            thinking = Thinking {
                score,
                depth,
                time: self.start_time.elapsed(),
                nodes: self.nodes,
                fail_high: self.fail_high,
                fail_high_first: self.fail_high_first,
                pv: self.table.pv_line(pos, depth),
            };
            debug!("depth {} score {} nodes {} pv {:?}", depth, score, self.nodes,
                thinking.pv.iter().map(|mv| mv.to_string()).collect::<Vec<_>>());
            self.protocol.send_thinking(&thinking);

            if let Some(stop_time) = self.stop_time {
                if self.start_time + iteration_time * ITERATION_FACTOR > stop_time {
                    break;
                }
            }
        }

        if self.abort {
            return None;
        }

        thinking.time = self.start_time.elapsed();
        thinking.nodes = self.nodes;

        if thinking.pv.is_empty() {
            let first_legal = pos.generate_moves().iter().find(|&mv| {
                let legal = pos.make_move(mv);
                if legal {
                    pos.unmake_move();
                }
                legal
            });
            thinking.pv.extend(first_legal);
        }

        Some(thinking)
    }

    /// Counts a visited node, checking the clock and the input every so often.
    fn visit_node(&mut self) {
        if self.nodes % CHECK_INTERVAL == 0 {
            self.check_up();
        }
        self.nodes += 1;
    }

    /// Stops the search if time is up or the protocol asks for it.
    fn check_up(&mut self) {
        if let Some(stop_time) = self.stop_time {
            if Instant::now() >= stop_time {
                self.stop = true;
            }
        }

        match self.protocol.check_input() {
            Some(SearchAction::Stop) => self.stop = true,
            Some(SearchAction::Abort) => {
                self.stop = true;
                self.abort = true;
            },
            None => { },
        }
    }
}
