//! Supported chess protocols
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use std::time::Duration;
use crate::engine::Thinking;
use crate::chess::{Position, MAX_DEPTH};

////////////////////////////////////////////////////////////////////////////////////////////////////
/// An action that should be taken regarding the current search.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SearchAction {
    /// The engine should stop thinking and call
    /// [send_move](trait.Protocol.html#tymethod.send_move).
    Stop,

    /// The engine should stop thinking, but should *not* call
    /// [send_move](trait.Protocol.html#tymethod.send_move).
    Abort,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// How long and how deep the engine may search.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SearchLimits {
    /// The deepest iteration to search
    pub depth: usize,
    /// Time available for the search, or `None` to search until told to stop
    pub time: Option<Duration>,
}

impl SearchLimits {
    /// Time per move used when nothing else is configured
    pub const DEFAULT_TIME: Duration = Duration::from_millis(12_000);

    /// Searches until stopped, up to the deepest supported depth
    pub fn infinite() -> Self {
        SearchLimits { depth: MAX_DEPTH - 1, time: None }
    }

    /// Searches to `depth` without a time limit
    pub fn depth(depth: usize) -> Self {
        SearchLimits { depth, time: None }
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits { depth: MAX_DEPTH - 1, time: Some(Self::DEFAULT_TIME) }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
/// Trait used for structures that implement the engine side of a chess protocol
pub trait Protocol {
    /// Waits until the engine should begin searching or should exit.
    ///
    /// Returns true if the engine should begin searching, or false if it should exit.
    fn wait_for_search(&mut self) -> bool where Self: Sized;

    /// Sends the engine's move to the client and plays it in the protocol's game.
    fn send_move(&mut self, thinking: &Thinking);

    /// If supported by the protocol, send the engine's thinking to the client.
    fn send_thinking(&mut self, thinking: &Thinking);

    /// If supported by the protocol, send a debug message to the client.
    fn send_debug_msg(&mut self, msg: &str);

    /// Allows the protocol to check the input during a search.
    ///
    /// If the search should end for any reason, returns how it should end.
    fn check_input(&mut self) -> Option<SearchAction> where Self: Sized;

    /// Returns the position to search.
    fn position(&self) -> &Position;

    /// Returns the limits for the next search.
    fn limits(&self) -> SearchLimits;

    /// Returns the requested size of the transposition table, in bytes.
    fn hash_size(&self) -> usize;
}

pub mod io;
pub mod xboard;
pub mod console;
