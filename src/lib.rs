//! cep, a bitboard chess engine speaking the xboard protocol
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
#![warn(missing_docs, missing_debug_implementations, unused_extern_crates)]
#![warn(clippy::unimplemented, clippy::option_unwrap_used, clippy::result_unwrap_used)]

pub mod chess;
pub mod engine;
pub mod protocol;
pub mod config;

/// Builds the attack, hashing and evaluation tables up front, so the first search doesn't pay
/// for them.
pub fn init() {
    chess::init();
    engine::init();
}
