//! Alpha-beta and quiescence search
//
//  This Source Code Form is subject to the terms of the Mozilla Public
//  License, v. 2.0. If a copy of the MPL was not distributed with this
//  file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
////////////////////////////////////////////////////////////////////////////////////////////////////
use crate::chess::{Position, MAX_DEPTH};
use crate::protocol::Protocol;
use super::{Engine, Score, evaluate_for_mover};
use super::hash::Bound;

/// Depth taken off the search after a null move, on top of the ply itself
const NULL_MOVE_REDUCTION: usize = 3;

impl<T> Engine<T> where T: Protocol {
    /// Searches `pos` to `depth` plies (plus extensions) with the window `alpha`..`beta` and
    /// returns the score from the point of view of the side to move. Scores outside the window
    /// are clamped to it.
    ///
    /// `null_allowed` is `false` right after a null move, so that two are never made in a row.
    pub fn alpha_beta(&mut self,
        pos: &mut Position,
        mut alpha: Score, beta: Score,
        mut depth: usize, null_allowed: bool)
    -> Score {
        if depth == 0 {
            return self.quiescence(pos, alpha, beta);
        }

        self.visit_node();
        if self.stop {
            return Score::draw();
        }

        let ply = pos.ply();
        if ply > 0 && (pos.is_repetition() || pos.fifty_moves()) {
            return Score::draw();
        }
        if ply >= MAX_DEPTH - 1 {
            return evaluate_for_mover(pos);
        }

        // check extension
        let in_check = pos.in_check();
        if in_check {
            depth += 1;
        }

        let probe = self.table.probe(pos.zobrist(), depth, alpha, beta, ply);
        if let Some(score) = probe.score {
            if ply > 0 {
                return score;
            }
        }

        if null_allowed && !in_check && ply > 0 && depth > NULL_MOVE_REDUCTION
            && pos.has_big_piece(pos.turn()) {
            pos.make_null_move();
            let score = -self.alpha_beta(pos, -beta, -beta + 1,
                depth - 1 - NULL_MOVE_REDUCTION, false);
            pos.unmake_null_move();

            if self.stop {
                return Score::draw();
            }
            if score >= beta {
                return beta;
            }
        }

        let mut list = pos.generate_moves();
        let mut legal = 0;
        let mut best_move = None;
        let mut best_score = -Score::infinity();
        let old_alpha = alpha;

        // the hash move goes first, provided it really is a move in this position
        let hash_move = probe.best_move.filter(|&mv| list.contains(mv));
        if let Some(mv) = hash_move {
            if pos.make_move(mv) {
                legal += 1;
                let score = -self.alpha_beta(pos, -beta, -alpha, depth - 1, true);
                pos.unmake_move();

                if self.stop {
                    return Score::draw();
                }

                best_score = score;
                if score > alpha {
                    if score >= beta {
                        self.fail_high += 1;
                        self.fail_high_first += 1;
                        if !mv.is_capture() {
                            pos.store_killer(mv);
                        }
                        self.table.store(pos.zobrist(), Some(mv), depth, beta, Bound::Beta, ply);
                        return beta;
                    }
                    alpha = score;
                    best_move = Some(mv);
                }
            }
        }

        for i in 0..list.len() {
            let mv = match list.select_next(i) {
                Some(mv) => mv,
                None => break,
            };
            if Some(mv) == hash_move || !pos.make_move(mv) {
                continue;
            }

            legal += 1;
            let score = -self.alpha_beta(pos, -beta, -alpha, depth - 1, true);
            pos.unmake_move();

            if self.stop {
                return Score::draw();
            }

            if score > best_score {
                best_score = score;
                if score > alpha {
                    if score >= beta {
                        if legal == 1 {
                            self.fail_high_first += 1;
                        }
                        self.fail_high += 1;
                        if !mv.is_capture() {
                            pos.store_killer(mv);
                        }
                        self.table.store(pos.zobrist(), Some(mv), depth, beta, Bound::Beta, ply);
                        return beta;
                    }
                    alpha = score;
                    best_move = Some(mv);
                }
            }
        }

        if legal == 0 {
            return if in_check {
                Score::mated_in(ply)
            } else {
                Score::draw()
            };
        }

        if alpha != old_alpha {
            self.table.store(pos.zobrist(), best_move, depth, best_score, Bound::Exact, ply);
        } else {
            self.table.store(pos.zobrist(), best_move, depth, alpha, Bound::Alpha, ply);
        }

        alpha
    }

    /// Searches captures and promotions until the position is quiet, with the static evaluation
    /// as a lower bound (the side to move is assumed to have at least one quiet move as good).
    fn quiescence(&mut self, pos: &mut Position, mut alpha: Score, beta: Score) -> Score {
        self.visit_node();
        if self.stop {
            return Score::draw();
        }

        let stand_pat = evaluate_for_mover(pos);
        if pos.ply() >= MAX_DEPTH - 1 {
            return stand_pat;
        }
        if stand_pat >= beta {
            return beta;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let mut list = pos.generate_captures();
        for i in 0..list.len() {
            let mv = match list.select_next(i) {
                Some(mv) => mv,
                None => break,
            };
            if !pos.make_move(mv) {
                continue;
            }

            let score = -self.quiescence(pos, -beta, -alpha);
            pos.unmake_move();

            if self.stop {
                return Score::draw();
            }

            if score > alpha {
                if score >= beta {
                    return beta;
                }
                alpha = score;
            }
        }

        alpha
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Thinking;
    use crate::protocol::{SearchAction, SearchLimits};

    /// Asks for the search to stop every time it is polled
    #[derive(Debug)]
    struct Impatient(Position);

    impl Protocol for Impatient {
        fn wait_for_search(&mut self) -> bool { false }
        fn send_move(&mut self, _: &Thinking) { }
        fn send_thinking(&mut self, _: &Thinking) { }
        fn send_debug_msg(&mut self, _: &str) { }
        fn check_input(&mut self) -> Option<SearchAction> { Some(SearchAction::Stop) }
        fn position(&self) -> &Position { &self.0 }
        fn limits(&self) -> SearchLimits { SearchLimits::depth(4) }
        fn hash_size(&self) -> usize { 1 << 20 }
    }

    #[test]
    fn stop_checked_on_entry() {
        let mut engine = Engine::new(Impatient(Position::new()));
        let mut pos = Position::new();

        let score = engine.alpha_beta(&mut pos, -Score::infinity(), Score::infinity(), 4, true);
        assert_eq!(score, Score::draw());
        assert!(engine.stop);
        assert_eq!(engine.nodes, 1);
        assert_eq!(pos, Position::new());

        engine.stop = false;
        engine.nodes = 0;
        let score = engine.quiescence(&mut pos, -Score::infinity(), Score::infinity());
        assert_eq!(score, Score::draw());
        assert_eq!(engine.nodes, 1);
    }
}
