//! Centralized repetition/contempt scoring.
//!
//! A flat zero on every repetition lets the search happily shuffle into a
//! draw from a winning position and, symmetrically, gives no reason to
//! steer toward one from a losing position. This module centralizes the
//! contempt-shaped draw score (small penalty for the side that looks
//! ahead, small bonus for the side that looks behind) and the larger
//! adjustment for a two-fold cycle that is reachable but not yet
//! three-fold, so both the root search and quiescence draw from the same
//! tuned constants instead of scattered inline literals.

use super::super::{Board, Color, Piece};
use super::move_order::piece_value;

/// Contempt applied to a three-fold (or clock-bounded) repetition, from the
/// perspective of whichever side the repeated node favors.
pub const CONTEMPT_CP: i32 = 10;

/// Score adjustment applied when a two-fold cycle is reachable but has not
/// yet repeated a third time.
pub const TWO_FOLD_CYCLE_CP: i32 = 200;

/// Static-eval gap (centipawns, side-to-move perspective) considered a
/// clear advantage for contempt purposes.
const EVAL_ADVANTAGE_THRESHOLD: i32 = 150;

/// Material gap (centipawns) considered a clear advantage for contempt
/// purposes.
const MATERIAL_ADVANTAGE_THRESHOLD: i32 = 150;

/// Material balance (non-king pieces), in centipawns, from the side to
/// move's perspective.
#[must_use]
pub(in crate::board::search) fn material_balance(board: &Board) -> i32 {
    let mut balance = 0;
    for piece in [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
    ] {
        let value = piece_value(piece);
        let white = board.pieces[Color::White.index()][piece.index()].popcount() as i32;
        let black = board.pieces[Color::Black.index()][piece.index()].popcount() as i32;
        balance += (white - black) * value;
    }
    match board.side_to_move() {
        Color::White => balance,
        Color::Black => -balance,
    }
}

/// Contempt-shaped draw score for a three-fold (or clock) repetition,
/// returned from the side-to-move's perspective at the repeated node.
/// `eval` is the static eval and `material` the raw material balance, both
/// already oriented to the side to move.
#[must_use]
pub fn contempt_score(eval: i32, material: i32) -> i32 {
    if eval >= EVAL_ADVANTAGE_THRESHOLD || material >= MATERIAL_ADVANTAGE_THRESHOLD {
        -CONTEMPT_CP
    } else if eval <= -EVAL_ADVANTAGE_THRESHOLD || material <= -MATERIAL_ADVANTAGE_THRESHOLD {
        CONTEMPT_CP
    } else {
        0
    }
}

/// Score adjustment for a two-fold cycle that is reachable but not yet
/// three-fold: ±`TWO_FOLD_CYCLE_CP` depending on whose advantage the cycle
/// favors (side-to-move-relative `eval`).
#[must_use]
pub fn two_fold_cycle_score(eval: i32) -> i32 {
    use std::cmp::Ordering;
    match eval.cmp(&0) {
        Ordering::Greater => -TWO_FOLD_CYCLE_CP,
        Ordering::Less => TWO_FOLD_CYCLE_CP,
        Ordering::Equal => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contempt_penalizes_the_side_ahead() {
        assert_eq!(contempt_score(300, 0), -CONTEMPT_CP);
        assert_eq!(contempt_score(0, 300), -CONTEMPT_CP);
    }

    #[test]
    fn contempt_rewards_the_side_behind() {
        assert_eq!(contempt_score(-300, 0), CONTEMPT_CP);
        assert_eq!(contempt_score(0, -300), CONTEMPT_CP);
    }

    #[test]
    fn contempt_is_zero_near_balanced() {
        assert_eq!(contempt_score(10, -10), 0);
    }

    #[test]
    fn two_fold_cycle_favors_the_side_behind() {
        assert_eq!(two_fold_cycle_score(50), -TWO_FOLD_CYCLE_CP);
        assert_eq!(two_fold_cycle_score(-50), TWO_FOLD_CYCLE_CP);
        assert_eq!(two_fold_cycle_score(0), 0);
    }
}
