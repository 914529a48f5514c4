//! Position evaluation
//!
//! The search only depends on the [`Evaluator`] contract:
//!
//! - deterministic: the same board and player always give the same score
//! - higher is better for `player`
//! - [`WIN`] exactly when `player` has a completed road, [`LOSS`] exactly when
//!   the opponent has one
//!
//! # Perspective
//!
//! The search scores every node from the root player's perspective while the
//! side to move alternates. Alpha-beta bounds are only sound when the
//! evaluator is zero-sum: `evaluate(b, p) == -evaluate(b, p.opponent())`.
//! An evaluator that weighs the two sides differently still works, but the
//! pruned search may then disagree with a full minimax.

pub mod heuristic;

pub use heuristic::{HeuristicEvaluator, HeuristicWeights};

use crate::board::{Board, Player};

/// Score for a position `player` has already won.
pub const WIN: f64 = f64::INFINITY;

/// Score for a position `player` has already lost.
pub const LOSS: f64 = f64::NEG_INFINITY;

/// Scores a board for one player.
pub trait Evaluator {
    fn evaluate(&self, board: &Board, player: Player) -> f64;
}

impl<F> Evaluator for F
where
    F: Fn(&Board, Player) -> f64,
{
    #[inline]
    fn evaluate(&self, board: &Board, player: Player) -> f64 {
        self(board, player)
    }
}

/// Is `score` one of the win/loss sentinels?
#[inline]
pub fn is_terminal_score(score: f64) -> bool {
    score.is_infinite()
}
