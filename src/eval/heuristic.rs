//! Reference heuristic evaluation for Tak positions
//!
//! Scores a board from one player's perspective based on:
//! - Road detection (win/loss sentinels)
//! - Visible flat count (what decides a flat win)
//! - Road progress (placements still needed for a road)
//! - Stack control and buried own pieces
//!
//! Every term is a difference `mine - theirs`, so the score is zero-sum:
//! `evaluate(board, p) == -evaluate(board, p.opponent())`.

use serde::{Deserialize, Serialize};

use crate::board::{Board, Player};
use crate::rules::{road_distance, road_winner};

use super::{Evaluator, LOSS, WIN};

/// Term weights for [`HeuristicEvaluator`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicWeights {
    /// Per visible flat top
    pub flat: f64,
    /// Per placement of road-distance advantage
    pub road: f64,
    /// Per controlled stack, whatever the top piece
    pub control: f64,
    /// Per own piece buried under an own top
    pub captive: f64,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self {
            flat: 1.0,
            road: 2.5,
            control: 0.4,
            captive: 0.2,
        }
    }
}

/// Weighted sum of material and road features.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeuristicEvaluator {
    pub weights: HeuristicWeights,
}

impl HeuristicEvaluator {
    #[must_use]
    pub fn new(weights: HeuristicWeights) -> Self {
        Self { weights }
    }
}

impl Evaluator for HeuristicEvaluator {
    /// Evaluate the board from the perspective of `player`.
    ///
    /// Returns [`WIN`] / [`LOSS`] when a road exists, otherwise a finite score
    /// where positive values favour `player`.
    fn evaluate(&self, board: &Board, player: Player) -> f64 {
        let opponent = player.opponent();
        match road_winner(board) {
            Some(p) if p == player => return WIN,
            Some(_) => return LOSS,
            None => {}
        }

        let w = &self.weights;
        let flats = board.flat_count(player) as f64 - board.flat_count(opponent) as f64;

        // A blocked road counts as further than any real one
        let far = (board.size() * board.size()) as f64;
        let dist = |p: Player| road_distance(board, p).map_or(far, |d| d as f64);
        let road = dist(opponent) - dist(player);

        let (control, captive) = material(board, player, opponent);

        w.flat * flats + w.road * road + w.control * control + w.captive * captive
    }
}

/// Controlled stacks and buried own pieces, as `player - opponent` differences.
fn material(board: &Board, player: Player, opponent: Player) -> (f64, f64) {
    let mut control = 0i32;
    let mut captive = 0i32;
    for (_, stack) in board.stacks() {
        let Some(owner) = stack.controller() else {
            continue;
        };
        let sign = if owner == player {
            1
        } else if owner == opponent {
            -1
        } else {
            0
        };
        let buried = stack.pieces()[..stack.height() - 1]
            .iter()
            .filter(|piece| piece.owner == owner)
            .count() as i32;
        control += sign;
        captive += sign * buried;
    }
    (f64::from(control), f64::from(captive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Piece, PieceKind, Pos};

    fn put(board: &mut Board, x: u8, y: u8, kind: PieceKind, owner: Player) {
        board.place(Pos::new(x, y), Piece::new(kind, owner)).unwrap();
    }

    #[test]
    fn test_empty_board_is_even() {
        let board = Board::new(5).unwrap();
        let eval = HeuristicEvaluator::default();
        assert_eq!(eval.evaluate(&board, Player::White), 0.0);
        assert_eq!(eval.evaluate(&board, Player::Black), 0.0);
    }

    #[test]
    fn test_road_sentinels() {
        let mut board = Board::new(4).unwrap();
        for y in 0..4 {
            put(&mut board, 1, y, PieceKind::Flat, Player::Black);
        }
        let eval = HeuristicEvaluator::default();
        assert_eq!(eval.evaluate(&board, Player::Black), WIN);
        assert_eq!(eval.evaluate(&board, Player::White), LOSS);
    }

    #[test]
    fn test_flat_advantage_is_positive() {
        let mut board = Board::new(5).unwrap();
        put(&mut board, 2, 2, PieceKind::Flat, Player::White);
        put(&mut board, 3, 3, PieceKind::Standing, Player::Black);
        let eval = HeuristicEvaluator::default();
        assert!(eval.evaluate(&board, Player::White) > 0.0);
    }

    #[test]
    fn test_zero_sum() {
        let mut board = Board::new(5).unwrap();
        put(&mut board, 0, 0, PieceKind::Flat, Player::White);
        put(&mut board, 1, 0, PieceKind::Flat, Player::White);
        put(&mut board, 2, 1, PieceKind::Capstone, Player::Black);
        put(&mut board, 4, 4, PieceKind::Standing, Player::Black);
        board.drop_piece(Pos::new(0, 0), Piece::flat(Player::White)).unwrap();

        let eval = HeuristicEvaluator::new(HeuristicWeights {
            flat: 1.3,
            road: 0.7,
            control: 0.11,
            captive: 0.05,
        });
        let white = eval.evaluate(&board, Player::White);
        let black = eval.evaluate(&board, Player::Black);
        assert_eq!(white, -black);
        assert!(white > 0.0);
    }

    #[test]
    fn test_weights_deserialize_with_defaults() {
        let weights: HeuristicWeights = serde_json::from_str(r#"{ "flat": 2.0 }"#).unwrap();
        assert_eq!(weights.flat, 2.0);
        assert_eq!(weights.road, HeuristicWeights::default().road);
    }
}
