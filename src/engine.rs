//! Turn-loop facade and player strategies
//!
//! [`Engine`] is what a game driver calls once per turn:
//! `find_best_action(board, player, ply, deadline)`. It wraps a [`Searcher`]
//! built around one evaluator.
//!
//! Player behaviour is a [`Strategy`] value picked when the game is set up:
//!
//! - [`SearchStrategy`]: alpha-beta through an [`Engine`]
//! - [`RandomStrategy`]: uniformly random legal action (seeded)
//! - [`FnStrategy`]: any closure, for scripted players and tests
//!
//! # Example
//!
//! ```
//! use tak::board::{Board, Player};
//! use tak::engine::Engine;
//! use tak::eval::HeuristicEvaluator;
//! use tak::search::{Deadline, SearchConfig};
//!
//! let config = SearchConfig::default().with_max_depth(2);
//! let mut engine = Engine::with_config(HeuristicEvaluator::default(), config);
//! let board = Board::new(4).unwrap();
//!
//! let action = engine
//!     .find_best_action(&board, Player::White, 0, Deadline::from_millis(500))
//!     .unwrap();
//! println!("play {action}");
//! ```

use crate::board::{Board, Player};
use crate::error::GameError;
use crate::eval::Evaluator;
use crate::rules::{legal_actions, Action};
use crate::search::{Deadline, SearchConfig, SearchResult, Searcher, TTStats};

/// Search engine bound to one evaluator.
pub struct Engine<E> {
    searcher: Searcher<E>,
}

impl<E: Evaluator> Engine<E> {
    /// Engine with the default search configuration.
    #[must_use]
    pub fn new(evaluator: E) -> Self {
        Self {
            searcher: Searcher::new(evaluator),
        }
    }

    #[must_use]
    pub fn with_config(evaluator: E, config: SearchConfig) -> Self {
        Self {
            searcher: Searcher::with_config(evaluator, config),
        }
    }

    /// Best action for `player` on `board` at `ply`, within `deadline`.
    ///
    /// Always returns a playable action while one exists, even with an
    /// already expired deadline.
    ///
    /// # Errors
    ///
    /// [`GameError::SearchExhausted`] when `player` has nothing to play, which
    /// the caller should treat as the end of the game.
    pub fn find_best_action(
        &mut self,
        board: &Board,
        player: Player,
        ply: u32,
        deadline: Deadline,
    ) -> Result<Action, GameError> {
        self.find_best_action_with_stats(board, player, ply, deadline)
            .map(|result| result.action)
    }

    /// Like [`Engine::find_best_action`], with search diagnostics.
    pub fn find_best_action_with_stats(
        &mut self,
        board: &Board,
        player: Player,
        ply: u32,
        deadline: Deadline,
    ) -> Result<SearchResult, GameError> {
        self.searcher.search(board, player, ply, deadline)
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        self.searcher.config()
    }

    #[inline]
    pub fn evaluator(&self) -> &E {
        self.searcher.evaluator()
    }

    /// Forget cached positions, e.g. before a new game.
    pub fn clear_cache(&mut self) {
        self.searcher.clear_tt();
    }

    #[must_use]
    pub fn tt_stats(&self) -> TTStats {
        self.searcher.tt_stats()
    }
}

/// Decides the next action for the side to move.
pub trait Strategy {
    /// Pick an action for `board.to_move()` at `board.ply()`.
    ///
    /// # Errors
    ///
    /// [`GameError::SearchExhausted`] when there is nothing to play.
    fn decide(&mut self, board: &Board, deadline: Deadline) -> Result<Action, GameError>;

    /// Short label for logs.
    fn name(&self) -> &str {
        "strategy"
    }
}

/// Alpha-beta player.
pub struct SearchStrategy<E> {
    engine: Engine<E>,
}

impl<E: Evaluator> SearchStrategy<E> {
    #[must_use]
    pub fn new(engine: Engine<E>) -> Self {
        Self { engine }
    }

    #[inline]
    pub fn engine(&self) -> &Engine<E> {
        &self.engine
    }
}

impl<E: Evaluator> Strategy for SearchStrategy<E> {
    fn decide(&mut self, board: &Board, deadline: Deadline) -> Result<Action, GameError> {
        self.engine
            .find_best_action(board, board.to_move(), board.ply(), deadline)
    }

    fn name(&self) -> &str {
        "alpha-beta"
    }
}

/// Uniformly random legal action.
pub struct RandomStrategy {
    rng: fastrand::Rng,
}

impl RandomStrategy {
    /// Reproducible sequence for a given seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl Default for RandomStrategy {
    fn default() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }
}

impl Strategy for RandomStrategy {
    fn decide(&mut self, board: &Board, _deadline: Deadline) -> Result<Action, GameError> {
        let mut actions = legal_actions(board);
        if actions.is_empty() {
            return Err(GameError::SearchExhausted);
        }
        let idx = self.rng.usize(..actions.len());
        Ok(actions.swap_remove(idx))
    }

    fn name(&self) -> &str {
        "random"
    }
}

/// Strategy backed by a closure.
pub struct FnStrategy<F> {
    decide: F,
}

impl<F> FnStrategy<F>
where
    F: FnMut(&Board, Deadline) -> Result<Action, GameError>,
{
    pub fn new(decide: F) -> Self {
        Self { decide }
    }
}

impl<F> Strategy for FnStrategy<F>
where
    F: FnMut(&Board, Deadline) -> Result<Action, GameError>,
{
    fn decide(&mut self, board: &Board, deadline: Deadline) -> Result<Action, GameError> {
        (self.decide)(board, deadline)
    }

    fn name(&self) -> &str {
        "closure"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{PieceKind, Pos};
    use crate::eval::HeuristicEvaluator;

    fn engine(depth: u32) -> Engine<HeuristicEvaluator> {
        Engine::with_config(
            HeuristicEvaluator::default(),
            SearchConfig::default().with_max_depth(depth).with_tt_size_mb(1),
        )
    }

    #[test]
    fn test_find_best_action_is_legal() {
        let mut engine = engine(2);
        let mut board = Board::new(4).unwrap();
        Action::place(0, 0, PieceKind::Flat, Player::Black)
            .execute(&mut board)
            .unwrap();

        let action = engine
            .find_best_action(&board, Player::Black, 1, Deadline::never())
            .unwrap();
        assert!(legal_actions(&board).contains(&action));
    }

    #[test]
    fn test_find_best_action_uses_given_turn() {
        // The board says white at ply 0, the caller says black at ply 5
        let mut engine = engine(1);
        let board = Board::new(3).unwrap();
        let action = engine
            .find_best_action(&board, Player::Black, 5, Deadline::never())
            .unwrap();
        match action {
            Action::Place { owner, .. } => assert_eq!(owner, Player::Black),
            Action::Move { .. } => panic!("nothing to move on an empty board"),
        }
    }

    #[test]
    fn test_closure_evaluator_engine() {
        // Prefers boards where white has a piece in the centre
        let eval = |board: &Board, player: Player| {
            let centre = board.top_piece(Pos::new(1, 1));
            let score = match centre {
                Some(p) if p.owner == Player::White => 1.0,
                Some(_) => -1.0,
                None => 0.0,
            };
            if player == Player::White {
                score
            } else {
                -score
            }
        };
        let mut engine = Engine::with_config(eval, SearchConfig::default().with_max_depth(1));
        let board = Board::new(3).unwrap();
        let action = engine
            .find_best_action(&board, Player::White, 4, Deadline::never())
            .unwrap();
        assert_eq!(action.origin(), Pos::new(1, 1));
    }

    #[test]
    fn test_random_strategy_is_reproducible() {
        let board = Board::new(5).unwrap();
        let mut a = RandomStrategy::seeded(7);
        let mut b = RandomStrategy::seeded(7);
        for _ in 0..5 {
            let x = a.decide(&board, Deadline::never()).unwrap();
            let y = b.decide(&board, Deadline::never()).unwrap();
            assert_eq!(x, y);
            assert!(x.validate(&board).is_ok());
        }
    }

    #[test]
    fn test_random_strategy_exhausted() {
        let board = Board::with_reserves(3, crate::board::Reserve {
            stones: 0,
            capstones: 0,
        })
        .unwrap();
        let mut random = RandomStrategy::seeded(1);
        assert_eq!(
            random.decide(&board, Deadline::never()),
            Err(GameError::SearchExhausted)
        );
    }

    #[test]
    fn test_fn_strategy() {
        let mut calls = 0;
        let mut first = FnStrategy::new(|board: &Board, _| {
            calls += 1;
            legal_actions(board)
                .into_iter()
                .next()
                .ok_or(GameError::SearchExhausted)
        });
        let board = Board::new(3).unwrap();
        let action = first.decide(&board, Deadline::never()).unwrap();
        assert_eq!(action, Action::place(0, 0, PieceKind::Flat, Player::Black));
        assert_eq!(first.name(), "closure");
        drop(first);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_search_strategy_name() {
        let strategy = SearchStrategy::new(engine(1));
        assert_eq!(strategy.name(), "alpha-beta");
        assert_eq!(strategy.engine().config().max_depth, 1);
    }
}
