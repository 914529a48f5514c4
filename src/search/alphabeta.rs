//! Alpha-Beta search with iterative deepening and transposition table
//!
//! This module implements the core search algorithm for the Tak engine.
//! It is a fixed-perspective minimax: every score is from the root player's
//! point of view, nodes where the root player moves maximize and the others
//! minimize. See [`crate::eval`] for the zero-sum requirement this places on
//! evaluators.
//!
//! # Features
//!
//! - Iterative deepening for time management and move ordering
//! - Make/unmake through [`Action::execute`] and [`Action::undo`]
//! - Transposition table, optionally keyed over board symmetries
//! - TT move, killer and history move ordering
//! - Optional branch cap below the root
//! - Fallback to a legal action when no depth completes
//!
//! # Example
//!
//! ```
//! use tak::board::{Board, Player};
//! use tak::eval::HeuristicEvaluator;
//! use tak::search::{Deadline, SearchConfig, Searcher};
//!
//! let config = SearchConfig::default().with_max_depth(2);
//! let mut searcher = Searcher::with_config(HeuristicEvaluator::default(), config);
//! let board = Board::new(3).unwrap();
//!
//! let result = searcher.search(&board, Player::White, 0, Deadline::never()).unwrap();
//! assert!(result.action.validate(&board).is_ok());
//! assert_eq!(result.depth_reached, 2);
//! ```

use std::time::Duration;

use rustc_hash::FxHashMap;
use tracing::{debug, error, info, warn};

use crate::board::{Board, Player};
use crate::error::{GameError, MoveError};
use crate::eval::{is_terminal_score, Evaluator};
use crate::rules::{generate_actions, is_flat_ending, Action};

use super::{Deadline, EntryType, SearchConfig, TTStats, TranspositionTable, ZobristTable};

/// Search statistics for diagnostics and tuning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Total beta cutoffs (fail-high)
    pub beta_cutoffs: u64,
    /// Beta cutoffs on the first move tried (measures move ordering quality)
    pub first_move_cutoffs: u64,
    /// Total TT probes
    pub tt_probes: u64,
    /// TT probes that returned a usable score
    pub tt_hits: u64,
    /// Generated actions that failed to execute and were skipped
    pub invalid_skipped: u64,
    /// Actions dropped by the branch cap
    pub capped_moves: u64,
}

impl SearchStats {
    /// First-move cutoff rate in percent
    pub fn first_move_rate(&self) -> f64 {
        if self.beta_cutoffs == 0 {
            0.0
        } else {
            self.first_move_cutoffs as f64 / self.beta_cutoffs as f64 * 100.0
        }
    }

    /// TT hit rate in percent
    pub fn tt_hit_rate(&self) -> f64 {
        if self.tt_probes == 0 {
            0.0
        } else {
            self.tt_hits as f64 / self.tt_probes as f64 * 100.0
        }
    }
}

/// Outcome of one top-level search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Action to play
    pub action: Action,
    /// Score of `action` at `depth_reached`, from the searching player's view
    pub score: f64,
    /// Nodes entered, including the ones of a discarded partial pass
    pub nodes_visited: u64,
    /// Deepest fully completed pass (0 when the fallback was used)
    pub depth_reached: u32,
    /// Sibling actions skipped by alpha-beta cutoffs
    pub pruned_count: u64,
    pub elapsed: Duration,
    pub stats: SearchStats,
    /// No pass completed and `action` is simply the first playable one
    pub fallback: bool,
}

/// Why a pass stopped early.
#[derive(Debug)]
enum Interrupt {
    TimeUp,
    /// Undo failed; the working board can no longer be trusted.
    Corrupted(MoveError),
}

/// Killer slots per remaining depth
type Killers = [Option<Action>; 2];

/// Per-call search state borrowing the searcher's long-lived parts.
struct Worker<'a, E> {
    evaluator: &'a E,
    config: &'a SearchConfig,
    zobrist: &'a ZobristTable,
    tt: &'a mut TranspositionTable,
    root: Player,
    deadline: Deadline,
    nodes: u64,
    pruned: u64,
    killers: Vec<Killers>,
    history: FxHashMap<Action, u32>,
    stats: SearchStats,
}

impl<'a, E: Evaluator> Worker<'a, E> {
    #[inline]
    fn key(&self, board: &Board) -> u64 {
        if self.config.symmetric_keys {
            self.zobrist.canonical_hash(board)
        } else {
            self.zobrist.hash(board)
        }
    }

    /// One full pass at `depth` over the root actions.
    ///
    /// Returns `None` when no root action could be executed.
    fn search_root(
        &mut self,
        board: &mut Board,
        actions: &[Action],
        depth: u32,
    ) -> Result<Option<(usize, f64)>, Interrupt> {
        self.nodes += 1;
        if self.deadline.is_expired() {
            return Err(Interrupt::TimeUp);
        }

        let hash = self.key(board);
        let mut alpha = f64::NEG_INFINITY;
        let beta = f64::INFINITY;
        let mut best: Option<(usize, f64)> = None;

        for (i, action) in actions.iter().enumerate() {
            if let Err(err) = action.execute(board) {
                self.stats.invalid_skipped += 1;
                warn!(%action, %err, "root action failed revalidation");
                continue;
            }
            let result = self.alpha_beta(board, depth - 1, alpha, beta);
            self.undo(action, board)?;
            let score = result?;

            // Ties keep the first action found
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((i, score));
            }
            alpha = alpha.max(score);
        }

        if let Some((i, score)) = best {
            self.tt
                .store(hash, depth, score, EntryType::Exact, Some(actions[i].clone()));
        }
        Ok(best)
    }

    fn alpha_beta(
        &mut self,
        board: &mut Board,
        depth: u32,
        mut alpha: f64,
        mut beta: f64,
    ) -> Result<f64, Interrupt> {
        self.nodes += 1;
        if self.deadline.is_expired() {
            return Err(Interrupt::TimeUp);
        }

        let static_eval = self.evaluator.evaluate(board, self.root);
        if depth == 0 || is_terminal_score(static_eval) || is_flat_ending(board) {
            return Ok(static_eval);
        }

        let hash = self.key(board);
        if self.tt.is_enabled() {
            self.stats.tt_probes += 1;
            if let Some(score) = self.tt.probe(hash, depth, alpha, beta) {
                self.stats.tt_hits += 1;
                return Ok(score);
            }
        }

        let mover = board.to_move();
        let mut actions = generate_actions(board, mover, board.ply());
        if actions.is_empty() {
            return Ok(static_eval);
        }
        let maximizing = mover == self.root;

        if let Some(cap) = self.config.max_branching {
            self.cap_actions(board, &mut actions, cap, maximizing)?;
        }
        if self.config.order_moves {
            self.order_actions(&mut actions, hash, depth);
        }

        let (alpha0, beta0) = (alpha, beta);
        let mut best: Option<(usize, f64)> = None;

        for (i, action) in actions.iter().enumerate() {
            if action.execute(board).is_err() {
                self.stats.invalid_skipped += 1;
                continue;
            }
            let result = self.alpha_beta(board, depth - 1, alpha, beta);
            self.undo(action, board)?;
            let score = result?;

            if maximizing {
                if best.map_or(true, |(_, s)| score > s) {
                    best = Some((i, score));
                }
                alpha = alpha.max(score);
            } else {
                if best.map_or(true, |(_, s)| score < s) {
                    best = Some((i, score));
                }
                beta = beta.min(score);
            }

            if alpha >= beta {
                self.stats.beta_cutoffs += 1;
                if i == 0 {
                    self.stats.first_move_cutoffs += 1;
                }
                self.pruned += (actions.len() - i - 1) as u64;
                self.record_cutoff(action, depth);
                break;
            }
        }

        // Every action failed to execute: treat the node as a leaf
        let Some((best_idx, best_score)) = best else {
            return Ok(static_eval);
        };

        let entry_type = if best_score <= alpha0 {
            EntryType::UpperBound
        } else if best_score >= beta0 {
            EntryType::LowerBound
        } else {
            EntryType::Exact
        };
        self.tt.store(
            hash,
            depth,
            best_score,
            entry_type,
            Some(actions[best_idx].clone()),
        );
        Ok(best_score)
    }

    #[inline]
    fn undo(&self, action: &Action, board: &mut Board) -> Result<(), Interrupt> {
        action.undo(board).map_err(|err| {
            error!(%action, %err, "undo failed during search");
            Interrupt::Corrupted(err)
        })
    }

    /// Keep the `cap` actions that look best for the mover after one ply.
    fn cap_actions(
        &mut self,
        board: &mut Board,
        actions: &mut Vec<Action>,
        cap: usize,
        maximizing: bool,
    ) -> Result<(), Interrupt> {
        if actions.len() <= cap {
            return Ok(());
        }
        let mut scored = Vec::with_capacity(actions.len());
        for action in actions.drain(..) {
            if action.execute(board).is_err() {
                self.stats.invalid_skipped += 1;
                continue;
            }
            let score = self.evaluator.evaluate(board, self.root);
            self.undo(&action, board)?;
            scored.push((action, score));
        }
        if maximizing {
            scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        } else {
            scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        }
        self.stats.capped_moves += scored.len().saturating_sub(cap) as u64;
        scored.truncate(cap);
        actions.extend(scored.into_iter().map(|(action, _)| action));
        Ok(())
    }

    /// TT move first, then killers, then by history score. Stable otherwise.
    fn order_actions(&self, actions: &mut [Action], hash: u64, depth: u32) {
        let tt_move = self.tt.best_move(hash);
        let killers = self.killers.get(depth as usize);
        let rank = |action: &Action| -> u64 {
            if tt_move == Some(action) {
                return u64::MAX;
            }
            if let Some(k) = killers {
                if k[0].as_ref() == Some(action) {
                    return u64::MAX - 1;
                }
                if k[1].as_ref() == Some(action) {
                    return u64::MAX - 2;
                }
            }
            u64::from(self.history.get(action).copied().unwrap_or(0))
        };
        actions.sort_by_cached_key(|action| std::cmp::Reverse(rank(action)));
    }

    fn record_cutoff(&mut self, action: &Action, depth: u32) {
        if let Some(slot) = self.killers.get_mut(depth as usize) {
            if slot[0].as_ref() != Some(action) {
                slot[1] = slot[0].take();
                slot[0] = Some(action.clone());
            }
        }
        let bonus = depth * depth;
        *self.history.entry(action.clone()).or_insert(0) += bonus;
    }
}

/// Alpha-Beta search engine with iterative deepening and transposition table.
///
/// The evaluator is fixed at construction. The transposition table lives as
/// long as the searcher but is cleared at the start of every call unless
/// `reuse_table` is set and the root player is unchanged.
pub struct Searcher<E> {
    evaluator: E,
    config: SearchConfig,
    zobrist: ZobristTable,
    tt: TranspositionTable,
    /// Root player of the last call, for table reuse
    last_root: Option<Player>,
}

impl<E: Evaluator> Searcher<E> {
    /// Create a searcher with the default configuration.
    #[must_use]
    pub fn new(evaluator: E) -> Self {
        Self::with_config(evaluator, SearchConfig::default())
    }

    #[must_use]
    pub fn with_config(evaluator: E, config: SearchConfig) -> Self {
        Self {
            tt: TranspositionTable::new(config.tt_size_mb),
            evaluator,
            config,
            zobrist: ZobristTable::new(),
            last_root: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[inline]
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Search for the best action for `player` at `ply` using iterative deepening.
    ///
    /// `board`'s own side to move and ply are overridden by `player` and
    /// `ply`. Running out of time is not an error: the last completed depth
    /// is used, or the first playable action if none completed.
    ///
    /// # Errors
    ///
    /// - [`GameError::SearchExhausted`] when `player` has no playable action
    /// - [`GameError::InvalidMove`] when an undo fails mid-search
    pub fn search(
        &mut self,
        board: &Board,
        player: Player,
        ply: u32,
        deadline: Deadline,
    ) -> Result<SearchResult, GameError> {
        let mut work = board.clone();
        work.set_turn(player, ply);

        let mut root_actions = generate_actions(&work, player, ply);
        if root_actions.is_empty() {
            return Err(GameError::SearchExhausted);
        }

        if !(self.config.reuse_table && self.last_root == Some(player)) {
            self.tt.clear();
        }
        self.last_root = Some(player);

        let mut worker = Worker {
            evaluator: &self.evaluator,
            config: &self.config,
            zobrist: &self.zobrist,
            tt: &mut self.tt,
            root: player,
            deadline,
            nodes: 0,
            pruned: 0,
            killers: vec![Default::default(); self.config.max_depth as usize + 1],
            history: FxHashMap::default(),
            stats: SearchStats::default(),
        };

        let mut best: Option<(Action, f64)> = None;
        let mut depth_reached = 0;

        for depth in 1..=self.config.max_depth {
            if depth > 1 && deadline.fraction_spent() >= self.config.time_fraction {
                break;
            }

            match worker.search_root(&mut work, &root_actions, depth) {
                Ok(Some((idx, score))) => {
                    let action = root_actions[idx].clone();
                    debug!(
                        depth,
                        score,
                        nodes = worker.nodes,
                        elapsed_ms = deadline.elapsed().as_millis() as u64,
                        %action,
                        "depth completed"
                    );
                    if self.config.order_moves {
                        // Previous best leads the next pass
                        let first = root_actions.remove(idx);
                        root_actions.insert(0, first);
                    }
                    best = Some((action, score));
                    depth_reached = depth;
                    if is_terminal_score(score) {
                        break;
                    }
                }
                Ok(None) => break,
                Err(Interrupt::TimeUp) => {
                    debug!(depth, "time up, discarding partial pass");
                    break;
                }
                Err(Interrupt::Corrupted(err)) => return Err(GameError::InvalidMove(err)),
            }
        }

        let nodes_visited = worker.nodes;
        let pruned_count = worker.pruned;
        let mut stats = worker.stats;

        let (action, score, fallback) = match best {
            Some((action, score)) => (action, score, false),
            None => {
                let action = first_playable(&mut work, &root_actions, &mut stats)?;
                warn!(%action, "no search depth completed, playing fallback action");
                (action, self.evaluator.evaluate(&work, player), true)
            }
        };

        let elapsed = deadline.elapsed();
        info!(
            %player,
            %action,
            score,
            depth = depth_reached,
            nodes = nodes_visited,
            pruned = pruned_count,
            elapsed_ms = elapsed.as_millis() as u64,
            fallback,
            "search finished"
        );

        Ok(SearchResult {
            action,
            score,
            nodes_visited,
            depth_reached,
            pruned_count,
            elapsed,
            stats,
            fallback,
        })
    }

    /// Clear the transposition table.
    pub fn clear_tt(&mut self) {
        self.tt.clear();
        self.last_root = None;
    }

    /// Get statistics about the transposition table.
    #[must_use]
    pub fn tt_stats(&self) -> TTStats {
        self.tt.stats()
    }
}

/// First root action that executes on `board`.
///
/// Returns [`GameError::SearchExhausted`] when every action fails to execute:
/// an action the board rejects is not legal, so there is no legal action to
/// fall back to and the caller ends the game as if none had been generated.
fn first_playable(
    board: &mut Board,
    actions: &[Action],
    stats: &mut SearchStats,
) -> Result<Action, GameError> {
    for action in actions {
        match action.execute(board) {
            Ok(()) => {
                action.undo(board)?;
                return Ok(action.clone());
            }
            Err(_) => stats.invalid_skipped += 1,
        }
    }
    Err(GameError::SearchExhausted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Piece, PieceKind, Pos};
    use crate::eval::{HeuristicEvaluator, LOSS, WIN};
    use crate::rules::{has_road, legal_actions};

    fn put(board: &mut Board, x: u8, y: u8, kind: PieceKind, owner: Player) {
        board.place(Pos::new(x, y), Piece::new(kind, owner)).unwrap();
    }

    fn searcher(depth: u32) -> Searcher<HeuristicEvaluator> {
        Searcher::with_config(
            HeuristicEvaluator::default(),
            SearchConfig::default().with_max_depth(depth).with_tt_size_mb(1),
        )
    }

    #[test]
    fn test_search_empty_board() {
        let mut searcher = searcher(2);
        let board = Board::new(4).unwrap();

        let result = searcher
            .search(&board, Player::White, 0, Deadline::never())
            .unwrap();
        assert!(!result.fallback);
        assert_eq!(result.depth_reached, 2);
        assert!(result.nodes_visited > 16);
        // Opening: the piece goes to black
        assert!(matches!(
            result.action,
            Action::Place { kind: PieceKind::Flat, owner: Player::Black, .. }
        ));
    }

    #[test]
    fn test_search_finds_road_in_one() {
        let mut board = Board::new(4).unwrap();
        for x in 0..3 {
            put(&mut board, x, 1, PieceKind::Flat, Player::White);
        }
        put(&mut board, 0, 3, PieceKind::Flat, Player::Black);
        put(&mut board, 2, 3, PieceKind::Flat, Player::Black);

        let mut searcher = searcher(3);
        let result = searcher
            .search(&board, Player::White, 6, Deadline::never())
            .unwrap();
        assert_eq!(result.score, WIN);
        assert_eq!(result.depth_reached, 1, "a win at depth 1 stops deepening");

        let mut after = board.clone();
        after.set_turn(Player::White, 6);
        result.action.execute(&mut after).unwrap();
        assert!(has_road(&after, Player::White));
    }

    #[test]
    fn test_search_sees_unstoppable_loss() {
        // Black has two separate one-move roads; white cannot block both
        let mut board = Board::new(3).unwrap();
        put(&mut board, 0, 0, PieceKind::Flat, Player::Black);
        put(&mut board, 1, 0, PieceKind::Flat, Player::Black);
        put(&mut board, 0, 2, PieceKind::Flat, Player::Black);
        put(&mut board, 1, 2, PieceKind::Flat, Player::Black);
        put(&mut board, 2, 1, PieceKind::Standing, Player::White);

        let mut searcher = searcher(2);
        let result = searcher
            .search(&board, Player::White, 10, Deadline::never())
            .unwrap();
        assert_eq!(result.score, LOSS);
    }

    #[test]
    fn test_zero_deadline_uses_fallback() {
        let board = Board::new(5).unwrap();
        let mut searcher = searcher(4);
        let result = searcher
            .search(&board, Player::White, 0, Deadline::after(Duration::ZERO))
            .unwrap();
        assert!(result.fallback);
        assert_eq!(result.depth_reached, 0);
        assert_eq!(result.action, legal_actions(&board)[0]);
    }

    #[test]
    fn test_no_actions_is_exhausted() {
        let board = Board::with_reserves(3, crate::board::Reserve {
            stones: 0,
            capstones: 0,
        })
        .unwrap();
        let mut searcher = searcher(2);
        let err = searcher
            .search(&board, Player::White, 4, Deadline::never())
            .unwrap_err();
        assert_eq!(err, GameError::SearchExhausted);
    }

    #[test]
    fn test_first_playable_skips_rejected_actions() {
        let mut board = Board::new(4).unwrap();
        put(&mut board, 1, 1, PieceKind::Flat, Player::White);
        board.set_turn(Player::White, 4);
        let before = board.clone();

        let occupied = Action::place(1, 1, PieceKind::Flat, Player::White);
        let foreign = Action::place(0, 0, PieceKind::Flat, Player::Black);
        let open = Action::place(2, 2, PieceKind::Flat, Player::White);

        let mut stats = SearchStats::default();
        let actions = [occupied.clone(), foreign.clone(), open.clone()];
        let chosen = first_playable(&mut board, &actions, &mut stats);
        assert_eq!(chosen, Ok(open));
        assert_eq!(stats.invalid_skipped, 2);
        assert_eq!(board, before);

        let mut stats = SearchStats::default();
        assert_eq!(
            first_playable(&mut board, &[occupied, foreign], &mut stats),
            Err(GameError::SearchExhausted)
        );
        assert_eq!(stats.invalid_skipped, 2);
    }

    #[test]
    fn test_search_leaves_input_untouched() {
        let mut board = Board::new(4).unwrap();
        put(&mut board, 1, 1, PieceKind::Flat, Player::White);
        let before = board.clone();

        let mut searcher = searcher(3);
        let _ = searcher
            .search(&board, Player::Black, 3, Deadline::never())
            .unwrap();
        assert_eq!(board, before);
    }

    #[test]
    fn test_branch_cap_counts_dropped_moves() {
        let board = Board::new(4).unwrap();
        let config = SearchConfig::default()
            .with_max_depth(2)
            .with_max_branching(Some(3));
        let mut searcher = Searcher::with_config(HeuristicEvaluator::default(), config);

        let result = searcher
            .search(&board, Player::White, 2, Deadline::never())
            .unwrap();
        // Each reply node has 15 cells x 2 kinds, capped to 3
        assert!(result.stats.capped_moves >= 30 - 3);
        assert!(!result.fallback);
    }

    #[test]
    fn test_move_ordering_keeps_score() {
        let mut board = Board::new(4).unwrap();
        put(&mut board, 0, 0, PieceKind::Flat, Player::White);
        put(&mut board, 1, 1, PieceKind::Flat, Player::Black);
        put(&mut board, 2, 1, PieceKind::Standing, Player::White);

        let plain = SearchConfig::default()
            .with_max_depth(2)
            .with_move_ordering(false)
            .with_tt_size_mb(0);
        let ordered = SearchConfig::default().with_max_depth(2);

        let a = Searcher::with_config(HeuristicEvaluator::default(), plain)
            .search(&board, Player::White, 4, Deadline::never())
            .unwrap();
        let b = Searcher::with_config(HeuristicEvaluator::default(), ordered)
            .search(&board, Player::White, 4, Deadline::never())
            .unwrap();
        assert_eq!(a.score, b.score);
    }

    #[test]
    fn test_table_reuse_is_per_player() {
        let board = Board::new(3).unwrap();
        let config = SearchConfig::default()
            .with_max_depth(2)
            .with_table_reuse(true);
        let mut searcher = Searcher::with_config(HeuristicEvaluator::default(), config);

        searcher
            .search(&board, Player::White, 2, Deadline::never())
            .unwrap();
        let used = searcher.tt_stats().used;
        assert!(used > 0);

        searcher.clear_tt();
        assert_eq!(searcher.tt_stats().used, 0);
    }

    #[test]
    fn test_stats_rates() {
        let stats = SearchStats {
            beta_cutoffs: 4,
            first_move_cutoffs: 3,
            tt_probes: 10,
            tt_hits: 1,
            ..SearchStats::default()
        };
        assert_eq!(stats.first_move_rate(), 75.0);
        assert_eq!(stats.tt_hit_rate(), 10.0);
    }
}
