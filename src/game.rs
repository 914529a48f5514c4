//! Game record and self-play driver

use std::time::Duration;

use tracing::{debug, info};

use crate::board::{Board, Player};
use crate::engine::Strategy;
use crate::error::GameError;
use crate::rules::{flat_result, game_result, parse_action, Action, GameResult};
use crate::search::Deadline;

/// A board plus the actions that led to it.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    moves: Vec<Action>,
    result: Option<GameResult>,
}

impl Game {
    /// Fresh game on a `size × size` board.
    pub fn new(size: usize) -> Result<Self, GameError> {
        Ok(Self::from_board(Board::new(size)?))
    }

    /// Continue from an existing position.
    pub fn from_board(board: Board) -> Self {
        let result = game_result(&board);
        Self {
            board,
            moves: Vec::new(),
            result,
        }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn moves(&self) -> &[Action] {
        &self.moves
    }

    #[inline]
    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.result.is_some()
    }

    #[inline]
    pub fn to_move(&self) -> Player {
        self.board.to_move()
    }

    /// Play `action` for the side to move.
    ///
    /// # Errors
    ///
    /// - [`GameError::GameOver`] once the game has a result
    /// - [`GameError::InvalidMove`] for an illegal action (the board is unchanged)
    pub fn play(&mut self, action: Action) -> Result<Option<GameResult>, GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        action.execute(&mut self.board)?;
        debug!(ply = self.board.ply(), %action, "played");
        self.moves.push(action);
        self.result = game_result(&self.board);
        Ok(self.result)
    }

    /// Parse `text` in action notation and play it.
    pub fn play_text(&mut self, text: &str) -> Result<Option<GameResult>, GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        let action = parse_action(text, &self.board)?;
        self.play(action)
    }

    /// Take back the last action. Returns `None` at the start of the record.
    pub fn undo(&mut self) -> Result<Option<Action>, GameError> {
        let Some(action) = self.moves.pop() else {
            return Ok(None);
        };
        if let Err(err) = action.undo(&mut self.board) {
            self.moves.push(action);
            return Err(err.into());
        }
        self.result = game_result(&self.board);
        Ok(Some(action))
    }

    /// End the game because the side to move has nothing to play.
    pub fn resign_exhausted(&mut self) -> GameResult {
        let result = flat_result(&self.board);
        self.result = Some(result);
        result
    }

    /// Let two strategies play until the game ends or `max_plies` more plies pass.
    ///
    /// Each decision gets a fresh `budget`. A strategy reporting
    /// [`GameError::SearchExhausted`] ends the game on flats.
    ///
    /// Returns the result, or `None` if the ply limit was hit first.
    pub fn play_out(
        &mut self,
        white: &mut dyn Strategy,
        black: &mut dyn Strategy,
        budget: Duration,
        max_plies: u32,
    ) -> Result<Option<GameResult>, GameError> {
        let mut plies = 0;
        while !self.is_over() && plies < max_plies {
            let strategy: &mut dyn Strategy = match self.to_move() {
                Player::White => &mut *white,
                Player::Black => &mut *black,
            };
            match strategy.decide(&self.board, Deadline::after(budget)) {
                Ok(action) => {
                    self.play(action)?;
                }
                Err(GameError::SearchExhausted) => {
                    debug!(player = %self.to_move(), "no actions left");
                    self.resign_exhausted();
                }
                Err(err) => return Err(err),
            }
            plies += 1;
        }

        match self.result {
            Some(result) => info!(?result, plies = self.board.ply(), "game over"),
            None => info!(plies = self.board.ply(), "ply limit reached"),
        }
        Ok(self.result)
    }
}
