//! Tak engine with iterative-deepening alpha-beta search
//!
//! Tak is played on an N×N board (3 through 8) with flat stones, standing
//! stones and capstones that stack and move as stacks:
//! - Carry limit: at most N pieces lifted per stack move
//! - First two plies: each side places a flat stone for the opponent
//! - Road win: an orthogonal chain of flats/capstones joining opposite edges
//! - Flat win: most visible flat tops once the board fills or a reserve runs out
//!
//! # Architecture
//!
//! The engine is organized into several modules:
//! - [`board`]: Pieces, stacks, reserves and the board with its undo log
//! - [`rules`]: Actions with execute/undo, move generation, win checks, notation
//! - [`eval`]: The evaluator contract and a reference heuristic
//! - [`search`]: Iterative deepening alpha-beta with transposition table
//! - [`engine`]: Turn-loop facade and player strategies
//! - [`game`]: Game record and self-play driver
//!
//! # Quick Start
//!
//! ```
//! use tak::{Board, Deadline, Engine, HeuristicEvaluator, Player, SearchConfig};
//!
//! let mut board = Board::new(5).unwrap();
//! let config = SearchConfig::default().with_max_depth(2);
//! let mut engine = Engine::with_config(HeuristicEvaluator::default(), config);
//!
//! let action = engine
//!     .find_best_action(&board, Player::White, 0, Deadline::from_millis(500))
//!     .unwrap();
//! action.execute(&mut board).unwrap();
//! println!("{action}\n{board}");
//! ```

pub mod board;
pub mod engine;
pub mod error;
pub mod eval;
pub mod game;
pub mod rules;
pub mod search;

// Re-export commonly used types for convenience
pub use board::{Board, Direction, Piece, PieceKind, Player, Pos, Reserve, Stack};
pub use engine::{Engine, FnStrategy, RandomStrategy, SearchStrategy, Strategy};
pub use error::{GameError, MoveError, ParseActionError};
pub use eval::{Evaluator, HeuristicEvaluator, HeuristicWeights};
pub use game::Game;
pub use rules::{Action, GameResult};
pub use search::{Deadline, SearchConfig, SearchResult, Searcher};
