//! Error types for the Tak engine
//!
//! - [`MoveError`]: an illegal placement, stack move, or undo attempt
//! - [`ParseActionError`]: malformed textual action
//! - [`GameError`]: everything a caller of the engine can see

use thiserror::Error;

use crate::board::{PieceKind, Player};

/// Why an action was rejected by the board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("({x}, {y}) is outside the {size}x{size} board")]
    OutOfBounds { x: i64, y: i64, size: usize },

    #[error("cell ({x}, {y}) is already occupied")]
    Occupied { x: u8, y: u8 },

    #[error("cell ({x}, {y}) holds {height} pieces but {requested} were requested")]
    NotEnoughPieces {
        x: u8,
        y: u8,
        height: usize,
        requested: usize,
    },

    #[error("{owner} has no {kind} pieces left")]
    NoPieceAvailable { owner: Player, kind: PieceKind },

    #[error("only flat stones may be placed during the first two plies")]
    OpeningFlatOnly,

    #[error("{player} does not control the stack at ({x}, {y})")]
    NotOwner { player: Player, x: u8, y: u8 },

    #[error("the placed piece must belong to {expected}, not {found}")]
    WrongOwner { expected: Player, found: Player },

    #[error("a {incoming} cannot be dropped onto a {target}")]
    IllegalStacking { incoming: PieceKind, target: PieceKind },

    #[error("carrying {carry} pieces exceeds the carry limit of {limit}")]
    CarryLimit { carry: usize, limit: usize },

    #[error("invalid drop partition: {0}")]
    BadDrops(&'static str),

    #[error("undo does not match the board: {0}")]
    UndoMismatch(&'static str),
}

/// Why a textual action could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseActionError {
    #[error("empty action text")]
    Empty,

    #[error("unknown action `{0}`")]
    UnknownCommand(String),

    #[error("missing {0}")]
    MissingToken(&'static str),

    #[error("`{0}` is not a valid number")]
    BadNumber(String),

    #[error("coordinate ({x}, {y}) is outside the {size}x{size} board")]
    OutOfRange { x: u32, y: u32, size: usize },

    #[error("unknown direction `{0}`")]
    UnknownDirection(String),

    #[error("carry count {carry} exceeds the carry limit {limit}")]
    CarryOutOfRange { carry: u32, limit: usize },

    #[error("carry count {carry} does not match the drop total {total}")]
    CarryMismatch { carry: u32, total: u32 },

    #[error("drop counts must be at least 1")]
    ZeroDrop,

    #[error("unexpected trailing token `{0}`")]
    Trailing(String),
}

/// Errors surfaced to callers of the game and engine APIs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("invalid move: {0}")]
    InvalidMove(#[from] MoveError),

    #[error("the game is already over")]
    GameOver,

    /// No legal action could be evaluated; the game has ended.
    #[error("no legal actions available")]
    SearchExhausted,

    #[error("unsupported board size {0}, expected 3 through 8")]
    UnsupportedSize(usize),

    #[error(transparent)]
    Parse(#[from] ParseActionError),
}
