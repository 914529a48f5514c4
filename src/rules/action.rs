//! Actions: one ply of play, with execute and undo
//!
//! An [`Action`] is either a placement from the reserve or a stack move.
//! `execute` validates the whole action against the board before touching
//! it, so a rejected action leaves the board unchanged. `undo` reverses the
//! most recent executed action and must be called in LIFO order.
//!
//! # Example
//!
//! ```
//! use tak::board::{Board, Direction, PieceKind, Player};
//! use tak::rules::Action;
//!
//! let mut board = Board::new(5).unwrap();
//! let before = board.snapshot();
//!
//! // White opens by placing a black flat
//! let action = Action::place(0, 0, PieceKind::Flat, Player::Black);
//! action.execute(&mut board).unwrap();
//! action.undo(&mut board).unwrap();
//! assert_eq!(board, before);
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::board::board::UndoRecord;
use crate::board::{can_stack, Board, Direction, Piece, PieceKind, Player, Pos};
use crate::error::MoveError;

/// Pieces dropped per visited cell, in path order.
pub type Drops = SmallVec<[u8; 8]>;

/// Cells visited by a stack move, in path order.
pub type Path = SmallVec<[Pos; 8]>;

/// One ply.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Place a piece from `owner`'s reserve on an empty cell.
    Place {
        at: Pos,
        kind: PieceKind,
        owner: Player,
    },
    /// Lift `sum(drops)` pieces from `from` and spread them along `direction`.
    Move {
        from: Pos,
        direction: Direction,
        drops: Drops,
    },
}

impl Action {
    #[inline]
    pub fn place(x: u8, y: u8, kind: PieceKind, owner: Player) -> Self {
        Action::Place {
            at: Pos::new(x, y),
            kind,
            owner,
        }
    }

    #[inline]
    pub fn stack_move(x: u8, y: u8, direction: Direction, drops: &[u8]) -> Self {
        Action::Move {
            from: Pos::new(x, y),
            direction,
            drops: SmallVec::from_slice(drops),
        }
    }

    /// Cell the action starts from.
    #[inline]
    pub fn origin(&self) -> Pos {
        match self {
            Action::Place { at, .. } => *at,
            Action::Move { from, .. } => *from,
        }
    }

    #[inline]
    pub fn is_placement(&self) -> bool {
        matches!(self, Action::Place { .. })
    }

    /// Pieces lifted by a stack move (0 for placements).
    pub fn carry(&self) -> usize {
        match self {
            Action::Place { .. } => 0,
            Action::Move { drops, .. } => drops.iter().map(|&d| d as usize).sum(),
        }
    }

    /// Check the action against the board's side to move and ply.
    pub fn validate(&self, board: &Board) -> Result<(), MoveError> {
        self.validate_for(board, board.to_move(), board.ply())
    }

    /// Check the action as if `mover` were to play at `ply`.
    pub fn validate_for(&self, board: &Board, mover: Player, ply: u32) -> Result<(), MoveError> {
        match self {
            Action::Place { at, kind, owner } => {
                validate_placement(board, *at, *kind, *owner, mover, ply)
            }
            Action::Move {
                from,
                direction,
                drops,
            } => validate_stack_move(board, *from, *direction, drops, mover).map(|_| ()),
        }
    }

    /// Apply the action. On error the board is left untouched.
    pub fn execute(&self, board: &mut Board) -> Result<(), MoveError> {
        match self {
            Action::Place { at, kind, owner } => {
                validate_placement(board, *at, *kind, *owner, board.to_move(), board.ply())?;
                board.place(*at, Piece::new(*kind, *owner))?;
                board.take_from_reserve(*owner, *kind)?;
                board.finish_ply(UndoRecord::Place);
            }
            Action::Move {
                from,
                direction,
                drops,
            } => {
                let path = validate_stack_move(board, *from, *direction, drops, board.to_move())?;
                let carried = board.pop_n(*from, self.carry())?;
                let mut flattened = None;
                let mut offset = 0;
                for (&cell, &n) in path.iter().zip(drops.iter()) {
                    for &piece in &carried[offset..offset + n as usize] {
                        if board.drop_piece(cell, piece)? {
                            flattened = Some(cell);
                        }
                    }
                    offset += n as usize;
                }
                board.finish_ply(UndoRecord::Move { flattened });
            }
        }
        Ok(())
    }

    /// Reverse this action, which must be the last one executed on `board`.
    pub fn undo(&self, board: &mut Board) -> Result<(), MoveError> {
        match self {
            Action::Place { at, kind, owner } => {
                if board.last_record() != Some(UndoRecord::Place) {
                    return Err(MoveError::UndoMismatch("last action was not a placement"));
                }
                board.check_bounds(*at)?;
                if board.stack_height(*at) != 1 {
                    return Err(MoveError::UndoMismatch("expected exactly one piece"));
                }
                if board.top_piece(*at) != Some(Piece::new(*kind, *owner)) {
                    return Err(MoveError::UndoMismatch("placed piece is not on top"));
                }
                board.pop_n(*at, 1)?;
                board.return_to_reserve(*owner, *kind);
                board.rewind_ply();
            }
            Action::Move {
                from,
                direction,
                drops,
            } => {
                let Some(UndoRecord::Move { flattened }) = board.last_record() else {
                    return Err(MoveError::UndoMismatch("last action was not a stack move"));
                };
                board.check_bounds(*from)?;
                if drops.is_empty() || drops.contains(&0) {
                    return Err(MoveError::BadDrops("drop counts must be positive"));
                }
                let mut path = Path::new();
                for (i, &n) in drops.iter().enumerate() {
                    let cell = from
                        .step(*direction, i + 1, board.size())
                        .ok_or(MoveError::UndoMismatch("path leaves the board"))?;
                    if board.stack_height(cell) < n as usize {
                        return Err(MoveError::UndoMismatch("dropped pieces are missing"));
                    }
                    path.push(cell);
                }
                if flattened.is_some() && flattened != path.last().copied() {
                    return Err(MoveError::UndoMismatch("flattened cell is not the last drop"));
                }

                let mut returned: SmallVec<[Piece; 8]> = SmallVec::new();
                for (&cell, &n) in path.iter().zip(drops.iter()) {
                    returned.extend(board.pop_n(cell, n as usize)?);
                }
                board.push_unchecked(*from, &returned);
                if let Some(cell) = flattened {
                    board.set_top_kind(cell, PieceKind::Standing);
                }
                board.rewind_ply();
            }
        }
        Ok(())
    }
}

/// Placement rule shared by the generator and the executor.
pub fn validate_placement(
    board: &Board,
    at: Pos,
    kind: PieceKind,
    owner: Player,
    mover: Player,
    ply: u32,
) -> Result<(), MoveError> {
    board.check_bounds(at)?;
    if board.stack_height(at) > 0 {
        return Err(MoveError::Occupied { x: at.x, y: at.y });
    }
    let opening = ply < 2;
    if opening && kind != PieceKind::Flat {
        return Err(MoveError::OpeningFlatOnly);
    }
    let expected = if opening { mover.opponent() } else { mover };
    if owner != expected {
        return Err(MoveError::WrongOwner {
            expected,
            found: owner,
        });
    }
    if board.reserve(owner).count(kind) == 0 {
        return Err(MoveError::NoPieceAvailable { owner, kind });
    }
    Ok(())
}

/// Stack-move rule shared by the generator and the executor.
///
/// Walks the full path without mutating and returns the visited cells.
pub fn validate_stack_move(
    board: &Board,
    from: Pos,
    direction: Direction,
    drops: &[u8],
    mover: Player,
) -> Result<Path, MoveError> {
    board.check_bounds(from)?;
    if drops.is_empty() {
        return Err(MoveError::BadDrops("at least one drop is required"));
    }
    if drops.contains(&0) {
        return Err(MoveError::BadDrops("drop counts must be positive"));
    }
    let carry: usize = drops.iter().map(|&d| d as usize).sum();
    if carry > board.carry_limit() {
        return Err(MoveError::CarryLimit {
            carry,
            limit: board.carry_limit(),
        });
    }

    let height = board.stack_height(from);
    let not_enough = MoveError::NotEnoughPieces {
        x: from.x,
        y: from.y,
        height,
        requested: carry,
    };
    let stack = board.stack(from).ok_or_else(|| not_enough.clone())?;
    match stack.top() {
        None => return Err(not_enough),
        Some(top) if top.owner != mover => {
            return Err(MoveError::NotOwner {
                player: mover,
                x: from.x,
                y: from.y,
            })
        }
        Some(_) => {}
    }
    let carried = stack.top_n(carry).ok_or(not_enough)?;

    let (dx, dy) = direction.delta();
    let mut path = Path::new();
    let mut offset = 0;
    for (i, &n) in drops.iter().enumerate() {
        let steps = i as i64 + 1;
        let cell = from
            .step(direction, i + 1, board.size())
            .ok_or(MoveError::OutOfBounds {
                x: i64::from(from.x) + i64::from(dx) * steps,
                y: i64::from(from.y) + i64::from(dy) * steps,
                size: board.size(),
            })?;
        let mut top = board.top_piece(cell).map(|p| p.kind);
        for piece in &carried[offset..offset + n as usize] {
            if !can_stack(top, piece.kind) {
                return Err(MoveError::IllegalStacking {
                    incoming: piece.kind,
                    target: top.unwrap_or(PieceKind::Flat),
                });
            }
            top = Some(piece.kind);
        }
        offset += n as usize;
        path.push(cell);
    }
    Ok(path)
}
