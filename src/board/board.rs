//! Board structure with piece reserves and an undo log

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{starting_reserve, Piece, PieceKind, Player, Pos, Stack, MAX_SIZE, MIN_SIZE};
use crate::error::{GameError, MoveError};

/// Pieces a player still has in hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reserve {
    /// Flats and standing stones share one pool
    pub stones: u8,
    pub capstones: u8,
}

impl Reserve {
    #[inline]
    pub fn count(&self, kind: PieceKind) -> u8 {
        match kind {
            PieceKind::Flat | PieceKind::Standing => self.stones,
            PieceKind::Capstone => self.capstones,
        }
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.stones == 0 && self.capstones == 0
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.stones as usize + self.capstones as usize
    }
}

/// What undo needs beyond the action itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(crate) enum UndoRecord {
    Place,
    Move { flattened: Option<Pos> },
}

/// Game board: a `size × size` grid of stacks plus both players' reserves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    size: usize,
    /// Max pieces lifted (and so dropped) by one stack move
    carry_limit: usize,
    cells: Vec<Stack>,
    reserves: [Reserve; 2],
    to_move: Player,
    ply: u32,
    /// One record per executed action, undone in LIFO order
    history: Vec<UndoRecord>,
}

impl Board {
    /// Empty board with the standard reserves for `size`.
    pub fn new(size: usize) -> Result<Self, GameError> {
        let reserve = starting_reserve(size).ok_or(GameError::UnsupportedSize(size))?;
        Self::with_reserves(size, reserve)
    }

    /// Empty board where both players start with `reserve`.
    pub fn with_reserves(size: usize, reserve: Reserve) -> Result<Self, GameError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(GameError::UnsupportedSize(size));
        }
        Ok(Self {
            size,
            carry_limit: size,
            cells: vec![Stack::new(); size * size],
            reserves: [reserve; 2],
            to_move: Player::White,
            ply: 0,
            history: Vec::with_capacity(64),
        })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn carry_limit(&self) -> usize {
        self.carry_limit
    }

    /// Plies played so far.
    #[inline]
    pub fn ply(&self) -> u32 {
        self.ply
    }

    #[inline]
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    /// Plies 0 and 1: flats only, placed for the opponent.
    #[inline]
    pub fn is_opening(&self) -> bool {
        self.ply < 2
    }

    /// Override side to move and ply counter (used when a caller hands us a position).
    pub fn set_turn(&mut self, player: Player, ply: u32) {
        self.to_move = player;
        self.ply = ply;
    }

    /// Owner of a piece placed by the side to move right now.
    #[inline]
    pub fn placement_owner(&self) -> Player {
        if self.is_opening() {
            self.to_move.opponent()
        } else {
            self.to_move
        }
    }

    #[inline]
    pub fn reserve(&self, player: Player) -> Reserve {
        self.reserves[player.index()]
    }

    #[inline]
    pub fn is_within_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.size && (y as usize) < self.size
    }

    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        self.is_within_bounds(i64::from(pos.x), i64::from(pos.y))
    }

    pub(crate) fn check_bounds(&self, pos: Pos) -> Result<(), MoveError> {
        if self.contains(pos) {
            Ok(())
        } else {
            Err(MoveError::OutOfBounds {
                x: i64::from(pos.x),
                y: i64::from(pos.y),
                size: self.size,
            })
        }
    }

    /// Stack at `pos`, or `None` off the board.
    #[inline]
    pub fn stack(&self, pos: Pos) -> Option<&Stack> {
        if self.contains(pos) {
            Some(&self.cells[pos.to_index(self.size)])
        } else {
            None
        }
    }

    /// All cells in row-major order.
    pub fn stacks(&self) -> impl Iterator<Item = (Pos, &Stack)> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, stack)| (Pos::from_index(i, size), stack))
    }

    #[inline]
    pub fn top_piece(&self, pos: Pos) -> Option<Piece> {
        self.stack(pos).and_then(Stack::top)
    }

    #[inline]
    pub fn stack_height(&self, pos: Pos) -> usize {
        self.stack(pos).map_or(0, Stack::height)
    }

    #[inline]
    fn cell_mut(&mut self, pos: Pos) -> &mut Stack {
        let idx = pos.to_index(self.size);
        &mut self.cells[idx]
    }

    /// Put a single piece on an empty cell.
    pub fn place(&mut self, pos: Pos, piece: Piece) -> Result<(), MoveError> {
        self.check_bounds(pos)?;
        if !self.cell_mut(pos).is_empty() {
            return Err(MoveError::Occupied { x: pos.x, y: pos.y });
        }
        self.cell_mut(pos).push_unchecked(piece);
        Ok(())
    }

    /// Lift the top `n` pieces off `pos`, bottom to top.
    pub fn pop_n(&mut self, pos: Pos, n: usize) -> Result<SmallVec<[Piece; 8]>, MoveError> {
        self.check_bounds(pos)?;
        let height = self.stack_height(pos);
        if n > height {
            return Err(MoveError::NotEnoughPieces {
                x: pos.x,
                y: pos.y,
                height,
                requested: n,
            });
        }
        Ok(self.cell_mut(pos).split_off_top(n))
    }

    /// Drop one piece onto `pos` under the stacking rule.
    ///
    /// Returns `true` when a capstone flattened a standing stone.
    pub fn drop_piece(&mut self, pos: Pos, piece: Piece) -> Result<bool, MoveError> {
        self.check_bounds(pos)?;
        let cell = self.cell_mut(pos);
        let top = cell.top().map(|p| p.kind);
        if !cell.can_receive(piece.kind) {
            // can_receive only fails on an occupied cell
            return Err(MoveError::IllegalStacking {
                incoming: piece.kind,
                target: top.unwrap_or(PieceKind::Flat),
            });
        }
        let flattened = top == Some(PieceKind::Standing);
        if flattened {
            cell.set_top_kind(PieceKind::Flat);
        }
        cell.push_unchecked(piece);
        Ok(flattened)
    }

    /// Push pieces back without the stacking rule (undo path).
    pub(crate) fn push_unchecked(&mut self, pos: Pos, pieces: &[Piece]) {
        let cell = self.cell_mut(pos);
        for &piece in pieces {
            cell.push_unchecked(piece);
        }
    }

    pub(crate) fn set_top_kind(&mut self, pos: Pos, kind: PieceKind) -> Option<PieceKind> {
        self.cell_mut(pos).set_top_kind(kind)
    }

    /// Every cell holds at least one piece.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Stack::is_empty)
    }

    /// Pieces on the board.
    pub fn piece_count(&self) -> usize {
        self.cells.iter().map(Stack::height).sum()
    }

    /// Pieces in play overall (board plus both reserves); constant over a game.
    pub fn total_pieces(&self) -> usize {
        self.piece_count() + self.reserves.iter().map(Reserve::total).sum::<usize>()
    }

    /// Visible flat tops owned by `player`.
    pub fn flat_count(&self, player: Player) -> usize {
        self.cells
            .iter()
            .filter_map(Stack::top)
            .filter(|p| p.owner == player && p.kind == PieceKind::Flat)
            .count()
    }

    /// Deep copy of the current state.
    #[inline]
    pub fn snapshot(&self) -> Board {
        self.clone()
    }

    pub(crate) fn take_from_reserve(
        &mut self,
        owner: Player,
        kind: PieceKind,
    ) -> Result<(), MoveError> {
        let reserve = &mut self.reserves[owner.index()];
        let slot = match kind {
            PieceKind::Flat | PieceKind::Standing => &mut reserve.stones,
            PieceKind::Capstone => &mut reserve.capstones,
        };
        *slot = slot
            .checked_sub(1)
            .ok_or(MoveError::NoPieceAvailable { owner, kind })?;
        Ok(())
    }

    pub(crate) fn return_to_reserve(&mut self, owner: Player, kind: PieceKind) {
        let reserve = &mut self.reserves[owner.index()];
        match kind {
            PieceKind::Flat | PieceKind::Standing => reserve.stones += 1,
            PieceKind::Capstone => reserve.capstones += 1,
        }
    }

    pub(crate) fn finish_ply(&mut self, record: UndoRecord) {
        self.history.push(record);
        self.ply += 1;
        self.to_move = self.to_move.opponent();
    }

    pub(crate) fn last_record(&self) -> Option<UndoRecord> {
        self.history.last().copied()
    }

    pub(crate) fn rewind_ply(&mut self) {
        self.history.pop();
        self.ply = self.ply.saturating_sub(1);
        self.to_move = self.to_move.opponent();
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .cells
            .iter()
            .map(Stack::height)
            .max()
            .unwrap_or(0)
            .max(1);
        for y in 0..self.size {
            for x in 0..self.size {
                let stack = &self.cells[y * self.size + x];
                let text: String = if stack.is_empty() {
                    ".".to_string()
                } else {
                    stack.pieces().iter().map(|p| p.glyph()).collect()
                };
                write!(f, "[{text:<width$}]")?;
            }
            writeln!(f)?;
        }
        for player in [Player::White, Player::Black] {
            let r = self.reserve(player);
            writeln!(f, "{player}: {} stones, {} capstones", r.stones, r.capstones)?;
        }
        write!(f, "{} to move (ply {})", self.to_move, self.ply)
    }
}
