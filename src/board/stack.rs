//! A cell's pile of pieces and the stacking rule

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{Piece, PieceKind, Player};

/// Can `incoming` be dropped onto a cell whose top piece is `top`?
///
/// Anything lands on an empty cell or a flat. Only a capstone lands on a
/// standing stone (flattening it). Nothing lands on a capstone.
/// Both the move generator and the executor go through this predicate.
#[inline]
pub fn can_stack(top: Option<PieceKind>, incoming: PieceKind) -> bool {
    match top {
        None | Some(PieceKind::Flat) => true,
        Some(PieceKind::Standing) => incoming == PieceKind::Capstone,
        Some(PieceKind::Capstone) => false,
    }
}

/// Ordered pile of pieces, last = top.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stack {
    pieces: SmallVec<[Piece; 8]>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn top(&self) -> Option<Piece> {
        self.pieces.last().copied()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.pieces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Bottom to top.
    #[inline]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Player controlling the cell, if any.
    #[inline]
    pub fn controller(&self) -> Option<Player> {
        self.top().map(|p| p.owner)
    }

    /// Top piece is a road piece of `player`.
    #[inline]
    pub fn is_road_for(&self, player: Player) -> bool {
        self.top().is_some_and(|p| p.owner == player && p.is_road())
    }

    #[inline]
    pub fn can_receive(&self, incoming: PieceKind) -> bool {
        can_stack(self.top().map(|p| p.kind), incoming)
    }

    /// The top `n` pieces, bottom to top, or `None` if the stack is shorter.
    #[inline]
    pub fn top_n(&self, n: usize) -> Option<&[Piece]> {
        let len = self.pieces.len();
        if n > len {
            None
        } else {
            Some(&self.pieces[len - n..])
        }
    }

    /// Push without checking the stacking rule.
    #[inline]
    pub(crate) fn push_unchecked(&mut self, piece: Piece) {
        self.pieces.push(piece);
    }

    /// Remove the top `n` pieces, bottom to top.
    pub(crate) fn split_off_top(&mut self, n: usize) -> SmallVec<[Piece; 8]> {
        let at = self.pieces.len().saturating_sub(n);
        self.pieces.drain(at..).collect()
    }

    /// Change the kind of the top piece. Returns the previous kind.
    pub(crate) fn set_top_kind(&mut self, kind: PieceKind) -> Option<PieceKind> {
        let top = self.pieces.last_mut()?;
        let previous = top.kind;
        top.kind = kind;
        Some(previous)
    }
}
