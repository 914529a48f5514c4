//! Transposition Table for caching search results
//!
//! The transposition table stores search results indexed by position key,
//! so subtrees reached through different move orders are searched once.
//!
//! Scores are only reused for an entry searched to exactly the requested
//! depth. The search is depth-limited minimax, and a deeper value for the
//! same position is a different number, so reusing it would make the result
//! depend on move order.
//!
//! # Example
//!
//! ```
//! use tak::board::{PieceKind, Player};
//! use tak::rules::Action;
//! use tak::search::{EntryType, TranspositionTable};
//!
//! let mut tt = TranspositionTable::new(1); // 1 MB
//! let best = Action::place(2, 2, PieceKind::Flat, Player::White);
//!
//! tt.store(0x1234_5678_9ABC_DEF0, 3, 1.5, EntryType::Exact, Some(best.clone()));
//!
//! assert_eq!(tt.probe(0x1234_5678_9ABC_DEF0, 3, -10.0, 10.0), Some(1.5));
//! assert_eq!(tt.probe(0x1234_5678_9ABC_DEF0, 2, -10.0, 10.0), None);
//! assert_eq!(tt.best_move(0x1234_5678_9ABC_DEF0), Some(&best));
//! ```

use crate::rules::Action;

/// Entry type for score interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// Exact score - the search completed inside the window
    Exact,
    /// Lower bound - score >= stored value (beta cutoff)
    LowerBound,
    /// Upper bound - score <= stored value (alpha fail-low)
    UpperBound,
}

/// Transposition table entry
#[derive(Debug, Clone)]
pub struct TTEntry {
    /// Full position key
    pub hash: u64,
    /// Remaining depth the entry was searched to
    pub depth: u32,
    /// Score from the root player's perspective
    pub score: f64,
    pub entry_type: EntryType,
    /// Best action found for this position
    pub best_move: Option<Action>,
}

/// Transposition table for caching search results.
///
/// Direct-mapped: each key maps to exactly one slot. Collisions are
/// resolved in favour of the deeper search.
pub struct TranspositionTable {
    entries: Vec<Option<TTEntry>>,
    size: usize,
}

impl TranspositionTable {
    /// Create a new transposition table with the given size in megabytes.
    ///
    /// A size of 0 gives a disabled table that stores nothing.
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let size = if size_mb == 0 {
            0
        } else {
            let entry_size = std::mem::size_of::<Option<TTEntry>>();
            ((size_mb * 1024 * 1024) / entry_size).max(1024)
        };

        Self {
            entries: vec![None; size],
            size,
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.size > 0
    }

    #[inline]
    fn slot(&self, hash: u64) -> Option<&TTEntry> {
        if self.size == 0 {
            return None;
        }
        self.entries[(hash as usize) % self.size]
            .as_ref()
            .filter(|e| e.hash == hash)
    }

    /// Probe the table for a usable score.
    ///
    /// Returns the stored score when the entry was searched to exactly
    /// `depth` and its bound type decides the `(alpha, beta)` window.
    #[must_use]
    pub fn probe(&self, hash: u64, depth: u32, alpha: f64, beta: f64) -> Option<f64> {
        let entry = self.slot(hash)?;
        if entry.depth != depth {
            return None;
        }
        match entry.entry_type {
            EntryType::Exact => Some(entry.score),
            EntryType::LowerBound if entry.score >= beta => Some(entry.score),
            EntryType::UpperBound if entry.score <= alpha => Some(entry.score),
            _ => None,
        }
    }

    /// Best move from a previous search of this position, for move ordering.
    #[must_use]
    pub fn best_move(&self, hash: u64) -> Option<&Action> {
        self.slot(hash)?.best_move.as_ref()
    }

    /// Store a position in the table.
    ///
    /// Replaces the slot if it is empty, holds the same position, or the new
    /// search is at least as deep as the existing entry.
    pub fn store(
        &mut self,
        hash: u64,
        depth: u32,
        score: f64,
        entry_type: EntryType,
        best_move: Option<Action>,
    ) {
        if self.size == 0 {
            return;
        }
        let idx = (hash as usize) % self.size;

        let should_replace = match &self.entries[idx] {
            None => true,
            Some(e) => e.hash == hash || e.depth <= depth,
        };

        if should_replace {
            self.entries[idx] = Some(TTEntry {
                hash,
                depth,
                score,
                entry_type,
                best_move,
            });
        }
    }

    /// Clear all entries in the table.
    pub fn clear(&mut self) {
        self.entries.fill(None);
    }

    /// Get statistics about table usage.
    #[must_use]
    pub fn stats(&self) -> TTStats {
        let used = self.entries.iter().filter(|e| e.is_some()).count();
        let usage_percent = if self.size == 0 {
            0
        } else {
            (used as f64 / self.size as f64 * 100.0) as u8
        };
        TTStats {
            size: self.size,
            used,
            usage_percent,
        }
    }
}

/// Statistics about transposition table usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTStats {
    /// Total number of slots in the table
    pub size: usize,
    /// Number of slots currently occupied
    pub used: usize,
    /// Percentage of table in use (0-100)
    pub usage_percent: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Direction, PieceKind, Player};

    #[test]
    fn test_tt_store_probe() {
        let mut tt = TranspositionTable::new(1);
        let best = Action::stack_move(1, 1, Direction::Right, &[2, 1]);
        tt.store(0x1234, 5, 100.0, EntryType::Exact, Some(best.clone()));

        assert_eq!(tt.probe(0x1234, 5, -1000.0, 1000.0), Some(100.0));
        assert_eq!(tt.best_move(0x1234), Some(&best));
    }

    #[test]
    fn test_tt_depth_must_match() {
        let mut tt = TranspositionTable::new(1);
        tt.store(0x1234, 5, 100.0, EntryType::Exact, None);

        assert_eq!(tt.probe(0x1234, 4, -1000.0, 1000.0), None);
        assert_eq!(tt.probe(0x1234, 6, -1000.0, 1000.0), None);
    }

    #[test]
    fn test_tt_bounds() {
        let mut tt = TranspositionTable::new(1);

        tt.store(0x1111, 3, 50.0, EntryType::LowerBound, None);
        assert_eq!(tt.probe(0x1111, 3, 0.0, 40.0), Some(50.0));
        assert_eq!(tt.probe(0x1111, 3, 0.0, 60.0), None);

        tt.store(0x2222, 3, -50.0, EntryType::UpperBound, None);
        assert_eq!(tt.probe(0x2222, 3, -40.0, 0.0), Some(-50.0));
        assert_eq!(tt.probe(0x2222, 3, -60.0, 0.0), None);
    }

    #[test]
    fn test_tt_infinite_scores() {
        let mut tt = TranspositionTable::new(1);
        tt.store(0x3333, 2, f64::INFINITY, EntryType::Exact, None);
        assert_eq!(
            tt.probe(0x3333, 2, f64::NEG_INFINITY, f64::INFINITY),
            Some(f64::INFINITY)
        );
    }

    #[test]
    fn test_tt_replacement_prefers_depth() {
        let mut tt = TranspositionTable::new(1);
        let size = tt.stats().size as u64;
        let deep = 7u64;
        let shallow = deep + size;

        tt.store(deep, 6, 1.0, EntryType::Exact, None);
        tt.store(shallow, 2, 2.0, EntryType::Exact, None);
        assert_eq!(tt.probe(deep, 6, -10.0, 10.0), Some(1.0));
        assert_eq!(tt.probe(shallow, 2, -10.0, 10.0), None);
    }

    #[test]
    fn test_tt_clear_and_stats() {
        let mut tt = TranspositionTable::new(1);
        let mv = Action::place(0, 0, PieceKind::Capstone, Player::Black);
        tt.store(0xAAAA, 1, 0.0, EntryType::Exact, Some(mv));
        assert_eq!(tt.stats().used, 1);

        tt.clear();
        assert_eq!(tt.stats().used, 0);
        assert_eq!(tt.best_move(0xAAAA), None);
    }

    #[test]
    fn test_tt_disabled() {
        let mut tt = TranspositionTable::new(0);
        assert!(!tt.is_enabled());
        tt.store(0x1, 1, 1.0, EntryType::Exact, None);
        assert_eq!(tt.probe(0x1, 1, -1.0, 2.0), None);
        assert_eq!(tt.stats().usage_percent, 0);
    }
}
