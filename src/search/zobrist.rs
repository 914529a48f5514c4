//! Zobrist hashing for position identification
//!
//! A position key XORs one random value per (cell, stack level, piece) plus
//! board-size, side-to-move and opening components. Stacks make incremental updates
//! awkward (a stack move rewrites several cells at once), so keys are
//! recomputed from the board; with `symmetric` keys the smallest key over the
//! eight rotations and reflections is used.
//!
//! # Example
//!
//! ```
//! use tak::board::{Board, Piece, Player, Pos};
//! use tak::search::ZobristTable;
//!
//! let zt = ZobristTable::new();
//! let mut a = Board::new(5).unwrap();
//! let mut b = Board::new(5).unwrap();
//! a.place(Pos::new(0, 0), Piece::flat(Player::White)).unwrap();
//! b.place(Pos::new(4, 4), Piece::flat(Player::White)).unwrap();
//!
//! assert_ne!(zt.hash(&a), zt.hash(&b));
//! assert_eq!(zt.canonical_hash(&a), zt.canonical_hash(&b));
//! ```

use crate::board::{Board, Pos, MAX_SIZE};

/// Levels with a precomputed key; taller stacks derive theirs by mixing.
const MAX_LEVELS: usize = 128;

/// Distinct piece codes (kind × owner)
const PIECE_CODES: usize = 6;

const CELLS: usize = MAX_SIZE * MAX_SIZE;

/// Zobrist hash table for position hashing.
pub struct ZobristTable {
    /// Indexed by `(cell * MAX_LEVELS + level) * PIECE_CODES + code`
    pieces: Vec<u64>,
    /// XORed when black is to move
    black_to_move: u64,
    /// XORed during the first two plies
    opening: u64,
    /// One per board size; cells sit on a fixed `MAX_SIZE` grid
    sizes: Vec<u64>,
}

impl ZobristTable {
    /// Create a new Zobrist table with deterministic random values.
    ///
    /// Same seed = same table = reproducible hashes.
    #[must_use]
    pub fn new() -> Self {
        // Knuth's MMIX LCG
        let mut seed: u64 = 0x1234_5678_9ABC_DEF0;
        let mut next_rand = || {
            seed = seed
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            mix(seed)
        };

        let pieces = (0..CELLS * MAX_LEVELS * PIECE_CODES)
            .map(|_| next_rand())
            .collect();

        Self {
            pieces,
            black_to_move: next_rand(),
            opening: next_rand(),
            sizes: (0..=MAX_SIZE).map(|_| next_rand()).collect(),
        }
    }

    /// Key of the board as it stands.
    #[must_use]
    pub fn hash(&self, board: &Board) -> u64 {
        self.hash_with(board, Symmetry::Identity)
    }

    /// Smallest key over the eight board symmetries.
    ///
    /// Positions that are rotations or reflections of each other share a key.
    #[must_use]
    pub fn canonical_hash(&self, board: &Board) -> u64 {
        Symmetry::ALL
            .into_iter()
            .map(|sym| self.hash_with(board, sym))
            .min()
            .unwrap_or_default()
    }

    fn hash_with(&self, board: &Board, sym: Symmetry) -> u64 {
        let size = board.size();
        let mut h = self.sizes.get(size).copied().unwrap_or_default();
        for (pos, stack) in board.stacks() {
            let cell = sym.apply(pos, size);
            let cell = cell.y as usize * MAX_SIZE + cell.x as usize;
            for (level, piece) in stack.pieces().iter().enumerate() {
                h ^= self.piece_key(cell, level, piece.code());
            }
        }
        if board.to_move() == crate::board::Player::Black {
            h ^= self.black_to_move;
        }
        if board.is_opening() {
            h ^= self.opening;
        }
        h
    }

    #[inline]
    fn piece_key(&self, cell: usize, level: usize, code: usize) -> u64 {
        if level < MAX_LEVELS {
            self.pieces[(cell * MAX_LEVELS + level) * PIECE_CODES + code]
        } else {
            let base = self.pieces[(cell * MAX_LEVELS + MAX_LEVELS - 1) * PIECE_CODES + code];
            mix(base ^ level as u64)
        }
    }
}

impl Default for ZobristTable {
    fn default() -> Self {
        Self::new()
    }
}

/// SplitMix64 finalizer
#[inline]
fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Rotations and reflections of a square board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Symmetry {
    Identity,
    Rotate90,
    Rotate180,
    Rotate270,
    FlipX,
    FlipY,
    Transpose,
    AntiTranspose,
}

impl Symmetry {
    const ALL: [Symmetry; 8] = [
        Symmetry::Identity,
        Symmetry::Rotate90,
        Symmetry::Rotate180,
        Symmetry::Rotate270,
        Symmetry::FlipX,
        Symmetry::FlipY,
        Symmetry::Transpose,
        Symmetry::AntiTranspose,
    ];

    #[inline]
    fn apply(self, pos: Pos, size: usize) -> Pos {
        let n = size as u8 - 1;
        let (x, y) = (pos.x, pos.y);
        let (x, y) = match self {
            Symmetry::Identity => (x, y),
            Symmetry::Rotate90 => (n - y, x),
            Symmetry::Rotate180 => (n - x, n - y),
            Symmetry::Rotate270 => (y, n - x),
            Symmetry::FlipX => (n - x, y),
            Symmetry::FlipY => (x, n - y),
            Symmetry::Transpose => (y, x),
            Symmetry::AntiTranspose => (n - y, n - x),
        };
        Pos::new(x, y)
    }
}
