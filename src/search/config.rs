//! Search configuration parameters.

use serde::{Deserialize, Serialize};

/// Alpha-beta search configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Deepest iterative-deepening pass, in plies.
    pub max_depth: u32,

    /// Share of the time budget after which no new deepening pass starts.
    /// A pass already running still stops at the hard deadline.
    pub time_fraction: f64,

    /// Transposition table size in megabytes (0 disables the table).
    pub tt_size_mb: usize,

    /// Most actions expanded below the root, best-first by a one-ply
    /// evaluation. This is an approximation: a capped search can miss
    /// moves a full search would find. `None` expands everything.
    pub max_branching: Option<usize>,

    /// Try the cached best move, killer moves and history-ranked moves first.
    pub order_moves: bool,

    /// Key the transposition table on the smallest hash over the eight
    /// rotations and reflections of the board.
    pub symmetric_keys: bool,

    /// Keep the transposition table between calls made for the same root player.
    pub reuse_table: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            time_fraction: 0.5,
            tt_size_mb: 16,
            max_branching: None,
            order_moves: true,
            symmetric_keys: false,
            reuse_table: false,
        }
    }
}

impl SearchConfig {
    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_time_fraction(mut self, fraction: f64) -> Self {
        self.time_fraction = fraction;
        self
    }

    pub fn with_tt_size_mb(mut self, size_mb: usize) -> Self {
        self.tt_size_mb = size_mb;
        self
    }

    pub fn with_max_branching(mut self, cap: Option<usize>) -> Self {
        self.max_branching = cap;
        self
    }

    pub fn with_move_ordering(mut self, enabled: bool) -> Self {
        self.order_moves = enabled;
        self
    }

    pub fn with_symmetric_keys(mut self, enabled: bool) -> Self {
        self.symmetric_keys = enabled;
        self
    }

    pub fn with_table_reuse(mut self, enabled: bool) -> Self {
        self.reuse_table = enabled;
        self
    }
}
