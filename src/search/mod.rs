//! Search module for the Tak engine
//!
//! Contains:
//! - Deadline handling for time-bounded searches
//! - Search configuration
//! - Zobrist hashing for position identification
//! - Transposition table for caching search results
//! - Alpha-Beta search with iterative deepening

pub mod alphabeta;
pub mod config;
pub mod deadline;
pub mod tt;
pub mod zobrist;

pub use alphabeta::{SearchResult, SearchStats, Searcher};
pub use config::SearchConfig;
pub use deadline::Deadline;
pub use tt::{EntryType, TTEntry, TTStats, TranspositionTable};
pub use zobrist::ZobristTable;
