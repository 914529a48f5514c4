//! Game rules for Tak
//!
//! This module implements the rule set including:
//! - Actions (placement and stack moves) with execute/undo
//! - Legal action generation
//! - Win conditions (roads, flat count)
//! - Text notation for actions

pub mod action;
pub mod movegen;
pub mod notation;
pub mod win;

// Re-exports for convenient access
pub use action::{validate_placement, validate_stack_move, Action, Drops, Path};
pub use movegen::{compositions, generate_actions, legal_actions, perft};
pub use notation::{parse_action, parse_action_with};
pub use win::{
    flat_result, game_result, has_road, has_road_on_axis, is_flat_ending, is_near_road,
    road_distance, road_winner, Axis, GameResult,
};
