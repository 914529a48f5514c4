//! Win condition checking for Tak
//!
//! Win conditions:
//! 1. Road: an orthogonally connected chain of a player's flats/capstones
//!    joining two opposite edges
//! 2. Flats: when the board fills or a reserve runs out, most visible flat
//!    tops wins (equal counts draw)
//!
//! If one move completes roads for both players, the player who moved wins.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Player, Pos};

/// Pair of opposite edges a road connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Left edge (`x == 0`) to right edge
    Horizontal,
    /// Top edge (`y == 0`) to bottom edge
    Vertical,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::Horizontal, Axis::Vertical];

    #[inline]
    fn coord(self, pos: Pos) -> usize {
        match self {
            Axis::Horizontal => pos.x as usize,
            Axis::Vertical => pos.y as usize,
        }
    }
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    Road(Player),
    Flats(Player),
    Draw,
}

impl GameResult {
    pub fn winner(self) -> Option<Player> {
        match self {
            GameResult::Road(p) | GameResult::Flats(p) => Some(p),
            GameResult::Draw => None,
        }
    }
}

/// Breadth-first search from every road piece on the near edge.
pub fn has_road_on_axis(board: &Board, player: Player, axis: Axis) -> bool {
    let size = board.size();
    let mut visited = vec![false; size * size];
    let mut queue = VecDeque::with_capacity(size * size);

    for (pos, stack) in board.stacks() {
        if axis.coord(pos) == 0 && stack.is_road_for(player) {
            visited[pos.to_index(size)] = true;
            queue.push_back(pos);
        }
    }

    while let Some(pos) = queue.pop_front() {
        if axis.coord(pos) == size - 1 {
            return true;
        }
        for next in pos.neighbours(size) {
            let idx = next.to_index(size);
            if visited[idx] {
                continue;
            }
            if board.stack(next).is_some_and(|s| s.is_road_for(player)) {
                visited[idx] = true;
                queue.push_back(next);
            }
        }
    }
    false
}

/// Does `player` have a completed road on either axis?
pub fn has_road(board: &Board, player: Player) -> bool {
    Axis::ALL
        .into_iter()
        .any(|axis| has_road_on_axis(board, player, axis))
}

/// Player owning a road, if any. A double road goes to whoever just moved.
pub fn road_winner(board: &Board) -> Option<Player> {
    let last_mover = board.to_move().opponent();
    if has_road(board, last_mover) {
        Some(last_mover)
    } else if has_road(board, last_mover.opponent()) {
        Some(last_mover.opponent())
    } else {
        None
    }
}

/// Fewest placements `player` still needs for a road, ignoring the opponent's replies.
///
/// Own road pieces cost 0, empty cells cost 1, anything else blocks.
/// Returns `None` when every path is blocked.
pub fn road_distance(board: &Board, player: Player) -> Option<usize> {
    Axis::ALL
        .into_iter()
        .filter_map(|axis| road_distance_on_axis(board, player, axis))
        .min()
}

/// `player` is at most `steps` placements away from a road.
pub fn is_near_road(board: &Board, player: Player, steps: usize) -> bool {
    road_distance(board, player).is_some_and(|d| d <= steps)
}

fn road_distance_on_axis(board: &Board, player: Player, axis: Axis) -> Option<usize> {
    let size = board.size();
    let cost = |pos: Pos| -> Option<usize> {
        let stack = board.stack(pos)?;
        if stack.is_empty() {
            Some(1)
        } else if stack.is_road_for(player) {
            Some(0)
        } else {
            None
        }
    };

    // 0-1 BFS over cell weights
    let mut dist = vec![usize::MAX; size * size];
    let mut deque = VecDeque::with_capacity(size * size);
    for (pos, _) in board.stacks() {
        if axis.coord(pos) != 0 {
            continue;
        }
        if let Some(c) = cost(pos) {
            dist[pos.to_index(size)] = c;
            if c == 0 {
                deque.push_front(pos);
            } else {
                deque.push_back(pos);
            }
        }
    }

    let mut best: Option<usize> = None;
    while let Some(pos) = deque.pop_front() {
        let d = dist[pos.to_index(size)];
        if axis.coord(pos) == size - 1 {
            best = Some(best.map_or(d, |b| b.min(d)));
        }
        for next in pos.neighbours(size) {
            let Some(c) = cost(next) else { continue };
            let nd = d + c;
            let idx = next.to_index(size);
            if nd < dist[idx] {
                dist[idx] = nd;
                if c == 0 {
                    deque.push_front(next);
                } else {
                    deque.push_back(next);
                }
            }
        }
    }
    best
}

/// Result by visible flat count.
pub fn flat_result(board: &Board) -> GameResult {
    let white = board.flat_count(Player::White);
    let black = board.flat_count(Player::Black);
    match white.cmp(&black) {
        std::cmp::Ordering::Greater => GameResult::Flats(Player::White),
        std::cmp::Ordering::Less => GameResult::Flats(Player::Black),
        std::cmp::Ordering::Equal => GameResult::Draw,
    }
}

/// The board is full or a player has nothing left to place.
pub fn is_flat_ending(board: &Board) -> bool {
    board.is_full()
        || [Player::White, Player::Black]
            .into_iter()
            .any(|p| board.reserve(p).is_exhausted())
}

/// Terminal state check: road first, then full board or exhausted reserve.
pub fn game_result(board: &Board) -> Option<GameResult> {
    if let Some(player) = road_winner(board) {
        return Some(GameResult::Road(player));
    }
    if is_flat_ending(board) {
        return Some(flat_result(board));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Piece, PieceKind};

    fn put(board: &mut Board, x: u8, y: u8, kind: PieceKind, owner: Player) {
        board.place(Pos::new(x, y), Piece::new(kind, owner)).unwrap();
    }

    #[test]
    fn test_horizontal_road() {
        let mut board = Board::new(5).unwrap();
        for x in 0..5 {
            put(&mut board, x, 2, PieceKind::Flat, Player::White);
        }
        assert!(has_road_on_axis(&board, Player::White, Axis::Horizontal));
        assert!(!has_road_on_axis(&board, Player::White, Axis::Vertical));
        assert!(has_road(&board, Player::White));
        assert!(!has_road(&board, Player::Black));
    }

    #[test]
    fn test_vertical_road_with_capstone_and_bend() {
        let mut board = Board::new(5).unwrap();
        put(&mut board, 1, 0, PieceKind::Flat, Player::Black);
        put(&mut board, 1, 1, PieceKind::Flat, Player::Black);
        put(&mut board, 2, 1, PieceKind::Capstone, Player::Black);
        put(&mut board, 2, 2, PieceKind::Flat, Player::Black);
        put(&mut board, 2, 3, PieceKind::Flat, Player::Black);
        put(&mut board, 2, 4, PieceKind::Flat, Player::Black);
        assert!(has_road_on_axis(&board, Player::Black, Axis::Vertical));
        assert!(!has_road_on_axis(&board, Player::Black, Axis::Horizontal));
    }

    #[test]
    fn test_standing_stone_breaks_road() {
        let mut board = Board::new(5).unwrap();
        for x in 0..5 {
            let kind = if x == 3 { PieceKind::Standing } else { PieceKind::Flat };
            put(&mut board, x, 0, kind, Player::White);
        }
        assert!(!has_road(&board, Player::White));
    }

    #[test]
    fn test_opponent_top_breaks_road() {
        let mut board = Board::new(3).unwrap();
        put(&mut board, 0, 0, PieceKind::Flat, Player::White);
        put(&mut board, 1, 0, PieceKind::Flat, Player::White);
        board.drop_piece(Pos::new(1, 0), Piece::flat(Player::Black)).unwrap();
        put(&mut board, 2, 0, PieceKind::Flat, Player::White);
        assert!(!has_road(&board, Player::White));
    }

    #[test]
    fn test_diagonal_is_not_a_road() {
        let mut board = Board::new(3).unwrap();
        for i in 0..3 {
            put(&mut board, i, i, PieceKind::Flat, Player::White);
        }
        assert!(!has_road(&board, Player::White));
    }

    #[test]
    fn test_double_road_goes_to_last_mover() {
        let mut board = Board::new(3).unwrap();
        for x in 0..3 {
            put(&mut board, x, 0, PieceKind::Flat, Player::White);
            put(&mut board, x, 2, PieceKind::Flat, Player::Black);
        }
        // Black just moved
        board.set_turn(Player::White, 7);
        assert_eq!(road_winner(&board), Some(Player::Black));
        board.set_turn(Player::Black, 8);
        assert_eq!(road_winner(&board), Some(Player::White));
    }

    #[test]
    fn test_road_distance() {
        let mut board = Board::new(5).unwrap();
        assert_eq!(road_distance(&board, Player::White), Some(5));

        for x in 0..3 {
            put(&mut board, x, 1, PieceKind::Flat, Player::White);
        }
        assert_eq!(road_distance(&board, Player::White), Some(2));
        assert!(is_near_road(&board, Player::White, 2));
        assert!(!is_near_road(&board, Player::White, 1));

        // A wall at (3, 1) forces a detour
        put(&mut board, 3, 1, PieceKind::Standing, Player::Black);
        assert_eq!(road_distance(&board, Player::White), Some(3));
    }

    #[test]
    fn test_road_distance_fully_blocked() {
        let mut board = Board::new(3).unwrap();
        for x in 0..3 {
            put(&mut board, x, 1, PieceKind::Standing, Player::Black);
        }
        assert_eq!(road_distance_on_axis(&board, Player::White, Axis::Vertical), None);
    }

    #[test]
    fn test_game_result_flats() {
        let mut board = Board::new(3).unwrap();
        let (w, b) = (Player::White, Player::Black);
        let owners = [w, b, w, b, w, b, b, w, w];
        for (i, owner) in owners.into_iter().enumerate() {
            let pos = Pos::from_index(i, 3);
            board.place(pos, Piece::flat(owner)).unwrap();
        }
        // Full board, no road (no straight line of one colour)
        assert_eq!(road_winner(&board), None);
        assert_eq!(game_result(&board), Some(GameResult::Flats(Player::White)));
    }

    #[test]
    fn test_game_result_ongoing_and_reserve_out() {
        let board = Board::new(5).unwrap();
        assert_eq!(game_result(&board), None);

        let no_pieces = crate::board::Reserve {
            stones: 0,
            capstones: 0,
        };
        let mut empty_hand = Board::with_reserves(5, no_pieces).unwrap();
        empty_hand.place(Pos::new(0, 0), Piece::flat(Player::Black)).unwrap();
        assert_eq!(game_result(&empty_hand), Some(GameResult::Flats(Player::Black)));
    }
}
