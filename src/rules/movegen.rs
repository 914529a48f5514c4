//! Legal action enumeration
//!
//! Placements come first (row-major), then stack moves grouped by origin,
//! carry count, direction and drop composition. The order is deterministic,
//! which keeps search results reproducible.

use crate::board::{Board, Direction, PieceKind, Player, MAX_SIZE};

use super::action::{validate_stack_move, Action, Drops};

/// Every way to split `carry` pieces into ordered positive drops.
///
/// There are `2^(carry-1)` of them; `[carry]` comes first. Empty for a carry
/// of zero or above the largest carry limit (`MAX_SIZE`).
pub fn compositions(carry: usize) -> Vec<Drops> {
    if carry == 0 || carry > MAX_SIZE {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(1 << (carry - 1));
    for mask in 0u32..(1u32 << (carry - 1)) {
        let mut parts = Drops::new();
        let mut run = 1u8;
        for bit in 0..carry - 1 {
            if mask & (1 << bit) != 0 {
                parts.push(run);
                run = 1;
            } else {
                run += 1;
            }
        }
        parts.push(run);
        out.push(parts);
    }
    out
}

/// All legal actions for `player` at `ply`.
pub fn generate_actions(board: &Board, player: Player, ply: u32) -> Vec<Action> {
    let mut actions = Vec::with_capacity(board.size() * board.size() * 3);
    generate_placements(board, player, ply, &mut actions);
    generate_stack_moves(board, player, &mut actions);
    actions
}

/// All legal actions for the side to move.
#[inline]
pub fn legal_actions(board: &Board) -> Vec<Action> {
    generate_actions(board, board.to_move(), board.ply())
}

fn generate_placements(board: &Board, player: Player, ply: u32, actions: &mut Vec<Action>) {
    let opening = ply < 2;
    let owner = if opening { player.opponent() } else { player };
    let reserve = board.reserve(owner);

    let kinds: &[PieceKind] = if opening {
        &[PieceKind::Flat]
    } else {
        &[PieceKind::Flat, PieceKind::Standing, PieceKind::Capstone]
    };

    for (at, stack) in board.stacks() {
        if !stack.is_empty() {
            continue;
        }
        for &kind in kinds {
            if reserve.count(kind) > 0 {
                actions.push(Action::Place { at, kind, owner });
            }
        }
    }
}

fn generate_stack_moves(board: &Board, player: Player, actions: &mut Vec<Action>) {
    let size = board.size();
    let max_carry = board.carry_limit();
    // Compositions depend only on the carry count
    let table: Vec<Vec<Drops>> = (0..=max_carry).map(compositions).collect();

    for (from, stack) in board.stacks() {
        if stack.controller() != Some(player) {
            continue;
        }
        let carry_cap = max_carry.min(stack.height());
        for carry in 1..=carry_cap {
            for direction in Direction::ALL {
                let room = room_in_direction(from.x as usize, from.y as usize, direction, size);
                for drops in &table[carry] {
                    if drops.len() > room {
                        continue;
                    }
                    if validate_stack_move(board, from, direction, drops, player).is_ok() {
                        actions.push(Action::Move {
                            from,
                            direction,
                            drops: drops.clone(),
                        });
                    }
                }
            }
        }
    }
}

/// Cells between `(x, y)` and the edge in `direction`.
#[inline]
fn room_in_direction(x: usize, y: usize, direction: Direction, size: usize) -> usize {
    match direction {
        Direction::Up => y,
        Direction::Down => size - 1 - y,
        Direction::Left => x,
        Direction::Right => size - 1 - x,
    }
}

/// Leaf count of the legal-action tree `depth` plies deep.
///
/// Actions that fail to execute are not counted.
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let actions = legal_actions(board);
    if depth == 1 {
        return actions.len() as u64;
    }
    let mut total = 0;
    for action in &actions {
        if action.execute(board).is_err() {
            continue;
        }
        total += perft(board, depth - 1);
        if let Err(err) = action.undo(board) {
            tracing::error!(%err, "undo failed during perft");
            break;
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Piece, Pos};

    #[test]
    fn test_compositions_count() {
        assert!(compositions(0).is_empty());
        assert!(compositions(MAX_SIZE + 1).is_empty());
        assert!(compositions(40).is_empty());
        for carry in 1..=8 {
            let all = compositions(carry);
            assert_eq!(all.len(), 1 << (carry - 1));
            for drops in &all {
                assert_eq!(drops.iter().map(|&d| d as usize).sum::<usize>(), carry);
                assert!(drops.iter().all(|&d| d >= 1));
            }
        }
        assert_eq!(compositions(1), vec![Drops::from_slice(&[1])]);
        let three: Vec<Vec<u8>> = compositions(3).into_iter().map(|d| d.to_vec()).collect();
        assert_eq!(three, vec![vec![3], vec![1, 2], vec![2, 1], vec![1, 1, 1]]);
    }

    #[test]
    fn test_opening_placements() {
        let board = Board::new(5).unwrap();
        let actions = legal_actions(&board);
        assert_eq!(actions.len(), 25);
        for action in &actions {
            match action {
                Action::Place { kind, owner, .. } => {
                    assert_eq!(*kind, PieceKind::Flat);
                    assert_eq!(*owner, Player::Black);
                }
                Action::Move { .. } => panic!("nothing to move on an empty board"),
            }
        }
    }

    #[test]
    fn test_second_ply_moves_gifted_flat() {
        let mut board = Board::new(5).unwrap();
        Action::place(0, 0, PieceKind::Flat, Player::Black)
            .execute(&mut board)
            .unwrap();
        // Black controls (0, 0): 24 white flats to place plus two single steps
        let actions = legal_actions(&board);
        assert_eq!(actions.len(), 24 + 2);
        let (placements, moves): (Vec<_>, Vec<_>) =
            actions.into_iter().partition(|a| a.is_placement());
        assert!(placements
            .iter()
            .all(|a| matches!(a, Action::Place { owner: Player::White, .. })));
        assert_eq!(
            moves,
            vec![
                Action::stack_move(0, 0, Direction::Down, &[1]),
                Action::stack_move(0, 0, Direction::Right, &[1]),
            ]
        );
    }

    #[test]
    fn test_midgame_placements_respect_reserve() {
        let mut board = Board::new(5).unwrap();
        board.set_turn(Player::White, 2);
        assert_eq!(legal_actions(&board).len(), 25 * 3);

        let mut no_caps = Board::new(4).unwrap();
        no_caps.set_turn(Player::Black, 2);
        assert_eq!(legal_actions(&no_caps).len(), 16 * 2);
    }

    #[test]
    fn test_single_piece_moves() {
        let mut board = Board::new(5).unwrap();
        board.place(Pos::new(2, 2), Piece::flat(Player::White)).unwrap();
        board.set_turn(Player::White, 4);

        let moves: Vec<_> = legal_actions(&board)
            .into_iter()
            .filter(|a| !a.is_placement())
            .collect();
        assert_eq!(moves.len(), 4);
    }

    #[test]
    fn test_corner_stack_moves() {
        // Three white flats in the corner: carries 1..=3 in two directions
        let mut board = Board::new(5).unwrap();
        let corner = Pos::new(0, 0);
        board.place(corner, Piece::flat(Player::White)).unwrap();
        board.drop_piece(corner, Piece::flat(Player::White)).unwrap();
        board.drop_piece(corner, Piece::flat(Player::White)).unwrap();
        board.set_turn(Player::White, 4);

        let moves = legal_actions(&board)
            .into_iter()
            .filter(|a| !a.is_placement())
            .count();
        // (1 + 2 + 4) compositions per direction
        assert_eq!(moves, 2 * 7);
    }

    #[test]
    fn test_generated_moves_skip_blocked_paths() {
        let mut board = Board::new(5).unwrap();
        board.place(Pos::new(0, 0), Piece::flat(Player::White)).unwrap();
        board.drop_piece(Pos::new(0, 0), Piece::flat(Player::White)).unwrap();
        board
            .place(Pos::new(1, 0), Piece::new(PieceKind::Standing, Player::Black))
            .unwrap();
        board.set_turn(Player::White, 4);

        let moves: Vec<_> = legal_actions(&board)
            .into_iter()
            .filter(|a| a.origin() == Pos::new(0, 0) && !a.is_placement())
            .collect();
        // Only downward moves remain: [1], [2], [1, 1]
        assert_eq!(moves.len(), 3);
        assert!(moves
            .iter()
            .all(|a| matches!(a, Action::Move { direction: Direction::Down, .. })));
    }

    #[test]
    fn test_generated_actions_validate() {
        let mut board = Board::new(4).unwrap();
        let script = [
            Action::place(0, 0, PieceKind::Flat, Player::Black),
            Action::place(3, 3, PieceKind::Flat, Player::White),
            Action::place(1, 0, PieceKind::Flat, Player::White),
            Action::place(0, 1, PieceKind::Standing, Player::Black),
            Action::stack_move(1, 0, Direction::Left, &[1]),
        ];
        for action in &script {
            action.execute(&mut board).unwrap();
        }
        for action in legal_actions(&board) {
            assert_eq!(action.validate(&board), Ok(()), "{action:?}");
        }
    }

    #[test]
    fn test_perft_opening() {
        let mut board = Board::new(3).unwrap();
        assert_eq!(perft(&mut board, 1), 9);
        // Second ply: 8 placements, or one step with the gifted flat
        // (corners 2, edges 3, centre 4)
        assert_eq!(perft(&mut board, 2), 9 * 8 + 4 * 2 + 4 * 3 + 4);
        assert!(board.is_empty());
    }
}
