//! Board representation for Tak

pub mod board;
pub mod stack;


use std::fmt;

use serde::{Deserialize, Serialize};

// Re-exports
pub use board::{Board, Reserve};
pub use stack::{can_stack, Stack};

/// Smallest supported board size
pub const MIN_SIZE: usize = 3;
/// Largest supported board size
pub const MAX_SIZE: usize = 8;

/// Starting (stones, capstones) per player, indexed by board size.
pub fn starting_reserve(size: usize) -> Option<Reserve> {
    let (stones, capstones) = match size {
        3 => (10, 0),
        4 => (15, 0),
        5 => (21, 1),
        6 => (30, 1),
        7 => (40, 2),
        8 => (50, 2),
        _ => return None,
    };
    Some(Reserve { stones, capstones })
}

/// Player colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Player {
    White,
    Black,
}

impl Player {
    /// Get opponent color
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Player::White => 0,
            Player::Black => 1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::White => write!(f, "white"),
            Player::Black => write!(f, "black"),
        }
    }
}

/// Piece kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    Flat,
    Standing,
    Capstone,
}

impl PieceKind {
    pub const ALL: [PieceKind; 3] = [PieceKind::Flat, PieceKind::Standing, PieceKind::Capstone];

    /// Flats and capstones count towards roads, standing stones do not.
    #[inline]
    pub fn is_road(self) -> bool {
        matches!(self, PieceKind::Flat | PieceKind::Capstone)
    }

    /// Upper-case token used by the action notation.
    pub fn token(self) -> &'static str {
        match self {
            PieceKind::Flat => "FLAT",
            PieceKind::Standing => "STANDING",
            PieceKind::Capstone => "CAPSTONE",
        }
    }

    pub fn from_token(token: &str) -> Option<PieceKind> {
        PieceKind::ALL.into_iter().find(|kind| kind.token() == token)
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceKind::Flat => write!(f, "flat"),
            PieceKind::Standing => write!(f, "standing stone"),
            PieceKind::Capstone => write!(f, "capstone"),
        }
    }
}

/// A single piece. Only `kind` ever changes (standing → flat when flattened).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub owner: Player,
}

impl Piece {
    #[inline]
    pub fn new(kind: PieceKind, owner: Player) -> Self {
        Self { kind, owner }
    }

    #[inline]
    pub fn flat(owner: Player) -> Self {
        Self::new(PieceKind::Flat, owner)
    }

    #[inline]
    pub fn is_road(self) -> bool {
        self.kind.is_road()
    }

    /// Compact code in `0..6` used for hashing.
    #[inline]
    pub fn code(self) -> usize {
        self.owner.index() * 3
            + match self.kind {
                PieceKind::Flat => 0,
                PieceKind::Standing => 1,
                PieceKind::Capstone => 2,
            }
    }

    /// One-letter glyph, upper case for white.
    pub fn glyph(self) -> char {
        let c = match self.kind {
            PieceKind::Flat => 'f',
            PieceKind::Standing => 's',
            PieceKind::Capstone => 'c',
        };
        match self.owner {
            Player::White => c.to_ascii_uppercase(),
            Player::Black => c,
        }
    }
}

/// Orthogonal directions. `Up` decreases `y`, `Left` decreases `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        }
    }

    pub fn from_token(token: &str) -> Option<Direction> {
        Direction::ALL.into_iter().find(|dir| dir.token() == token)
    }
}

/// Position on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub x: u8,
    pub y: u8,
}

impl Pos {
    #[inline]
    pub fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn to_index(self, size: usize) -> usize {
        self.y as usize * size + self.x as usize
    }

    #[inline]
    pub fn from_index(idx: usize, size: usize) -> Self {
        Self {
            x: (idx % size) as u8,
            y: (idx / size) as u8,
        }
    }

    #[inline]
    pub fn is_valid(x: i32, y: i32, size: usize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < size && (y as usize) < size
    }

    /// Neighbouring position `steps` cells away, if still on the board.
    #[inline]
    pub fn step(self, direction: Direction, steps: usize, size: usize) -> Option<Pos> {
        let (dx, dy) = direction.delta();
        let steps = steps as i32;
        let x = i32::from(self.x) + dx * steps;
        let y = i32::from(self.y) + dy * steps;
        if Pos::is_valid(x, y, size) {
            Some(Pos::new(x as u8, y as u8))
        } else {
            None
        }
    }

    /// Orthogonal neighbours inside a `size` board.
    pub fn neighbours(self, size: usize) -> impl Iterator<Item = Pos> {
        Direction::ALL
            .into_iter()
            .filter_map(move |dir| self.step(dir, 1, size))
    }
}
