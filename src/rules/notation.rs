//! Textual action encoding
//!
//! - Placement: `PLACE_<KIND> x y`, e.g. `PLACE_CAPSTONE 2 3`
//! - Stack move: `MOVE x y <DIRECTION> <carry> d1 d2 ...`, e.g. `MOVE 0 0 RIGHT 3 1 2`
//!
//! The encoding is for logs, replays and external tools. The search works on
//! [`Action`] values directly.

use std::fmt;

use crate::board::{Board, Direction, PieceKind, Player, Pos};
use crate::error::ParseActionError;

use super::action::{Action, Drops};

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Place { at, kind, .. } => write!(f, "PLACE_{} {} {}", kind.token(), at.x, at.y),
            Action::Move {
                from,
                direction,
                drops,
            } => {
                write!(
                    f,
                    "MOVE {} {} {} {}",
                    from.x,
                    from.y,
                    direction.token(),
                    self.carry()
                )?;
                for d in drops {
                    write!(f, " {d}")?;
                }
                Ok(())
            }
        }
    }
}

/// Parse an action for the side to move on `board`.
///
/// Placements get the owner the board expects (the opponent during the opening).
pub fn parse_action(text: &str, board: &Board) -> Result<Action, ParseActionError> {
    parse_action_with(text, board.size(), board.placement_owner())
}

/// Parse an action on a `size` board, giving placed pieces to `owner`.
pub fn parse_action_with(
    text: &str,
    size: usize,
    owner: Player,
) -> Result<Action, ParseActionError> {
    let mut tokens = text.split_whitespace();
    let head = tokens.next().ok_or(ParseActionError::Empty)?.to_ascii_uppercase();

    if let Some(kind_token) = head.strip_prefix("PLACE_") {
        let kind = PieceKind::from_token(kind_token)
            .ok_or_else(|| ParseActionError::UnknownCommand(head.clone()))?;
        let at = parse_pos(&mut tokens, size)?;
        if let Some(extra) = tokens.next() {
            return Err(ParseActionError::Trailing(extra.to_string()));
        }
        return Ok(Action::Place { at, kind, owner });
    }

    if head != "MOVE" {
        return Err(ParseActionError::UnknownCommand(head));
    }

    let from = parse_pos(&mut tokens, size)?;
    let dir_token = tokens
        .next()
        .ok_or(ParseActionError::MissingToken("direction"))?
        .to_ascii_uppercase();
    let direction =
        Direction::from_token(&dir_token).ok_or(ParseActionError::UnknownDirection(dir_token))?;
    let carry = parse_number(tokens.next().ok_or(ParseActionError::MissingToken("carry count"))?)?;
    // The carry limit equals the board size
    if carry as usize > size {
        return Err(ParseActionError::CarryOutOfRange { carry, limit: size });
    }

    let mut drops = Drops::new();
    let mut total = 0u32;
    for token in tokens {
        let d = parse_number(token)?;
        if d == 0 {
            return Err(ParseActionError::ZeroDrop);
        }
        let d = u8::try_from(d).map_err(|_| ParseActionError::BadNumber(token.to_string()))?;
        total += u32::from(d);
        drops.push(d);
    }
    if drops.is_empty() {
        return Err(ParseActionError::MissingToken("drop counts"));
    }
    if total != carry {
        return Err(ParseActionError::CarryMismatch { carry, total });
    }
    Ok(Action::Move {
        from,
        direction,
        drops,
    })
}

fn parse_number(token: &str) -> Result<u32, ParseActionError> {
    token
        .parse::<u32>()
        .map_err(|_| ParseActionError::BadNumber(token.to_string()))
}

fn parse_pos<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    size: usize,
) -> Result<Pos, ParseActionError> {
    let x = parse_number(tokens.next().ok_or(ParseActionError::MissingToken("x coordinate"))?)?;
    let y = parse_number(tokens.next().ok_or(ParseActionError::MissingToken("y coordinate"))?)?;
    if x as usize >= size || y as usize >= size {
        return Err(ParseActionError::OutOfRange { x, y, size });
    }
    Ok(Pos::new(x as u8, y as u8))
}
