use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::MapError;
use crate::grid::Point;

/// One of the four orthogonal moves on a grid, written either as a caret
/// (`^ > v <`) or a compass letter (`N E S W`).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    pub fn caret(self) -> char {
        match self {
            Direction::Up => '^',
            Direction::Right => '>',
            Direction::Down => 'v',
            Direction::Left => '<',
        }
    }

    pub fn compass(self) -> char {
        match self {
            Direction::Up => 'N',
            Direction::Right => 'E',
            Direction::Down => 'S',
            Direction::Left => 'W',
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// The direction of the single orthogonal step from `from` to `to`.
    pub fn between(from: Point, to: Point) -> Result<Direction, MapError> {
        Direction::ALL
            .into_iter()
            .find(|d| {
                let (dx, dy) = d.offset();
                from.offset(dx, dy) == Some(to)
            })
            .ok_or(MapError::NotAdjacent { from, to })
    }
}

impl TryFrom<char> for Direction {
    type Error = MapError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            '^' | 'N' | 'n' => Ok(Direction::Up),
            '>' | 'E' | 'e' => Ok(Direction::Right),
            'v' | 'V' | 'S' | 's' => Ok(Direction::Down),
            '<' | 'W' | 'w' => Ok(Direction::Left),
            _ => Err(MapError::UnknownDirection(c)),
        }
    }
}

impl FromStr for Direction {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Direction::try_from(c),
            (Some(c), Some(_)) => Err(MapError::UnknownDirection(c)),
            (None, _) => Err(MapError::UnknownDirection(' ')),
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.compass())
    }
}
