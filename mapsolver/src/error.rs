use thiserror::Error;

use crate::grid::Point;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("map has no rows")]
    Empty,

    #[error("row {row} is {found} cells wide, expected {expected}")]
    NotRectangular {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("map says {expected} rows but holds {found}")]
    HeightMismatch { expected: usize, found: usize },

    #[error("no start marker '{0}' on the map")]
    MissingStart(char),

    #[error("no end marker '{0}' on the map")]
    MissingEnd(char),

    #[error("({x},{y}) is not on the map")]
    OutOfBounds { x: usize, y: usize },

    #[error("unknown direction '{0}', use one of ^ > v < or N E S W")]
    UnknownDirection(char),

    #[error("{from} and {to} are not next to each other")]
    NotAdjacent { from: Point, to: Point },

    #[error("invalid point '{0}', expected x,y")]
    InvalidPoint(String),
}
