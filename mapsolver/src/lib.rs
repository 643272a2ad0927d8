//! Breadth-first distance fields over character grids.
//!
//! A [`Grid`] is loaded from text (`#` walls, `.` floor, `S`/`E` markers by
//! default). A [`Solver`] borrows it, stamps every cell with its step count
//! from the start until the end is reached, and can then:
//!
//! - prune dead ends from the field ([`Solver::purge_dead_ends`]),
//! - list every shortest route ([`Solver::find_all_shortest_routes`]),
//! - list every loop-free route ([`Solver::find_all_routes`]),
//! - dump the field for debugging ([`Solver::render`]).

pub mod direction;
pub mod error;
pub mod field;
pub mod grid;
pub mod render;
pub mod solver;
pub mod util;

pub use direction::Direction;
pub use error::MapError;
pub use field::{DistanceField, UNVISITED};
pub use grid::{Grid, Point, END, OPEN, START, WALL};
pub use render::Render;
pub use solver::{Route, RouteStep, Solver};
