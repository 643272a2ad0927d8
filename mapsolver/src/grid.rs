use std::fmt::Display;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::MapError;

pub const WALL: char = '#';
pub const OPEN: char = '.';
pub const START: char = 'S';
pub const END: char = 'E';

/// Neighbour scan order: the row above, the same row, then the row below.
const OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// A cell coordinate, `x` being the column and `y` the row.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Shift by a signed delta, `None` if that would leave the non-negative quadrant.
    pub fn offset(self, dx: isize, dy: isize) -> Option<Point> {
        Some(Point {
            x: self.x.checked_add_signed(dx)?,
            y: self.y.checked_add_signed(dy)?,
        })
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

impl FromStr for Point {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MapError::InvalidPoint(s.to_string());

        let (x, y) = s.split_once(',').ok_or_else(invalid)?;
        Ok(Point {
            x: x.trim().parse().map_err(|_| invalid())?,
            y: y.trim().parse().map_err(|_| invalid())?,
        })
    }
}

/// A rectangular grid of single character symbols.
///
/// The shape is fixed once loaded; single cells can be rewritten through
/// [`Grid::set_cell`]. Deserializing checks the same shape rules as parsing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridRepr")]
pub struct Grid {
    rows: usize,
    columns: usize,
    cells: Vec<Vec<char>>,
    start: Option<Point>,
    end: Option<Point>,
}

/// Unchecked serialized form of [`Grid`].
#[derive(Deserialize)]
struct GridRepr {
    rows: usize,
    columns: usize,
    cells: Vec<Vec<char>>,
    start: Option<Point>,
    end: Option<Point>,
}

impl TryFrom<GridRepr> for Grid {
    type Error = MapError;

    fn try_from(repr: GridRepr) -> Result<Self, Self::Error> {
        if repr.cells.len() != repr.rows {
            return Err(MapError::HeightMismatch {
                expected: repr.rows,
                found: repr.cells.len(),
            });
        }

        if let Some((row, found)) = repr
            .cells
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != repr.columns)
        {
            return Err(MapError::NotRectangular {
                row,
                expected: repr.columns,
                found,
            });
        }

        let grid = Grid {
            rows: repr.rows,
            columns: repr.columns,
            cells: repr.cells,
            start: None,
            end: None,
        };

        for marker in [repr.start, repr.end].into_iter().flatten() {
            if !grid.in_bounds(marker) {
                return Err(MapError::OutOfBounds {
                    x: marker.x,
                    y: marker.y,
                });
            }
        }

        Ok(Grid {
            start: repr.start,
            end: repr.end,
            ..grid
        })
    }
}

impl Grid {
    /// An all open grid without start or end.
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            rows: height,
            columns: width,
            cells: vec![vec![OPEN; width]; height],
            start: None,
            end: None,
        }
    }

    /// Load a grid, picking up the default `S`/`E` markers if they are present.
    ///
    /// A grid without markers loads fine here and is only rejected once a
    /// [`crate::Solver`] is built on it. Use [`Grid::parse_with_markers`] or
    /// `str::parse` to require both markers up front.
    pub fn parse(text: &str) -> Result<Self, MapError> {
        let mut grid = Self::from_lines(text)?;
        grid.start = grid.find_first(START);
        grid.end = grid.find_first(END);
        Ok(grid)
    }

    /// Load a grid that must contain both markers. The first occurrence in
    /// row-major order wins.
    pub fn parse_with_markers(
        text: &str,
        start_marker: char,
        end_marker: char,
    ) -> Result<Self, MapError> {
        let mut grid = Self::from_lines(text)?;
        grid.start = Some(
            grid.find_first(start_marker)
                .ok_or(MapError::MissingStart(start_marker))?,
        );
        grid.end = Some(
            grid.find_first(end_marker)
                .ok_or(MapError::MissingEnd(end_marker))?,
        );
        Ok(grid)
    }

    fn from_lines(text: &str) -> Result<Self, MapError> {
        let cells: Vec<Vec<char>> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.chars().collect())
            .collect();

        let columns = cells.first().map(Vec::len).ok_or(MapError::Empty)?;

        if let Some((row, found)) = cells
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != columns)
        {
            return Err(MapError::NotRectangular {
                row,
                expected: columns,
                found,
            });
        }

        debug!("loaded {}x{} map", columns, cells.len());

        Ok(Self {
            rows: cells.len(),
            columns,
            cells,
            start: None,
            end: None,
        })
    }

    pub fn width(&self) -> usize {
        self.columns
    }

    pub fn height(&self) -> usize {
        self.rows
    }

    pub fn start(&self) -> Option<Point> {
        self.start
    }

    pub fn end(&self) -> Option<Point> {
        self.end
    }

    pub fn rows(&self) -> impl Iterator<Item = &[char]> {
        self.cells.iter().map(Vec::as_slice)
    }

    /// All positions in row-major order.
    pub fn points(&self) -> impl Iterator<Item = Point> {
        let columns = self.columns;
        (0..self.rows).flat_map(move |y| (0..columns).map(move |x| Point::new(x, y)))
    }

    pub fn get(&self, point: Point) -> Option<char> {
        self.cells.get(point.y)?.get(point.x).copied()
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x < self.columns && point.y < self.rows
    }

    pub fn is_walkable(&self, point: Point) -> bool {
        self.get(point).is_some_and(|symbol| symbol != WALL)
    }

    pub fn is_wall(&self, point: Point) -> bool {
        self.get(point) == Some(WALL)
    }

    /// Walkable points next to `point`.
    ///
    /// Diagonal targets only need to be walkable themselves, slipping between
    /// two orthogonal walls is allowed.
    pub fn neighbors(&self, point: Point, allow_diagonal: bool) -> Vec<Point> {
        self.open_offsets(point, allow_diagonal)
            .into_iter()
            .filter_map(|(dx, dy)| point.offset(dx, dy))
            .collect()
    }

    /// Same as [`Grid::neighbors`] but returns the deltas.
    pub fn open_offsets(&self, point: Point, allow_diagonal: bool) -> Vec<(isize, isize)> {
        OFFSETS
            .iter()
            .copied()
            // diagonals are dropped, not just deprioritised
            .filter(|(dx, dy)| allow_diagonal || dx.abs() + dy.abs() != 2)
            .filter(|&(dx, dy)| {
                point
                    .offset(dx, dy)
                    .is_some_and(|next| self.is_walkable(next))
            })
            .collect()
    }

    /// Every position holding `symbol`, in row-major order.
    pub fn find_all(&self, symbol: char) -> Vec<Point> {
        self.cells
            .iter()
            .enumerate()
            .flat_map(|(y, row)| {
                row.iter()
                    .enumerate()
                    .filter(move |(_, c)| **c == symbol)
                    .map(move |(x, _)| Point::new(x, y))
            })
            .collect()
    }

    fn find_first(&self, symbol: char) -> Option<Point> {
        self.find_all(symbol).into_iter().next()
    }

    pub fn set_cell(&mut self, point: Point, symbol: char) -> Result<(), MapError> {
        if !self.in_bounds(point) {
            return Err(MapError::OutOfBounds {
                x: point.x,
                y: point.y,
            });
        }

        self.cells[point.y][point.x] = symbol;
        Ok(())
    }

    /// Write the start marker at `point` and use it as the start.
    pub fn mark_start(&mut self, point: Point) -> Result<(), MapError> {
        self.set_cell(point, START)?;
        self.start = Some(point);
        Ok(())
    }

    /// Write the end marker at `point` and use it as the end.
    pub fn mark_end(&mut self, point: Point) -> Result<(), MapError> {
        self.set_cell(point, END)?;
        self.end = Some(point);
        Ok(())
    }

    /// Where `marker` should go: `to` if given, otherwise its first
    /// occurrence. An occurrence that `to` overrides is cleared to open floor.
    pub fn resolve_marker(&mut self, marker: char, to: Option<Point>) -> Option<Point> {
        let found = self.find_first(marker);

        match (to, found) {
            (Some(to), Some(old)) => {
                self.cells[old.y][old.x] = OPEN;
                Some(to)
            }
            (to, found) => to.or(found),
        }
    }

    /// Scales the map by the given factor, i.e. to make it twice as large, pass 2.
    /// Every cell is repeated; the start and end markers are kept only in the
    /// top-left copy so they stay unique.
    pub fn scale_up(&mut self, factor: usize) {
        if factor <= 1 {
            return;
        }

        let mut new_cells = vec![vec![OPEN; self.columns * factor]; self.rows * factor];

        for row in 0..self.rows {
            for col in 0..self.columns {
                let symbol = self.cells[row][col];
                let here = Some(Point::new(col, row));
                let is_marker = here == self.start || here == self.end;

                for r in 0..factor {
                    for c in 0..factor {
                        new_cells[row * factor + r][col * factor + c] =
                            if is_marker && (r, c) != (0, 0) {
                                OPEN
                            } else {
                                symbol
                            };
                    }
                }
            }
        }

        self.rows *= factor;
        self.columns *= factor;
        self.cells = new_cells;
        self.start = self.start.map(|p| Point::new(p.x * factor, p.y * factor));
        self.end = self.end.map(|p| Point::new(p.x * factor, p.y * factor));
    }

    pub fn describe(&self) -> String {
        format!("{}x{} map", self.columns, self.rows)
    }
}

impl FromStr for Grid {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_markers(s, START, END)
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.cells {
            for cell in row {
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {

    use super::*;

    fn create_basic_map() -> Grid {
        "#######\n\
         #S###.#\n\
         #.###.#\n\
         #.#...#\n\
         #.#.###\n\
         #.....E\n\
         #######"
            .parse()
            .unwrap()
    }

    #[test]
    fn test_parse_markers() {
        let map = create_basic_map();

        assert_eq!(map.width(), 7);
        assert_eq!(map.height(), 7);
        assert_eq!(map.start(), Some(Point::new(1, 1)));
        assert_eq!(map.end(), Some(Point::new(6, 5)));
        assert_eq!(map.describe(), "7x7 map");
    }

    #[test]
    fn test_parse_custom_markers() {
        let map = Grid::parse_with_markers("a..\n..z\n", 'a', 'z').unwrap();

        assert_eq!(map.start(), Some(Point::new(0, 0)));
        assert_eq!(map.end(), Some(Point::new(2, 1)));
    }

    #[test]
    fn test_first_marker_wins() {
        let map = Grid::parse("..S\nS.E\nE..").unwrap();

        assert_eq!(map.start(), Some(Point::new(2, 0)));
        assert_eq!(map.end(), Some(Point::new(2, 1)));
    }

    #[test]
    fn test_parse_skips_blank_lines_and_whitespace() {
        let map = Grid::parse("\n  S.  \n\n.E\n\n").unwrap();

        assert_eq!(map.width(), 2);
        assert_eq!(map.height(), 2);
        assert_eq!(map.to_string(), "S.\n.E\n");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Grid::parse(""), Err(MapError::Empty));
        assert_eq!(Grid::parse("\n\n"), Err(MapError::Empty));
        assert_eq!(
            Grid::parse("S..\n..\n..E"),
            Err(MapError::NotRectangular {
                row: 1,
                expected: 3,
                found: 2
            })
        );
        assert_eq!("...\n..E".parse::<Grid>(), Err(MapError::MissingStart('S')));
        assert_eq!("S..\n...".parse::<Grid>(), Err(MapError::MissingEnd('E')));

        // markers are optional for a plain parse
        let map = Grid::parse("...\n...").unwrap();
        assert_eq!(map.start(), None);
        assert_eq!(map.end(), None);
    }

    #[test]
    fn test_bounds_and_walls() {
        let map = create_basic_map();

        assert!(map.in_bounds(Point::new(6, 6)));
        assert!(!map.in_bounds(Point::new(7, 0)));
        assert!(!map.in_bounds(Point::new(0, 7)));

        assert!(map.is_walkable(Point::new(1, 1)));
        assert!(map.is_walkable(Point::new(6, 5)));
        assert!(!map.is_walkable(Point::new(0, 0)));
        assert!(!map.is_walkable(Point::new(9, 9)));
        assert!(map.is_wall(Point::new(2, 3)));
    }

    #[test]
    fn test_neighbors_orthogonal() {
        let map = Grid::empty(3, 3);

        assert_eq!(
            map.neighbors(Point::new(1, 1), false),
            vec![
                Point::new(1, 0),
                Point::new(0, 1),
                Point::new(2, 1),
                Point::new(1, 2)
            ]
        );

        // corner, nothing left of or above it
        assert_eq!(
            map.neighbors(Point::new(0, 0), false),
            vec![Point::new(1, 0), Point::new(0, 1)]
        );
    }

    #[test]
    fn test_neighbors_diagonal() {
        let map = Grid::empty(3, 3);

        assert_eq!(map.neighbors(Point::new(1, 1), true).len(), 8);
        assert_eq!(
            map.neighbors(Point::new(0, 0), true),
            vec![Point::new(1, 0), Point::new(0, 1), Point::new(1, 1)]
        );
        assert_eq!(
            map.open_offsets(Point::new(2, 2), true),
            vec![(-1, -1), (0, -1), (-1, 0)]
        );
    }

    #[test]
    fn test_diagonal_squeeze_is_allowed() {
        let map = Grid::parse(".#\n#.").unwrap();

        assert!(map.neighbors(Point::new(0, 0), false).is_empty());
        assert_eq!(map.neighbors(Point::new(0, 0), true), vec![Point::new(1, 1)]);
    }

    #[test]
    fn test_find_all_row_major() {
        let map = Grid::parse("x.x\n.x.\nx..").unwrap();

        assert_eq!(
            map.find_all('x'),
            vec![
                Point::new(0, 0),
                Point::new(2, 0),
                Point::new(1, 1),
                Point::new(0, 2)
            ]
        );
        assert!(map.find_all('?').is_empty());
    }

    #[test]
    fn test_set_cell() {
        let mut map = create_basic_map();

        map.set_cell(Point::new(2, 3), OPEN).unwrap();
        assert!(map.is_walkable(Point::new(2, 3)));

        assert_eq!(
            map.set_cell(Point::new(7, 1), WALL),
            Err(MapError::OutOfBounds { x: 7, y: 1 })
        );
        assert_eq!(map.get(Point::new(6, 1)), Some(WALL));
    }

    #[test]
    fn test_mark_start_and_end() {
        let mut map = Grid::empty(4, 2);

        map.mark_start(Point::new(0, 1)).unwrap();
        map.mark_end(Point::new(3, 0)).unwrap();
        assert_eq!(map.start(), Some(Point::new(0, 1)));
        assert_eq!(map.end(), Some(Point::new(3, 0)));
        assert_eq!(map.to_string(), "...E\nS...\n");

        assert!(map.mark_end(Point::new(4, 0)).is_err());
        assert_eq!(map.end(), Some(Point::new(3, 0)));
    }

    #[test]
    fn test_resolve_marker() {
        let mut map = Grid::parse("S..\n..E").unwrap();

        assert_eq!(map.resolve_marker(END, None), Some(Point::new(2, 1)));
        assert_eq!(map.resolve_marker('x', None), None);
        assert_eq!(map.resolve_marker('x', Some(Point::new(1, 0))), Some(Point::new(1, 0)));
        assert_eq!(map.to_string(), "S..\n..E\n");

        let start = map.resolve_marker(START, Some(Point::new(1, 1))).unwrap();
        map.mark_start(start).unwrap();

        assert_eq!(map.to_string(), "...\n.SE\n");
        assert_eq!(map.find_all(START), vec![Point::new(1, 1)]);
        assert_eq!(map.start(), Some(Point::new(1, 1)));
    }

    #[test]
    fn test_deserialize_checks_shape() {
        let map = create_basic_map();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(serde_json::from_str::<Grid>(&json).unwrap(), map);

        let ragged = r#"{"rows":2,"columns":3,"cells":[["S",".","E"],["."]],"start":{"x":0,"y":0},"end":{"x":2,"y":0}}"#;
        assert!(serde_json::from_str::<Grid>(ragged).is_err());

        let short = r#"{"rows":3,"columns":1,"cells":[["S"],["E"]],"start":null,"end":null}"#;
        assert!(serde_json::from_str::<Grid>(short).is_err());

        let far_start = r#"{"rows":1,"columns":2,"cells":[["S","E"]],"start":{"x":9,"y":9},"end":{"x":1,"y":0}}"#;
        let err = serde_json::from_str::<Grid>(far_start).unwrap_err();
        assert!(err.to_string().contains("(9,9) is not on the map"));
    }

    #[test]
    fn test_scale_up() {
        let mut map = Grid::parse("S#\n.E").unwrap();
        map.scale_up(2);

        assert_eq!(map.to_string(), "S.##\n..##\n..E.\n....\n");
        assert_eq!(map.start(), Some(Point::new(0, 0)));
        assert_eq!(map.end(), Some(Point::new(2, 2)));
        assert_eq!(map.find_all(START).len(), 1);
    }

    #[test]
    fn test_point_parse() {
        assert_eq!("3,4".parse::<Point>(), Ok(Point::new(3, 4)));
        assert_eq!(" 10 , 0 ".parse::<Point>(), Ok(Point::new(10, 0)));
        assert!("3".parse::<Point>().is_err());
        assert!("-1,2".parse::<Point>().is_err());
        assert_eq!(Point::new(3, 4).to_string(), "(3,4)");
    }

    #[test]
    fn test_point_offset() {
        assert_eq!(Point::new(0, 0).offset(-1, 0), None);
        assert_eq!(Point::new(2, 0).offset(-1, 1), Some(Point::new(1, 1)));
    }
}
