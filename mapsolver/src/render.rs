use std::collections::HashSet;
use std::fmt::Display;

use crate::field::DistanceField;
use crate::grid::{Grid, Point, WALL};
use crate::solver::Route;

/// Text dump of a distance field for eyeballing a solve.
///
/// Each cell is printed as `[d]` padded to the widest value, or filled with
/// `#` (wall), `O` (route), `X` (no distance) or `*` (shortcut), checked in
/// that order. Not meant to be parsed back.
pub struct Render<'s> {
    grid: &'s Grid,
    distances: &'s DistanceField,
    route: HashSet<Point>,
    shortcut: HashSet<Point>,
    top_left: Point,
    bottom_right: Point,
}

impl<'s> Render<'s> {
    pub fn new(grid: &'s Grid, distances: &'s DistanceField) -> Self {
        Self {
            grid,
            distances,
            route: HashSet::new(),
            shortcut: HashSet::new(),
            top_left: Point::new(0, 0),
            bottom_right: Point::new(grid.width(), grid.height()),
        }
    }

    pub fn route(mut self, route: &Route) -> Self {
        self.route.extend(route.positions());
        self
    }

    pub fn shortcut(mut self, shortcut: &Route) -> Self {
        self.shortcut.extend(shortcut.positions());
        self
    }

    /// Only print cells from `top_left` up to, but excluding, `bottom_right`.
    pub fn window(mut self, top_left: Point, bottom_right: Point) -> Self {
        self.top_left = top_left;
        self.bottom_right = Point::new(
            bottom_right.x.min(self.grid.width()),
            bottom_right.y.min(self.grid.height()),
        );
        self
    }
}

impl Display for Render<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self.distances.max_number_width();
        let fill = |c: char| c.to_string().repeat(width + 2);

        for y in self.top_left.y..self.bottom_right.y {
            for x in self.top_left.x..self.bottom_right.x {
                let p = Point::new(x, y);

                if self.grid.is_wall(p) {
                    write!(f, "{} ", fill(WALL))?;
                } else if self.route.contains(&p) {
                    write!(f, "{} ", fill('O'))?;
                } else if !self.distances.is_stamped(p) {
                    write!(f, "{} ", fill('X'))?;
                } else if self.shortcut.contains(&p) {
                    write!(f, "{} ", fill('*'))?;
                } else {
                    write!(f, "[{:>width$}] ", self.distances.get(p))?;
                }
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::solver::Solver;

    #[test]
    fn test_render_distances() {
        let map: Grid = "S#\n.E".parse().unwrap();
        let solver = Solver::new(&map, false).unwrap();

        // the -1 under the wall makes every number two wide
        assert_eq!(solver.render().to_string(), "[ 0] #### \n[ 1] [ 2] \n");
    }

    #[test]
    fn test_render_overlays() {
        let map: Grid = "S.E\n...".parse().unwrap();
        let solver = Solver::new(&map, false).unwrap();

        let routes = solver.find_all_routes(None, None);
        let (direct, detour) = (&routes[0], &routes[1]);

        assert_eq!(
            solver.render().route(direct).to_string(),
            "OOOO OOOO OOOO \n[ 1] [ 2] XXXX \n"
        );
        // unreached cells win over the shortcut overlay
        assert_eq!(
            solver.render().shortcut(detour).to_string(),
            "**** **** **** \n[ 1] **** XXXX \n"
        );
    }

    #[test]
    fn test_render_window() {
        let map: Grid = "S#\n.E".parse().unwrap();
        let solver = Solver::new(&map, false).unwrap();

        assert_eq!(
            solver
                .render()
                .window(Point::new(1, 0), Point::new(5, 5))
                .to_string(),
            "#### \n[ 2] \n"
        );
    }
}
