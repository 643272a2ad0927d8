use std::collections::HashSet;

use log::{debug, log_enabled, trace, Level};
use serde::{Deserialize, Serialize};

use crate::error::MapError;
use crate::field::{DistanceField, UNVISITED};
use crate::grid::{Grid, Point, END, START};
use crate::render::Render;

/// A position on a route together with its field value when the route was built.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    pub position: Point,
    pub distance: i32,
}

/// One concrete path, both endpoints included.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Route {
    steps: Vec<RouteStep>,
}

impl Route {
    pub fn steps(&self) -> &[RouteStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn start(&self) -> Option<Point> {
        self.steps.first().map(|step| step.position)
    }

    pub fn end(&self) -> Option<Point> {
        self.steps.last().map(|step| step.position)
    }

    pub fn positions(&self) -> impl Iterator<Item = Point> + '_ {
        self.steps.iter().map(|step| step.position)
    }

    pub fn contains(&self, position: Point) -> bool {
        self.positions().any(|p| p == position)
    }
}

/// Breadth-first distance field over a [`Grid`], plus dead-end pruning and
/// route enumeration guided by it.
///
/// The field is computed at construction and the search stops as soon as
/// the end is stamped, so cells further away than the end keep
/// [`UNVISITED`] even when they are reachable. `-1` only means unreachable
/// when the end itself is `-1`.
pub struct Solver<'a> {
    grid: &'a Grid,
    allow_diagonal: bool,
    start: Point,
    end: Point,
    distances: DistanceField,
}

impl<'a> Solver<'a> {
    pub fn new(grid: &'a Grid, allow_diagonal: bool) -> Result<Self, MapError> {
        Self::with_movement(grid, allow_diagonal, |_, _| true)
    }

    /// Like [`Solver::new`], but a cell only gets a distance (and is only
    /// expanded) when `allow_movement_to` accepts it.
    pub fn with_movement<F>(
        grid: &'a Grid,
        allow_diagonal: bool,
        allow_movement_to: F,
    ) -> Result<Self, MapError>
    where
        F: Fn(&Grid, Point) -> bool,
    {
        let start = grid.start().ok_or(MapError::MissingStart(START))?;
        let end = grid.end().ok_or(MapError::MissingEnd(END))?;

        let mut solver = Self {
            grid,
            allow_diagonal,
            start,
            end,
            distances: DistanceField::new(grid.width(), grid.height()),
        };
        solver.populate_distances(allow_movement_to);

        Ok(solver)
    }

    fn populate_distances<F>(&mut self, allow_movement_to: F)
    where
        F: Fn(&Grid, Point) -> bool,
    {
        let mut distance = 0;
        let mut positions = vec![self.start];

        while !self.distances.is_stamped(self.end) && !positions.is_empty() {
            trace!("layer {}: {} positions", distance, positions.len());

            let mut next_positions = Vec::new();
            for position in positions {
                if !allow_movement_to(self.grid, position) {
                    continue;
                }

                let current = self.distances.get(position);
                if current == UNVISITED || current > distance {
                    self.distances.set(position, distance);
                    next_positions.extend(
                        self.grid
                            .neighbors(position, self.allow_diagonal)
                            .into_iter()
                            .filter(|next| !self.distances.is_stamped(*next)),
                    );
                }
            }

            distance += 1;
            positions = next_positions;
        }

        if log_enabled!(Level::Debug) {
            debug!(
                "distance field done after {} layers: end distance {}, coverage {:.1}%",
                distance,
                self.distances.get(self.end),
                self.coverage()
            );
        }
    }

    pub fn grid(&self) -> &Grid {
        self.grid
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn allow_diagonal(&self) -> bool {
        self.allow_diagonal
    }

    pub fn distances(&self) -> &DistanceField {
        &self.distances
    }

    pub fn get_distance(&self, position: Point) -> i32 {
        self.distances.get(position)
    }

    pub fn find_shortest_route_distance(&self) -> i32 {
        self.distances.get(self.end)
    }

    /// Percentage of non-wall cells that currently hold a distance.
    pub fn coverage(&self) -> f64 {
        let (valid, visited) = self
            .grid
            .points()
            .filter(|p| !self.grid.is_wall(*p))
            .fold((0usize, 0usize), |(valid, visited), p| {
                (valid + 1, visited + usize::from(self.distances.is_stamped(p)))
            });

        if valid == 0 {
            return 0.0;
        }
        100.0 * visited as f64 / valid as f64
    }

    /// A stamped cell, other than the end, with no neighbour further along.
    pub fn is_dead_end(&self, position: Point) -> bool {
        if self.grid.is_wall(position)
            || position == self.end
            || !self.distances.is_stamped(position)
        {
            return false;
        }

        let current = self.distances.get(position);
        !self
            .grid
            .neighbors(position, self.allow_diagonal)
            .into_iter()
            .any(|next| self.distances.get(next) > current)
    }

    pub fn find_dead_ends(&self) -> Vec<Point> {
        self.grid
            .points()
            .filter(|p| self.is_dead_end(*p))
            .collect()
    }

    /// Unset every dead end, then every cell that became one because of that.
    ///
    /// Afterwards a cell keeps its distance only if it lies on a route that
    /// still reaches the end.
    pub fn purge_dead_ends(&mut self) {
        let mut purged = 0;

        for dead_end in self.find_dead_ends() {
            let mut stack = vec![dead_end];

            while let Some(position) = stack.pop() {
                if !self.distances.is_stamped(position) {
                    continue;
                }

                self.distances.set(position, UNVISITED);
                purged += 1;
                trace!("purged {}", position);

                // reversed so the first neighbour in scan order is handled first
                let neighbors = self.grid.neighbors(position, self.allow_diagonal);
                stack.extend(
                    neighbors
                        .into_iter()
                        .rev()
                        .filter(|next| self.is_dead_end(*next)),
                );
            }
        }

        debug!("purged {} dead end cells", purged);
    }

    fn route_step(&self, position: Point) -> RouteStep {
        RouteStep {
            position,
            distance: self.distances.get(position),
        }
    }

    fn next_shortest_positions(&self, position: Point) -> Vec<Point> {
        let current = self.distances.get(position);

        self.grid
            .neighbors(position, self.allow_diagonal)
            .into_iter()
            .filter(|next| self.distances.get(*next) == current + 1)
            .collect()
    }

    /// Every route from `start` to `end` whose length is the field distance.
    /// Both default to the grid's markers.
    ///
    /// Dead ends must have been purged first, running into one panics.
    pub fn find_all_shortest_routes(
        &self,
        start: Option<Point>,
        end: Option<Point>,
    ) -> Vec<Route> {
        let start = start.unwrap_or(self.start);
        let end = end.unwrap_or(self.end);

        if start == end {
            return Vec::new();
        }
        if !self.distances.is_stamped(end) {
            debug!("{} has no distance, no shortest routes", end);
            return Vec::new();
        }

        let mut routes = Vec::new();
        // (branch position, steps of the route up to the fork)
        let mut pending: Vec<(Point, Vec<RouteStep>)> = vec![(start, Vec::new())];

        while let Some((mut position, mut steps)) = pending.pop() {
            loop {
                steps.push(self.route_step(position));

                if position == end {
                    routes.push(Route { steps });
                    break;
                }

                let next = self.next_shortest_positions(position);
                match next.as_slice() {
                    [] => panic!(
                        "{} has no way forward towards {}, purge dead ends before enumerating shortest routes",
                        position, end
                    ),
                    [only] => position = *only,
                    _ => {
                        for branch in next.iter().rev() {
                            pending.push((*branch, steps.clone()));
                        }
                        break;
                    }
                }
            }
        }

        debug!("{} shortest routes from {} to {}", routes.len(), start, end);
        routes
    }

    /// Every loop-free route from `start` to `end`, shortest or not. Both
    /// default to the grid's markers.
    ///
    /// The number of routes grows exponentially with the number of forks.
    pub fn find_all_routes(&self, start: Option<Point>, end: Option<Point>) -> Vec<Route> {
        let start = start.unwrap_or(self.start);
        let end = end.unwrap_or(self.end);

        if start == end {
            return Vec::new();
        }

        let mut routes = Vec::new();
        // each branch carries its own copy of the visited positions
        let mut pending: Vec<(Point, Vec<RouteStep>, HashSet<Point>)> =
            vec![(start, Vec::new(), HashSet::new())];

        while let Some((mut position, mut steps, mut visited)) = pending.pop() {
            loop {
                visited.insert(position);
                steps.push(self.route_step(position));

                if position == end {
                    routes.push(Route { steps });
                    break;
                }

                let next: Vec<Point> = self
                    .grid
                    .neighbors(position, self.allow_diagonal)
                    .into_iter()
                    .filter(|p| !visited.contains(p))
                    .collect();

                match next.as_slice() {
                    [] => break,
                    [only] => position = *only,
                    _ => {
                        for branch in next.iter().rev() {
                            pending.push((*branch, steps.clone(), visited.clone()));
                        }
                        break;
                    }
                }
            }
        }

        debug!("{} routes from {} to {}", routes.len(), start, end);
        routes
    }

    pub fn render(&self) -> Render<'_> {
        Render::new(self.grid, &self.distances)
    }
}
