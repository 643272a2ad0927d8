use std::fmt::Display;

use crate::grid::Point;

/// Field value of a cell the search never reached, or one pruning removed.
pub const UNVISITED: i32 = -1;

/// Breadth-first layer numbers laid out like the grid they were computed on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistanceField(Vec<Vec<i32>>);

impl DistanceField {
    pub fn new(width: usize, height: usize) -> Self {
        Self(vec![vec![UNVISITED; width]; height])
    }

    pub fn width(&self) -> usize {
        self.0.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.0.len()
    }

    pub fn is_valid(&self, point: Point) -> bool {
        point.y < self.height() && point.x < self.width()
    }

    /// Reads outside the field are [`UNVISITED`].
    pub fn get(&self, point: Point) -> i32 {
        self.0
            .get(point.y)
            .and_then(|row| row.get(point.x))
            .copied()
            .unwrap_or(UNVISITED)
    }

    /// Writes outside the field are dropped, matching [`DistanceField::get`].
    pub fn set(&mut self, point: Point, distance: i32) {
        if let Some(cell) = self.0.get_mut(point.y).and_then(|row| row.get_mut(point.x)) {
            *cell = distance;
        }
    }

    pub fn is_stamped(&self, point: Point) -> bool {
        self.get(point) >= 0
    }

    pub fn stamped_count(&self) -> usize {
        self.0.iter().flatten().filter(|d| **d >= 0).count()
    }

    /// Width of the widest value when printed, the `-1` sentinel included.
    pub fn max_number_width(&self) -> usize {
        self.0
            .iter()
            .flatten()
            .map(|d| d.to_string().len())
            .max()
            .unwrap_or(1)
    }
}

impl Display for DistanceField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self.max_number_width();
        for row in &self.0 {
            for d in row {
                if *d >= 0 {
                    write!(f, "{:>width$} ", d)?;
                } else {
                    write!(f, "{:>width$} ", ".")?;
                }
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
