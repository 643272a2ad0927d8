use image::{DynamicImage, GenericImageView};

use crate::error::MapError;
use crate::grid::{Grid, Point, WALL};

/// Build a grid from a thresholded maze picture: dark pixels become walls,
/// everything else is open. Images carry no markers, so `start` and `end`
/// are written in afterwards.
pub fn grid_from_image(img: &DynamicImage, start: Point, end: Point) -> Result<Grid, MapError> {
    let width = img.width() as usize;
    let height = img.height() as usize;

    let mut grid = Grid::empty(width, height);

    for row in 0..height {
        for col in 0..width {
            let p = img.get_pixel(col as u32, row as u32);

            if p.0[0] < 128 {
                grid.set_cell(Point::new(col, row), WALL)?;
            }
        }
    }

    grid.mark_start(start)?;
    grid.mark_end(end)?;

    Ok(grid)
}
