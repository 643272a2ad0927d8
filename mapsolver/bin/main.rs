use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use log::info;
use mapsolver::{util::grid_from_image, Grid, MapError, Point, Solver, END, START};
use serde::Serialize;

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "gif"];

/// Shortest-path and route counting for grid mazes
#[derive(Parser, Debug)]
#[command(name = "mapsolve", version, about)]
struct Args {
    /// Text grid or thresholded maze image to solve
    map: PathBuf,

    /// Allow diagonal moves
    #[arg(short, long)]
    diagonal: bool,

    /// Start marker symbol in text grids
    #[arg(long, default_value_t = START)]
    start_marker: char,

    /// End marker symbol in text grids
    #[arg(long, default_value_t = END)]
    end_marker: char,

    /// Start position as x,y (required for images)
    #[arg(long)]
    start: Option<Point>,

    /// End position as x,y (required for images)
    #[arg(long)]
    end: Option<Point>,

    /// Also count every loop-free route
    #[arg(short, long)]
    all_routes: bool,

    /// Print the distance field with the first shortest route
    #[arg(short, long)]
    render: bool,

    /// Print a JSON summary instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Summary {
    distance: i32,
    coverage: f64,
    shortest_routes: usize,
    all_routes: Option<usize>,
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn load_map(args: &Args) -> anyhow::Result<Grid> {
    if is_image(&args.map) {
        let (Some(start), Some(end)) = (args.start, args.end) else {
            bail!("image maps need both --start and --end");
        };

        let img = image::open(&args.map)
            .with_context(|| format!("failed to open image {}", args.map.display()))?;
        return Ok(grid_from_image(&img, start, end)?);
    }

    let text = std::fs::read_to_string(&args.map)
        .with_context(|| format!("failed to read {}", args.map.display()))?;
    let mut grid =
        Grid::parse(&text).with_context(|| format!("failed to parse {}", args.map.display()))?;

    let start = grid
        .resolve_marker(args.start_marker, args.start)
        .ok_or(MapError::MissingStart(args.start_marker))?;
    let end = grid
        .resolve_marker(args.end_marker, args.end)
        .ok_or(MapError::MissingEnd(args.end_marker))?;

    grid.mark_start(start)?;
    grid.mark_end(end)?;

    Ok(grid)
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let grid = load_map(&args)?;
    info!("solving {}", grid.describe());

    let mut solver = Solver::new(&grid, args.diagonal).context("failed to start solver")?;

    let distance = solver.find_shortest_route_distance();
    let coverage = solver.coverage();

    solver.purge_dead_ends();

    let shortest = solver.find_all_shortest_routes(None, None);
    let all_routes = args
        .all_routes
        .then(|| solver.find_all_routes(None, None).len());

    if args.json {
        let summary = Summary {
            distance,
            coverage,
            shortest_routes: shortest.len(),
            all_routes,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", grid.describe());
        println!("shortest distance: {}", distance);
        println!("coverage: {:.1}%", coverage);
        println!("shortest routes: {}", shortest.len());
        if let Some(count) = all_routes {
            println!("all routes: {}", count);
        }
    }

    if args.render {
        let render = solver.render();
        match shortest.first() {
            Some(route) => print!("{}", render.route(route)),
            None => print!("{}", render),
        }
    }

    Ok(())
}
