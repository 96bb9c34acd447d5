//! Deterministic synthetic DEMs for demos, benchmarks, and tests.
//!
//! All builders emit the same arbitrary UTM-like placement: origin at
//! (500 000, 5 200 000) in EPSG:32610. There is no randomness anywhere.

use crate::TerrainGrid;
use geo_types::Coord;

/// Projected placement shared by every synthetic scene.
pub const ORIGIN: Coord<f64> = Coord {
    x: 500_000.0,
    y: 5_200_000.0,
};

const CRS: &str = "EPSG:32610";

/// A uniform plain at `elevation_m`.
pub fn flat_plain(rows: usize, cols: usize, cell_size_m: f64, elevation_m: f32) -> TerrainGrid {
    let elevations = vec![elevation_m; rows * cols];
    TerrainGrid::new(rows, cols, elevations, ORIGIN, cell_size_m, CRS)
        .expect("synthetic plain is well-formed")
}

/// A cone rising `peak_rise_m` above `base_m`, apex at the grid center.
///
/// The slope is uniform and reaches the base at half the smaller grid
/// extent, so a 201-cell grid at 10 m cells falls back to `base_m` at
/// 1 000 m from the apex.
pub fn conical_hill(
    rows: usize,
    cols: usize,
    cell_size_m: f64,
    base_m: f32,
    peak_rise_m: f32,
) -> TerrainGrid {
    let center_row = (rows - 1) as f64 / 2.0;
    let center_col = (cols - 1) as f64 / 2.0;
    let radius_m = (rows.min(cols) - 1) as f64 / 2.0 * cell_size_m;

    let mut elevations = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            let dy = (row as f64 - center_row) * cell_size_m;
            let dx = (col as f64 - center_col) * cell_size_m;
            let distance = dx.hypot(dy);
            let rise = f64::from(peak_rise_m) * (1.0 - distance / radius_m).max(0.0);
            elevations.push(base_m + rise as f32);
        }
    }
    TerrainGrid::new(rows, cols, elevations, ORIGIN, cell_size_m, CRS)
        .expect("synthetic cone is well-formed")
}

/// A gently sloped plane with a single Gaussian bump off-center.
///
/// Mirrors the classic synthetic test scene: a south-to-north ramp of 20 m
/// plus a bump of `peak_m - base_m` centered at (0.5, 0.4) in unit
/// coordinates.
pub fn sloped_bump(
    rows: usize,
    cols: usize,
    cell_size_m: f64,
    base_m: f32,
    peak_m: f32,
) -> TerrainGrid {
    let mut elevations = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            let unit_y = row as f64 / (rows - 1).max(1) as f64;
            let unit_x = col as f64 / (cols - 1).max(1) as f64;
            let ramp = f64::from(base_m) + 20.0 * unit_y;
            let bump = (-((unit_x - 0.5).powi(2) + (unit_y - 0.4).powi(2)) * 12.0).exp();
            let elevation = ramp + bump * f64::from(peak_m - base_m);
            elevations.push(elevation as f32);
        }
    }
    TerrainGrid::new(rows, cols, elevations, ORIGIN, cell_size_m, CRS)
        .expect("synthetic bump is well-formed")
}
