use crate::VisibilityRequest;
use demgrid::TerrainGrid;
use log::debug;

/// A DEM cell identified as a potential viewpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainCandidate {
    pub row: usize,
    pub col: usize,

    /// Projected coordinates of the cell center.
    pub x: f64,
    pub y: f64,

    /// Elevation at the cell, from the unsmoothed grid.
    pub elevation_m: f64,

    /// Elevation minus the lowest elevation in the detection window.
    pub prominence_m: f64,
}

/// Default detection window radius in cells, at resolution scale 1.
const DEFAULT_NEIGHBORHOOD_CELLS: f64 = 3.0;

/// Sigma for the pre-detection smoothing, in cells.
const SMOOTHING_SIGMA: f64 = 1.0;

/// Window radius held roughly constant in meters as the grid is resampled.
fn neighborhood_radius(resolution_scale: f64) -> usize {
    ((DEFAULT_NEIGHBORHOOD_CELLS / resolution_scale).round() as usize).max(1)
}

/// Detects strict local maxima of the smoothed grid as candidates.
///
/// Smoothing suppresses single-pixel spikes and is used for peak selection
/// only; reported elevations come from the unsmoothed grid. Cells within the
/// window radius of the border are skipped, no-data neighbors count as
/// negative infinity for the window max, and plateau ties go to the lowest
/// (row, col) cell.
pub fn identify_candidates(grid: &TerrainGrid, request: &VisibilityRequest) -> Vec<TerrainCandidate> {
    let k = neighborhood_radius(request.resolution_scale);
    let rows = grid.rows();
    let cols = grid.cols();
    let mut candidates = Vec::new();
    if rows <= 2 * k || cols <= 2 * k {
        return candidates;
    }

    let smoothed = grid.gaussian_smooth(SMOOTHING_SIGMA);

    for row in k..rows - k {
        for col in k..cols - k {
            let center = smoothed.get(row, col);
            if !center.is_finite() || grid.get(row, col).is_nan() {
                continue;
            }

            let mut window_max = f32::NEG_INFINITY;
            let mut max_at = (rows, cols);
            let mut exceeds_a_neighbor = false;
            for wrow in row - k..=row + k {
                for wcol in col - k..=col + k {
                    let sample = smoothed.get(wrow, wcol);
                    if sample.is_nan() {
                        continue;
                    }
                    if sample > window_max {
                        window_max = sample;
                        max_at = (wrow, wcol);
                    }
                    if (wrow, wcol) != (row, col) && center > sample {
                        exceeds_a_neighbor = true;
                    }
                }
            }
            // The center participates in the max, so the plateau tie-break
            // reduces to: the first window cell attaining the max is us.
            if max_at != (row, col) || !exceeds_a_neighbor {
                continue;
            }

            let elevation_m = f64::from(grid.get(row, col));
            if elevation_m < request.min_candidate_elevation_m {
                continue;
            }

            let mut window_min = f64::INFINITY;
            for wrow in row - k..=row + k {
                for wcol in col - k..=col + k {
                    let sample = f64::from(grid.get(wrow, wcol));
                    if sample.is_finite() && sample < window_min {
                        window_min = sample;
                    }
                }
            }
            let prominence_m = elevation_m - window_min;
            if prominence_m < request.min_prominence_m {
                continue;
            }

            let center_xy = grid.cell_center(row, col);
            candidates.push(TerrainCandidate {
                row,
                col,
                x: center_xy.x,
                y: center_xy.y,
                elevation_m,
                prominence_m,
            });
        }
    }

    debug!(
        "candidate detection: {} cells, window radius {k}, {} candidates",
        rows * cols,
        candidates.len()
    );
    candidates
}
