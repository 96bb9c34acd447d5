use crate::{TerrainCandidate, VisibilityRequest};
use demgrid::TerrainGrid;
use geo::Coord;
use log::debug;

/// Outcome of a single radial ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayResult {
    /// Direction, degrees clockwise from north, in [0, 360).
    pub azimuth_deg: f64,

    /// Distance to the farthest unobstructed sample; 0 when the ray never
    /// cleared the moat.
    pub max_distance_m: f64,

    /// Whether the bare terrain dropped enough inside the clear moat to see
    /// past the tree belt.
    pub cleared_moat: bool,
}

/// Visibility statistics over all rays of one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityMetrics {
    /// Per-ray outcomes, ordered by azimuth with 0 degrees first.
    pub rays: Vec<RayResult>,

    /// Maximum visible distance over all rays.
    pub max_distance_m: f64,

    /// Mean visible distance over in-sector rays; 0 when none are in-sector.
    pub mean_distance_m: f64,

    /// Median visible distance over in-sector rays; 0 when none are
    /// in-sector.
    pub median_distance_m: f64,

    /// Rays whose moat clearance succeeded.
    pub cleared_ray_count: usize,

    /// Summed azimuth-step width of in-sector rays meeting the required
    /// distance, degrees.
    pub fov_deg: f64,
}

/// A candidate that survived visibility analysis, with its metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleCandidate {
    pub candidate: TerrainCandidate,
    pub visibility: VisibilityMetrics,
}

/// Smallest angular separation between two azimuths, degrees.
pub(crate) fn angular_distance_deg(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % 360.0;
    diff.min(360.0 - diff)
}

/// Casts radial rays from candidates through a terrain grid.
///
/// The tracer owns a small scratch buffer of moat samples that is reused
/// across rays and candidates, so tracing allocates only the per-candidate
/// ray vector.
pub struct RayTracer<'a> {
    grid: &'a TerrainGrid,
    request: &'a VisibilityRequest,

    /// Ground distance per step: one cell.
    step_m: f64,

    max_steps: usize,

    /// Steps whose distance is inside the clear moat.
    moat_steps: usize,

    /// Bare terrain elevations for steps 0..=moat, reused across rays.
    moat_scratch: Vec<f64>,
}

impl<'a> RayTracer<'a> {
    pub fn new(grid: &'a TerrainGrid, request: &'a VisibilityRequest) -> Self {
        let step_m = grid.cell_size_m();
        let max_steps = (request.max_visibility_m / step_m).floor() as usize;
        let moat_steps = ((request.obstruction_start_m / step_m).floor() as usize).min(max_steps);
        Self {
            grid,
            request,
            step_m,
            max_steps,
            moat_steps,
            moat_scratch: Vec::with_capacity(moat_steps + 1),
        }
    }

    /// Casts all rays for one candidate and assembles its metrics.
    pub fn trace_candidate(&mut self, candidate: &TerrainCandidate) -> VisibilityMetrics {
        let ray_count = self.request.rays_full_circle;
        let azimuth_step = 360.0 / ray_count as f64;

        let mut rays = Vec::with_capacity(ray_count);
        for ray in 0..ray_count {
            let azimuth_deg = ray as f64 * azimuth_step;
            rays.push(self.trace_ray(candidate, azimuth_deg));
        }

        let max_distance_m = rays
            .iter()
            .map(|ray| ray.max_distance_m)
            .fold(0.0f64, f64::max);
        let cleared_ray_count = rays.iter().filter(|ray| ray.cleared_moat).count();

        let mut in_sector: Vec<f64> = rays
            .iter()
            .filter(|ray| {
                angular_distance_deg(ray.azimuth_deg, self.request.azimuth_deg)
                    <= self.request.azimuth_tolerance_deg
            })
            .map(|ray| ray.max_distance_m)
            .collect();

        let (mean_distance_m, median_distance_m) = if in_sector.is_empty() {
            (0.0, 0.0)
        } else {
            let mean = in_sector.iter().sum::<f64>() / in_sector.len() as f64;
            in_sector.sort_by(f64::total_cmp);
            let mid = in_sector.len() / 2;
            let median = if in_sector.len() % 2 == 0 {
                (in_sector[mid - 1] + in_sector[mid]) / 2.0
            } else {
                in_sector[mid]
            };
            (mean, median)
        };

        let meeting_requirement = rays
            .iter()
            .filter(|ray| {
                angular_distance_deg(ray.azimuth_deg, self.request.azimuth_deg)
                    <= self.request.azimuth_tolerance_deg
                    && ray.max_distance_m >= self.request.min_visibility_m
            })
            .count();
        let fov_deg = azimuth_step * meeting_requirement as f64;

        debug!(
            "candidate ({}, {}): cleared {cleared_ray_count}/{ray_count} rays, max {max_distance_m:.0} m",
            candidate.row,
            candidate.col
        );

        VisibilityMetrics {
            rays,
            max_distance_m,
            mean_distance_m,
            median_distance_m,
            cleared_ray_count,
            fov_deg,
        }
    }

    fn trace_ray(&mut self, candidate: &TerrainCandidate, azimuth_deg: f64) -> RayResult {
        let (sin_az, cos_az) = azimuth_deg.to_radians().sin_cos();

        if !self.moat_cleared(candidate, sin_az, cos_az) {
            return RayResult {
                azimuth_deg,
                max_distance_m: 0.0,
                cleared_moat: false,
            };
        }

        let observer_elev = candidate.elevation_m + self.request.observer_eye_height_m;
        let mut horizon_tangent = f64::NEG_INFINITY;
        let mut visible_distance = 0.0f64;

        for step in 1..=self.max_steps {
            let distance = step as f64 * self.step_m;
            let bare = if step < self.moat_scratch.len() {
                self.moat_scratch[step]
            } else {
                let point = Coord {
                    x: candidate.x + sin_az * distance,
                    y: candidate.y + cos_az * distance,
                };
                match self.grid.sample_bilinear(point) {
                    Some(elev) => elev,
                    // Off the grid or no-data: the ray ends at the previous
                    // valid step.
                    None => break,
                }
            };

            let canopy = if distance > self.request.obstruction_start_m {
                bare + self.request.obstruction_height_m
            } else {
                bare
            };

            // A sample is visible iff its elevation angle is at least the
            // steepest angle seen so far.
            let angle = (canopy - observer_elev) / distance;
            if angle >= horizon_tangent {
                visible_distance = distance;
            }
            if angle > horizon_tangent {
                horizon_tangent = angle;
            }
        }

        RayResult {
            azimuth_deg,
            max_distance_m: visible_distance,
            cleared_moat: true,
        }
    }

    /// Clearance pre-check: the ray sees past the tree belt iff some moat
    /// sample (including the candidate itself at step 0) drops by at least
    /// `obstruction_height_m - observer_eye_height_m` below the candidate.
    ///
    /// Also fills `moat_scratch` with the bare elevations it sampled so the
    /// outward walk does not interpolate them again.
    fn moat_cleared(&mut self, candidate: &TerrainCandidate, sin_az: f64, cos_az: f64) -> bool {
        let threshold = self.request.obstruction_height_m - self.request.observer_eye_height_m;

        self.moat_scratch.clear();
        self.moat_scratch.push(candidate.elevation_m);
        let mut cleared = 0.0 >= threshold;

        for step in 1..=self.moat_steps {
            let distance = step as f64 * self.step_m;
            let point = Coord {
                x: candidate.x + sin_az * distance,
                y: candidate.y + cos_az * distance,
            };
            let Some(bare) = self.grid.sample_bilinear(point) else {
                break;
            };
            self.moat_scratch.push(bare);
            if candidate.elevation_m - bare >= threshold {
                cleared = true;
            }
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::{angular_distance_deg, RayTracer};
    use crate::{TerrainCandidate, VisibilityRequest};
    use approx::assert_relative_eq;
    use demgrid::{synthetic, TerrainGrid};

    fn summit_candidate(grid: &TerrainGrid) -> TerrainCandidate {
        let row = grid.rows() / 2;
        let col = grid.cols() / 2;
        let center = grid.cell_center(row, col);
        TerrainCandidate {
            row,
            col,
            x: center.x,
            y: center.y,
            elevation_m: f64::from(grid.get(row, col)),
            prominence_m: 0.0,
        }
    }

    #[test]
    fn test_angular_distance_wraps() {
        assert_relative_eq!(angular_distance_deg(350.0, 10.0), 20.0);
        assert_relative_eq!(angular_distance_deg(10.0, 350.0), 20.0);
        assert_relative_eq!(angular_distance_deg(180.0, 0.0), 180.0);
        assert_relative_eq!(angular_distance_deg(45.0, 45.0), 0.0);
    }

    #[test]
    fn test_cone_summit_sees_full_circle_without_canopy() {
        let grid = synthetic::conical_hill(201, 201, 10.0, 100.0, 200.0);
        let request = VisibilityRequest::builder()
            .obstruction_height(0.0)
            .min_visibility(800.0)
            .azimuth_tolerance(180.0)
            .build()
            .unwrap();
        let candidate = summit_candidate(&grid);
        let mut tracer = RayTracer::new(&grid, &request);
        let metrics = tracer.trace_candidate(&candidate);

        assert_eq!(metrics.cleared_ray_count, 72);
        assert_relative_eq!(metrics.fov_deg, 360.0);
        // Axis-aligned rays run out of grid at ~1000 m; diagonals reach
        // farther before leaving the extent.
        assert!(metrics.max_distance_m >= 1000.0);
        assert!(metrics.mean_distance_m >= 800.0);
        assert!(metrics.median_distance_m >= 800.0);
    }

    #[test]
    fn test_gentle_slope_fails_moat_clearance() {
        // 50 m/km slope: the moat sample at 10 m drops only ~0.5 m, far
        // short of the 13.2 m the tree belt demands.
        let grid = synthetic::conical_hill(201, 201, 10.0, 100.0, 50.0);
        let request = VisibilityRequest::builder()
            .obstruction_start(10.0)
            .obstruction_height(15.0)
            .observer_eye_height(1.8)
            .build()
            .unwrap();
        let candidate = summit_candidate(&grid);
        let mut tracer = RayTracer::new(&grid, &request);
        let metrics = tracer.trace_candidate(&candidate);

        assert_eq!(metrics.cleared_ray_count, 0);
        assert_relative_eq!(metrics.max_distance_m, 0.0);
        assert!(metrics.rays.iter().all(|ray| !ray.cleared_moat));
    }

    #[test]
    fn test_cliff_inside_moat_clears() {
        // Everything but the summit cell dropped by 30 m: the moat sample at
        // 10 m sees a >= 13.2 m drop and the ray walks out.
        let base = synthetic::conical_hill(201, 201, 10.0, 100.0, 200.0);
        let mut elevations = Vec::with_capacity(201 * 201);
        for row in 0..201 {
            for col in 0..201 {
                let sample = base.get(row, col);
                elevations.push(if (row, col) == (100, 100) {
                    sample
                } else {
                    sample - 30.0
                });
            }
        }
        let grid =
            TerrainGrid::new(201, 201, elevations, synthetic::ORIGIN, 10.0, "EPSG:32610").unwrap();
        let request = VisibilityRequest::builder()
            .obstruction_start(10.0)
            .obstruction_height(15.0)
            .observer_eye_height(1.8)
            .min_visibility(800.0)
            .azimuth_tolerance(180.0)
            .build()
            .unwrap();
        let candidate = summit_candidate(&grid);
        let mut tracer = RayTracer::new(&grid, &request);
        let metrics = tracer.trace_candidate(&candidate);

        assert_eq!(metrics.cleared_ray_count, 72);
        assert!(metrics.max_distance_m > request.obstruction_start_m);
    }

    #[test]
    fn test_trivial_clearance_when_eye_tops_canopy() {
        // Canopy no taller than the observer's eye: every moat sample
        // qualifies, even on dead-flat terrain.
        let grid = synthetic::flat_plain(101, 101, 10.0, 100.0);
        let request = VisibilityRequest::builder()
            .obstruction_height(1.5)
            .observer_eye_height(1.8)
            .build()
            .unwrap();
        let candidate = summit_candidate(&grid);
        let mut tracer = RayTracer::new(&grid, &request);
        let metrics = tracer.trace_candidate(&candidate);

        assert_eq!(metrics.cleared_ray_count, request.rays_full_circle);
    }

    #[test]
    fn test_fov_grows_as_required_distance_shrinks() {
        let grid = synthetic::conical_hill(201, 201, 10.0, 100.0, 200.0);
        let candidate = summit_candidate(&grid);

        let strict = VisibilityRequest::builder()
            .obstruction_height(0.0)
            .min_visibility(1600.0)
            .azimuth_tolerance(180.0)
            .build()
            .unwrap();
        let relaxed = VisibilityRequest::builder()
            .obstruction_height(0.0)
            .min_visibility(800.0)
            .azimuth_tolerance(180.0)
            .build()
            .unwrap();

        let strict_fov = RayTracer::new(&grid, &strict)
            .trace_candidate(&candidate)
            .fov_deg;
        let relaxed_fov = RayTracer::new(&grid, &relaxed)
            .trace_candidate(&candidate)
            .fov_deg;
        assert!(relaxed_fov >= strict_fov);
    }

    #[test]
    fn test_ridge_occludes_then_reemerges() {
        // Flat plain with a 40 m ridge at 300 m and higher ground at 600 m.
        // The horizon-angle rule must credit the far ground that re-emerges
        // over the ridge.
        let rows = 201;
        let cols = 201;
        let mut elevations = vec![100.0f32; rows * cols];
        let center = 100usize;
        for row in 0..rows {
            elevations[row * cols + center + 30] = 140.0; // ridge at 300 m east
            elevations[row * cols + center + 60] = 200.0; // peak at 600 m east
        }
        let grid =
            TerrainGrid::new(rows, cols, elevations, synthetic::ORIGIN, 10.0, "EPSG:32610").unwrap();
        let candidate = {
            let point = grid.cell_center(center, center);
            TerrainCandidate {
                row: center,
                col: center,
                x: point.x,
                y: point.y,
                elevation_m: 100.0,
                prominence_m: 0.0,
            }
        };
        let request = VisibilityRequest::builder()
            .obstruction_height(0.0)
            .max_visibility(700.0)
            .build()
            .unwrap();
        let mut tracer = RayTracer::new(&grid, &request);
        let metrics = tracer.trace_candidate(&candidate);

        // Ray 18 of 72 is due east (90 degrees).
        let east = &metrics.rays[18];
        assert_relative_eq!(east.azimuth_deg, 90.0);
        assert_relative_eq!(east.max_distance_m, 600.0);
    }
}
