use crate::GridError;
use geo_types::Coord;
use log::debug;

/// An immutable projected DEM raster.
///
/// Samples are stored row-major; rows advance northward and columns eastward
/// from `origin`, which is the projected coordinate of the *center* of cell
/// (0, 0). Cells are square. No-data samples are `f32::NAN`.
#[derive(Debug, Clone)]
pub struct TerrainGrid {
    /// Row-major elevation samples, meters.
    elevations: Box<[f32]>,

    /// Number of (rows, columns).
    dimensions: (usize, usize),

    /// Center of cell (0, 0) in projected coordinates.
    origin: Coord<f64>,

    /// Meters per cell, uniform in both axes.
    cell_size_m: f64,

    /// CRS tag carried for callers; the grid itself never reprojects.
    crs: String,
}

impl TerrainGrid {
    /// Returns Self after validating shape and cell size.
    pub fn new(
        rows: usize,
        cols: usize,
        elevations: Vec<f32>,
        origin: Coord<f64>,
        cell_size_m: f64,
        crs: impl Into<String>,
    ) -> Result<Self, GridError> {
        if !cell_size_m.is_finite() || cell_size_m <= 0.0 {
            return Err(GridError::CellSize(cell_size_m));
        }
        if rows == 0 || cols == 0 || elevations.is_empty() {
            return Err(GridError::Empty);
        }
        if elevations.len() != rows * cols {
            return Err(GridError::Shape {
                rows,
                cols,
                len: elevations.len(),
            });
        }
        Ok(Self {
            elevations: elevations.into_boxed_slice(),
            dimensions: (rows, cols),
            origin,
            cell_size_m,
            crs: crs.into(),
        })
    }

    pub fn rows(&self) -> usize {
        self.dimensions.0
    }

    pub fn cols(&self) -> usize {
        self.dimensions.1
    }

    pub fn cell_size_m(&self) -> f64 {
        self.cell_size_m
    }

    pub fn origin(&self) -> Coord<f64> {
        self.origin
    }

    pub fn crs(&self) -> &str {
        &self.crs
    }

    /// Returns the sample at the given cell.
    ///
    /// Panics when the cell is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.elevations[row * self.dimensions.1 + col]
    }

    /// Projected coordinates of the center of cell (row, col).
    pub fn cell_center(&self, row: usize, col: usize) -> Coord<f64> {
        Coord {
            x: self.origin.x + col as f64 * self.cell_size_m,
            y: self.origin.y + row as f64 * self.cell_size_m,
        }
    }

    /// Returns the lowest finite sample, or `None` for an all-no-data raster.
    pub fn min_elevation(&self) -> Option<f32> {
        self.elevations
            .iter()
            .copied()
            .filter(|sample| sample.is_finite())
            .fold(None, |min, sample| match min {
                None => Some(sample),
                Some(current) => Some(current.min(sample)),
            })
    }

    /// Returns the highest finite sample, or `None` for an all-no-data raster.
    pub fn max_elevation(&self) -> Option<f32> {
        self.elevations
            .iter()
            .copied()
            .filter(|sample| sample.is_finite())
            .fold(None, |max, sample| match max {
                None => Some(sample),
                Some(current) => Some(current.max(sample)),
            })
    }

    /// Bilinear elevation at a projected point.
    ///
    /// Fractional indices clamp to the border cells; a point strictly beyond
    /// the border cell centers is outside the grid. Returns `None` outside
    /// the grid or when any supporting sample is no-data.
    pub fn sample_bilinear(&self, point: Coord<f64>) -> Option<f64> {
        let (rows, cols) = self.dimensions;
        let frac_col = (point.x - self.origin.x) / self.cell_size_m;
        let frac_row = (point.y - self.origin.y) / self.cell_size_m;
        if frac_row < 0.0
            || frac_col < 0.0
            || frac_row > (rows - 1) as f64
            || frac_col > (cols - 1) as f64
        {
            return None;
        }

        let row0 = frac_row.floor() as usize;
        let col0 = frac_col.floor() as usize;
        let row1 = (row0 + 1).min(rows - 1);
        let col1 = (col0 + 1).min(cols - 1);
        let ty = frac_row - row0 as f64;
        let tx = frac_col - col0 as f64;

        let v00 = f64::from(self.get(row0, col0));
        let v10 = f64::from(self.get(row0, col1));
        let v01 = f64::from(self.get(row1, col0));
        let v11 = f64::from(self.get(row1, col1));
        if v00.is_nan() || v10.is_nan() || v01.is_nan() || v11.is_nan() {
            return None;
        }

        Some(
            v00 * (1.0 - tx) * (1.0 - ty)
                + v10 * tx * (1.0 - ty)
                + v01 * (1.0 - tx) * ty
                + v11 * tx * ty,
        )
    }

    /// Bilinear resample by `scale`: values below 1 sharpen, above 1 coarsen.
    ///
    /// The origin is preserved and the new cell size is `cell_size_m * scale`.
    /// New cells whose center falls outside the source extent become no-data.
    pub fn resample(&self, scale: f64) -> Self {
        if (scale - 1.0).abs() < f64::EPSILON {
            return self.clone();
        }
        let (rows, cols) = self.dimensions;
        let out_rows = ((rows as f64 / scale).round() as usize).max(1);
        let out_cols = ((cols as f64 / scale).round() as usize).max(1);
        let out_cell = self.cell_size_m * scale;
        debug!(
            "resample {}x{} @ {}m -> {}x{} @ {}m",
            rows, cols, self.cell_size_m, out_rows, out_cols, out_cell
        );

        let mut samples = Vec::with_capacity(out_rows * out_cols);
        for row in 0..out_rows {
            for col in 0..out_cols {
                let point = Coord {
                    x: self.origin.x + col as f64 * out_cell,
                    y: self.origin.y + row as f64 * out_cell,
                };
                let sample = self
                    .sample_bilinear(point)
                    .map_or(f32::NAN, |elev| elev as f32);
                samples.push(sample);
            }
        }

        Self {
            elevations: samples.into_boxed_slice(),
            dimensions: (out_rows, out_cols),
            origin: self.origin,
            cell_size_m: out_cell,
            crs: self.crs.clone(),
        }
    }

    /// Separable Gaussian smoothing with `sigma` in cells.
    ///
    /// The kernel is truncated at 3 sigma and normalized; edges clamp to the
    /// border samples. A no-data sample poisons every window it supports.
    pub fn gaussian_smooth(&self, sigma: f64) -> Self {
        assert!(sigma > 0.0, "sigma must be positive");
        let radius = (3.0 * sigma).ceil() as isize;
        let kernel: Vec<f64> = (-radius..=radius)
            .map(|offset| (-0.5 * (offset as f64 / sigma).powi(2)).exp())
            .collect();
        let total: f64 = kernel.iter().sum();
        let kernel: Vec<f64> = kernel.iter().map(|weight| weight / total).collect();

        let (rows, cols) = self.dimensions;
        let clamp = |index: isize, max: usize| index.clamp(0, max as isize - 1) as usize;

        // Horizontal pass.
        let mut pass = vec![0.0f64; rows * cols];
        for row in 0..rows {
            for col in 0..cols {
                let mut accum = 0.0f64;
                for (tap, weight) in kernel.iter().enumerate() {
                    let source = clamp(col as isize + tap as isize - radius, cols);
                    accum += weight * f64::from(self.get(row, source));
                }
                pass[row * cols + col] = accum;
            }
        }

        // Vertical pass.
        let mut smoothed = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let mut accum = 0.0f64;
                for (tap, weight) in kernel.iter().enumerate() {
                    let source = clamp(row as isize + tap as isize - radius, rows);
                    accum += weight * pass[source * cols + col];
                }
                smoothed.push(accum as f32);
            }
        }

        Self {
            elevations: smoothed.into_boxed_slice(),
            dimensions: self.dimensions,
            origin: self.origin,
            cell_size_m: self.cell_size_m,
            crs: self.crs.clone(),
        }
    }
}
