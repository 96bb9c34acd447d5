use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("cell size must be positive, got {0}")]
    CellSize(f64),

    #[error("elevation raster is empty")]
    Empty,

    #[error("elevation raster shape mismatch: {rows}x{cols} grid, {len} samples")]
    Shape { rows: usize, cols: usize, len: usize },
}
