use demgrid::GridError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewshedError {
    /// Configuration or input data failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// Cooperative cancellation fired.
    #[error("pipeline cancelled")]
    Cancelled,

    /// An internal invariant was violated; always fatal.
    #[error("internal invariant violated: {0}")]
    Internal(String),

    #[error("{0}")]
    Grid(#[from] GridError),
}
