use crate::matrix::MatrixShape;

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while building, evaluating or training a network.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Operand shapes violate the precondition of an algebraic operation.
    #[error("shape mismatch in {op}: {left} vs {right}")]
    ShapeMismatch {
        op: &'static str,
        left: MatrixShape,
        right: MatrixShape,
    },

    #[error("a {shape} matrix needs {} elements, got {got}", .shape.len())]
    DataLength { shape: MatrixShape, got: usize },

    #[error("row {row} has {got} elements, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("a matrix must have at least one row and one column")]
    EmptyMatrix,

    #[error("batch size must be positive")]
    ZeroBatchSize,

    #[error("parameter record has no bias row")]
    MissingBias,

    #[error("failed to decode document: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn mismatch(op: &'static str, left: MatrixShape, right: MatrixShape) -> Self {
        Error::ShapeMismatch { op, left, right }
    }
}
