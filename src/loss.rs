//! Loss functions.

use crate::error::Result;
use crate::matrix::DenseMatrix;

/// Squared-error loss, summed over every output of every example.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredError;

impl SquaredError {
    /// `sum((yh - y)^2)`.
    pub fn loss(&self, y: &DenseMatrix, yh: &DenseMatrix) -> Result<f64> {
        Ok(yh.subtract(y)?.iter().map(|d| d * d).sum())
    }

    /// Partial derivative of the loss with respect to `yh`: `2 * (yh - y)`.
    pub fn deriv(&self, y: &DenseMatrix, yh: &DenseMatrix) -> Result<DenseMatrix> {
        Ok(yh.subtract(y)?.scale(2.0))
    }
}
