//! Pre-trained layer parameters.

use std::io::Read;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::matrix::DenseMatrix;

/// A stored weight/bias record for one `DenseLayer`.
///
/// `weights` has one row per layer input and one column per output. Only the
/// first row of `bias` is used.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayerParams {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<Vec<f64>>,
}

impl LayerParams {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn weights(&self) -> Result<DenseMatrix> {
        DenseMatrix::from_rows(&self.weights)
    }

    pub fn bias(&self) -> Result<&[f64]> {
        self.bias
            .first()
            .map(Vec::as_slice)
            .ok_or(Error::MissingBias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode() {
        let params = LayerParams::from_json(
            r#"{"weights": [[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]], "bias": [[0.5, -0.5], [9.0, 9.0]]}"#,
        )
        .unwrap();
        assert_eq!(params.weights().unwrap().shape().rows(), 3);
        assert_eq!(params.bias().unwrap(), &[0.5, -0.5]);
    }

    #[test]
    fn missing_bias() {
        let params = LayerParams::from_reader(r#"{"weights": [[1.0]], "bias": []}"#.as_bytes())
            .unwrap();
        assert!(matches!(params.bias(), Err(Error::MissingBias)));
        assert!(matches!(
            LayerParams::from_json(r#"{"weights": [[1.0]]}"#),
            Err(Error::Decode(_))
        ));
    }
}
