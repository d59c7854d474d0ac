//! Training hyperparameters.

use serde::Deserialize;

use crate::error::Result;

/// How a layer folds its weight gradient into a bias update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasUpdate {
    /// Use the last row of the weight-gradient block as the bias gradient.
    ///
    /// This ignores every other row, so the bias does not see the whole
    /// batch the way the weights do. It reproduces the behaviour of the
    /// networks this crate was built to be compatible with.
    #[default]
    LastGradientRow,
    /// Use the layer's error signal summed over the examples in the batch,
    /// which is the true gradient of the summed squared error.
    BatchSum,
}

/// Settings for `Network::fit_with`.
///
/// Every field has a default, so a JSON document only needs to name the
/// settings it changes:
///
/// ```
/// # use densenet::TrainConfig;
/// let config = TrainConfig::from_json(r#"{"epochs": 20, "learning_rate": 0.01}"#).unwrap();
/// assert_eq!(config.batch_size, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainConfig {
    /// Training runs over the data `epochs + 1` times; epoch numbers go from
    /// 0 through `epochs` inclusive.
    pub epochs: usize,
    pub learning_rate: f64,
    /// Rows per mini-batch. The last batch of an epoch may be smaller.
    pub batch_size: usize,
    pub bias_update: BiasUpdate,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            epochs: 10,
            learning_rate: 0.01,
            batch_size: 64,
            bias_update: BiasUpdate::default(),
        }
    }
}

impl TrainConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_bias_update(mut self, bias_update: BiasUpdate) -> Self {
        self.bias_update = bias_update;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn partial_document() {
        let config = TrainConfig::from_json(r#"{"batch_size": 8, "bias_update": "batch_sum"}"#)
            .unwrap();
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.bias_update, BiasUpdate::BatchSum);
        assert_eq!(config.epochs, TrainConfig::default().epochs);
    }

    #[test]
    fn unknown_field() {
        assert!(matches!(
            TrainConfig::from_json(r#"{"epoch": 3}"#),
            Err(Error::Decode(_))
        ));
    }
}
