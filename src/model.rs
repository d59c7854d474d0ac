use rand::Rng;
use tracing::{debug, info, trace};

use crate::config::{BiasUpdate, TrainConfig};
use crate::error::{Error, Result};
use crate::layers::{Activation, DenseLayer};
use crate::loss::SquaredError;
use crate::matrix::{DenseMatrix, MatrixShape};

/// Size and activation function of one layer, for `Network::from_specs`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerSpec {
    pub num_inputs: usize,
    pub num_outputs: usize,
    pub activation: Activation,
}

impl LayerSpec {
    pub fn new(num_inputs: usize, num_outputs: usize, activation: impl Into<Activation>) -> Self {
        LayerSpec {
            num_inputs,
            num_outputs,
            activation: activation.into(),
        }
    }
}

/// A stack of dense layers trained by mini-batch gradient descent on
/// squared error.
#[derive(Debug, Clone)]
pub struct Network {
    /// Layer 0 is nearest the input.
    layers: Vec<DenseLayer>,
    loss: SquaredError,
}

impl Network {
    /// Build a network from prebuilt layers.
    ///
    /// The caller must make sure adjacent layers fit together: each layer's
    /// `num_outputs` must equal the next layer's `num_inputs`. A network that
    /// breaks this fails with `Error::ShapeMismatch` when it is run.
    pub fn new(layers: Vec<DenseLayer>) -> Self {
        Network {
            layers,
            loss: SquaredError,
        }
    }

    /// Build a network of randomly initialized layers.
    pub fn from_specs(specs: &[LayerSpec]) -> Result<Self> {
        Self::from_specs_using(specs, &mut rand::thread_rng())
    }

    /// Like [`Network::from_specs`], drawing the initial parameters from `rng`.
    pub fn from_specs_using<R: Rng + ?Sized>(specs: &[LayerSpec], rng: &mut R) -> Result<Self> {
        for pair in specs.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.num_outputs != b.num_inputs {
                return Err(Error::mismatch(
                    "layer chain",
                    MatrixShape::new(a.num_inputs, a.num_outputs)?,
                    MatrixShape::new(b.num_inputs, b.num_outputs)?,
                ));
            }
        }
        let layers = specs
            .iter()
            .map(|spec| {
                DenseLayer::new_using(spec.num_inputs, spec.num_outputs, spec.activation, &mut *rng)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Network::new(layers))
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    /// Mutable access to the layers, e.g. to `load` stored parameters.
    pub fn layers_mut(&mut self) -> &mut [DenseLayer] {
        &mut self.layers
    }

    /// Run the network on a batch of examples, one per row.
    pub fn predict(&self, x: &DenseMatrix) -> Result<DenseMatrix> {
        let mut output = x.clone();
        for layer in &self.layers {
            output = layer.apply(&output)?;
        }
        Ok(output)
    }

    /// Summed squared error of the network's predictions for `x` against `y`.
    pub fn loss(&self, x: &DenseMatrix, y: &DenseMatrix) -> Result<f64> {
        self.loss.loss(y, &self.predict(x)?)
    }

    /// Train the network on one batch of examples. Returns the loss on the
    /// batch as measured before the update.
    ///
    /// Every layer computes its update from the parameters as they were at
    /// the start of the batch; the updates are committed together only once
    /// all of them have been computed. On error nothing is committed.
    pub fn train_batch(
        &mut self,
        x: &DenseMatrix,
        y: &DenseMatrix,
        learning_rate: f64,
        bias_update: BiasUpdate,
    ) -> Result<f64> {
        let mut passes = Vec::with_capacity(self.layers.len());
        let mut output = x.clone();
        for layer in &self.layers {
            let pass = layer.forward(&output)?;
            output = pass.output().clone();
            passes.push(pass);
        }

        let loss = self.loss.loss(y, &output)?;
        let mut error = self.loss.deriv(y, &output)?;

        let mut updates = Vec::with_capacity(self.layers.len());
        for (layer, pass) in self.layers.iter().zip(&passes).rev() {
            let step = layer.backward(pass, &error, learning_rate, bias_update)?;
            error = step.input_error;
            updates.push(step.update);
        }

        for (layer, update) in self.layers.iter_mut().rev().zip(updates) {
            layer.commit(update)?;
        }
        Ok(loss)
    }

    /// Train the network on all of `x` and `y`, which hold one example per
    /// row, for epochs `0..=epochs`.
    pub fn fit(
        &mut self,
        x: &DenseMatrix,
        y: &DenseMatrix,
        epochs: usize,
        learning_rate: f64,
        batch_size: usize,
    ) -> Result<()> {
        let config = TrainConfig::default()
            .with_epochs(epochs)
            .with_learning_rate(learning_rate)
            .with_batch_size(batch_size);
        self.fit_with(x, y, &config)
    }

    /// Like `fit`, with every setting taken from `config`.
    ///
    /// Batches are visited in order and there is no early stopping. If a
    /// batch fails, training stops and the error is returned; updates from
    /// earlier batches stay in place.
    pub fn fit_with(
        &mut self,
        x: &DenseMatrix,
        y: &DenseMatrix,
        config: &TrainConfig,
    ) -> Result<()> {
        if x.rows() != y.rows() {
            return Err(Error::mismatch("fit", x.shape(), y.shape()));
        }
        let x_batches = x.split_rows(config.batch_size)?;
        let y_batches = y.split_rows(config.batch_size)?;
        debug!(
            examples = x.rows(),
            batches = x_batches.len(),
            layers = self.layers.len(),
            ?config,
            "starting training"
        );

        for epoch in 0..=config.epochs {
            let mut total = 0.0;
            for (i, (xb, yb)) in x_batches.iter().zip(&y_batches).enumerate() {
                let loss = self.train_batch(xb, yb, config.learning_rate, config.bias_update)?;
                trace!(epoch, batch = i, loss);
                total += loss;
            }
            info!(epoch, loss = total, batches = x_batches.len(), "epoch finished");
        }
        Ok(())
    }
}
