use rand::Rng;

use crate::config::BiasUpdate;
use crate::error::{Error, Result};
use crate::matrix::{DenseMatrix, MatrixShape};
use crate::params::LayerParams;

use super::Activation;

/// A fully connected layer: `activation(x . weights + bias)`.
#[derive(Debug, Clone)]
pub struct DenseLayer {
    /// Shape is `(num_inputs, num_outputs)`.
    weights: DenseMatrix,
    /// Length is `num_outputs`.
    bias: Vec<f64>,
    activation: Activation,
}

/// Everything a forward pass through one layer produced, kept so the
/// backward pass can reuse it. Valid for one mini-batch.
#[derive(Debug, Clone)]
pub struct ForwardPass {
    input: DenseMatrix,
    pre_activation: DenseMatrix,
    output: DenseMatrix,
}

impl ForwardPass {
    /// The matrix that was fed into the layer.
    pub fn input(&self) -> &DenseMatrix {
        &self.input
    }

    /// `input . weights + bias`, before the activation function.
    pub fn pre_activation(&self) -> &DenseMatrix {
        &self.pre_activation
    }

    pub fn output(&self) -> &DenseMatrix {
        &self.output
    }

    pub fn into_output(self) -> DenseMatrix {
        self.output
    }
}

/// New parameters for a layer, computed but not yet applied.
///
/// Holding updates aside until every layer of the network has computed its
/// own keeps the backward pass reading one consistent set of parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedUpdate {
    weights: DenseMatrix,
    bias: Vec<f64>,
}

impl StagedUpdate {
    pub fn weights(&self) -> &DenseMatrix {
        &self.weights
    }

    pub fn bias(&self) -> &[f64] {
        &self.bias
    }
}

/// Result of one backward step through a layer.
#[derive(Debug, Clone)]
pub struct Backward {
    /// Gradient-descent update for this layer.
    pub update: StagedUpdate,
    /// Error signal for the layer below: `delta . weights^T`, using the
    /// weights the forward pass saw.
    pub input_error: DenseMatrix,
}

impl DenseLayer {
    /// A layer with weights drawn from `[-1, 1]` and biases from `[-0.1, 0.1]`.
    pub fn new(
        num_inputs: usize,
        num_outputs: usize,
        activation: impl Into<Activation>,
    ) -> Result<Self> {
        Self::new_using(
            num_inputs,
            num_outputs,
            activation,
            &mut rand::thread_rng(),
        )
    }

    /// Like [`DenseLayer::new`], drawing the initial parameters from `rng`.
    pub fn new_using<R: Rng + ?Sized>(
        num_inputs: usize,
        num_outputs: usize,
        activation: impl Into<Activation>,
        rng: &mut R,
    ) -> Result<Self> {
        let shape = MatrixShape::new(num_inputs, num_outputs)?;
        let weights = DenseMatrix::random_using(shape, -1.0, 1.0, rng);
        let bias = (0..num_outputs)
            .map(|_| rng.gen_range(-0.1..=0.1))
            .collect();
        Ok(DenseLayer {
            weights,
            bias,
            activation: activation.into(),
        })
    }

    /// A layer with the given parameters.
    pub fn from_parts(
        weights: DenseMatrix,
        bias: Vec<f64>,
        activation: impl Into<Activation>,
    ) -> Result<Self> {
        check_bias(&weights, &bias)?;
        Ok(DenseLayer {
            weights,
            bias,
            activation: activation.into(),
        })
    }

    pub fn weights(&self) -> &DenseMatrix {
        &self.weights
    }

    pub fn bias(&self) -> &[f64] {
        &self.bias
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// Shape of the weight matrix, `num_inputs x num_outputs`.
    pub fn size(&self) -> MatrixShape {
        self.weights.shape()
    }

    pub fn num_inputs(&self) -> usize {
        self.weights.rows()
    }

    pub fn num_outputs(&self) -> usize {
        self.weights.columns()
    }

    /// Compute the output of this layer for a batch `x` with one example
    /// per row.
    pub fn apply(&self, x: &DenseMatrix) -> Result<DenseMatrix> {
        Ok(self.forward(x)?.into_output())
    }

    /// Like `apply`, but keeps the intermediate values `backward` needs.
    pub fn forward(&self, x: &DenseMatrix) -> Result<ForwardPass> {
        let pre_activation = x.dot(&self.weights)?.add_row(&self.bias)?;
        let output = self.activation.run(&pre_activation);
        Ok(ForwardPass {
            input: x.clone(),
            pre_activation,
            output,
        })
    }

    /// Given the forward pass for a batch and ∂L/∂output, compute the
    /// gradient-descent update for this layer and the error signal to hand
    /// to the layer below.
    ///
    /// Nothing is modified; apply the update with `commit`.
    pub fn backward(
        &self,
        pass: &ForwardPass,
        output_error: &DenseMatrix,
        learning_rate: f64,
        bias_update: BiasUpdate,
    ) -> Result<Backward> {
        let delta = self
            .activation
            .der(&pass.pre_activation)
            .multiply_elementwise(output_error)?;
        let dw = pass.input.transpose().dot(&delta)?;
        let db = match bias_update {
            BiasUpdate::LastGradientRow => dw
                .row(dw.rows() - 1)
                .ok_or(Error::EmptyMatrix)?
                .to_vec(),
            BiasUpdate::BatchSum => delta.sum_rows(),
        };

        let weights = self.weights.add(&dw.scale(-learning_rate))?;
        let bias = self
            .bias
            .iter()
            .zip(&db)
            .map(|(b, g)| b - learning_rate * g)
            .collect();
        let input_error = delta.dot(&self.weights.transpose())?;

        Ok(Backward {
            update: self.stage_update(weights, bias)?,
            input_error,
        })
    }

    /// Propose new parameters for this layer. The layer itself is unchanged
    /// until the update is passed to `commit`.
    pub fn stage_update(&self, weights: DenseMatrix, bias: Vec<f64>) -> Result<StagedUpdate> {
        self.check_params("stage_update", &weights, &bias)?;
        Ok(StagedUpdate { weights, bias })
    }

    /// Replace this layer's parameters with a staged update.
    ///
    /// The update must fit this layer; one staged by a layer of another
    /// size is rejected and the layer is left unchanged.
    pub fn commit(&mut self, update: StagedUpdate) -> Result<()> {
        self.check_params("commit", &update.weights, &update.bias)?;
        self.weights = update.weights;
        self.bias = update.bias;
        Ok(())
    }

    fn check_params(&self, op: &'static str, weights: &DenseMatrix, bias: &[f64]) -> Result<()> {
        if weights.shape() != self.weights.shape() {
            return Err(Error::mismatch(op, self.weights.shape(), weights.shape()));
        }
        check_bias(weights, bias)
    }

    /// Replace this layer's parameters with a stored record. The record must
    /// have the same shape as the layer.
    pub fn load(&mut self, params: &LayerParams) -> Result<()> {
        let update = self.stage_update(params.weights()?, params.bias()?.to_vec())?;
        self.commit(update)
    }
}

fn check_bias(weights: &DenseMatrix, bias: &[f64]) -> Result<()> {
    if bias.len() != weights.columns() {
        return Err(Error::mismatch(
            "bias",
            weights.shape(),
            MatrixShape::row_vector(bias.len()),
        ));
    }
    Ok(())
}
