//! A small feed-forward neural network: dense layers, a handful of activation
//! functions, and a mini-batch gradient-descent trainer, all on top of a
//! row-major `f64` matrix type.
//!
//! ```
//! use densenet::{DenseLayer, DenseMatrix, Linear, Network};
//!
//! let weights = DenseMatrix::from_rows(&[[1.0], [1.0]]).unwrap();
//! let layer = DenseLayer::from_parts(weights, vec![0.0], Linear).unwrap();
//! let net = Network::new(vec![layer]);
//! let x = DenseMatrix::from_rows(&[[1.0, 2.0]]).unwrap();
//! assert_eq!(net.predict(&x).unwrap().to_rows(), vec![vec![3.0]]);
//! ```

mod error;
pub use error::{Error, Result};

mod matrix;
pub use matrix::{DenseMatrix, MatrixShape};

mod traits;
pub use traits::ActivationFn;

mod config;
pub use config::{BiasUpdate, TrainConfig};

mod params;
pub use params::LayerParams;

mod model;
pub use model::{LayerSpec, Network};

pub mod loss;

pub mod layers;
pub use layers::{Activation, DenseLayer, Linear, Relu, Sigmoid, Swish};
