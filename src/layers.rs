mod activation;
pub use activation::{Activation, Linear, Relu, Sigmoid, Swish};

mod dense;
pub use dense::{Backward, DenseLayer, ForwardPass, StagedUpdate};
