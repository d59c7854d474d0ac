use crate::matrix::DenseMatrix;
use crate::ActivationFn;

/// The identity function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Linear;

impl ActivationFn for Linear {
    fn f(self, x: f64) -> f64 {
        x
    }

    fn df(self, _x: f64) -> f64 {
        1.0
    }
}

/// Rectified linear unit activation function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Relu;

impl ActivationFn for Relu {
    fn f(self, x: f64) -> f64 {
        x.max(0.0)
    }

    fn df(self, x: f64) -> f64 {
        if x > 0.0 {
            1.0
        } else {
            0.0
        }
    }
}

/// The logistic function, a handy symmetric, s-shaped function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sigmoid;

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl ActivationFn for Sigmoid {
    fn f(self, x: f64) -> f64 {
        sigmoid(x)
    }

    fn df(self, x: f64) -> f64 {
        let y = sigmoid(x);
        y * (1.0 - y)
    }
}

/// `x * sigmoid(x)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Swish {
    sigmoid: Sigmoid,
}

impl Swish {
    pub fn new() -> Self {
        Swish { sigmoid: Sigmoid }
    }
}

impl ActivationFn for Swish {
    fn f(self, x: f64) -> f64 {
        x * self.sigmoid.f(x)
    }

    fn df(self, x: f64) -> f64 {
        let s = self.sigmoid.f(x);
        let y = self.f(x);
        y + s * (1.0 - y)
    }
}

/// The activation functions a `DenseLayer` can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Linear(Linear),
    Relu(Relu),
    Sigmoid(Sigmoid),
    Swish(Swish),
}

impl Activation {
    pub fn linear() -> Self {
        Activation::Linear(Linear)
    }

    pub fn relu() -> Self {
        Activation::Relu(Relu)
    }

    pub fn sigmoid() -> Self {
        Activation::Sigmoid(Sigmoid)
    }

    pub fn swish() -> Self {
        Activation::Swish(Swish::new())
    }

    /// Applies the function to each element of `x`.
    pub fn run(&self, x: &DenseMatrix) -> DenseMatrix {
        match *self {
            // Identity: skip the elementwise pass.
            Activation::Linear(_) => x.clone(),
            Activation::Relu(f) => x.map(move |v| f.f(v)),
            Activation::Sigmoid(f) => x.map(move |v| f.f(v)),
            Activation::Swish(f) => x.map(move |v| f.f(v)),
        }
    }

    /// Derivative of the function at each element of the pre-activation `x`.
    pub fn der(&self, x: &DenseMatrix) -> DenseMatrix {
        match *self {
            Activation::Linear(_) => DenseMatrix::ones(x.shape()),
            Activation::Relu(f) => x.map(move |v| f.df(v)),
            Activation::Sigmoid(f) => x.map(move |v| f.df(v)),
            Activation::Swish(f) => x.map(move |v| f.df(v)),
        }
    }
}

impl From<Linear> for Activation {
    fn from(f: Linear) -> Self {
        Activation::Linear(f)
    }
}

impl From<Relu> for Activation {
    fn from(f: Relu) -> Self {
        Activation::Relu(f)
    }
}

impl From<Sigmoid> for Activation {
    fn from(f: Sigmoid) -> Self {
        Activation::Sigmoid(f)
    }
}

impl From<Swish> for Activation {
    fn from(f: Swish) -> Self {
        Activation::Swish(f)
    }
}
