use std::fmt::Debug;

/// A real-valued function applied to each element of a matrix, together with
/// its derivative.
///
/// Both methods take the *pre-activation* value `x`; `df` recomputes `f`
/// itself when the derivative is expressed in terms of it.
pub trait ActivationFn: Copy + Clone + Debug + Send + Sync {
    fn f(self, x: f64) -> f64;
    fn df(self, x: f64) -> f64;
}
