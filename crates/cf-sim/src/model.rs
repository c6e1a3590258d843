//! OdeSystem trait for pluggable right-hand sides.

use nalgebra::SVector;

/// A system of first-order ODEs `dx/dt = f(t, x)` with a fixed-size state.
///
/// `rhs` must be a pure function of its arguments: adaptive stepping
/// evaluates it at stage times that are not monotonic, and repeats
/// evaluations after rejected steps.
pub trait OdeSystem<const N: usize> {
    /// Compute state derivative dxdt = f(t, x).
    fn rhs(&self, t: f64, x: &SVector<f64, N>) -> SVector<f64, N>;
}

impl<F, const N: usize> OdeSystem<N> for F
where
    F: Fn(f64, &SVector<f64, N>) -> SVector<f64, N>,
{
    fn rhs(&self, t: f64, x: &SVector<f64, N>) -> SVector<f64, N> {
        self(t, x)
    }
}
