//! Dense output: continuous 4th-order interpolant over accepted steps.

use nalgebra::SVector;

use crate::error::{SimError, SimResult};
use crate::tableau::{D, STAGES};

/// Interpolant over one accepted step `[t0, t1]`.
///
/// Uses the Dormand-Prince continuous extension in the Hermite-like form of
/// Hairer's CONTD5. The endpoints reproduce the step's start and end states
/// exactly.
#[derive(Clone, Debug)]
pub struct DenseSegment<const N: usize> {
    t0: f64,
    t1: f64,
    y0: SVector<f64, N>,
    y1: SVector<f64, N>,
    ydiff: SVector<f64, N>,
    bspl: SVector<f64, N>,
    r4: SVector<f64, N>,
    r5: SVector<f64, N>,
}

impl<const N: usize> DenseSegment<N> {
    /// Build from the stages of an accepted step of size `h = t1 - t0`.
    pub fn new(
        t0: f64,
        t1: f64,
        y0: SVector<f64, N>,
        y1: SVector<f64, N>,
        k: &[SVector<f64, N>; STAGES],
    ) -> Self {
        let h = t1 - t0;
        let ydiff = y1 - y0;
        let bspl = k[0] * h - ydiff;
        let r4 = ydiff - k[STAGES - 1] * h - bspl;
        let mut r5 = SVector::<f64, N>::zeros();
        for (i, ki) in k.iter().enumerate() {
            if D[i] != 0.0 {
                r5 += ki * (h * D[i]);
            }
        }
        Self {
            t0,
            t1,
            y0,
            y1,
            ydiff,
            bspl,
            r4,
            r5,
        }
    }

    pub fn t_start(&self) -> f64 {
        self.t0
    }

    pub fn t_end(&self) -> f64 {
        self.t1
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.t0 && t <= self.t1
    }

    /// Interpolated state at `t`. Caller guarantees `t` lies in the segment.
    pub fn eval(&self, t: f64) -> SVector<f64, N> {
        if t == self.t0 {
            return self.y0;
        }
        if t == self.t1 {
            return self.y1;
        }
        let theta = (t - self.t0) / (self.t1 - self.t0);
        let theta1 = 1.0 - theta;
        self.y0
            + (self.ydiff + (self.bspl + (self.r4 + self.r5 * theta1) * theta) * theta1) * theta
    }
}

/// Piecewise interpolant over the whole integrated span.
#[derive(Clone, Debug)]
pub struct DenseSolution<const N: usize> {
    t_start: f64,
    y_start: SVector<f64, N>,
    segments: Vec<DenseSegment<N>>,
}

impl<const N: usize> DenseSolution<N> {
    pub fn new(t_start: f64, y_start: SVector<f64, N>) -> Self {
        Self {
            t_start,
            y_start,
            segments: Vec::new(),
        }
    }

    /// Append the segment of the next accepted step. Segments must be
    /// contiguous and in time order.
    pub(crate) fn push(&mut self, segment: DenseSegment<N>) {
        debug_assert!(segment.t0 == self.t_max());
        self.segments.push(segment);
    }

    pub fn t_min(&self) -> f64 {
        self.t_start
    }

    pub fn t_max(&self) -> f64 {
        self.segments.last().map_or(self.t_start, |s| s.t1)
    }

    pub fn segments(&self) -> &[DenseSegment<N>] {
        &self.segments
    }

    /// State at an arbitrary time inside the integrated span.
    pub fn eval(&self, t: f64) -> SimResult<SVector<f64, N>> {
        if !(t >= self.t_min() && t <= self.t_max()) {
            return Err(SimError::OutOfRange {
                t,
                t_min: self.t_min(),
                t_max: self.t_max(),
            });
        }
        if t == self.t_start {
            return Ok(self.y_start);
        }
        let idx = self
            .segments
            .partition_point(|s| s.t1 < t)
            .min(self.segments.len() - 1);
        Ok(self.segments[idx].eval(t))
    }

    /// States at each of `times`, in order.
    pub fn eval_many(&self, times: &[f64]) -> SimResult<Vec<SVector<f64, N>>> {
        times.iter().map(|&t| self.eval(t)).collect()
    }
}
