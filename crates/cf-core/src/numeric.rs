use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

/// Absolute/relative tolerance pair.
///
/// The defaults are the integration tolerances of the circulation run
/// (`atol = 1e-12`, `rtol = 1e-10`).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-10,
        }
    }
}

impl Tolerances {
    pub fn new(abs: Real, rel: Real) -> Self {
        Self { abs, rel }
    }

    /// Error weight for one component: `abs + rel * magnitude`.
    #[inline]
    pub fn scale(&self, magnitude: Real) -> Real {
        self.abs + self.rel * magnitude.abs()
    }

    /// Both tolerances finite, `abs > 0` and `rel >= 0`.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.abs.is_finite() || self.abs <= 0.0 {
            return Err(CoreError::OutOfRange {
                what: "absolute tolerance",
                value: self.abs,
                expected: "finite and > 0",
            });
        }
        if !self.rel.is_finite() || self.rel < 0.0 {
            return Err(CoreError::OutOfRange {
                what: "relative tolerance",
                value: self.rel,
                expected: "finite and >= 0",
            });
        }
        Ok(())
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Finite and strictly positive.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, CoreError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(CoreError::OutOfRange {
            what,
            value: v,
            expected: "> 0",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_positive_rejects_zero_and_negative() {
        assert!(ensure_positive(0.0, "c1").is_err());
        assert!(ensure_positive(-1.0, "c1").is_err());
        assert!(ensure_positive(Real::INFINITY, "c1").is_err());
        assert_eq!(ensure_positive(0.5, "c1").unwrap(), 0.5);
    }

    #[test]
    fn tolerance_validation() {
        assert!(Tolerances::default().validate().is_ok());
        assert!(Tolerances::new(0.0, 1e-6).validate().is_err());
        assert!(Tolerances::new(1e-9, -1.0).validate().is_err());
        assert!(Tolerances::new(1e-9, Real::NAN).validate().is_err());
    }

    #[test]
    fn tolerance_scale() {
        let tol = Tolerances::new(1e-12, 1e-10);
        assert_eq!(tol.scale(-100.0), 1e-12 + 1e-8);
    }
}
