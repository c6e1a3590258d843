//! Cardiac activation waveform.

use std::f64::consts::PI;

use crate::error::{ModelError, ModelResult};
use crate::params::{SYSTOLE_BASE_S, SYSTOLE_SLOPE};

/// Periodic contraction timing of both ventricles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardiacCycle {
    period: f64,
    systole: f64,
}

impl CardiacCycle {
    pub fn new(period: f64) -> ModelResult<Self> {
        if !period.is_finite() || period <= 0.0 {
            return Err(ModelError::InvalidParameter {
                name: "tc",
                value: period,
                reason: "must be positive",
            });
        }
        Ok(Self {
            period,
            systole: SYSTOLE_BASE_S + SYSTOLE_SLOPE * period,
        })
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn systole_duration(&self) -> f64 {
        self.systole
    }

    /// Time since the start of the current beat, in `[0, period)` for any `t`.
    pub fn phase(&self, t: f64) -> f64 {
        t.rem_euclid(self.period)
    }

    /// Zero-based beat number containing `t`.
    pub fn beat_index(&self, t: f64) -> i64 {
        (t / self.period).floor() as i64
    }

    pub fn in_systole(&self, t: f64) -> bool {
        self.phase(t) < self.systole
    }

    /// Raised-cosine activation `a(t)` in `[0, 1]`.
    pub fn activation(&self, t: f64) -> f64 {
        let tm = self.phase(t);
        if tm < self.systole {
            0.5 * (1.0 - (2.0 * PI * tm / self.systole).cos())
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reference() -> CardiacCycle {
        CardiacCycle::new(0.9).unwrap()
    }

    #[test]
    fn starts_at_rest() {
        let c = reference();
        assert_eq!(c.activation(0.0), 0.0);
        assert_eq!(c.beat_index(0.0), 0);
        assert!(c.in_systole(0.0));
    }

    #[test]
    fn peaks_mid_systole() {
        let c = reference();
        let mid = 0.5 * c.systole_duration();
        assert!((c.activation(mid) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn negative_time_wraps() {
        let c = reference();
        let t = 0.1;
        assert!((c.activation(t - 0.9) - c.activation(t)).abs() < 1e-12);
        assert_eq!(c.beat_index(-0.1), -1);
        assert!((c.phase(-0.1) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_period() {
        assert!(CardiacCycle::new(0.0).is_err());
        assert!(CardiacCycle::new(f64::NAN).is_err());
    }

    proptest! {
        #[test]
        fn activation_bounded(t in -100.0f64..100.0, tc in 0.3f64..2.0) {
            let c = CardiacCycle::new(tc).unwrap();
            let a = c.activation(t);
            prop_assert!((0.0..=1.0).contains(&a));
        }

        #[test]
        fn activation_periodic(t in 0.0f64..50.0, k in 1u32..20) {
            let c = reference();
            let shifted = t + f64::from(k) * c.period();
            prop_assert!((c.activation(shifted) - c.activation(t)).abs() < 1e-9);
        }

        #[test]
        fn relaxed_after_systole(frac in 0.0f64..1.0, beat in 0u32..50) {
            let c = reference();
            let ts = c.systole_duration();
            // Keep clear of the window edges so beat offsets do not round across them.
            let tm = ts + 1e-6 + frac * (c.period() - ts - 2e-6);
            let t = f64::from(beat) * c.period() + tm;
            prop_assert_eq!(c.activation(t), 0.0);
        }
    }
}
