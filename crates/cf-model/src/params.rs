//! Circuit parameters.
//!
//! Units follow the mmHg / cm³ / s system throughout: compliances in
//! cm³/mmHg, elastances in mmHg/cm³, inertances in mmHg·s²/cm³ and
//! resistances in mmHg·s/cm³.

use cf_core::{CoreError, ensure_positive};

use crate::error::{ModelError, ModelResult};

/// Fixed constant of the systolic duration `ts = 0.16 + 0.3 * tc`.
pub const SYSTOLE_BASE_S: f64 = 0.16;
/// Slope of the systolic duration with respect to the cardiac period.
pub const SYSTOLE_SLOPE: f64 = 0.3;

/// Immutable parameter set of the closed-loop circuit.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CirculationParams {
    /// Aortic compliance.
    pub c1: f64,
    /// Systemic arterial compliance.
    pub c2: f64,
    /// Systemic venous compliance.
    pub c3: f64,
    /// Pulmonary artery compliance.
    pub c4: f64,
    /// Pulmonary arterial compliance.
    pub c5: f64,
    /// Pulmonary venous compliance.
    pub c6: f64,
    /// Left ventricle diastolic elastance.
    pub ed_l: f64,
    /// Right ventricle diastolic elastance.
    pub ed_r: f64,
    /// Left ventricle systolic elastance.
    pub es_l: f64,
    /// Right ventricle systolic elastance.
    pub es_r: f64,
    /// Left ventricle peak isovolumic pressure (mmHg).
    pub p0_l: f64,
    /// Right ventricle peak isovolumic pressure (mmHg).
    pub p0_r: f64,
    pub l1: f64,
    pub l2: f64,
    pub l3: f64,
    pub l4: f64,
    /// Aortic valve resistance.
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    /// Tricuspid valve resistance.
    pub r4: f64,
    /// Pulmonary valve resistance.
    pub r5: f64,
    pub r6: f64,
    pub r7: f64,
    /// Mitral valve resistance.
    pub r8: f64,
    /// Left myocardial viscosity resistance.
    pub r_l: f64,
    /// Right myocardial viscosity resistance.
    pub r_r: f64,
    /// Cardiac period (s).
    pub tc: f64,
    /// Fraction of backflow through the closed aortic valve, in `[0, 1)`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub reflux: f64,
}

impl Default for CirculationParams {
    fn default() -> Self {
        Self::reference()
    }
}

impl CirculationParams {
    /// Reference adult parameter set: heart rate of 66.7 bpm, no regurgitation.
    pub fn reference() -> Self {
        Self {
            c1: 0.08,
            c2: 1.33,
            c3: 20.0,
            c4: 0.18,
            c5: 3.8,
            c6: 4.0,
            ed_l: 0.1,
            ed_r: 0.03,
            es_l: 2.0,
            es_r: 0.4,
            p0_l: 20.0,
            p0_r: 8.0,
            l1: 0.0005,
            l2: 0.0005,
            l3: 0.0005,
            l4: 0.0005,
            r1: 0.01,
            r2: 0.067,
            r3: 1.0,
            r4: 0.005,
            r5: 0.003,
            r6: 0.03,
            r7: 0.088,
            r8: 0.005,
            r_l: 0.01,
            r_r: 0.01,
            tc: 0.9,
            reflux: 0.0,
        }
    }

    pub fn with_reflux(mut self, reflux: f64) -> Self {
        self.reflux = reflux;
        self
    }

    /// Duration of ventricular contraction within one cycle.
    pub fn systole_duration(&self) -> f64 {
        SYSTOLE_BASE_S + SYSTOLE_SLOPE * self.tc
    }

    /// Every strictly positive parameter with its configuration key.
    pub fn named_values(&self) -> [(&'static str, f64); 27] {
        [
            ("c1", self.c1),
            ("c2", self.c2),
            ("c3", self.c3),
            ("c4", self.c4),
            ("c5", self.c5),
            ("c6", self.c6),
            ("ed_l", self.ed_l),
            ("ed_r", self.ed_r),
            ("es_l", self.es_l),
            ("es_r", self.es_r),
            ("p0_l", self.p0_l),
            ("p0_r", self.p0_r),
            ("l1", self.l1),
            ("l2", self.l2),
            ("l3", self.l3),
            ("l4", self.l4),
            ("r1", self.r1),
            ("r2", self.r2),
            ("r3", self.r3),
            ("r4", self.r4),
            ("r5", self.r5),
            ("r6", self.r6),
            ("r7", self.r7),
            ("r8", self.r8),
            ("r_l", self.r_l),
            ("r_r", self.r_r),
            ("tc", self.tc),
        ]
    }

    pub fn validate(&self) -> ModelResult<()> {
        for (name, value) in self.named_values() {
            ensure_positive(value, name).map_err(|e| ModelError::InvalidParameter {
                name,
                value,
                reason: match e {
                    CoreError::NonFinite { .. } => "must be finite",
                    _ => "must be positive",
                },
            })?;
        }

        if !(0.0..1.0).contains(&self.reflux) {
            return Err(ModelError::InvalidParameter {
                name: "reflux",
                value: self.reflux,
                reason: "must lie in [0, 1)",
            });
        }

        // Contraction has to finish before the next beat starts.
        if self.systole_duration() >= self.tc {
            return Err(ModelError::InvalidParameter {
                name: "tc",
                value: self.tc,
                reason: "cardiac period shorter than systole (0.16 + 0.3 * tc)",
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_is_valid() {
        let p = CirculationParams::reference();
        assert!(p.validate().is_ok());
        assert_eq!(p.reflux, 0.0);
        assert!((p.systole_duration() - 0.43).abs() < 1e-15);
    }

    #[test]
    fn rejects_non_positive() {
        let mut p = CirculationParams::reference();
        p.r3 = 0.0;
        assert!(matches!(
            p.validate(),
            Err(ModelError::InvalidParameter { name: "r3", .. })
        ));

        let mut p = CirculationParams::reference();
        p.c4 = -0.18;
        assert!(matches!(
            p.validate(),
            Err(ModelError::InvalidParameter { name: "c4", .. })
        ));
    }

    #[test]
    fn rejects_non_finite() {
        let mut p = CirculationParams::reference();
        p.l2 = f64::NAN;
        let err = p.validate().unwrap_err();
        assert!(err.to_string().contains("finite"));

        let mut p = CirculationParams::reference();
        p.r1 = f64::INFINITY;
        assert_eq!(
            p.validate(),
            Err(ModelError::InvalidParameter {
                name: "r1",
                value: f64::INFINITY,
                reason: "must be finite",
            })
        );
    }

    #[test]
    fn reflux_range() {
        let p = CirculationParams::reference();
        assert!(p.with_reflux(0.05).validate().is_ok());
        assert!(p.with_reflux(-0.01).validate().is_err());
        assert!(p.with_reflux(1.0).validate().is_err());
    }

    #[test]
    fn short_period_rejected() {
        let mut p = CirculationParams::reference();
        p.tc = 0.2;
        assert!(matches!(
            p.validate(),
            Err(ModelError::InvalidParameter { name: "tc", .. })
        ));
    }
}
