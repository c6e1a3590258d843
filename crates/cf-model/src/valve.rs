//! Diode-like heart valves.

/// The four cardiac valves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Valve {
    /// Left ventricle to aorta.
    Aortic,
    /// Right atrium to right ventricle.
    Tricuspid,
    /// Right ventricle to pulmonary artery.
    Pulmonary,
    /// Left atrium to left ventricle.
    Mitral,
}

impl Valve {
    pub const ALL: [Valve; 4] = [Valve::Aortic, Valve::Tricuspid, Valve::Pulmonary, Valve::Mitral];

    pub fn name(self) -> &'static str {
        match self {
            Valve::Aortic => "aortic",
            Valve::Tricuspid => "tricuspid",
            Valve::Pulmonary => "pulmonary",
            Valve::Mitral => "mitral",
        }
    }
}

/// Gate value for a forward pressure difference `dp`.
///
/// Conducts (1) only for strictly positive `dp`. `leak` is subtracted on
/// both sides, so a closed valve with leakage yields `-leak`.
#[inline]
pub fn gate(dp: f64, leak: f64) -> f64 {
    let open = if dp > 0.0 { 1.0 } else { 0.0 };
    open - leak
}

/// Snapshot of one valve at a given time and state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValveState {
    pub valve: Valve,
    /// Forward pressure difference across the valve (mmHg).
    pub pressure_difference: f64,
    pub gate: f64,
    /// Gated flow through the valve (cm³/s).
    pub flow: f64,
}

impl ValveState {
    pub(crate) fn new(valve: Valve, pressure_difference: f64, leak: f64, resistance: f64) -> Self {
        let gate = gate(pressure_difference, leak);
        Self {
            valve,
            pressure_difference,
            gate,
            flow: gate * pressure_difference / resistance,
        }
    }

    pub fn is_open(&self) -> bool {
        self.pressure_difference > 0.0
    }
}

/// All four valves, in circuit order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValveSet {
    pub aortic: ValveState,
    pub tricuspid: ValveState,
    pub pulmonary: ValveState,
    pub mitral: ValveState,
}

impl ValveSet {
    pub fn get(&self, valve: Valve) -> &ValveState {
        match valve {
            Valve::Aortic => &self.aortic,
            Valve::Tricuspid => &self.tricuspid,
            Valve::Pulmonary => &self.pulmonary,
            Valve::Mitral => &self.mitral,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValveState> {
        [&self.aortic, &self.tricuspid, &self.pulmonary, &self.mitral].into_iter()
    }

    pub fn open_count(&self) -> usize {
        self.iter().filter(|v| v.is_open()).count()
    }
}
