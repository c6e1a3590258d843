// cf-core/src/units.rs
//
// State values are carried as plain f64 in the mmHg / cm³ / s system. These
// helpers lift them into typed quantities at the reporting edge.

use uom::si::f64::{
    Pressure as UomPressure, Ratio as UomRatio, Volume as UomVolume, VolumeRate as UomVolumeRate,
};

pub type Pressure = UomPressure;
pub type Ratio = UomRatio;
pub type Volume = UomVolume;
pub type FlowRate = UomVolumeRate;

#[inline]
pub fn mmhg(v: f64) -> Pressure {
    use uom::si::pressure::millimeter_of_mercury;
    Pressure::new::<millimeter_of_mercury>(v)
}

#[inline]
pub fn cm3(v: f64) -> Volume {
    use uom::si::volume::cubic_centimeter;
    Volume::new::<cubic_centimeter>(v)
}

#[inline]
pub fn cm3ps(v: f64) -> FlowRate {
    use uom::si::volume_rate::cubic_centimeter_per_second;
    FlowRate::new::<cubic_centimeter_per_second>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

#[inline]
pub fn to_l_per_min(q: FlowRate) -> f64 {
    q.get::<uom::si::volume_rate::liter_per_minute>()
}
