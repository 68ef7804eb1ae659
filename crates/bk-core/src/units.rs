// bk-core/src/units.rs

use uom::si::f64::{
    Mass as UomMass, Ratio as UomRatio, Time as UomTime, Volume as UomVolume,
    VolumeRate as UomVolumeRate,
};

// Public canonical unit types (SI, f64)
pub type Mass = UomMass;
pub type Ratio = UomRatio;
pub type Time = UomTime;
pub type Volume = UomVolume;
pub type VolumeRate = UomVolumeRate;

#[inline]
pub fn liters(v: f64) -> Volume {
    use uom::si::volume::liter;
    Volume::new::<liter>(v)
}

#[inline]
pub fn kg(v: f64) -> Mass {
    use uom::si::mass::kilogram;
    Mass::new::<kilogram>(v)
}

#[inline]
pub fn minutes(v: f64) -> Time {
    use uom::si::time::minute;
    Time::new::<minute>(v)
}

#[inline]
pub fn liters_per_hour(v: f64) -> VolumeRate {
    use uom::si::volume_rate::liter_per_second;
    VolumeRate::new::<liter_per_second>(v / 3600.0)
}

#[inline]
pub fn percent(v: f64) -> Ratio {
    use uom::si::ratio::percent;
    Ratio::new::<percent>(v)
}

#[inline]
pub fn to_liters(v: Volume) -> f64 {
    use uom::si::volume::liter;
    v.get::<liter>()
}

#[inline]
pub fn to_kg(v: Mass) -> f64 {
    use uom::si::mass::kilogram;
    v.get::<kilogram>()
}

#[inline]
pub fn to_minutes(v: Time) -> f64 {
    use uom::si::time::minute;
    v.get::<minute>()
}

#[inline]
pub fn to_liters_per_hour(v: VolumeRate) -> f64 {
    use uom::si::volume_rate::liter_per_second;
    v.get::<liter_per_second>() * 3600.0
}

#[inline]
pub fn to_percent(v: Ratio) -> f64 {
    use uom::si::ratio::percent;
    v.get::<percent>()
}
