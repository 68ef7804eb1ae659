//! Field catalogue for the equipment profile.
//!
//! Emission order, BeerXML tag names, human labels and bounds all live here
//! so that serialization, loading and validation agree.

use std::fmt;

/// Bound enforced by a field's setter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// No numeric bound (text, booleans, schema version).
    Unbounded,
    /// Finite and `>= 0`.
    NonNegative,
    /// Finite and within `[0, 100]`.
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EquipmentField {
    Name,
    Version,
    BoilSize,
    BatchSize,
    TunVolume,
    TunWeight,
    TunSpecificHeat,
    TopUpWater,
    TrubChillerLoss,
    EvapRatePercent,
    EvapRateAbsolute,
    BoilTime,
    CalcBoilVolume,
    LauterDeadspace,
    TopUpKettle,
    HopUtilization,
    Notes,
}

impl EquipmentField {
    /// Every field, in serialization order.
    pub const ALL: [EquipmentField; 17] = [
        EquipmentField::Name,
        EquipmentField::Version,
        EquipmentField::BoilSize,
        EquipmentField::BatchSize,
        EquipmentField::TunVolume,
        EquipmentField::TunWeight,
        EquipmentField::TunSpecificHeat,
        EquipmentField::TopUpWater,
        EquipmentField::TrubChillerLoss,
        EquipmentField::EvapRatePercent,
        EquipmentField::EvapRateAbsolute,
        EquipmentField::BoilTime,
        EquipmentField::CalcBoilVolume,
        EquipmentField::LauterDeadspace,
        EquipmentField::TopUpKettle,
        EquipmentField::HopUtilization,
        EquipmentField::Notes,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            EquipmentField::Name => "NAME",
            EquipmentField::Version => "VERSION",
            EquipmentField::BoilSize => "BOIL_SIZE",
            EquipmentField::BatchSize => "BATCH_SIZE",
            EquipmentField::TunVolume => "TUN_VOLUME",
            EquipmentField::TunWeight => "TUN_WEIGHT",
            EquipmentField::TunSpecificHeat => "TUN_SPECIFIC_HEAT",
            EquipmentField::TopUpWater => "TOP_UP_WATER",
            EquipmentField::TrubChillerLoss => "TRUB_CHILLER_LOSS",
            EquipmentField::EvapRatePercent => "EVAP_RATE",
            EquipmentField::EvapRateAbsolute => "REAL_EVAP_RATE",
            EquipmentField::BoilTime => "BOIL_TIME",
            EquipmentField::CalcBoilVolume => "CALC_BOIL_VOLUME",
            EquipmentField::LauterDeadspace => "LAUTER_DEADSPACE",
            EquipmentField::TopUpKettle => "TOP_UP_KETTLE",
            EquipmentField::HopUtilization => "HOP_UTILIZATION",
            EquipmentField::Notes => "NOTES",
        }
    }

    /// Exact, case-sensitive tag lookup.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.tag() == tag)
    }

    pub fn label(self) -> &'static str {
        match self {
            EquipmentField::Name => "name",
            EquipmentField::Version => "version",
            EquipmentField::BoilSize => "boil size",
            EquipmentField::BatchSize => "batch size",
            EquipmentField::TunVolume => "tun volume",
            EquipmentField::TunWeight => "tun weight",
            EquipmentField::TunSpecificHeat => "tun specific heat",
            EquipmentField::TopUpWater => "top up water",
            EquipmentField::TrubChillerLoss => "trub chiller loss",
            EquipmentField::EvapRatePercent => "evap rate",
            EquipmentField::EvapRateAbsolute => "real evap rate",
            EquipmentField::BoilTime => "boil time",
            EquipmentField::CalcBoilVolume => "calc boil volume",
            EquipmentField::LauterDeadspace => "lauter deadspace",
            EquipmentField::TopUpKettle => "top up kettle",
            EquipmentField::HopUtilization => "hop utilization",
            EquipmentField::Notes => "notes",
        }
    }

    pub fn bound(self) -> Bound {
        match self {
            EquipmentField::Name
            | EquipmentField::Version
            | EquipmentField::CalcBoilVolume
            | EquipmentField::Notes => Bound::Unbounded,
            EquipmentField::EvapRatePercent | EquipmentField::HopUtilization => Bound::Percent,
            _ => Bound::NonNegative,
        }
    }

    /// Whether a successful set re-derives the boil size.
    pub fn triggers_recompute(self) -> bool {
        matches!(
            self,
            EquipmentField::BatchSize
                | EquipmentField::TopUpWater
                | EquipmentField::TrubChillerLoss
                | EquipmentField::EvapRatePercent
                | EquipmentField::EvapRateAbsolute
                | EquipmentField::BoilTime
                | EquipmentField::CalcBoilVolume
        )
    }

    /// Unit suffix used when printing values.
    pub fn unit(self) -> &'static str {
        match self {
            EquipmentField::BoilSize
            | EquipmentField::BatchSize
            | EquipmentField::TunVolume
            | EquipmentField::TopUpWater
            | EquipmentField::TrubChillerLoss
            | EquipmentField::LauterDeadspace
            | EquipmentField::TopUpKettle => "L",
            EquipmentField::TunWeight => "kg",
            EquipmentField::TunSpecificHeat => "cal/(g*C)",
            EquipmentField::EvapRatePercent | EquipmentField::HopUtilization => "%",
            EquipmentField::EvapRateAbsolute => "L/hr",
            EquipmentField::BoilTime => "min",
            _ => "",
        }
    }
}

impl fmt::Display for EquipmentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
