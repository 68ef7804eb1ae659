//! Equipment profile entity.
//!
//! One physical brewing setup: vessel volumes, losses, boil-off and the
//! optional derived boil volume. State changes only through the validated
//! `set_*` methods; each successful change is reported to the registered
//! change callback, if any.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use bk_core::{
    Mass, Ratio, Real, Time, Volume, VolumeRate, kg, liters, liters_per_hour, minutes, percent,
};

use crate::field::EquipmentField;
use crate::validate::{ValidationError, check};

/// BeerXML schema version this entity reads and writes.
pub const SCHEMA_VERSION: i32 = 1;

/// Callback invoked after every successful mutation.
pub type ChangeCallback = Arc<dyn Fn(EquipmentField) + Send + Sync>;

pub type SetResult = Result<(), ValidationError>;

#[derive(Clone)]
pub struct Equipment {
    name: String,
    version: i32,
    boil_size_l: Real,
    batch_size_l: Real,
    tun_volume_l: Real,
    tun_weight_kg: Real,
    tun_specific_heat_cal_gc: Real,
    top_up_water_l: Real,
    trub_chiller_loss_l: Real,
    evap_rate_pct_hr: Real,
    evap_rate_l_hr: Real,
    boil_time_min: Real,
    calc_boil_volume: bool,
    lauter_deadspace_l: Real,
    top_up_kettle_l: Real,
    hop_utilization_pct: Real,
    notes: String,
    on_change: Option<ChangeCallback>,
}

impl Default for Equipment {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: SCHEMA_VERSION,
            boil_size_l: 0.0,
            batch_size_l: 0.0,
            tun_volume_l: 0.0,
            tun_weight_kg: 0.0,
            tun_specific_heat_cal_gc: 0.0,
            top_up_water_l: 0.0,
            trub_chiller_loss_l: 0.0,
            evap_rate_pct_hr: 0.0,
            evap_rate_l_hr: 0.0,
            boil_time_min: 0.0,
            calc_boil_volume: false,
            lauter_deadspace_l: 0.0,
            top_up_kettle_l: 0.0,
            hop_utilization_pct: 0.0,
            notes: String::new(),
            on_change: None,
        }
    }
}

impl Equipment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor used by tests and the CLI.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    // ---------------------------------------------------------------- notify

    /// Register the change callback, replacing any previous one.
    ///
    /// Clones share the callback.
    pub fn on_change<F>(&mut self, callback: F)
    where
        F: Fn(EquipmentField) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(callback));
    }

    pub fn clear_on_change(&mut self) {
        self.on_change = None;
    }

    fn changed(&self, field: EquipmentField) {
        if let Some(callback) = &self.on_change {
            callback(field);
        }
    }

    /// Validate, store, notify, then re-derive the boil size if `field`
    /// feeds it.
    fn set_real(&mut self, field: EquipmentField, value: Real) -> SetResult {
        let value = check(field, value)?;
        let Some(slot) = self.slot_mut(field) else {
            return Err(ValidationError::NotNumeric { field });
        };
        *slot = value;
        self.changed(field);
        if field.triggers_recompute() {
            self.recompute_boil_size();
        }
        Ok(())
    }

    fn slot_mut(&mut self, field: EquipmentField) -> Option<&mut Real> {
        let slot = match field {
            EquipmentField::BoilSize => &mut self.boil_size_l,
            EquipmentField::BatchSize => &mut self.batch_size_l,
            EquipmentField::TunVolume => &mut self.tun_volume_l,
            EquipmentField::TunWeight => &mut self.tun_weight_kg,
            EquipmentField::TunSpecificHeat => &mut self.tun_specific_heat_cal_gc,
            EquipmentField::TopUpWater => &mut self.top_up_water_l,
            EquipmentField::TrubChillerLoss => &mut self.trub_chiller_loss_l,
            EquipmentField::EvapRatePercent => &mut self.evap_rate_pct_hr,
            EquipmentField::EvapRateAbsolute => &mut self.evap_rate_l_hr,
            EquipmentField::BoilTime => &mut self.boil_time_min,
            EquipmentField::LauterDeadspace => &mut self.lauter_deadspace_l,
            EquipmentField::TopUpKettle => &mut self.top_up_kettle_l,
            EquipmentField::HopUtilization => &mut self.hop_utilization_pct,
            EquipmentField::Name
            | EquipmentField::Version
            | EquipmentField::CalcBoilVolume
            | EquipmentField::Notes => return None,
        };
        Some(slot)
    }

    /// Numeric value of `field`, or `None` for text/flag fields.
    pub fn real(&self, field: EquipmentField) -> Option<Real> {
        let v = match field {
            EquipmentField::BoilSize => self.boil_size_l,
            EquipmentField::BatchSize => self.batch_size_l,
            EquipmentField::TunVolume => self.tun_volume_l,
            EquipmentField::TunWeight => self.tun_weight_kg,
            EquipmentField::TunSpecificHeat => self.tun_specific_heat_cal_gc,
            EquipmentField::TopUpWater => self.top_up_water_l,
            EquipmentField::TrubChillerLoss => self.trub_chiller_loss_l,
            EquipmentField::EvapRatePercent => self.evap_rate_pct_hr,
            EquipmentField::EvapRateAbsolute => self.evap_rate_l_hr,
            EquipmentField::BoilTime => self.boil_time_min,
            EquipmentField::LauterDeadspace => self.lauter_deadspace_l,
            EquipmentField::TopUpKettle => self.top_up_kettle_l,
            EquipmentField::HopUtilization => self.hop_utilization_pct,
            EquipmentField::Name
            | EquipmentField::Version
            | EquipmentField::CalcBoilVolume
            | EquipmentField::Notes => return None,
        };
        Some(v)
    }

    /// Set any numeric field by identifier, through the same validation
    /// and recompute rules as the dedicated setter.
    pub fn set_real_field(&mut self, field: EquipmentField, value: Real) -> SetResult {
        if field == EquipmentField::BoilSize {
            return self.set_boil_size_l(value);
        }
        self.set_real(field, value)
    }

    // ---------------------------------------------------------------- setters

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.changed(EquipmentField::Name);
    }

    /// Set the boil size directly.
    ///
    /// While `calc_boil_volume` is on the derived value wins, so the stored
    /// boil size is re-derived right after.
    pub fn set_boil_size_l(&mut self, v: Real) -> SetResult {
        self.set_real(EquipmentField::BoilSize, v)?;
        self.recompute_boil_size();
        Ok(())
    }

    pub fn set_batch_size_l(&mut self, v: Real) -> SetResult {
        self.set_real(EquipmentField::BatchSize, v)
    }

    pub fn set_tun_volume_l(&mut self, v: Real) -> SetResult {
        self.set_real(EquipmentField::TunVolume, v)
    }

    pub fn set_tun_weight_kg(&mut self, v: Real) -> SetResult {
        self.set_real(EquipmentField::TunWeight, v)
    }

    pub fn set_tun_specific_heat_cal_gc(&mut self, v: Real) -> SetResult {
        self.set_real(EquipmentField::TunSpecificHeat, v)
    }

    pub fn set_top_up_water_l(&mut self, v: Real) -> SetResult {
        self.set_real(EquipmentField::TopUpWater, v)
    }

    pub fn set_trub_chiller_loss_l(&mut self, v: Real) -> SetResult {
        self.set_real(EquipmentField::TrubChillerLoss, v)
    }

    pub fn set_evap_rate_pct_hr(&mut self, v: Real) -> SetResult {
        self.set_real(EquipmentField::EvapRatePercent, v)
    }

    pub fn set_evap_rate_l_hr(&mut self, v: Real) -> SetResult {
        self.set_real(EquipmentField::EvapRateAbsolute, v)
    }

    pub fn set_boil_time_min(&mut self, v: Real) -> SetResult {
        self.set_real(EquipmentField::BoilTime, v)
    }

    pub fn set_calc_boil_volume(&mut self, on: bool) {
        self.calc_boil_volume = on;
        self.changed(EquipmentField::CalcBoilVolume);
        if on {
            self.recompute_boil_size();
        }
    }

    pub fn set_lauter_deadspace_l(&mut self, v: Real) -> SetResult {
        self.set_real(EquipmentField::LauterDeadspace, v)
    }

    pub fn set_top_up_kettle_l(&mut self, v: Real) -> SetResult {
        self.set_real(EquipmentField::TopUpKettle, v)
    }

    pub fn set_hop_utilization_pct(&mut self, v: Real) -> SetResult {
        self.set_real(EquipmentField::HopUtilization, v)
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
        self.changed(EquipmentField::Notes);
    }

    // ---------------------------------------------------------------- getters

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn boil_size_l(&self) -> Real {
        self.boil_size_l
    }

    pub fn batch_size_l(&self) -> Real {
        self.batch_size_l
    }

    pub fn tun_volume_l(&self) -> Real {
        self.tun_volume_l
    }

    pub fn tun_weight_kg(&self) -> Real {
        self.tun_weight_kg
    }

    pub fn tun_specific_heat_cal_gc(&self) -> Real {
        self.tun_specific_heat_cal_gc
    }

    pub fn top_up_water_l(&self) -> Real {
        self.top_up_water_l
    }

    pub fn trub_chiller_loss_l(&self) -> Real {
        self.trub_chiller_loss_l
    }

    pub fn evap_rate_pct_hr(&self) -> Real {
        self.evap_rate_pct_hr
    }

    pub fn evap_rate_l_hr(&self) -> Real {
        self.evap_rate_l_hr
    }

    pub fn boil_time_min(&self) -> Real {
        self.boil_time_min
    }

    pub fn calc_boil_volume(&self) -> bool {
        self.calc_boil_volume
    }

    pub fn lauter_deadspace_l(&self) -> Real {
        self.lauter_deadspace_l
    }

    pub fn top_up_kettle_l(&self) -> Real {
        self.top_up_kettle_l
    }

    pub fn hop_utilization_pct(&self) -> Real {
        self.hop_utilization_pct
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    // ------------------------------------------------------- typed quantities

    pub fn boil_size(&self) -> Volume {
        liters(self.boil_size_l)
    }

    pub fn batch_size(&self) -> Volume {
        liters(self.batch_size_l)
    }

    pub fn tun_volume(&self) -> Volume {
        liters(self.tun_volume_l)
    }

    pub fn tun_weight(&self) -> Mass {
        kg(self.tun_weight_kg)
    }

    pub fn evap_rate(&self) -> VolumeRate {
        liters_per_hour(self.evap_rate_l_hr)
    }

    pub fn boil_time(&self) -> Time {
        minutes(self.boil_time_min)
    }

    pub fn hop_utilization(&self) -> Ratio {
        percent(self.hop_utilization_pct)
    }

    // ---------------------------------------------------------------- derived

    fn boil_off_l(&self) -> Real {
        (self.boil_time_min / 60.0) * self.evap_rate_l_hr
    }

    /// Re-derive the boil size from batch size, losses and boil-off.
    ///
    /// `boil = batch - top_up_water + trub_chiller_loss + boil_time/60 * evap_l_hr`
    ///
    /// Does nothing unless `calc_boil_volume` is on. The BeerXML 1.0
    /// percentage-based formula is deliberately not used.
    pub fn recompute_boil_size(&mut self) {
        if !self.calc_boil_volume {
            return;
        }
        self.boil_size_l =
            self.batch_size_l - self.top_up_water_l + self.trub_chiller_loss_l + self.boil_off_l();
        self.changed(EquipmentField::BoilSize);
    }

    /// Wort left in the kettle after boiling `kettle_wort_l` liters for the
    /// configured boil time.
    pub fn wort_remaining_after_boil(&self, kettle_wort_l: Real) -> Real {
        kettle_wort_l - self.boil_off_l()
    }

    pub fn wort_remaining_after_boil_volume(&self, kettle_wort: Volume) -> Volume {
        kettle_wort - self.evap_rate() * self.boil_time()
    }

    // ------------------------------------------------------------- comparison

    /// Field-by-field comparison; `==` only compares names.
    pub fn same_values(&self, other: &Equipment) -> bool {
        self.name == other.name
            && self.version == other.version
            && self.calc_boil_volume == other.calc_boil_volume
            && self.notes == other.notes
            && EquipmentField::ALL
                .into_iter()
                .all(|f| self.real(f) == other.real(f))
    }
}

/// Ordering used for sorting profiles: lexicographic by name.
pub fn cmp_by_name(a: &Equipment, b: &Equipment) -> Ordering {
    a.name.cmp(&b.name)
}

impl PartialEq for Equipment {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Equipment {}

impl PartialOrd for Equipment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Equipment {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_by_name(self, other)
    }
}

impl fmt::Debug for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Equipment")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("boil_size_l", &self.boil_size_l)
            .field("batch_size_l", &self.batch_size_l)
            .field("tun_volume_l", &self.tun_volume_l)
            .field("tun_weight_kg", &self.tun_weight_kg)
            .field("tun_specific_heat_cal_gc", &self.tun_specific_heat_cal_gc)
            .field("top_up_water_l", &self.top_up_water_l)
            .field("trub_chiller_loss_l", &self.trub_chiller_loss_l)
            .field("evap_rate_pct_hr", &self.evap_rate_pct_hr)
            .field("evap_rate_l_hr", &self.evap_rate_l_hr)
            .field("boil_time_min", &self.boil_time_min)
            .field("calc_boil_volume", &self.calc_boil_volume)
            .field("lauter_deadspace_l", &self.lauter_deadspace_l)
            .field("top_up_kettle_l", &self.top_up_kettle_l)
            .field("hop_utilization_pct", &self.hop_utilization_pct)
            .field("notes", &self.notes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bk_core::{
        Tolerances, nearly_equal, to_kg, to_liters, to_liters_per_hour, to_minutes, to_percent,
    };
    use std::sync::Mutex;

    fn tol() -> Tolerances {
        Tolerances::default()
    }

    fn brew_kettle() -> Equipment {
        let mut e = Equipment::named("Kettle");
        e.set_batch_size_l(20.0).unwrap();
        e.set_top_up_water_l(1.0).unwrap();
        e.set_trub_chiller_loss_l(0.5).unwrap();
        e.set_boil_time_min(60.0).unwrap();
        e.set_evap_rate_l_hr(4.0).unwrap();
        e
    }

    #[test]
    fn defaults_are_zero() {
        let e = Equipment::new();
        assert_eq!(e.name(), "");
        assert_eq!(e.version(), SCHEMA_VERSION);
        assert!(!e.calc_boil_volume());
        for field in EquipmentField::ALL {
            if let Some(v) = e.real(field) {
                assert_eq!(v, 0.0, "{field}");
            }
        }
    }

    #[test]
    fn boil_volume_formula() {
        let mut e = brew_kettle();
        assert_eq!(e.boil_size_l(), 0.0, "flag off leaves boil size alone");
        e.set_calc_boil_volume(true);
        assert!(nearly_equal(e.boil_size_l(), 23.5, tol()));
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut e = brew_kettle();
        e.set_calc_boil_volume(true);
        e.recompute_boil_size();
        let first = e.boil_size_l();
        e.recompute_boil_size();
        assert_eq!(first, e.boil_size_l());
    }

    #[test]
    fn triggering_setters_keep_invariant() {
        let mut e = brew_kettle();
        e.set_calc_boil_volume(true);
        e.set_batch_size_l(25.0).unwrap();
        assert!(nearly_equal(e.boil_size_l(), 28.5, tol()));
        e.set_boil_time_min(90.0).unwrap();
        assert!(nearly_equal(e.boil_size_l(), 30.5, tol()));
        e.set_top_up_water_l(0.0).unwrap();
        e.set_trub_chiller_loss_l(0.0).unwrap();
        e.set_evap_rate_l_hr(2.0).unwrap();
        assert!(nearly_equal(e.boil_size_l(), 28.0, tol()));
    }

    #[test]
    fn boil_size_is_free_when_flag_off() {
        let mut e = brew_kettle();
        e.set_boil_size_l(30.0).unwrap();
        assert_eq!(e.boil_size_l(), 30.0);
        e.set_batch_size_l(22.0).unwrap();
        assert_eq!(e.boil_size_l(), 30.0);
    }

    #[test]
    fn boil_size_is_derived_when_flag_on() {
        let mut e = brew_kettle();
        e.set_calc_boil_volume(true);
        e.set_boil_size_l(30.0).unwrap();
        assert!(nearly_equal(e.boil_size_l(), 23.5, tol()));
    }

    #[test]
    fn wort_remaining_after_boil() {
        let e = brew_kettle();
        assert!(nearly_equal(e.wort_remaining_after_boil(25.0), 21.0, tol()));
        let typed = e.wort_remaining_after_boil_volume(liters(25.0));
        assert!(nearly_equal(to_liters(typed), 21.0, Tolerances { abs: 1e-9, rel: 1e-9 }));
    }

    #[test]
    fn negative_batch_size_leaves_state_unchanged() {
        let mut e = brew_kettle();
        e.set_calc_boil_volume(true);
        let before = e.clone();
        let err = e.set_batch_size_l(-1.0).unwrap_err();
        assert_eq!(err.field(), EquipmentField::BatchSize);
        assert!(err.to_string().contains("-1"));
        assert!(e.same_values(&before));
    }

    #[test]
    fn percent_fields_reject_over_100() {
        let mut e = Equipment::new();
        assert!(e.set_evap_rate_pct_hr(100.0).is_ok());
        assert!(e.set_evap_rate_pct_hr(100.5).is_err());
        assert!(e.set_hop_utilization_pct(-1.0).is_err());
        assert_eq!(e.evap_rate_pct_hr(), 100.0);
        assert_eq!(e.hop_utilization_pct(), 0.0);
    }

    #[test]
    fn change_callback_sees_each_successful_mutation() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut e = Equipment::new();
        e.on_change(move |f| sink.lock().unwrap().push(f));

        e.set_name("Pot");
        e.set_tun_volume_l(-3.0).unwrap_err();
        e.set_tun_volume_l(30.0).unwrap();
        e.set_calc_boil_volume(true);
        e.set_batch_size_l(10.0).unwrap();

        let seen = seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                EquipmentField::Name,
                EquipmentField::TunVolume,
                EquipmentField::CalcBoilVolume,
                EquipmentField::BoilSize,
                EquipmentField::BatchSize,
                EquipmentField::BoilSize,
            ]
        );
    }

    #[test]
    fn cleared_callback_is_silent() {
        let count = Arc::new(Mutex::new(0_usize));
        let sink = Arc::clone(&count);
        let mut e = Equipment::new();
        e.on_change(move |_| *sink.lock().unwrap() += 1);
        e.set_notes("first");
        e.clear_on_change();
        e.set_notes("second");
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn ordering_and_equality_use_name_only() {
        let mut a = Equipment::named("Alpha");
        let b = Equipment::named("Beta");
        assert!(a < b);
        assert_eq!(cmp_by_name(&b, &a), Ordering::Greater);

        let mut other = Equipment::named("Alpha");
        other.set_batch_size_l(40.0).unwrap();
        a.set_batch_size_l(10.0).unwrap();
        assert_eq!(a, other);
        assert!(!a.same_values(&other));
    }

    #[test]
    fn set_real_field_rejects_text_fields() {
        let mut e = Equipment::new();
        assert!(e.set_real_field(EquipmentField::Notes, 1.0).is_err());
        e.set_real_field(EquipmentField::TopUpKettle, 2.0).unwrap();
        assert_eq!(e.top_up_kettle_l(), 2.0);
    }

    #[test]
    fn typed_quantities_carry_stored_values() {
        let mut e = brew_kettle();
        e.set_boil_size_l(26.0).unwrap();
        e.set_tun_volume_l(38.0).unwrap();
        e.set_tun_weight_kg(4.5).unwrap();
        e.set_hop_utilization_pct(85.0).unwrap();

        assert!(nearly_equal(to_liters(e.boil_size()), 26.0, tol()));
        assert!(nearly_equal(to_liters(e.batch_size()), 20.0, tol()));
        assert!(nearly_equal(to_liters(e.tun_volume()), 38.0, tol()));
        assert!(nearly_equal(to_kg(e.tun_weight()), 4.5, tol()));
        assert!(nearly_equal(to_liters_per_hour(e.evap_rate()), 4.0, tol()));
        assert!(nearly_equal(to_minutes(e.boil_time()), 60.0, tol()));
        assert!(nearly_equal(to_percent(e.hop_utilization()), 85.0, tol()));
    }
}
