//! Mapping between [`Equipment`] and [`Record`].
//!
//! Loading is best-effort: bad values and unknown children are logged and
//! collected in a [`LoadReport`], never fatal.

use crate::equipment::{Equipment, SCHEMA_VERSION};
use crate::field::EquipmentField;
use crate::record::{
    FieldNode, Record, format_bool, format_int, format_real, parse_bool, parse_int, parse_real,
};

pub const EQUIPMENT_TAG: &str = "EQUIPMENT";

/// A child that named a known field but whose value was not accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedField {
    pub field: EquipmentField,
    pub text: String,
    pub line: Option<usize>,
    pub reason: String,
}

/// Diagnostics gathered while loading one record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Child names that match no field, with their source line.
    pub unknown: Vec<(String, Option<usize>)>,
    pub rejected: Vec<RejectedField>,
    /// Version found in the record when it differs from [`SCHEMA_VERSION`].
    pub version_mismatch: Option<i32>,
    /// `EVAP_RATE` children ignored because `REAL_EVAP_RATE` came first.
    pub shadowed_percent_rate: bool,
    /// `REAL_EVAP_RATE` was absent and the absolute rate was estimated.
    pub estimated_evap_rate: bool,
}

impl LoadReport {
    /// No unknown children, rejected values or version mismatch.
    pub fn is_clean(&self) -> bool {
        self.unknown.is_empty() && self.rejected.is_empty() && self.version_mismatch.is_none()
    }
}

fn line_suffix(line: Option<usize>) -> String {
    match line {
        Some(l) => format!(" (line {l})"),
        None => String::new(),
    }
}

impl Equipment {
    pub fn from_record(record: &Record) -> Self {
        Self::from_record_with_report(record).0
    }

    /// Build an entity from `record`, applying each child through its
    /// validated setter.
    pub fn from_record_with_report(record: &Record) -> (Self, LoadReport) {
        let mut equipment = Equipment::new();
        let mut report = LoadReport::default();
        let mut has_real_evap_rate = false;
        // held until the calc flag is known; a derived boil size may be negative
        let mut rejected_boil_size: Option<RejectedField> = None;

        if record.tag != EQUIPMENT_TAG {
            tracing::warn!(
                "loading equipment from <{}> rather than <{EQUIPMENT_TAG}>{}",
                record.tag,
                line_suffix(record.line)
            );
        }

        for node in record {
            let Some(field) = EquipmentField::from_tag(&node.name) else {
                tracing::warn!(
                    "Unsupported EQUIPMENT property: {}{}",
                    node.name,
                    line_suffix(node.line)
                );
                report.unknown.push((node.name.clone(), node.line));
                continue;
            };
            let Some(text) = node.value() else {
                continue;
            };

            match field {
                EquipmentField::Version => {
                    match parse_int(text) {
                        Ok(found) if found != SCHEMA_VERSION => {
                            tracing::error!(
                                "EQUIPMENT says it is not version {SCHEMA_VERSION}{}",
                                line_suffix(node.line)
                            );
                            report.version_mismatch = Some(found);
                        }
                        Ok(_) => {}
                        Err(e) => report.rejected.push(RejectedField {
                            field,
                            text: text.to_string(),
                            line: node.line,
                            reason: e.to_string(),
                        }),
                    }
                    continue;
                }
                EquipmentField::EvapRatePercent if has_real_evap_rate => {
                    tracing::debug!(
                        "ignoring EVAP_RATE after REAL_EVAP_RATE{}",
                        line_suffix(node.line)
                    );
                    report.shadowed_percent_rate = true;
                    continue;
                }
                EquipmentField::EvapRateAbsolute => has_real_evap_rate = true,
                _ => {}
            }

            if let Err(reason) = apply(&mut equipment, field, text) {
                let rejected = RejectedField {
                    field,
                    text: text.to_string(),
                    line: node.line,
                    reason,
                };
                if field == EquipmentField::BoilSize {
                    rejected_boil_size = Some(rejected);
                } else {
                    reject(&mut report, rejected);
                }
            }
        }

        if let Some(rejected) = rejected_boil_size {
            if equipment.calc_boil_volume() {
                tracing::debug!(
                    "BOIL_SIZE {} replaced by the calculated boil size{}",
                    rejected.text,
                    line_suffix(rejected.line)
                );
            } else {
                reject(&mut report, rejected);
            }
        }

        // Estimate the absolute boil-off when only the percentage was given.
        if !has_real_evap_rate {
            let base = if equipment.boil_size_l() > 0.0 {
                equipment.boil_size_l()
            } else {
                equipment.batch_size_l()
            };
            let estimate = equipment.evap_rate_pct_hr() / 100.0 * base;
            if let Err(e) = equipment.set_evap_rate_l_hr(estimate) {
                tracing::warn!("could not estimate REAL_EVAP_RATE: {e}");
            } else {
                report.estimated_evap_rate = true;
            }
        }

        (equipment, report)
    }

    /// Serialize every field, in catalogue order, regardless of value.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new(EQUIPMENT_TAG);
        for field in EquipmentField::ALL {
            record.push(FieldNode::text(field.tag(), self.field_text(field)));
        }
        record
    }

    /// Text form of one field as it appears in a record.
    pub fn field_text(&self, field: EquipmentField) -> String {
        match field {
            EquipmentField::Name => self.name().to_string(),
            EquipmentField::Version => format_int(self.version()),
            EquipmentField::CalcBoilVolume => format_bool(self.calc_boil_volume()),
            EquipmentField::Notes => self.notes().to_string(),
            numeric => format_real(self.real(numeric).unwrap_or_default()),
        }
    }
}

fn reject(report: &mut LoadReport, rejected: RejectedField) {
    tracing::warn!(
        "EQUIPMENT {} rejected: {}{}",
        rejected.field.tag(),
        rejected.reason,
        line_suffix(rejected.line)
    );
    report.rejected.push(rejected);
}

/// Parse `text` for `field` and push it through the matching setter.
fn apply(equipment: &mut Equipment, field: EquipmentField, text: &str) -> Result<(), String> {
    match field {
        EquipmentField::Name => equipment.set_name(text),
        EquipmentField::Notes => equipment.set_notes(text),
        // checked by the caller; the stored version is always SCHEMA_VERSION
        EquipmentField::Version => {}
        EquipmentField::CalcBoilVolume => {
            let on = parse_bool(text).map_err(|e| e.to_string())?;
            equipment.set_calc_boil_volume(on);
        }
        numeric => {
            let v = parse_real(text).map_err(|e| e.to_string())?;
            equipment
                .set_real_field(numeric, v)
                .map_err(|e| e.to_string())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bk_core::{Tolerances, nearly_equal};

    fn tol() -> Tolerances {
        Tolerances::default()
    }

    #[test]
    fn percent_rate_derives_absolute_rate() {
        let record = Record::new(EQUIPMENT_TAG)
            .with("NAME", "Pot")
            .with("EVAP_RATE", "50")
            .with("BATCH_SIZE", "20");
        let (e, report) = Equipment::from_record_with_report(&record);
        assert!(nearly_equal(e.evap_rate_l_hr(), 10.0, tol()));
        assert!(report.estimated_evap_rate);
        assert!(report.is_clean());
    }

    #[test]
    fn estimate_prefers_boil_size() {
        let record = Record::new(EQUIPMENT_TAG)
            .with("BOIL_SIZE", "30")
            .with("BATCH_SIZE", "20")
            .with("EVAP_RATE", "10");
        let e = Equipment::from_record(&record);
        assert!(nearly_equal(e.evap_rate_l_hr(), 3.0, tol()));
    }

    #[test]
    fn real_rate_wins_when_it_comes_last() {
        let record = Record::new(EQUIPMENT_TAG)
            .with("EVAP_RATE", "50")
            .with("REAL_EVAP_RATE", "7")
            .with("BATCH_SIZE", "20");
        let (e, report) = Equipment::from_record_with_report(&record);
        assert_eq!(e.evap_rate_l_hr(), 7.0);
        assert_eq!(e.evap_rate_pct_hr(), 50.0);
        assert!(!report.estimated_evap_rate);
        assert!(!report.shadowed_percent_rate);
    }

    #[test]
    fn real_rate_shadows_later_percent() {
        let record = Record::new(EQUIPMENT_TAG)
            .with("REAL_EVAP_RATE", "7")
            .with("EVAP_RATE", "50")
            .with("BATCH_SIZE", "20");
        let (e, report) = Equipment::from_record_with_report(&record);
        assert_eq!(e.evap_rate_l_hr(), 7.0);
        assert_eq!(e.evap_rate_pct_hr(), 0.0);
        assert!(report.shadowed_percent_rate);
    }

    #[test]
    fn unknown_children_are_reported_not_fatal() {
        let record = Record {
            tag: EQUIPMENT_TAG.to_string(),
            line: Some(1),
            fields: vec![
                FieldNode::text("NAME", "Pot").at_line(2),
                FieldNode::text("COLOR", "red").at_line(3),
                FieldNode::text("BATCH_SIZE", "19").at_line(4),
            ],
        };
        let (e, report) = Equipment::from_record_with_report(&record);
        assert_eq!(e.name(), "Pot");
        assert_eq!(e.batch_size_l(), 19.0);
        assert_eq!(report.unknown, vec![("COLOR".to_string(), Some(3))]);
        assert!(!report.is_clean());
    }

    #[test]
    fn version_mismatch_is_logged_only() {
        let record = Record::new(EQUIPMENT_TAG)
            .with("NAME", "Old")
            .with("VERSION", "2")
            .with("BATCH_SIZE", "10");
        let (e, report) = Equipment::from_record_with_report(&record);
        assert_eq!(report.version_mismatch, Some(2));
        assert_eq!(e.version(), SCHEMA_VERSION);
        assert_eq!(e.batch_size_l(), 10.0);
    }

    #[test]
    fn bad_values_keep_defaults() {
        let record = Record::new(EQUIPMENT_TAG)
            .with("BATCH_SIZE", "-5")
            .with("TUN_VOLUME", "lots")
            .with("HOP_UTILIZATION", "101")
            .with("TUN_WEIGHT", "3.5");
        let (e, report) = Equipment::from_record_with_report(&record);
        assert_eq!(e.batch_size_l(), 0.0);
        assert_eq!(e.tun_volume_l(), 0.0);
        assert_eq!(e.hop_utilization_pct(), 0.0);
        assert_eq!(e.tun_weight_kg(), 3.5);
        let rejected: Vec<_> = report.rejected.iter().map(|r| r.field).collect();
        assert_eq!(
            rejected,
            vec![
                EquipmentField::BatchSize,
                EquipmentField::TunVolume,
                EquipmentField::HopUtilization,
            ]
        );
        assert!(report.rejected[0].reason.contains("-5"));
    }

    #[test]
    fn valueless_children_are_skipped() {
        let mut record = Record::new(EQUIPMENT_TAG).with("NAME", "Pot");
        record.push(FieldNode::empty("BATCH_SIZE"));
        let (e, report) = Equipment::from_record_with_report(&record);
        assert_eq!(e.batch_size_l(), 0.0);
        assert!(report.is_clean());
    }

    #[test]
    fn to_record_emits_every_field_in_order() {
        let record = Equipment::named("Pot").to_record();
        let names: Vec<_> = record.iter().map(|f| f.name.as_str()).collect();
        let expected: Vec<_> = EquipmentField::ALL.iter().map(|f| f.tag()).collect();
        assert_eq!(names, expected);
        assert_eq!(record.get("BOIL_SIZE"), Some("0.000"));
        assert_eq!(record.get("VERSION"), Some("1"));
        assert_eq!(record.get("CALC_BOIL_VOLUME"), Some("FALSE"));
        assert_eq!(record.get("NOTES"), Some(""));
    }

    #[test]
    fn record_round_trip_preserves_values() {
        let mut e = Equipment::named("Ten Gallon");
        e.set_batch_size_l(20.0).unwrap();
        e.set_tun_volume_l(40.0).unwrap();
        e.set_tun_weight_kg(7.25).unwrap();
        e.set_tun_specific_heat_cal_gc(0.12).unwrap();
        e.set_top_up_water_l(1.0).unwrap();
        e.set_trub_chiller_loss_l(0.5).unwrap();
        e.set_evap_rate_pct_hr(9.0).unwrap();
        e.set_evap_rate_l_hr(4.0).unwrap();
        e.set_boil_time_min(60.0).unwrap();
        e.set_calc_boil_volume(true);
        e.set_lauter_deadspace_l(0.75).unwrap();
        e.set_top_up_kettle_l(0.25).unwrap();
        e.set_hop_utilization_pct(100.0).unwrap();
        e.set_notes("Keggle with false bottom");

        let back = Equipment::from_record(&e.to_record());
        assert!(back.same_values(&e), "{back:?} != {e:?}");
        assert!(nearly_equal(back.boil_size_l(), 23.5, tol()));
    }

    #[test]
    fn negative_boil_size_is_rejected_unless_derived() {
        let fixed = Record::new(EQUIPMENT_TAG)
            .with("BOIL_SIZE", "-5")
            .with("BATCH_SIZE", "10");
        let (e, report) = Equipment::from_record_with_report(&fixed);
        assert_eq!(e.boil_size_l(), 0.0);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].field, EquipmentField::BoilSize);

        let derived = Record::new(EQUIPMENT_TAG)
            .with("BOIL_SIZE", "-5")
            .with("BATCH_SIZE", "10")
            .with("TOP_UP_WATER", "15")
            .with("CALC_BOIL_VOLUME", "TRUE");
        let (e, report) = Equipment::from_record_with_report(&derived);
        assert_eq!(e.boil_size_l(), -5.0);
        assert!(report.is_clean(), "{report:?}");
    }
}
