//! Setter validation errors.

use crate::field::{Bound, EquipmentField};
use bk_core::{CoreError, Real, ensure_finite, ensure_non_negative, ensure_percent};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} {reason}: {value}")]
    OutOfRange {
        field: EquipmentField,
        value: Real,
        reason: &'static str,
    },

    #[error("{field} is not a numeric field")]
    NotNumeric { field: EquipmentField },
}

impl ValidationError {
    pub fn field(&self) -> EquipmentField {
        match self {
            ValidationError::OutOfRange { field, .. } | ValidationError::NotNumeric { field } => {
                *field
            }
        }
    }

    /// The rejected value, when there was one.
    pub fn value(&self) -> Option<Real> {
        match self {
            ValidationError::OutOfRange { value, .. } => Some(*value),
            ValidationError::NotNumeric { .. } => None,
        }
    }

    fn from_core(field: EquipmentField, err: CoreError) -> Self {
        let reason = match (&err, field.bound()) {
            (CoreError::NonFinite { .. }, _) => "must be a finite number",
            (_, Bound::Percent) => "must be a percentage between 0 and 100",
            _ => "cannot be negative",
        };
        ValidationError::OutOfRange {
            field,
            value: err.value(),
            reason,
        }
    }
}

/// Check `value` against the bound declared for `field`.
pub fn check(field: EquipmentField, value: Real) -> Result<Real, ValidationError> {
    let label = field.label();
    let checked = match field.bound() {
        Bound::Unbounded => ensure_finite(value, label),
        Bound::NonNegative => ensure_non_negative(value, label),
        Bound::Percent => ensure_percent(value, label),
    };
    checked.map_err(|e| ValidationError::from_core(field, e))
}
