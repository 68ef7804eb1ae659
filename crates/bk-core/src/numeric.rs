use crate::{CoreError, CoreResult};

/// Floating point type used throughout brewkit
pub type Real = f64;

/// Absolute + relative tolerance pair
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> CoreResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Finite and `>= 0`.
pub fn ensure_non_negative(v: Real, what: &'static str) -> CoreResult<Real> {
    let v = ensure_finite(v, what)?;
    if v < 0.0 {
        return Err(CoreError::OutOfRange {
            what,
            value: v,
            bound: ">= 0",
        });
    }
    Ok(v)
}

/// Finite and within `[0, 100]`.
pub fn ensure_percent(v: Real, what: &'static str) -> CoreResult<Real> {
    let v = ensure_finite(v, what)?;
    if !(0.0..=100.0).contains(&v) {
        return Err(CoreError::OutOfRange {
            what,
            value: v,
            bound: "0..=100",
        });
    }
    Ok(v)
}
