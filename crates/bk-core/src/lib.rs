//! bk-core: shared foundation for brewkit.
//!
//! Contains:
//! - units (uom SI types + brewing-scale constructors)
//! - numeric (Real + tolerances + bound checks)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use units::*;
