use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("{what} out of range: {value} (expected {bound})")]
    OutOfRange {
        what: &'static str,
        value: f64,
        bound: &'static str,
    },
}

impl CoreError {
    /// The offending value carried by the error.
    pub fn value(&self) -> f64 {
        match self {
            CoreError::NonFinite { value, .. } | CoreError::OutOfRange { value, .. } => *value,
        }
    }
}
