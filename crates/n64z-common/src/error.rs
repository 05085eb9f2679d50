use thiserror::Error;

/// Errors from the ambient layers around the measurement engine.
///
/// The engine's per-frame update itself never fails: degenerate
/// measurements are skipped and the previous value is kept.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MonitorError {
    /// A platform backend could not be constructed.
    #[error("platform error: {0}")]
    Platform(String),

    /// A configured value is outside its valid range.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Name of the offending configuration key.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Convenience type alias for fallible n64z operations.
pub type MonitorResult<T> = Result<T, MonitorError>;
