//! Call-wrapping instrumentation adapters.
//!
//! Each adapter wraps exactly one category of traced operation and emits
//! spans around the real call. Tracing is observational: errors from the
//! wrapped operation are recorded on the span and then returned to the
//! caller unchanged.

pub mod db;
pub mod http;

/// Type and message of an error captured on a span.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExceptionInfo {
    /// The error type, recorded as `exception.type`.
    pub error_type: String,
    /// The error message, recorded as `exception.message`.
    pub message: String,
}

impl ExceptionInfo {
    /// Capture type name and display message of an error.
    pub fn from_error<E: std::error::Error>(error: &E) -> Self {
        ExceptionInfo {
            error_type: std::any::type_name::<E>().to_owned(),
            message: error.to_string(),
        }
    }
}
