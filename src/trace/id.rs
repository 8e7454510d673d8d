use std::fmt;
use std::num::ParseIntError;

/// A 16-byte value which identifies a trace.
///
/// Rendered as 32 lowercase hex characters. The id is valid if it contains
/// at least one non-zero byte.
#[derive(Clone, PartialEq, Eq, Copy, Hash)]
pub struct TraceId(u128);

impl TraceId {
    /// Invalid, all-zero trace id.
    pub const INVALID: TraceId = TraceId(0);

    /// Converts a string in base 16 to a trace id.
    pub fn from_hex(hex: &str) -> Result<Self, ParseIntError> {
        u128::from_str_radix(hex, 16).map(TraceId)
    }

    /// Returns `true` if the id contains at least one non-zero byte.
    pub fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

impl From<u128> for TraceId {
    fn from(value: u128) -> Self {
        TraceId(value)
    }
}

impl fmt::Debug for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:032x}", self.0))
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:032x}", self.0))
    }
}

/// An 8-byte value which identifies a span within a trace.
///
/// Rendered as 16 lowercase hex characters. The id is valid if it contains
/// at least one non-zero byte.
#[derive(Clone, PartialEq, Eq, Copy, Hash)]
pub struct SpanId(u64);

impl SpanId {
    /// Invalid, all-zero span id.
    pub const INVALID: SpanId = SpanId(0);

    /// Converts a string in base 16 to a span id.
    pub fn from_hex(hex: &str) -> Result<Self, ParseIntError> {
        u64::from_str_radix(hex, 16).map(SpanId)
    }

    /// Returns `true` if the id contains at least one non-zero byte.
    pub fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

impl From<u64> for SpanId {
    fn from(value: u64) -> Self {
        SpanId(value)
    }
}

impl fmt::Debug for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:016x}", self.0))
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:016x}", self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rustfmt::skip]
    fn trace_id_test_data() -> Vec<(TraceId, &'static str)> {
        vec![
            (TraceId(0), "00000000000000000000000000000000"),
            (TraceId(42), "0000000000000000000000000000002a"),
            (TraceId(126642714606581564793456114182061442190), "5f467fe7bf42676c05e20ba4a90e448e"),
        ]
    }

    #[rustfmt::skip]
    fn span_id_test_data() -> Vec<(SpanId, &'static str)> {
        vec![
            (SpanId(0), "0000000000000000"),
            (SpanId(42), "000000000000002a"),
            (SpanId(5508496025762705295), "4c721bf33e3caf8f"),
        ]
    }

    #[test]
    fn test_trace_id() {
        for (id, hex) in trace_id_test_data() {
            assert_eq!(format!("{id}"), hex);
            assert_eq!(id, TraceId::from_hex(hex).unwrap());
        }
        assert!(TraceId::from_hex("not_hex").is_err());
        assert!(!TraceId::INVALID.is_valid());
        assert!(TraceId(42).is_valid());
    }

    #[test]
    fn test_span_id() {
        for (id, hex) in span_id_test_data() {
            assert_eq!(format!("{id}"), hex);
            assert_eq!(id, SpanId::from_hex(hex).unwrap());
        }
        assert!(SpanId::from_hex("not_hex").is_err());
        assert!(!SpanId::INVALID.is_valid());
        assert!(SpanId(42).is_valid());
    }
}
