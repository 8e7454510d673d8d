//! W3C-style `traceparent` rendering and parsing.

use crate::propagation::TraceContext;
use crate::trace::{SpanId, TraceId};

/// Header name carrying the trace identity across process boundaries.
pub const TRACEPARENT_HEADER: &str = "traceparent";

const SUPPORTED_VERSION: u8 = 0;

/// Render a `traceparent` value for an outbound request.
///
/// Always version 0 with the sampled flag set:
/// `00-<32 hex traceId>-<16 hex spanId>-01`.
pub fn format_traceparent(trace_id: TraceId, span_id: SpanId) -> String {
    format!("{SUPPORTED_VERSION:02x}-{trace_id}-{span_id}-01")
}

/// Parse a `traceparent` header value.
///
/// Accepts version-0 headers with lowercase hex identifiers; returns
/// `None` for malformed input or all-zero ids. Only the trace and span ids
/// are consumed, trace flags beyond the sampled bit are ignored.
pub fn parse_traceparent(value: &str) -> Option<TraceContext> {
    let parts: Vec<&str> = value.trim().split_terminator('-').collect();
    if parts.len() < 4 {
        return None;
    }

    let version = u8::from_str_radix(parts[0], 16).ok()?;
    if version == SUPPORTED_VERSION && parts.len() != 4 {
        return None;
    }

    if parts[1].len() != 32 || parts[1].chars().any(|c| c.is_ascii_uppercase()) {
        return None;
    }
    let trace_id = TraceId::from_hex(parts[1]).ok()?;

    if parts[2].len() != 16 || parts[2].chars().any(|c| c.is_ascii_uppercase()) {
        return None;
    }
    let span_id = SpanId::from_hex(parts[2]).ok()?;

    u8::from_str_radix(parts[3], 16).ok()?;

    if !trace_id.is_valid() || !span_id.is_valid() {
        return None;
    }

    Some(TraceContext::new(trace_id, span_id))
}

/// Helper for injecting the `traceparent` header into outbound HTTP
/// request headers. Does nothing if the value is not a valid header value.
#[derive(Debug)]
pub struct HeaderInjector<'a>(pub &'a mut http::HeaderMap);

impl HeaderInjector<'_> {
    /// Set a key and value in the underlying header map.
    pub fn set(&mut self, key: &str, value: String) {
        if let Ok(name) = http::header::HeaderName::from_bytes(key.as_bytes()) {
            if let Ok(val) = http::header::HeaderValue::from_str(&value) {
                self.0.insert(name, val);
            }
        }
    }
}

pub(crate) fn inject_traceparent(headers: &mut http::HeaderMap, trace_id: TraceId, span_id: SpanId) {
    HeaderInjector(headers).set(TRACEPARENT_HEADER, format_traceparent(trace_id, span_id));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_is_version_zero_sampled() {
        let header = format_traceparent(
            TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736").unwrap(),
            SpanId::from_hex("00f067aa0ba902b7").unwrap(),
        );
        assert_eq!(header, "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01");
    }

    #[test]
    fn parse_roundtrip() {
        let trace_id = TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736").unwrap();
        let span_id = SpanId::from_hex("00f067aa0ba902b7").unwrap();

        let parsed = parse_traceparent(&format_traceparent(trace_id, span_id)).unwrap();
        assert_eq!(parsed.trace_id, trace_id);
        assert_eq!(parsed.span_id, span_id);
    }

    #[rustfmt::skip]
    fn invalid_headers() -> Vec<(&'static str, &'static str)> {
        vec![
            ("", "empty"),
            ("   ", "whitespace only"),
            ("00", "too few parts"),
            ("0000-00000000000000000000000000000000-0000000000000000-01", "wrong version length"),
            ("00-ab00000000000000000000000000000000-cd00000000000000-01", "wrong trace id length"),
            ("00-ab000000000000000000000000000000-cd0000000000000000-01", "wrong span id length"),
            ("qw-00000000000000000000000000000000-0000000000000000-01", "bogus version"),
            ("00-qw000000000000000000000000000000-cd00000000000000-01", "bogus trace id"),
            ("00-ab000000000000000000000000000000-qw00000000000000-01", "bogus span id"),
            ("00-ab000000000000000000000000000000-cd00000000000000-qw", "bogus trace flags"),
            ("00-AB000000000000000000000000000000-cd00000000000000-01", "upper case trace id"),
            ("00-ab000000000000000000000000000000-CD00000000000000-01", "upper case span id"),
            ("00-00000000000000000000000000000000-0000000000000000-01", "all-zero ids"),
            ("00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7", "missing flags"),
            ("00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01-extra", "version 0 with extra part"),
        ]
    }

    #[test]
    fn parse_rejects_invalid() {
        for (header, reason) in invalid_headers() {
            assert!(parse_traceparent(header).is_none(), "{reason}");
        }
    }

    #[test]
    fn future_version_with_extra_parts_is_accepted() {
        let parsed =
            parse_traceparent("02-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-09-xyz");
        assert!(parsed.is_some());
    }

    #[test]
    fn injector_sets_header() {
        let mut headers = http::HeaderMap::new();
        inject_traceparent(
            &mut headers,
            TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736").unwrap(),
            SpanId::from_hex("00f067aa0ba902b7").unwrap(),
        );

        assert_eq!(
            headers.get(TRACEPARENT_HEADER).unwrap(),
            "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01"
        );
    }
}
