//! Serde model of the OTLP/HTTP JSON trace envelope.
//!
//! One finished span travels as
//! `resourceSpans[0].scopeSpans[0].spans[0]`; there is no batching layer.

use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::attributes::Attribute;
use crate::trace::FinishedSpan;

const SCOPE_NAME: &str = env!("CARGO_PKG_NAME");
const SCOPE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExportTraceServiceRequest<'a> {
    resource_spans: Vec<ResourceSpans<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResourceSpans<'a> {
    resource: Resource,
    scope_spans: Vec<ScopeSpans<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Resource {
    attributes: Vec<Attribute>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScopeSpans<'a> {
    scope: Scope,
    spans: Vec<Span<'a>>,
}

#[derive(Debug, Serialize)]
struct Scope {
    name: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Span<'a> {
    trace_id: String,
    span_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_span_id: Option<String>,
    name: &'a str,
    kind: u32,
    start_time_unix_nano: u64,
    end_time_unix_nano: u64,
    attributes: &'a [Attribute],
    status: Status,
}

#[derive(Debug, Serialize)]
struct Status {
    code: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

pub(crate) fn build_request<'a>(
    span: &'a FinishedSpan,
    resource: crate::resource::Resource,
) -> ExportTraceServiceRequest<'a> {
    ExportTraceServiceRequest {
        resource_spans: vec![ResourceSpans {
            resource: Resource {
                attributes: resource.into_attributes(),
            },
            scope_spans: vec![ScopeSpans {
                scope: Scope {
                    name: SCOPE_NAME,
                    version: SCOPE_VERSION,
                },
                spans: vec![Span {
                    trace_id: span.trace_id().to_string(),
                    span_id: span.span_id().to_string(),
                    parent_span_id: span.span.parent_span_id.map(|id| id.to_string()),
                    name: &span.span.name,
                    kind: span.span.kind.otlp_code(),
                    start_time_unix_nano: unix_nanos(span.start_time()),
                    end_time_unix_nano: unix_nanos(span.end_time()),
                    attributes: span.attributes(),
                    status: Status {
                        code: span.status().otlp_code(),
                        message: span.status().message().map(str::to_owned),
                    },
                }],
            }],
        }],
    }
}

fn unix_nanos(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}
