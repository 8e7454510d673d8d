//! In-process span instrumentation with OTLP/HTTP JSON export.
//!
//! `tracewire` captures spans around database statements and outbound HTTP
//! calls and delivers each finished span, individually and immediately, to
//! an OpenTelemetry-compatible collector. It is not an OpenTelemetry SDK:
//! there is no sampling, no batching and no processor pipeline, and
//! collector failures are swallowed so tracing can never alter the outcome
//! of the operation it observes.
//!
//! An inbound boundary (HTTP middleware, job runner) attaches the ambient
//! [`TraceContext`] once per request; the instrumentation adapters read it
//! to parent their spans and to reuse the request's trace id. When no
//! context is attached each adapter starts a fresh root trace instead of
//! failing.
//!
//! ```no_run
//! use std::sync::Arc;
//! use tracewire::instrument::db::DbInstrument;
//! use tracewire::instrument::http::{HttpInstrument, OutboundRequest, ResponseInfo};
//! use tracewire::{TraceContext, Tracer};
//!
//! let tracer = Arc::new(Tracer::from_env());
//!
//! // inbound boundary: continue the caller's trace
//! let _guard = TraceContext::from_traceparent(
//!     "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01",
//! )
//! .map(TraceContext::attach);
//!
//! // database statement
//! let db = DbInstrument::new(Arc::clone(&tracer));
//! let rows: Result<u64, std::io::Error> =
//!     db.trace_query("SELECT * FROM users", || Ok(42));
//!
//! // outbound HTTP call
//! let http = HttpInstrument::new(tracer);
//! let mut headers = http::HeaderMap::new();
//! let response: Result<ResponseInfo, std::io::Error> = http.trace_request(
//!     OutboundRequest {
//!         method: "GET",
//!         url: "https://api.example.com/v1/x?y=1",
//!         headers: &mut headers,
//!         body_size: None,
//!     },
//!     |headers| {
//!         // perform the real request with the injected traceparent header
//!         let _ = headers;
//!         Ok(ResponseInfo::default())
//!     },
//! );
//! ```
//!
//! Configuration comes from the environment:
//! `OTEL_EXPORTER_OTLP_TRACES_ENDPOINT`, `OTEL_EXPORTER_OTLP_HEADERS`,
//! `OTEL_SERVICE_NAME`, `OTEL_SERVICE_VERSION`, `APP_ENV`, and the `DB_*`
//! variables used as database attribute defaults.

#![warn(
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    unreachable_pub,
    unused
)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod attributes;
mod resource;

pub mod export;
pub mod instrument;
pub mod propagation;
pub mod semconv;
pub mod sql;
pub mod trace;

pub use attributes::{format_attributes, Attribute, AttributeValue, Scalar};
pub use propagation::{ContextGuard, TraceContext};
pub use resource::Resource;
pub use trace::{
    ExportMode, FinishedSpan, IdGenerator, RandomIdGenerator, Span, SpanBuilder, SpanId, SpanKind,
    Status, TraceId, Tracer, TracerBuilder,
};
