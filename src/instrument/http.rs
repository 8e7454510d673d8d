//! HTTP client instrumentation.
//!
//! Each traced call produces two `Client` spans: one sized to the actual
//! request/response cycle and one near-zero-duration span describing the
//! destination host. Both are children of the propagated context, not of
//! each other. A `traceparent` header is injected into the outbound
//! request so a downstream service can continue the trace.

use std::sync::Arc;

use url::Url;

use crate::attributes::Attribute;
use crate::instrument::ExceptionInfo;
use crate::propagation::{self, TraceContext};
use crate::semconv;
use crate::trace::{SpanBuilder, SpanId, SpanKind, Status, TraceId, Tracer};

/// What the core needs to know about a response.
///
/// Implemented by a shim over the real client's response type; every
/// accessor is optional since transports differ in what they expose.
pub trait ResponseDescriptor {
    /// The HTTP status code.
    fn status_code(&self) -> Option<u16>;
    /// The response body size in bytes.
    fn body_size(&self) -> Option<u64>;
    /// The response `Content-Type` header value.
    fn content_type(&self) -> Option<String>;
}

/// A plain response descriptor for notification-style reporting.
#[derive(Clone, Debug, Default)]
pub struct ResponseInfo {
    /// The HTTP status code.
    pub status_code: Option<u16>,
    /// The response body size in bytes.
    pub body_size: Option<u64>,
    /// The response `Content-Type` header value.
    pub content_type: Option<String>,
}

impl ResponseDescriptor for ResponseInfo {
    fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    fn body_size(&self) -> Option<u64> {
        self.body_size
    }

    fn content_type(&self) -> Option<String> {
        self.content_type.clone()
    }
}

/// An outbound request about to be sent through [`HttpInstrument::trace_request`].
#[derive(Debug)]
pub struct OutboundRequest<'a> {
    /// The request method, e.g. `GET`.
    pub method: &'a str,
    /// The absolute request URL.
    pub url: &'a str,
    /// Request headers; the `traceparent` header is inserted here before
    /// the request is sent.
    pub headers: &'a mut http::HeaderMap,
    /// Size of the request body, when known.
    pub body_size: Option<u64>,
}

/// A completed request, as reported by the HTTP client collaborator.
#[derive(Debug, Default)]
pub struct RequestInfo<'a> {
    /// The request method.
    pub method: &'a str,
    /// The absolute request URL.
    pub url: &'a str,
    /// Size of the request body, when known.
    pub body_size: Option<u64>,
    /// The outgoing `User-Agent` header value, when set.
    pub user_agent: Option<&'a str>,
}

/// Emits spans for outbound HTTP calls.
#[derive(Clone, Debug)]
pub struct HttpInstrument {
    tracer: Arc<Tracer>,
}

impl HttpInstrument {
    /// Create an instrument on top of the given tracer.
    pub fn new(tracer: Arc<Tracer>) -> Self {
        HttpInstrument { tracer }
    }

    /// Run one request/response cycle through the given closure, tracing it.
    ///
    /// The closure receives the headers after `traceparent` injection and
    /// performs the real call. The call span's duration is measured around
    /// the closure; errors are recorded and returned unchanged.
    pub fn trace_request<R, E>(
        &self,
        request: OutboundRequest<'_>,
        send: impl FnOnce(&http::HeaderMap) -> Result<R, E>,
    ) -> Result<R, E>
    where
        R: ResponseDescriptor,
        E: std::error::Error,
    {
        let parts = UrlParts::parse(request.url);
        let (trace_id, parent) = TraceContext::current_or_root(self.tracer.ids());
        let span_id = self.tracer.ids().new_span_id();
        propagation::inject_traceparent(request.headers, trace_id, span_id);

        let user_agent = request
            .headers
            .get(http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let mut builder = SpanBuilder::new(parts.span_name(request.method))
            .with_kind(SpanKind::Client)
            .with_trace_id(trace_id)
            .with_span_id(span_id)
            .with_attributes(parts.request_attributes(
                request.method,
                request.url,
                request.body_size,
                user_agent.as_deref(),
            ));
        if let Some(parent) = parent {
            builder = builder.with_parent(parent);
        }
        let mut span = builder.start(&self.tracer);

        let result = send(request.headers);

        let status = match &result {
            Ok(response) => {
                for attribute in response_attributes(response) {
                    span.set_attribute(attribute);
                }
                Status::Ok
            }
            Err(error) => {
                let info = ExceptionInfo::from_error(error);
                for attribute in exception_attributes(&info) {
                    span.set_attribute(attribute);
                }
                Status::error(info.message)
            }
        };

        self.tracer.finish(span, status);
        self.emit_host_span(trace_id, parent, &parts);

        result
    }

    /// Record one completed request as spans.
    ///
    /// Notification-style entry point for collaborators that report the
    /// outcome after the fact. No duration is known here, so the call span
    /// covers a near-zero interval.
    pub fn record_request(
        &self,
        request: RequestInfo<'_>,
        response: Option<&ResponseInfo>,
        error: Option<&ExceptionInfo>,
    ) {
        let parts = UrlParts::parse(request.url);
        let (trace_id, parent) = TraceContext::current_or_root(self.tracer.ids());

        let mut attributes = parts.request_attributes(
            request.method,
            request.url,
            request.body_size,
            request.user_agent,
        );
        if let Some(response) = response {
            attributes.extend(response_attributes(response));
        }
        if let Some(error) = error {
            attributes.extend(exception_attributes(error));
        }

        let mut builder = SpanBuilder::new(parts.span_name(request.method))
            .with_kind(SpanKind::Client)
            .with_trace_id(trace_id)
            .with_attributes(attributes);
        if let Some(parent) = parent {
            builder = builder.with_parent(parent);
        }
        let span = builder.start(&self.tracer);

        let status = match error {
            Some(error) => Status::error(error.message.clone()),
            None => Status::Ok,
        };
        self.tracer.finish(span, status);
        self.emit_host_span(trace_id, parent, &parts);
    }

    /// The short auxiliary span recording only the destination host.
    fn emit_host_span(&self, trace_id: TraceId, parent: Option<SpanId>, parts: &UrlParts) {
        let Some(host) = &parts.host else {
            return;
        };

        let mut attributes = vec![Attribute::string(semconv::trace::SERVER_ADDRESS, host)];
        if let Some(port) = parts.port {
            attributes.push(Attribute::int(semconv::trace::SERVER_PORT, i64::from(port)));
        }

        let mut builder = SpanBuilder::new(host.clone())
            .with_kind(SpanKind::Client)
            .with_trace_id(trace_id)
            .with_attributes(attributes);
        if let Some(parent) = parent {
            builder = builder.with_parent(parent);
        }
        let span = builder.start(&self.tracer);
        self.tracer.finish(span, Status::Ok);
    }
}

#[derive(Debug)]
struct UrlParts {
    host: Option<String>,
    port: Option<u16>,
    scheme: String,
    path: String,
    query: Option<String>,
}

impl UrlParts {
    fn parse(raw: &str) -> Self {
        match Url::parse(raw) {
            Ok(url) => UrlParts {
                host: url.host_str().map(str::to_owned),
                port: url.port_or_known_default(),
                scheme: url.scheme().to_owned(),
                path: url.path().to_owned(),
                query: url.query().map(str::to_owned),
            },
            Err(_) => UrlParts {
                host: None,
                port: None,
                scheme: "http".to_owned(),
                path: "/".to_owned(),
                query: None,
            },
        }
    }

    fn span_name(&self, method: &str) -> String {
        format!("{} {}", method, self.host.as_deref().unwrap_or("unknown"))
    }

    fn request_attributes(
        &self,
        method: &str,
        url: &str,
        body_size: Option<u64>,
        user_agent: Option<&str>,
    ) -> Vec<Attribute> {
        let mut attributes = vec![
            Attribute::string(semconv::trace::HTTP_REQUEST_METHOD, method),
            Attribute::string(semconv::trace::URL_FULL, url),
            Attribute::string(
                semconv::trace::SERVER_ADDRESS,
                self.host.as_deref().unwrap_or(""),
            ),
        ];
        if let Some(port) = self.port {
            attributes.push(Attribute::int(semconv::trace::SERVER_PORT, i64::from(port)));
        }
        attributes.push(Attribute::string(semconv::trace::URL_SCHEME, &self.scheme));
        attributes.push(Attribute::string(semconv::trace::URL_PATH, &self.path));
        if let Some(query) = &self.query {
            attributes.push(Attribute::string(semconv::trace::URL_QUERY, query));
        }
        attributes.push(Attribute::string(semconv::trace::NETWORK_PROTOCOL_NAME, "http"));
        attributes.push(Attribute::string(semconv::trace::NETWORK_PROTOCOL_VERSION, "1.1"));
        if let Some(size) = body_size {
            attributes.push(Attribute::int(
                semconv::trace::HTTP_REQUEST_BODY_SIZE,
                size as i64,
            ));
        }
        if let Some(user_agent) = user_agent {
            attributes.push(Attribute::string(
                semconv::trace::USER_AGENT_ORIGINAL,
                user_agent,
            ));
        }
        attributes
    }
}

fn response_attributes<R: ResponseDescriptor + ?Sized>(response: &R) -> Vec<Attribute> {
    let mut attributes = Vec::new();
    if let Some(code) = response.status_code() {
        attributes.push(Attribute::int(
            semconv::trace::HTTP_RESPONSE_STATUS_CODE,
            i64::from(code),
        ));
    }
    if let Some(size) = response.body_size() {
        attributes.push(Attribute::int(
            semconv::trace::HTTP_RESPONSE_BODY_SIZE,
            size as i64,
        ));
    }
    if let Some(content_type) = response.content_type() {
        attributes.push(Attribute::string(
            semconv::trace::HTTP_RESPONSE_CONTENT_TYPE,
            content_type,
        ));
    }
    attributes
}

fn exception_attributes(info: &ExceptionInfo) -> Vec<Attribute> {
    vec![
        Attribute::string(semconv::trace::EXCEPTION_TYPE, &info.error_type),
        Attribute::string(semconv::trace::EXCEPTION_MESSAGE, &info.message),
    ]
}
