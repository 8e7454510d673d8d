//! OTLP/HTTP JSON span exporter.
//!
//! Configuration is read from the environment once at construction;
//! delivery is a single POST per finished span with a fixed short timeout.
//! Every pipeline failure surfaces as an [`ExportError`] so the tracer can
//! discard it in one place; nothing in this module ever panics on
//! collector misbehavior.

mod envelope;

use std::env;
use std::str::FromStr;
use std::time::Duration;

use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::HeaderMap;
use thiserror::Error;

use crate::resource::Resource;
use crate::trace::FinishedSpan;

/// Target the exporter sends spans to.
pub const OTEL_EXPORTER_OTLP_TRACES_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_TRACES_ENDPOINT";
/// Key-value pairs to be used as headers associated with export requests.
/// Example: `k1=v1,k2=v2`. Values are URL-decoded.
pub const OTEL_EXPORTER_OTLP_HEADERS: &str = "OTEL_EXPORTER_OTLP_HEADERS";

/// Default target when `OTEL_EXPORTER_OTLP_TRACES_ENDPOINT` is not set.
pub const DEFAULT_COLLECTOR_ENDPOINT: &str = "http://otel-collector:4318/v1/traces";

/// Max waiting time for the collector to accept a span.
const EXPORT_TIMEOUT: Duration = Duration::from_secs(2);

/// Errors that can occur while exporting a span.
///
/// These never reach application code: the tracer discards them after a
/// diagnostic event. Observability must not become a source of outages.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    /// The HTTP client could not be constructed.
    #[error("no http client available")]
    NoHttpClient,

    /// The span payload could not be serialized.
    #[error("failed to serialize span payload: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The POST to the collector failed or timed out.
    #[error("failed to deliver span to collector: {0}")]
    Transport(#[from] reqwest::Error),

    /// The collector answered with a non-2xx status.
    #[error("collector rejected span with status {0}")]
    Rejected(u16),
}

/// Configuration for the OTLP exporter.
#[derive(Clone, Debug)]
pub struct ExportConfig {
    /// The address of the OTLP collector. Kept as an opaque string; an
    /// unparsable value fails at POST time and is swallowed like any other
    /// transport error.
    pub endpoint: String,

    /// Headers sent with every export request. Always contains
    /// `Content-Type: application/json`.
    pub headers: HeaderMap,
}

impl ExportConfig {
    /// Read the collector endpoint and extra headers from the environment.
    pub fn from_env() -> Self {
        let endpoint = env::var(OTEL_EXPORTER_OTLP_TRACES_ENDPOINT)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_COLLECTOR_ENDPOINT.to_owned());

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(input) = env::var(OTEL_EXPORTER_OTLP_HEADERS) {
            add_header_from_string(&input, &mut headers);
        }

        ExportConfig { endpoint, headers }
    }
}

/// Exports one finished span per call to an OTLP/HTTP JSON collector.
///
/// TLS certificate verification is disabled on the underlying client,
/// matching collector deployments fronted by self-signed ingress. Spans
/// are never buffered or retried.
#[derive(Debug)]
pub struct OtlpExporter {
    client: Option<reqwest::blocking::Client>,
    endpoint: String,
    headers: HeaderMap,
}

impl OtlpExporter {
    /// Build an exporter configured from the environment.
    pub fn from_env() -> Self {
        Self::new(ExportConfig::from_env())
    }

    /// Build an exporter from an explicit configuration.
    pub fn new(config: ExportConfig) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(EXPORT_TIMEOUT)
            .danger_accept_invalid_certs(true)
            .build()
            .ok();

        OtlpExporter {
            client,
            endpoint: config.endpoint,
            headers: config.headers,
        }
    }

    /// The configured collector endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Deliver a span synchronously.
    ///
    /// Blocks until the collector answered or the fixed timeout elapsed.
    pub fn export(&self, span: &FinishedSpan) -> Result<(), ExportError> {
        let body = self.encode(span)?;
        let client = self.client.as_ref().ok_or(ExportError::NoHttpClient)?;
        post(client, &self.endpoint, self.headers.clone(), body)
    }

    /// Deliver a span without waiting for the collector's response.
    ///
    /// The payload is serialized on the calling thread, then posted from a
    /// detached short-lived thread so collector latency is never added to
    /// the traced operation.
    pub fn export_detached(&self, span: &FinishedSpan) -> Result<(), ExportError> {
        let body = self.encode(span)?;
        let client = self.client.clone().ok_or(ExportError::NoHttpClient)?;
        let endpoint = self.endpoint.clone();
        let headers = self.headers.clone();

        std::thread::spawn(move || {
            if let Err(error) = post(&client, &endpoint, headers, body) {
                tracing::debug!(target: "tracewire", %error, "detached span export failed");
            }
        });

        Ok(())
    }

    fn encode(&self, span: &FinishedSpan) -> Result<Vec<u8>, ExportError> {
        // the resource is re-read from the environment on every export
        let request = envelope::build_request(span, Resource::from_env());
        Ok(serde_json::to_vec(&request)?)
    }
}

fn post(
    client: &reqwest::blocking::Client,
    endpoint: &str,
    headers: HeaderMap,
    body: Vec<u8>,
) -> Result<(), ExportError> {
    let response = client.post(endpoint).headers(headers).body(body).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(ExportError::Rejected(status.as_u16()));
    }
    Ok(())
}

fn add_header_from_string(input: &str, headers: &mut HeaderMap) {
    headers.extend(parse_header_string(input).filter_map(|(key, value)| {
        Some((
            HeaderName::from_str(key).ok()?,
            HeaderValue::from_str(&value).ok()?,
        ))
    }));
}

fn parse_header_string(value: &str) -> impl Iterator<Item = (&str, String)> {
    value
        .split_terminator(',')
        .map(str::trim)
        .filter_map(parse_header_key_value_string)
}

fn parse_header_key_value_string(key_value_string: &str) -> Option<(&str, String)> {
    key_value_string
        .split_once('=')
        .map(|(key, value)| {
            (
                key.trim(),
                url_decode(value.trim()).unwrap_or_else(|| value.to_string()),
            )
        })
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
}

fn url_decode(value: &str) -> Option<String> {
    let mut result = String::with_capacity(value.len());
    let mut bytes_to_decode = Vec::<u8>::new();
    let mut chars = value.chars();

    loop {
        let ch = chars.next();

        if ch == Some('%') {
            bytes_to_decode.push(
                u8::from_str_radix(&format!("{}{}", chars.next()?, chars.next()?), 16).ok()?,
            );
            continue;
        }

        if !bytes_to_decode.is_empty() {
            result.push_str(std::str::from_utf8(&bytes_to_decode).ok()?);
            bytes_to_decode.clear();
        }

        match ch {
            Some(c) => result.push(c),
            None => return Some(result),
        }
    }
}
