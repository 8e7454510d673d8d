//! End-to-end pipeline tests against an in-process collector stub.
//!
//! The stub is a plain TCP listener speaking just enough HTTP/1.1 for the
//! exporter's POSTs, so the real transport path is exercised: adapter ->
//! span -> envelope -> HTTP -> collector.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracewire::instrument::db::{DbInstrument, DbSettings};
use tracewire::instrument::http::{HttpInstrument, OutboundRequest, ResponseInfo};
use tracewire::{ExportMode, SpanId, TraceContext, TraceId, Tracer};

/// Spawn a collector stub; returns its endpoint URL and a channel of
/// received export payloads. Each POST is answered with `status` after
/// `delay`.
fn spawn_collector(status: u16, delay: Duration) -> (String, Receiver<Value>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub collector");
    let addr = listener.local_addr().expect("stub collector addr");
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            handle_request(stream, &tx, status, delay);
        }
    });

    (format!("http://{addr}/v1/traces"), rx)
}

fn handle_request(stream: TcpStream, tx: &Sender<Value>, status: u16, delay: Duration) {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }

    let mut content_length = 0usize;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header).is_err() || header.trim_end().is_empty() {
            break;
        }
        if let Some(value) = header.to_ascii_lowercase().strip_prefix("content-length:") {
            content_length = value.trim().parse().unwrap_or(0);
        }
    }

    let mut body = vec![0u8; content_length];
    if reader.read_exact(&mut body).is_err() {
        return;
    }
    if let Ok(payload) = serde_json::from_slice(&body) {
        let _ = tx.send(payload);
    }

    thread::sleep(delay);

    let mut stream = stream;
    let response = format!(
        "HTTP/1.1 {status} STUB\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
    );
    let _ = stream.write_all(response.as_bytes());
}

fn first_span(payload: &Value) -> &Value {
    &payload["resourceSpans"][0]["scopeSpans"][0]["spans"][0]
}

fn attribute<'a>(span: &'a Value, key: &str) -> Option<&'a Value> {
    span["attributes"]
        .as_array()
        .expect("attributes array")
        .iter()
        .find(|attr| attr["key"] == key)
        .map(|attr| &attr["value"])
}

fn db_instrument(tracer: Arc<Tracer>) -> DbInstrument {
    DbInstrument::with_settings(
        tracer,
        DbSettings {
            system: "mysql".to_owned(),
            database: "shop".to_owned(),
            host: "localhost".to_owned(),
            port: 3306,
            user: "root".to_owned(),
        },
    )
}

#[derive(Debug, thiserror::Error)]
#[error("duplicate key")]
struct DuplicateKey;

#[test]
fn failing_database_call_exports_error_span_and_re_raises() {
    let (endpoint, requests) = spawn_collector(200, Duration::ZERO);
    let tracer = Arc::new(Tracer::builder().with_endpoint(endpoint).build());
    let db = db_instrument(tracer);

    let result: Result<(), DuplicateKey> =
        db.trace_query("INSERT INTO users (id) VALUES (1)", || Err(DuplicateKey));
    assert_eq!(result.unwrap_err().to_string(), "duplicate key");

    let payload = requests
        .recv_timeout(Duration::from_secs(5))
        .expect("span delivered");
    let span = first_span(&payload);

    assert_eq!(span["name"], "db.insert users");
    assert_eq!(span["kind"], 3);
    assert_eq!(span["status"]["code"], 2);
    assert_eq!(span["status"]["message"], "duplicate key");
    assert_eq!(
        attribute(span, "exception.message").unwrap()["stringValue"],
        "duplicate key"
    );
    assert_eq!(
        attribute(span, "db.sql.table").unwrap()["stringValue"],
        "users"
    );

    let start = span["startTimeUnixNano"].as_u64().unwrap();
    let end = span["endTimeUnixNano"].as_u64().unwrap();
    assert!(end >= start);
}

#[test]
fn successful_database_call_exports_ok_span() {
    let (endpoint, requests) = spawn_collector(200, Duration::ZERO);
    let tracer = Arc::new(Tracer::builder().with_endpoint(endpoint).build());
    let db = db_instrument(tracer);

    let result: Result<u64, DuplicateKey> = db.trace_query("SELECT * FROM users", || Ok(3));
    assert_eq!(result.unwrap(), 3);

    let payload = requests
        .recv_timeout(Duration::from_secs(5))
        .expect("span delivered");
    let span = first_span(&payload);

    assert_eq!(span["name"], "db.select users");
    assert_eq!(span["status"]["code"], 1);
    assert_eq!(attribute(span, "db.operation").unwrap()["stringValue"], "select");
    assert_eq!(attribute(span, "server.port").unwrap()["intValue"], 3306);
    assert!(attribute(span, "exception.message").is_none());

    let resource = &payload["resourceSpans"][0]["resource"]["attributes"];
    assert!(resource
        .as_array()
        .unwrap()
        .iter()
        .any(|attr| attr["key"] == "service.name"));
}

#[test]
fn http_adapter_emits_call_and_host_spans_under_the_ambient_context() {
    let (endpoint, requests) = spawn_collector(200, Duration::ZERO);
    let tracer = Arc::new(Tracer::builder().with_endpoint(endpoint).build());
    let http_instrument = HttpInstrument::new(tracer);

    let ambient = TraceContext::new(TraceId::from(0xabc), SpanId::from(0xdef));
    let _guard = ambient.attach();

    let mut headers = http::HeaderMap::new();
    let result: Result<ResponseInfo, DuplicateKey> = http_instrument.trace_request(
        OutboundRequest {
            method: "GET",
            url: "https://api.example.com/v1/x?y=1",
            headers: &mut headers,
            body_size: None,
        },
        |_| {
            Ok(ResponseInfo {
                status_code: Some(200),
                body_size: Some(512),
                content_type: Some("application/json".to_owned()),
            })
        },
    );
    assert!(result.is_ok());

    let call_payload = requests
        .recv_timeout(Duration::from_secs(5))
        .expect("call span delivered");
    let call_span = first_span(&call_payload);

    assert_eq!(call_span["name"], "GET api.example.com");
    assert_eq!(call_span["traceId"], "00000000000000000000000000000abc");
    assert_eq!(call_span["parentSpanId"], "0000000000000def");
    assert_eq!(attribute(call_span, "url.path").unwrap()["stringValue"], "/v1/x");
    assert_eq!(attribute(call_span, "url.query").unwrap()["stringValue"], "y=1");
    assert_eq!(attribute(call_span, "server.port").unwrap()["intValue"], 443);
    assert_eq!(
        attribute(call_span, "http.response.status_code").unwrap()["intValue"],
        200
    );

    let host_payload = requests
        .recv_timeout(Duration::from_secs(5))
        .expect("host span delivered");
    let host_span = first_span(&host_payload);

    assert_eq!(host_span["name"], "api.example.com");
    assert_eq!(host_span["traceId"], "00000000000000000000000000000abc");
    // child of the propagated context, not of the call span
    assert_eq!(host_span["parentSpanId"], "0000000000000def");
    assert_ne!(host_span["spanId"], call_span["spanId"]);
    assert_eq!(
        attribute(host_span, "server.address").unwrap()["stringValue"],
        "api.example.com"
    );
    assert_eq!(attribute(host_span, "server.port").unwrap()["intValue"], 443);

    // outbound header carried the call span identity
    let traceparent = headers
        .get("traceparent")
        .expect("traceparent injected")
        .to_str()
        .unwrap();
    assert_eq!(
        traceparent,
        format!(
            "00-00000000000000000000000000000abc-{}-01",
            call_span["spanId"].as_str().unwrap()
        )
    );
}

#[test]
fn collector_rejection_is_swallowed() {
    let (endpoint, requests) = spawn_collector(500, Duration::ZERO);
    let tracer = Arc::new(Tracer::builder().with_endpoint(endpoint).build());
    let db = db_instrument(tracer);

    let result: Result<(), DuplicateKey> = db.trace_query("SELECT * FROM users", || Ok(()));
    assert!(result.is_ok());

    // the payload still reached the stub before it answered 500
    assert!(requests.recv_timeout(Duration::from_secs(5)).is_ok());
}

#[test]
fn unreachable_collector_is_swallowed() {
    let tracer = Arc::new(
        Tracer::builder()
            .with_endpoint("http://127.0.0.1:9/v1/traces")
            .build(),
    );
    let db = db_instrument(tracer);

    let result: Result<(), DuplicateKey> = db.trace_query("SELECT * FROM users", || Ok(()));
    assert!(result.is_ok());
}

#[test]
fn fire_and_forget_returns_before_the_collector_answers() {
    let (endpoint, requests) = spawn_collector(200, Duration::from_millis(1500));
    let tracer = Arc::new(
        Tracer::builder()
            .with_endpoint(endpoint)
            .with_export_mode(ExportMode::FireAndForget)
            .build(),
    );
    let db = db_instrument(tracer);

    let started = Instant::now();
    let result: Result<(), DuplicateKey> = db.trace_query("SELECT * FROM users", || Ok(()));
    assert!(result.is_ok());
    assert!(
        started.elapsed() < Duration::from_millis(1000),
        "caller waited on the collector"
    );

    // delivery still happens in the background
    assert!(requests.recv_timeout(Duration::from_secs(5)).is_ok());
}
