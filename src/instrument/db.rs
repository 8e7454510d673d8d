//! Database instrumentation.
//!
//! One `Client` span per executed statement, named
//! `db.<operation>[ <table>]`, always emitted even when the statement
//! fails. The real error is re-raised to the caller after tracing.

use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::attributes::Attribute;
use crate::instrument::ExceptionInfo;
use crate::propagation::TraceContext;
use crate::semconv;
use crate::sql;
use crate::trace::{SpanBuilder, SpanKind, Status, Tracer};

const DB_DATABASE: &str = "DB_DATABASE";
const DB_HOST: &str = "DB_HOST";
const DB_PORT: &str = "DB_PORT";
const DB_USERNAME: &str = "DB_USERNAME";

/// Connection-level attribute defaults.
///
/// Filled from the `DB_*` environment variables, overridable for
/// applications with several connections.
#[derive(Clone, Debug)]
pub struct DbSettings {
    /// The database product, `db.system`. Defaults to `mysql`.
    pub system: String,
    /// Database name used when a statement record carries none.
    pub database: String,
    /// Database server host, `server.address`.
    pub host: String,
    /// Database server port, `server.port`.
    pub port: u16,
    /// Connecting user, `db.user`.
    pub user: String,
}

impl DbSettings {
    /// Read defaults from `DB_DATABASE`, `DB_HOST`, `DB_PORT` and
    /// `DB_USERNAME`.
    pub fn from_env() -> Self {
        DbSettings {
            system: "mysql".to_owned(),
            database: env::var(DB_DATABASE).unwrap_or_else(|_| "unknown".to_owned()),
            host: env::var(DB_HOST).unwrap_or_else(|_| "localhost".to_owned()),
            port: env::var(DB_PORT)
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3306),
            user: env::var(DB_USERNAME).unwrap_or_else(|_| "root".to_owned()),
        }
    }
}

/// One executed statement, as reported by the database collaborator.
#[derive(Debug, Default)]
pub struct QueryRecord<'a> {
    /// The SQL text, with bound parameters either already interpolated by
    /// the caller or appended separately.
    pub sql: &'a str,
    /// Logical connection name, when the driver distinguishes several.
    pub connection: Option<&'a str>,
    /// Database name, falling back to the configured default.
    pub database: Option<&'a str>,
    /// Measured execution time.
    pub duration: Option<Duration>,
    /// Rows affected or returned, when the driver reports it.
    pub rows_affected: Option<u64>,
    /// The failure the statement ended with, if any.
    pub error: Option<ExceptionInfo>,
}

/// The narrow statement interface the tracing decorator needs.
///
/// Implemented by a thin shim over the real driver's prepared statement.
pub trait Statement {
    /// A fetched row.
    type Row;
    /// The driver's error type.
    type Error: std::error::Error;

    /// Execute the statement with the given bound parameters.
    fn execute(&mut self, params: &[serde_json::Value]) -> Result<(), Self::Error>;

    /// Fetch the next row, `None` when exhausted.
    fn fetch(&mut self) -> Result<Option<Self::Row>, Self::Error>;

    /// Rows affected or returned by the last execution.
    fn row_count(&self) -> Option<u64>;
}

/// Emits spans for database statements.
#[derive(Clone, Debug)]
pub struct DbInstrument {
    tracer: Arc<Tracer>,
    settings: DbSettings,
}

impl DbInstrument {
    /// An instrument with settings read from the environment.
    pub fn new(tracer: Arc<Tracer>) -> Self {
        DbInstrument {
            tracer,
            settings: DbSettings::from_env(),
        }
    }

    /// An instrument with explicit connection settings.
    pub fn with_settings(tracer: Arc<Tracer>, settings: DbSettings) -> Self {
        DbInstrument { tracer, settings }
    }

    /// Record one executed statement as a span.
    ///
    /// This is the notification-style entry point for drivers that report
    /// statements after the fact with a measured duration; the span's end
    /// time is the start plus that duration. Statements without a duration
    /// get a nominal millisecond.
    pub fn record(&self, record: QueryRecord<'_>) {
        let operation = sql::extract_operation(record.sql);
        let table = sql::extract_table_name(record.sql, operation);
        let name = match &table {
            Some(table) => format!("db.{operation} {table}"),
            None => format!("db.{operation}"),
        };

        let (trace_id, parent) = TraceContext::current_or_root(self.tracer.ids());

        let mut attributes = vec![
            Attribute::string(semconv::trace::DB_SYSTEM, &self.settings.system),
            Attribute::string(semconv::trace::DB_STATEMENT, record.sql),
            Attribute::string(semconv::trace::DB_OPERATION, operation),
            Attribute::string(
                semconv::trace::DB_NAME,
                record.database.unwrap_or(&self.settings.database),
            ),
            Attribute::string(semconv::trace::SERVER_ADDRESS, &self.settings.host),
            Attribute::int(semconv::trace::SERVER_PORT, i64::from(self.settings.port)),
            Attribute::string(semconv::trace::NETWORK_TRANSPORT, "tcp"),
            Attribute::string(semconv::trace::NETWORK_TYPE, "ipv4"),
            Attribute::string(semconv::trace::DB_USER, &self.settings.user),
        ];
        if let Some(connection) = record.connection {
            attributes.push(Attribute::string(semconv::trace::DB_CONNECTION, connection));
        }
        if let Some(table) = table {
            attributes.push(Attribute::string(semconv::trace::DB_SQL_TABLE, table));
        }
        if let Some(duration) = record.duration {
            attributes.push(Attribute::string(
                semconv::trace::DB_DURATION,
                format!("{}", duration.as_secs_f64() * 1000.0),
            ));
        }
        if let Some(rows) = record.rows_affected {
            attributes.push(Attribute::int(semconv::trace::DB_ROWS_AFFECTED, rows as i64));
        }
        if let Some(error) = &record.error {
            attributes.push(Attribute::string(
                semconv::trace::EXCEPTION_TYPE,
                &error.error_type,
            ));
            attributes.push(Attribute::string(
                semconv::trace::EXCEPTION_MESSAGE,
                &error.message,
            ));
        }

        let mut builder = SpanBuilder::new(name)
            .with_kind(SpanKind::Client)
            .with_trace_id(trace_id)
            .with_attributes(attributes);
        if let Some(parent) = parent {
            builder = builder.with_parent(parent);
        }

        let span = builder.start(&self.tracer);
        let end_time =
            span.start_time() + record.duration.unwrap_or_else(|| Duration::from_millis(1));
        let status = match record.error {
            Some(error) => Status::error(error.message),
            None => Status::Ok,
        };
        self.tracer.finish_at(span, status, end_time);
    }

    /// Run a one-shot query through the given closure, tracing it.
    ///
    /// The duration is measured around the call and a span is emitted
    /// whether the query succeeded or not; the closure's result is
    /// returned unchanged.
    pub fn trace_query<T, E>(&self, sql: &str, f: impl FnOnce() -> Result<T, E>) -> Result<T, E>
    where
        E: std::error::Error,
    {
        let started = Instant::now();
        let result = f();
        let duration = started.elapsed();

        self.record(QueryRecord {
            sql,
            duration: Some(duration),
            error: result.as_ref().err().map(ExceptionInfo::from_error),
            ..QueryRecord::default()
        });

        result
    }

    /// Wrap a prepared statement in a tracing decorator.
    pub fn prepare<S: Statement>(&self, sql: impl Into<String>, statement: S) -> TracedStatement<S> {
        TracedStatement {
            inner: statement,
            sql: sql.into(),
            instrument: self.clone(),
        }
    }
}

/// Decorator that traces each execution of a prepared statement and
/// forwards everything else to the wrapped statement.
#[derive(Debug)]
pub struct TracedStatement<S> {
    inner: S,
    sql: String,
    instrument: DbInstrument,
}

impl<S: Statement> TracedStatement<S> {
    /// Execute the statement, emitting one span.
    ///
    /// Bound parameters are appended to the traced statement text so the
    /// recorded `db.statement` reflects what actually ran. Failures are
    /// traced and then returned unchanged.
    pub fn execute(&mut self, params: &[serde_json::Value]) -> Result<(), S::Error> {
        let started = Instant::now();
        let result = self.inner.execute(params);
        let duration = started.elapsed();

        let sql = if params.is_empty() {
            self.sql.clone()
        } else {
            format!(
                "{} [params: {}]",
                self.sql,
                serde_json::Value::Array(params.to_vec())
            )
        };

        self.instrument.record(QueryRecord {
            sql: &sql,
            duration: Some(duration),
            rows_affected: self.inner.row_count(),
            error: result.as_ref().err().map(ExceptionInfo::from_error),
            ..QueryRecord::default()
        });

        result
    }

    /// Fetch the next row from the wrapped statement.
    pub fn fetch(&mut self) -> Result<Option<S::Row>, S::Error> {
        self.inner.fetch()
    }

    /// Rows affected or returned by the last execution.
    pub fn row_count(&self) -> Option<u64> {
        self.inner.row_count()
    }

    /// Unwrap the decorator.
    pub fn into_inner(self) -> S {
        self.inner
    }
}
