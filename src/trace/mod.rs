//! Span lifecycle: identifiers, the span builder, and the tracer that
//! finishes and exports spans.

mod id;
mod id_generator;
mod span;
mod tracer;

pub use id::{SpanId, TraceId};
pub use id_generator::{IdGenerator, RandomIdGenerator};
pub use span::{FinishedSpan, Span, SpanBuilder};
pub use tracer::{ExportMode, Tracer, TracerBuilder};

use std::borrow::Cow;

/// `SpanKind` describes the relationship between the span, its parents, and
/// its children in a trace.
///
/// Every span produced by the instrumentation adapters is a
/// [`SpanKind::Client`] span; [`SpanKind::Internal`] is the default for
/// spans created directly through a [`SpanBuilder`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpanKind {
    /// A request to some remote service.
    Client,
    /// Server-side handling of a remote request.
    Server,
    /// Initiator of an asynchronous request.
    Producer,
    /// Child of an asynchronous producer request.
    Consumer,
    /// An operation internal to the application.
    Internal,
}

impl SpanKind {
    /// The numeric code used on the OTLP wire.
    pub(crate) fn otlp_code(self) -> u32 {
        match self {
            SpanKind::Internal => 1,
            SpanKind::Server => 2,
            SpanKind::Client => 3,
            SpanKind::Producer => 4,
            SpanKind::Consumer => 5,
        }
    }
}

/// The status of a finished span.
///
/// Spans start out [`Status::Unset`]; the status given to
/// [`Tracer::finish`] is final since a span cannot be finished twice.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Status {
    /// The default status.
    #[default]
    Unset,

    /// The operation contains an error.
    Error {
        /// The description of the error.
        description: Cow<'static, str>,
    },

    /// The operation completed successfully.
    Ok,
}

impl Status {
    /// Create a new error status with a given description.
    pub fn error(description: impl Into<Cow<'static, str>>) -> Self {
        Status::Error {
            description: description.into(),
        }
    }

    /// The numeric code used on the OTLP wire.
    pub(crate) fn otlp_code(&self) -> u32 {
        match self {
            Status::Unset => 0,
            Status::Ok => 1,
            Status::Error { .. } => 2,
        }
    }

    /// The status message, present only for errors.
    pub(crate) fn message(&self) -> Option<&str> {
        match self {
            Status::Error { description } => Some(description),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otlp_codes() {
        assert_eq!(SpanKind::Internal.otlp_code(), 1);
        assert_eq!(SpanKind::Server.otlp_code(), 2);
        assert_eq!(SpanKind::Client.otlp_code(), 3);
        assert_eq!(SpanKind::Producer.otlp_code(), 4);
        assert_eq!(SpanKind::Consumer.otlp_code(), 5);

        assert_eq!(Status::Unset.otlp_code(), 0);
        assert_eq!(Status::Ok.otlp_code(), 1);
        assert_eq!(Status::error("boom").otlp_code(), 2);
    }

    #[test]
    fn error_status_carries_message() {
        assert_eq!(Status::error("duplicate key").message(), Some("duplicate key"));
        assert_eq!(Status::Ok.message(), None);
        assert_eq!(Status::Unset.message(), None);
    }
}
