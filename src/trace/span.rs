use std::time::SystemTime;

use crate::attributes::Attribute;
use crate::trace::{SpanId, SpanKind, Status, TraceId, Tracer};

/// An open, in-flight span.
///
/// Spans are created through a [`SpanBuilder`] and stay mutable until they
/// are handed to [`Tracer::finish`] or [`Tracer::finish_at`], which consume
/// them. Finishing a span twice is therefore rejected at compile time.
/// Ownership stays with the call stack that created the span; spans are
/// never shared across threads.
#[derive(Debug)]
pub struct Span {
    pub(crate) trace_id: TraceId,
    pub(crate) span_id: SpanId,
    pub(crate) parent_span_id: Option<SpanId>,
    pub(crate) name: String,
    pub(crate) kind: SpanKind,
    pub(crate) start_time: SystemTime,
    pub(crate) attributes: Vec<Attribute>,
}

impl Span {
    /// The id of the trace this span belongs to.
    pub fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// The id of this span.
    pub fn span_id(&self) -> SpanId {
        self.span_id
    }

    /// The id of the causing span, absent for root spans.
    pub fn parent_span_id(&self) -> Option<SpanId> {
        self.parent_span_id
    }

    /// The instant the span was started.
    pub fn start_time(&self) -> SystemTime {
        self.start_time
    }

    /// Set an attribute on this span.
    ///
    /// Setting an attribute with the same key as an existing attribute
    /// overwrites the existing value in place, keeping the original
    /// insertion position.
    pub fn set_attribute(&mut self, attribute: Attribute) {
        match self.attributes.iter_mut().find(|a| a.key == attribute.key) {
            Some(existing) => existing.value = attribute.value,
            None => self.attributes.push(attribute),
        }
    }
}

/// A finished, immutable span, eligible for export.
#[derive(Debug)]
pub struct FinishedSpan {
    pub(crate) span: Span,
    pub(crate) end_time: SystemTime,
    pub(crate) status: Status,
}

impl FinishedSpan {
    /// The id of the trace this span belongs to.
    pub fn trace_id(&self) -> TraceId {
        self.span.trace_id
    }

    /// The id of this span.
    pub fn span_id(&self) -> SpanId {
        self.span.span_id
    }

    /// The instant the span was started.
    pub fn start_time(&self) -> SystemTime {
        self.span.start_time
    }

    /// The instant the span ended, never earlier than the start.
    pub fn end_time(&self) -> SystemTime {
        self.end_time
    }

    /// The final status of the span.
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// The recorded attributes, in insertion order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.span.attributes
    }
}

/// Builder for [`Span`]s.
///
/// Ids left unset are resolved by the tracer when the span starts: the
/// trace id and parent come from the current [`TraceContext`] when one is
/// attached, and a fresh root trace id is generated otherwise.
///
/// [`TraceContext`]: crate::propagation::TraceContext
#[derive(Debug)]
pub struct SpanBuilder {
    pub(crate) name: String,
    pub(crate) kind: SpanKind,
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) trace_id: Option<TraceId>,
    pub(crate) span_id: Option<SpanId>,
    pub(crate) parent_span_id: Option<SpanId>,
}

impl SpanBuilder {
    /// Create a builder for a span with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        SpanBuilder {
            name: name.into(),
            kind: SpanKind::Internal,
            attributes: Vec::new(),
            trace_id: None,
            span_id: None,
            parent_span_id: None,
        }
    }

    /// Specify the kind of the span.
    pub fn with_kind(mut self, kind: SpanKind) -> Self {
        self.kind = kind;
        self
    }

    /// Specify initial attributes.
    pub fn with_attributes(mut self, attributes: impl IntoIterator<Item = Attribute>) -> Self {
        self.attributes = attributes.into_iter().collect();
        self
    }

    /// Pin the trace id instead of resolving it from the current context.
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Pin the span id instead of generating one.
    ///
    /// Used when the id had to exist before the span, e.g. for injecting a
    /// `traceparent` header ahead of the request the span describes.
    pub fn with_span_id(mut self, span_id: SpanId) -> Self {
        self.span_id = Some(span_id);
        self
    }

    /// Specify the parent span.
    pub fn with_parent(mut self, parent_span_id: SpanId) -> Self {
        self.parent_span_id = Some(parent_span_id);
        self
    }

    /// Start the span, capturing the current instant as its start time.
    pub fn start(self, tracer: &Tracer) -> Span {
        tracer.start(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attribute;

    fn open_span() -> Span {
        Span {
            trace_id: TraceId::from(1),
            span_id: SpanId::from(2),
            parent_span_id: None,
            name: "test".to_owned(),
            kind: SpanKind::Internal,
            start_time: SystemTime::now(),
            attributes: Vec::new(),
        }
    }

    #[test]
    fn set_attribute_appends_new_keys_in_order() {
        let mut span = open_span();
        span.set_attribute(Attribute::string("first", "1"));
        span.set_attribute(Attribute::string("second", "2"));

        let keys: Vec<_> = span.attributes.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, ["first", "second"]);
    }

    #[test]
    fn set_attribute_overwrites_in_place() {
        let mut span = open_span();
        span.set_attribute(Attribute::string("key", "old"));
        span.set_attribute(Attribute::string("other", "x"));
        span.set_attribute(Attribute::string("key", "new"));

        assert_eq!(span.attributes.len(), 2);
        assert_eq!(span.attributes[0], Attribute::string("key", "new"));
    }

    #[test]
    fn builder_defaults() {
        let builder = SpanBuilder::new("op");
        assert_eq!(builder.kind, SpanKind::Internal);
        assert!(builder.trace_id.is_none());
        assert!(builder.span_id.is_none());
        assert!(builder.parent_span_id.is_none());
        assert!(builder.attributes.is_empty());
    }
}
