//! Ambient trace context.
//!
//! An inbound request boundary (middleware, job runner) attaches the
//! current trace id and span id here once per logical request; every
//! instrumentation adapter reads them to parent the spans it creates. The
//! storage is thread-scoped, so concurrent requests handled on distinct
//! threads cannot leak trace ids into each other.

mod trace_parent;

pub use trace_parent::{format_traceparent, parse_traceparent, HeaderInjector, TRACEPARENT_HEADER};

pub(crate) use trace_parent::inject_traceparent;

use std::cell::RefCell;
use std::marker::PhantomData;

use crate::trace::{IdGenerator, SpanId, TraceId};

thread_local! {
    static CURRENT_CONTEXT: RefCell<Option<TraceContext>> = const { RefCell::new(None) };
}

/// The ambient trace identity read by instrumentation points.
///
/// Written by the inbound boundary collaborator (single writer, via
/// [`attach`]) and read by adapters (many readers). When no context is
/// attached, each instrumentation point independently fabricates a fresh
/// root trace id instead of failing; a request whose boundary never
/// attached a context therefore fragments into one trace per traced
/// operation. That permissive fallback is deliberate and kept.
///
/// [`attach`]: TraceContext::attach
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceContext {
    /// Trace id shared by every span of the current request.
    pub trace_id: TraceId,
    /// Id of the current span, used as the parent of new child spans.
    pub span_id: SpanId,
}

impl TraceContext {
    /// Create a context from explicit ids.
    pub fn new(trace_id: TraceId, span_id: SpanId) -> Self {
        TraceContext { trace_id, span_id }
    }

    /// Parse an inbound W3C `traceparent` header value.
    ///
    /// Returns `None` for malformed or all-zero identifiers.
    pub fn from_traceparent(header: &str) -> Option<Self> {
        parse_traceparent(header)
    }

    /// The context attached to the current thread, if any.
    pub fn current() -> Option<TraceContext> {
        CURRENT_CONTEXT.with(|cx| *cx.borrow())
    }

    /// Attach this context to the current thread.
    ///
    /// The returned guard restores the previously attached context when
    /// dropped, which rescopes nested attachments correctly.
    pub fn attach(self) -> ContextGuard {
        let previous = CURRENT_CONTEXT
            .try_with(|cx| cx.replace(Some(self)))
            .ok()
            .flatten();

        ContextGuard {
            previous,
            _marker: PhantomData,
        }
    }

    /// Resolve the trace id and parent span id for a new span.
    ///
    /// With a context attached this continues the ambient trace; without
    /// one it mints a fresh root trace id (the documented fragmentation
    /// fallback).
    pub(crate) fn current_or_root(ids: &dyn IdGenerator) -> (TraceId, Option<SpanId>) {
        match Self::current() {
            Some(cx) => (cx.trace_id, Some(cx.span_id)),
            None => (ids.new_trace_id(), None),
        }
    }
}

/// A guard that restores the prior trace context when dropped.
pub struct ContextGuard {
    previous: Option<TraceContext>,
    // ensure this type is !Send as it relies on thread locals
    _marker: PhantomData<*const ()>,
}

impl std::fmt::Debug for ContextGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextGuard").finish_non_exhaustive()
    }
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let _ = CURRENT_CONTEXT.try_with(|cx| *cx.borrow_mut() = self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::RandomIdGenerator;

    #[test]
    fn attach_and_restore() {
        assert_eq!(TraceContext::current(), None);

        let outer = TraceContext::new(TraceId::from(1), SpanId::from(2));
        {
            let _outer_guard = outer.attach();
            assert_eq!(TraceContext::current(), Some(outer));

            let inner = TraceContext::new(TraceId::from(3), SpanId::from(4));
            {
                let _inner_guard = inner.attach();
                assert_eq!(TraceContext::current(), Some(inner));
            }
            assert_eq!(TraceContext::current(), Some(outer));
        }
        assert_eq!(TraceContext::current(), None);
    }

    #[test]
    fn absent_context_mints_a_fresh_root_per_call() {
        let ids = RandomIdGenerator::default();

        let (first_trace, first_parent) = TraceContext::current_or_root(&ids);
        let (second_trace, second_parent) = TraceContext::current_or_root(&ids);

        assert!(first_parent.is_none());
        assert!(second_parent.is_none());
        // each call fragments into its own root trace
        assert_ne!(first_trace, second_trace);
    }

    #[test]
    fn attached_context_is_reused() {
        let ids = RandomIdGenerator::default();
        let cx = TraceContext::new(TraceId::from(7), SpanId::from(8));
        let _guard = cx.attach();

        let (trace_id, parent) = TraceContext::current_or_root(&ids);
        assert_eq!(trace_id, cx.trace_id);
        assert_eq!(parent, Some(cx.span_id));
    }
}
