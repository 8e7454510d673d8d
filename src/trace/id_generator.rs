//! Id Generator

use crate::trace::{SpanId, TraceId};
use rand::Rng;
use std::fmt;

/// Interface for generating trace and span ids.
pub trait IdGenerator: Send + Sync + fmt::Debug {
    /// Generate a new `TraceId`.
    fn new_trace_id(&self) -> TraceId;

    /// Generate a new `SpanId`.
    fn new_span_id(&self) -> SpanId;
}

/// Default [`IdGenerator`] implementation.
///
/// Generates trace and span ids from the thread-local cryptographically
/// secure random number generator. Failure of the OS entropy source aborts
/// the process rather than degrading to a weaker source.
#[derive(Clone, Debug, Default)]
pub struct RandomIdGenerator {
    _private: (),
}

impl IdGenerator for RandomIdGenerator {
    fn new_trace_id(&self) -> TraceId {
        TraceId::from(rand::rng().random::<u128>())
    }

    fn new_span_id(&self) -> SpanId {
        SpanId::from(rand::rng().random::<u64>())
    }
}
