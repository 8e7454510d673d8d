use std::time::SystemTime;

use crate::attributes::Attribute;
use crate::export::{ExportConfig, OtlpExporter};
use crate::propagation::TraceContext;
use crate::trace::{
    FinishedSpan, IdGenerator, RandomIdGenerator, Span, SpanBuilder, Status,
};

/// How finished spans are delivered to the collector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportMode {
    /// Block the caller until the POST completes or times out.
    #[default]
    Sync,
    /// Dispatch the POST without waiting for the response.
    FireAndForget,
}

/// Starts, finishes and exports spans.
///
/// Finishing a span consumes it, exports it as the last action and never
/// surfaces a telemetry failure to the caller: this is the one place where
/// [`ExportError`] values are deliberately discarded, after a diagnostic
/// event on the `tracewire` target.
///
/// [`ExportError`]: crate::export::ExportError
#[derive(Debug)]
pub struct Tracer {
    exporter: OtlpExporter,
    ids: Box<dyn IdGenerator>,
    mode: ExportMode,
}

impl Tracer {
    /// A tracer configured entirely from the environment.
    pub fn from_env() -> Self {
        Tracer::builder().build()
    }

    /// Start building a tracer.
    pub fn builder() -> TracerBuilder {
        TracerBuilder::default()
    }

    /// Start a span, resolving unset ids.
    ///
    /// A missing trace id comes from the current [`TraceContext`]; without
    /// one a fresh root trace id is generated, so spans are always
    /// produced even when context propagation was never wired up.
    pub fn start(&self, builder: SpanBuilder) -> Span {
        let (trace_id, inherited_parent) = match builder.trace_id {
            Some(trace_id) => (trace_id, None),
            None => TraceContext::current_or_root(self.ids()),
        };

        Span {
            trace_id,
            span_id: builder.span_id.unwrap_or_else(|| self.ids.new_span_id()),
            parent_span_id: builder.parent_span_id.or(inherited_parent),
            name: builder.name,
            kind: builder.kind,
            start_time: SystemTime::now(),
            attributes: builder.attributes,
        }
    }

    /// Finish a span now and export it.
    pub fn finish(&self, span: Span, status: Status) {
        self.finish_at(span, status, SystemTime::now());
    }

    /// Finish a span with a caller-supplied end time and export it.
    ///
    /// Used when the operation duration is already known, e.g. a measured
    /// database execution time. End times earlier than the span's start
    /// are clamped to the start so `end >= start` always holds.
    pub fn finish_at(&self, span: Span, status: Status, end_time: SystemTime) {
        let end_time = end_time.max(span.start_time);
        let finished = FinishedSpan {
            span,
            end_time,
            status,
        };
        self.export(&finished);
    }

    /// Emit a one-shot `Internal` span covering no measurable duration.
    pub fn trace_internal(&self, name: impl Into<String>, attributes: Vec<Attribute>) {
        let span = self.start(SpanBuilder::new(name).with_attributes(attributes));
        self.finish(span, Status::Ok);
    }

    pub(crate) fn ids(&self) -> &dyn IdGenerator {
        self.ids.as_ref()
    }

    fn export(&self, span: &FinishedSpan) {
        let result = match self.mode {
            ExportMode::Sync => self.exporter.export(span),
            ExportMode::FireAndForget => self.exporter.export_detached(span),
        };
        if let Err(error) = result {
            tracing::debug!(target: "tracewire", %error, "span export failed");
        }
    }
}

/// Builder for [`Tracer`]s.
#[derive(Debug, Default)]
pub struct TracerBuilder {
    config: Option<ExportConfig>,
    endpoint: Option<String>,
    mode: ExportMode,
    ids: Option<Box<dyn IdGenerator>>,
}

impl TracerBuilder {
    /// Use an explicit export configuration instead of the environment.
    pub fn with_export_config(mut self, config: ExportConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the collector endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Select the delivery mode, [`ExportMode::Sync`] by default.
    pub fn with_export_mode(mut self, mode: ExportMode) -> Self {
        self.mode = mode;
        self
    }

    /// Use a custom id generator.
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Some(Box::new(ids));
        self
    }

    /// Build the tracer, reading any unset configuration from the
    /// environment.
    pub fn build(self) -> Tracer {
        let mut config = self.config.unwrap_or_else(ExportConfig::from_env);
        if let Some(endpoint) = self.endpoint {
            config.endpoint = endpoint;
        }

        Tracer {
            exporter: OtlpExporter::new(config),
            ids: self
                .ids
                .unwrap_or_else(|| Box::new(RandomIdGenerator::default())),
            mode: self.mode,
        }
    }
}
