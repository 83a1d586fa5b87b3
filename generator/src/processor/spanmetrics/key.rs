//! Aggregation key derivation.
//!
//! One [`AggregationKey`] identifies one logical time series. The key is
//! a structured tuple rather than a delimiter-joined string, so dimension
//! values containing arbitrary characters cannot collide.

use shared::models::{Labels, Span, SpanKind, SpanStatus};

/// The dimensions identifying one logical time series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AggregationKey {
    /// The service that produced the span.
    pub service: String,
    /// The span operation name.
    pub operation: String,
    /// The span kind.
    pub kind: SpanKind,
    /// The span status code.
    pub status: SpanStatus,
}

impl AggregationKey {
    /// Derives the key for a span produced by the given service.
    #[must_use]
    pub fn from_span(service: &str, span: &Span) -> Self {
        Self {
            service: service.to_string(),
            operation: span.name.clone(),
            kind: span.kind,
            status: span.status,
        }
    }

    /// Returns the identity label set for this key.
    ///
    /// These labels are cached once per series lifetime and reused on
    /// every emission.
    #[must_use]
    pub fn labels(&self) -> Labels {
        Labels::new()
            .with_label("service", self.service.as_str())
            .with_label("span_name", self.operation.as_str())
            .with_label("span_kind", self.kind.to_string())
            .with_label("span_status", self.status.to_string())
    }
}
