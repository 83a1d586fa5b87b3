//! Data models for the Tracelight tracing backend.
//!
//! This module contains the span types consumed by the metrics generator
//! and the sample types it emits.

pub mod sample;
pub mod span;

pub use sample::{Label, Labels, Sample, BUCKET_BOUND_LABEL, METRIC_NAME_LABEL};
pub use span::{
    Resource, ResourceSpans, Span, SpanKind, SpanStatus, SpanValidationError, SERVICE_NAME_KEY,
};
