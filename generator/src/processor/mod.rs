//! Processors derive data from span batches.
//!
//! A processor is the per-tenant unit the host pipeline routes span
//! batches to. All processors share the same lifecycle contract so the
//! pipeline can register, drive, and tear them down uniformly.

pub mod spanmetrics;

use crate::sink::{SampleAppender, SinkError};
use shared::models::ResourceSpans;

/// Lifecycle and data-path contract shared by all processors.
pub trait Processor: Send + Sync {
    /// Returns the identifier used to route and register this processor
    /// among its siblings in the pipeline.
    fn name(&self) -> &'static str;

    /// Consumes one batch of resource-scoped spans.
    ///
    /// Never fails: malformed or unattributable input is dropped silently
    /// by design, keeping the hot path non-blocking.
    fn push_batch(&self, batches: &[ResourceSpans]);

    /// Sweeps staleness, evicts dead series, and writes the current
    /// cumulative values to the given sink.
    ///
    /// # Errors
    ///
    /// Returns the first sink error encountered; the remainder of the
    /// cycle is aborted and already-written samples are not rolled back.
    fn collect(&self, appender: &mut dyn SampleAppender) -> Result<(), SinkError>;

    /// Releases any resources held by the processor.
    ///
    /// # Errors
    ///
    /// Returns an error if teardown fails.
    fn shutdown(&self) -> anyhow::Result<()>;
}
