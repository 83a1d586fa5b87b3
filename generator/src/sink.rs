//! Sample sink contract and implementations.
//!
//! The generator treats the downstream time-series storage as an
//! append-only write target: every emitted sample goes through a
//! [`SampleAppender`], and each append can fail independently. The
//! generator never reads back, deduplicates, or retries writes itself.
//! An [`InMemorySampleSink`] implementation is provided for development
//! and testing.

use shared::models::{Labels, Sample};
use thiserror::Error;

/// Opaque reference to a stored series, returned by appends.
pub type SeriesRef = u64;

/// Errors that can occur when appending samples to a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink rejected the sample.
    #[error("Sink rejected sample: {0}")]
    Rejected(String),

    /// The sink is not reachable.
    #[error("Sink unavailable: {0}")]
    Unavailable(String),
}

/// Trait for append-only sample sinks.
///
/// Implementations receive the full label set (including the `__name__`
/// metric-name label), a millisecond timestamp, and the sample value.
pub trait SampleAppender: Send {
    /// Appends one sample.
    ///
    /// # Errors
    ///
    /// Returns an error if the sample cannot be written. Samples appended
    /// before a failure are kept; the caller decides whether and when to
    /// re-emit.
    fn append(
        &mut self,
        labels: Labels,
        timestamp_ms: i64,
        value: f64,
    ) -> Result<SeriesRef, SinkError>;
}

/// In-memory sample sink implementation.
///
/// Stores every appended sample in order. Useful for development and
/// testing.
#[derive(Debug, Default)]
pub struct InMemorySampleSink {
    samples: Vec<Sample>,
    next_ref: SeriesRef,
}

impl InMemorySampleSink {
    /// Creates a new empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all appended samples in append order.
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Returns the samples whose `__name__` label equals `metric_name`.
    #[must_use]
    pub fn samples_named(&self, metric_name: &str) -> Vec<&Sample> {
        self.samples
            .iter()
            .filter(|s| s.metric_name() == Some(metric_name))
            .collect()
    }

    /// Returns the number of appended samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if no samples have been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Removes all appended samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl SampleAppender for InMemorySampleSink {
    fn append(
        &mut self,
        labels: Labels,
        timestamp_ms: i64,
        value: f64,
    ) -> Result<SeriesRef, SinkError> {
        self.samples.push(Sample::new(labels, timestamp_ms, value));
        self.next_ref += 1;
        Ok(self.next_ref)
    }
}
