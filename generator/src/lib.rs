//! Tracelight Metrics Generator
//!
//! This crate is the metrics-derivation stage of the Tracelight tracing
//! backend. It consumes span batches streamed by the ingestion pipeline and
//! converts them into aggregated, cardinality-bounded time-series samples
//! (call counts and latency histograms) which are handed to the time-series
//! storage layer through an append-only sink.
//!
//! # Architecture
//!
//! - [`processor`] - the per-tenant processors; [`processor::spanmetrics`]
//!   holds the span-to-metrics aggregation engine
//! - [`sink`] - the append-only sample sink contract
//! - [`collector`] - a timer-driven loop invoking collection on a period
//! - [`config`] - the configuration surface consumed by the generator
//!
//! # Example
//!
//! ```
//! use generator::config::SpanMetricsConfig;
//! use generator::processor::spanmetrics::SpanMetricsProcessor;
//! use generator::sink::InMemorySampleSink;
//! use shared::models::{ResourceSpans, Span, SpanKind, SpanStatus};
//!
//! let config = SpanMetricsConfig::default();
//! let processor = SpanMetricsProcessor::new("tenant-a", &config).unwrap();
//!
//! let batch = ResourceSpans::for_service("api").with_span(
//!     Span::new("GET /users")
//!         .with_kind(SpanKind::Server)
//!         .with_status(SpanStatus::Ok)
//!         .with_times(0, 5_000_000),
//! );
//! processor.push_batch(&[batch]);
//!
//! let mut sink = InMemorySampleSink::new();
//! processor.collect(&mut sink).unwrap();
//! assert!(!sink.samples().is_empty());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collector;
pub mod config;
pub mod processor;
pub mod sink;

pub use config::{ConfigError, SpanMetricsConfig};
pub use processor::spanmetrics::SpanMetricsProcessor;
pub use processor::Processor;
pub use sink::{InMemorySampleSink, SampleAppender, SeriesRef, SinkError};
