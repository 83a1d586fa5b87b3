//! Tracelight Shared Library
//!
//! This crate contains the data models shared between the stages of the
//! Tracelight tracing backend: the span types delivered by the ingestion
//! pipeline and the sample types handed to the time-series storage layer.
//!
//! # Modules
//!
//! - [`models`] - Data models for spans and emitted samples
//!
//! # Example
//!
//! ```
//! use shared::models::{Span, SpanKind, SpanStatus};
//!
//! let span = Span::new("GET /api/users")
//!     .with_kind(SpanKind::Server)
//!     .with_status(SpanStatus::Ok)
//!     .with_times(1_000_000, 6_000_000);
//!
//! assert_eq!(span.latency_ms(), 5.0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod models;

/// Re-export common dependencies for convenience.
pub use serde;
pub use serde_json;
pub use validator;
