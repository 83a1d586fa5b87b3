//! Span data models.
//!
//! Defines the span structures the metrics generator consumes. Spans arrive
//! from the ingestion pipeline grouped by the resource that produced them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use validator::Validate;

/// The resource attribute key carrying the service name.
pub const SERVICE_NAME_KEY: &str = "service.name";

/// Status code for a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpanStatus {
    /// No status was recorded for the span.
    #[default]
    Unset,
    /// The span completed without error.
    Ok,
    /// The span encountered an error.
    Error,
}

impl std::fmt::Display for SpanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unset => write!(f, "unset"),
            Self::Ok => write!(f, "ok"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Kind of span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    /// Default span kind (internal operation).
    #[default]
    Internal,
    /// The span represents a server handling a request.
    Server,
    /// The span represents a client making a request.
    Client,
    /// The span represents a producer sending a message.
    Producer,
    /// The span represents a consumer receiving a message.
    Consumer,
}

impl std::fmt::Display for SpanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Internal => write!(f, "internal"),
            Self::Server => write!(f, "server"),
            Self::Client => write!(f, "client"),
            Self::Producer => write!(f, "producer"),
            Self::Consumer => write!(f, "consumer"),
        }
    }
}

/// A span representing a unit of work in a distributed trace.
///
/// Only the fields the metrics generator derives dimensions and latency
/// from are carried here; the full span body stays with the ingestion and
/// storage collaborators.
///
/// # Example
///
/// ```
/// use shared::models::{Span, SpanKind, SpanStatus};
///
/// let span = Span::new("HTTP GET /api/users")
///     .with_kind(SpanKind::Server)
///     .with_status(SpanStatus::Ok)
///     .with_times(0, 5_000_000);
///
/// assert!(span.validate_span().is_ok());
/// assert_eq!(span.latency_ms(), 5.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Span {
    /// The name/operation of this span.
    #[validate(length(min = 1, message = "Span name cannot be empty"))]
    pub name: String,

    /// The kind of span.
    #[serde(default)]
    pub kind: SpanKind,

    /// The status of the span.
    #[serde(default)]
    pub status: SpanStatus,

    /// Start timestamp in nanoseconds since the Unix epoch.
    pub start_time_unix_nano: u64,

    /// End timestamp in nanoseconds since the Unix epoch.
    pub end_time_unix_nano: u64,
}

/// Errors that can occur during span validation.
#[derive(Debug, Error)]
pub enum SpanValidationError {
    /// The span name is empty.
    #[error("Span name cannot be empty")]
    EmptyName,

    /// Validation failed with details.
    #[error("Validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

impl Span {
    /// Creates a new span with zeroed timestamps.
    ///
    /// Call `with_times` to set the actual start and end.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SpanKind::default(),
            status: SpanStatus::default(),
            start_time_unix_nano: 0,
            end_time_unix_nano: 0,
        }
    }

    /// Sets the span kind.
    #[must_use]
    pub fn with_kind(mut self, kind: SpanKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the span status.
    #[must_use]
    pub fn with_status(mut self, status: SpanStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the start and end timestamps (nanoseconds since the Unix epoch).
    #[must_use]
    pub fn with_times(mut self, start_unix_nano: u64, end_unix_nano: u64) -> Self {
        self.start_time_unix_nano = start_unix_nano;
        self.end_time_unix_nano = end_unix_nano;
        self
    }

    /// Returns the span latency in milliseconds.
    ///
    /// The value is signed: a span whose end precedes its start yields a
    /// negative latency. Consumers that aggregate latencies accept such
    /// values as-is rather than correcting them.
    #[must_use]
    pub fn latency_ms(&self) -> f64 {
        let nanos = self.end_time_unix_nano as i128 - self.start_time_unix_nano as i128;
        nanos as f64 / 1_000_000.0
    }

    /// Validates the span.
    ///
    /// # Errors
    ///
    /// Returns an error if the span name is empty.
    pub fn validate_span(&self) -> Result<(), SpanValidationError> {
        if self.name.is_empty() {
            return Err(SpanValidationError::EmptyName);
        }
        self.validate()?;
        Ok(())
    }
}

/// The entity that produced a group of spans.
///
/// Carries the attribute set reported by the instrumented process. The
/// service name lives in the `service.name` attribute by OpenTelemetry
/// semantic convention.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resource {
    /// Attributes reported for this resource.
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
}

impl Resource {
    /// Creates an empty resource.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute to the resource.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        self.attributes.insert(
            key.into(),
            serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
        );
        self
    }

    /// Returns the service name from the `service.name` attribute, if any.
    ///
    /// A missing attribute, a non-string value, or an empty string all
    /// resolve to `None`.
    #[must_use]
    pub fn service_name(&self) -> Option<&str> {
        self.attributes
            .get(SERVICE_NAME_KEY)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }
}

/// A group of spans scoped to the resource that produced them.
///
/// This is the batch unit delivered by the ingestion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSpans {
    /// The resource the spans belong to.
    pub resource: Resource,

    /// The spans produced by this resource.
    #[serde(default)]
    pub spans: Vec<Span>,
}

impl ResourceSpans {
    /// Creates a new group for the given resource.
    #[must_use]
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            spans: Vec::new(),
        }
    }

    /// Creates a group for a resource identified only by its service name.
    #[must_use]
    pub fn for_service(service: impl Into<String>) -> Self {
        Self::new(Resource::new().with_attribute(SERVICE_NAME_KEY, service.into()))
    }

    /// Adds a span to the group.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.spans.push(span);
        self
    }
}
