//! Generator configuration module.
//!
//! The generator does not own process configuration; it consumes a small
//! surface handed to it by the host: the metric namespace, the latency
//! bucket boundaries, the staleness threshold, and the collection period.
//! Values can also be loaded from environment variables with sensible
//! defaults, following the conventions used across the backend:
//!
//! - `TRACELIGHT_METRICS_NAMESPACE`: prefix for emitted metric names
//!   (default: "tracelight")
//! - `TRACELIGHT_LATENCY_BUCKETS`: comma-separated bucket boundaries in
//!   milliseconds (default: "1,10,50,100,500")
//! - `TRACELIGHT_STALENESS_THRESHOLD`: idle collection cycles before a
//!   series is evicted (default: 4)
//! - `TRACELIGHT_COLLECTION_INTERVAL_SECS`: collection period in seconds
//!   (default: 15)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use validator::Validate;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The latency bucket boundaries are not strictly ascending.
    #[error("Latency bucket boundaries must be strictly ascending")]
    UnsortedBuckets,

    /// A latency bucket boundary is not a finite number.
    #[error("Latency bucket boundaries must be finite")]
    NonFiniteBucket,

    /// Validation failed with details.
    #[error("Validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

/// Configuration for the span-metrics processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SpanMetricsConfig {
    /// Prefix for emitted metric names (e.g. "tracelight" yields
    /// "`tracelight_calls_total`").
    #[validate(length(min = 1, message = "Metric namespace cannot be empty"))]
    pub namespace: String,

    /// Ordered latency bucket boundaries in milliseconds.
    #[validate(length(min = 1, message = "At least one latency bucket boundary is required"))]
    pub latency_buckets: Vec<f64>,

    /// Number of idle collection cycles after which a series is evicted.
    #[validate(range(min = 1, message = "Staleness threshold must be at least one cycle"))]
    pub staleness_threshold: u32,

    /// Collection period in seconds, consumed by the collection driver.
    #[validate(range(min = 1, message = "Collection interval must be at least one second"))]
    pub collection_interval_secs: u64,
}

impl SpanMetricsConfig {
    /// Creates a configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed, or if
    /// the resulting configuration is invalid.
    pub fn from_env() -> Result<Self> {
        let namespace = std::env::var("TRACELIGHT_METRICS_NAMESPACE")
            .unwrap_or_else(|_| "tracelight".to_string());

        let latency_buckets = match std::env::var("TRACELIGHT_LATENCY_BUCKETS") {
            Ok(raw) => raw
                .split(',')
                .map(|s| {
                    s.trim()
                        .parse::<f64>()
                        .with_context(|| format!("invalid latency bucket boundary: '{s}'"))
                })
                .collect::<Result<Vec<f64>>>()?,
            Err(_) => Self::default().latency_buckets,
        };

        let staleness_threshold = std::env::var("TRACELIGHT_STALENESS_THRESHOLD")
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .context("invalid staleness threshold")?
            .unwrap_or(4);

        let collection_interval_secs = std::env::var("TRACELIGHT_COLLECTION_INTERVAL_SECS")
            .ok()
            .map(|v| v.parse::<u64>())
            .transpose()
            .context("invalid collection interval")?
            .unwrap_or(15);

        let config = Self {
            namespace,
            latency_buckets,
            staleness_threshold,
            collection_interval_secs,
        };
        config.validate_config()?;
        Ok(config)
    }

    /// Returns the collection period as a [`Duration`].
    #[must_use]
    pub fn collection_interval(&self) -> Duration {
        Duration::from_secs(self.collection_interval_secs)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The namespace is empty
    /// - No bucket boundaries are configured
    /// - A boundary is not finite, or boundaries are not strictly ascending
    /// - The staleness threshold or collection interval is zero
    pub fn validate_config(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if self.latency_buckets.iter().any(|b| !b.is_finite()) {
            return Err(ConfigError::NonFiniteBucket);
        }
        if self.latency_buckets.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::UnsortedBuckets);
        }
        Ok(())
    }
}

impl Default for SpanMetricsConfig {
    fn default() -> Self {
        Self {
            namespace: "tracelight".to_string(),
            latency_buckets: vec![1.0, 10.0, 50.0, 100.0, 500.0],
            staleness_threshold: 4,
            collection_interval_secs: 15,
        }
    }
}
