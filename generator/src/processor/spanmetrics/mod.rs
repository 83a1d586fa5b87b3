//! Span-to-metrics aggregation engine.
//!
//! Converts streamed spans into cumulative call-count and
//! latency-histogram series, keyed by `(service, operation, kind,
//! status)`. One processor instance owns the aggregate state of one
//! tenant; ingestion and collection share a single mutex over that state.
//! Ingestion takes the lock once per span, collection holds it for the
//! whole sweep-and-emit cycle, trading ingestion latency for a consistent
//! emission snapshot.
//!
//! Emitted values are always life-to-date cumulative totals, never
//! deltas; downstream consumers derive rates. A failed collection cycle
//! loses no aggregate state, the next successful cycle re-emits
//! everything in full.

pub mod histogram;
pub mod key;
pub mod staleness;

pub use histogram::LatencyHistogram;
pub use key::AggregationKey;
pub use staleness::{CycleStaleness, StalenessPolicy};

use crate::config::{ConfigError, SpanMetricsConfig};
use crate::processor::Processor;
use crate::sink::{SampleAppender, SinkError};
use chrono::Utc;
use shared::models::{Labels, ResourceSpans, Span, BUCKET_BOUND_LABEL, METRIC_NAME_LABEL};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Identifier this processor registers under in the pipeline.
pub const PROCESSOR_NAME: &str = "spanmetrics";

const CALLS_METRIC: &str = "calls_total";
const LATENCY_COUNT_METRIC: &str = "latency_count";
const LATENCY_SUM_METRIC: &str = "latency_sum";
const LATENCY_BUCKET_METRIC: &str = "latency_bucket";

/// Callback receiving the active-series count after every sweep.
///
/// Injected rather than registered globally so the host decides where
/// the cardinality gauge lives.
pub type ActiveSeriesGauge = Box<dyn Fn(f64) + Send + Sync>;

/// The aggregate state of one series.
///
/// All per-key state lives in this one struct, so a key is either fully
/// present or fully absent; eviction cannot leave partial state behind.
#[derive(Debug)]
struct SeriesState {
    calls: f64,
    latency: LatencyHistogram,
    labels: Labels,
    cycles_idle: u32,
}

impl SeriesState {
    fn new(labels: Labels, num_bounds: usize) -> Self {
        Self {
            calls: 0.0,
            latency: LatencyHistogram::new(num_bounds),
            labels,
            cycles_idle: 0,
        }
    }
}

/// Per-tenant span-metrics processor.
///
/// # Example
///
/// ```
/// use generator::config::SpanMetricsConfig;
/// use generator::processor::spanmetrics::SpanMetricsProcessor;
/// use generator::sink::InMemorySampleSink;
/// use shared::models::{ResourceSpans, Span};
///
/// let processor =
///     SpanMetricsProcessor::new("tenant-a", &SpanMetricsConfig::default()).unwrap();
///
/// let batch = ResourceSpans::for_service("api")
///     .with_span(Span::new("GET /users").with_times(0, 5_000_000));
/// processor.push_batch(&[batch]);
/// assert_eq!(processor.active_series(), 1);
///
/// let mut sink = InMemorySampleSink::new();
/// processor.collect(&mut sink).unwrap();
/// ```
pub struct SpanMetricsProcessor {
    tenant: String,
    namespace: String,
    latency_buckets: Vec<f64>,
    policy: Box<dyn StalenessPolicy>,
    active_series_gauge: Option<ActiveSeriesGauge>,
    series: Mutex<HashMap<AggregationKey, SeriesState>>,
}

impl SpanMetricsProcessor {
    /// Creates a processor for the given tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(tenant: impl Into<String>, config: &SpanMetricsConfig) -> Result<Self, ConfigError> {
        config.validate_config()?;
        Ok(Self {
            tenant: tenant.into(),
            namespace: config.namespace.clone(),
            latency_buckets: config.latency_buckets.clone(),
            policy: Box::new(CycleStaleness::new(config.staleness_threshold)),
            active_series_gauge: None,
            series: Mutex::new(HashMap::new()),
        })
    }

    /// Installs the active-series gauge callback.
    ///
    /// The callback is invoked from within the collection critical
    /// section, immediately after the staleness sweep.
    #[must_use]
    pub fn with_active_series_gauge(mut self, gauge: ActiveSeriesGauge) -> Self {
        self.active_series_gauge = Some(gauge);
        self
    }

    /// Replaces the staleness policy.
    #[must_use]
    pub fn with_staleness_policy(mut self, policy: Box<dyn StalenessPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the tenant this processor aggregates for.
    #[must_use]
    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    /// Returns the number of currently tracked series.
    #[must_use]
    pub fn active_series(&self) -> usize {
        self.lock_series().len()
    }

    /// Consumes one batch of resource-scoped spans.
    ///
    /// Spans whose resource lacks a resolvable service name are dropped
    /// silently; that is a filtering policy, not a fault.
    pub fn push_batch(&self, batches: &[ResourceSpans]) {
        for batch in batches {
            let Some(service) = batch.resource.service_name() else {
                debug!(
                    tenant = %self.tenant,
                    spans = batch.spans.len(),
                    "dropping spans from resource without a service name"
                );
                continue;
            };
            for span in &batch.spans {
                self.aggregate_span(service, span);
            }
        }
    }

    fn aggregate_span(&self, service: &str, span: &Span) {
        let key = AggregationKey::from_span(service, span);
        let latency_ms = span.latency_ms();

        // One critical section per span keeps lock hold times bounded and
        // lets ingestion interleave with a concurrent collection cycle.
        let mut series = self.lock_series();
        let state = series
            .entry(key)
            .or_insert_with_key(|k| SeriesState::new(k.labels(), self.latency_buckets.len()));
        self.policy.touch(&mut state.cycles_idle);
        state.calls += 1.0;
        state.latency.observe(&self.latency_buckets, latency_ms);
    }

    /// Sweeps staleness, evicts dead series, and emits the current
    /// cumulative values.
    ///
    /// # Errors
    ///
    /// Returns the first sink error; the remainder of the cycle is
    /// aborted and already-written samples stay written.
    pub fn collect(&self, appender: &mut dyn SampleAppender) -> Result<(), SinkError> {
        let mut series = self.lock_series();

        let before = series.len();
        series.retain(|_, state| !self.policy.advance(&mut state.cycles_idle));
        let evicted = before - series.len();
        if evicted > 0 {
            debug!(tenant = %self.tenant, evicted, "evicted stale series");
        }

        if let Some(gauge) = &self.active_series_gauge {
            #[allow(clippy::cast_precision_loss)]
            gauge(series.len() as f64);
        }

        let timestamp_ms = Utc::now().timestamp_millis();

        for state in series.values() {
            appender.append(
                self.metric_labels(&state.labels, CALLS_METRIC),
                timestamp_ms,
                state.calls,
            )?;
        }

        for state in series.values() {
            appender.append(
                self.metric_labels(&state.labels, LATENCY_COUNT_METRIC),
                timestamp_ms,
                state.latency.count(),
            )?;
            appender.append(
                self.metric_labels(&state.labels, LATENCY_SUM_METRIC),
                timestamp_ms,
                state.latency.sum_ms(),
            )?;
            for (i, count) in state.latency.bucket_counts().iter().enumerate() {
                let bound = self
                    .latency_buckets
                    .get(i)
                    .map_or_else(|| "+Inf".to_string(), |b| format_bound(*b));
                let labels = self
                    .metric_labels(&state.labels, LATENCY_BUCKET_METRIC)
                    .with_label(BUCKET_BOUND_LABEL, bound);
                appender.append(labels, timestamp_ms, *count)?;
            }
        }

        Ok(())
    }

    fn metric_labels(&self, cached: &Labels, metric: &str) -> Labels {
        cached
            .clone()
            .with_label(METRIC_NAME_LABEL, format!("{}_{metric}", self.namespace))
    }

    fn lock_series(&self) -> MutexGuard<'_, HashMap<AggregationKey, SeriesState>> {
        // A poisoned lock means a panic elsewhere mid-update; the counters
        // themselves remain usable.
        self.series.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Processor for SpanMetricsProcessor {
    fn name(&self) -> &'static str {
        PROCESSOR_NAME
    }

    fn push_batch(&self, batches: &[ResourceSpans]) {
        Self::push_batch(self, batches);
    }

    fn collect(&self, appender: &mut dyn SampleAppender) -> Result<(), SinkError> {
        Self::collect(self, appender)
    }

    fn shutdown(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[allow(clippy::cast_possible_truncation)]
fn format_bound(bound: f64) -> String {
    if bound.fract() == 0.0 {
        format!("{}", bound as i64)
    } else {
        bound.to_string()
    }
}
