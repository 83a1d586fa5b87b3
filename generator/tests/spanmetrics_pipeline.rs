//! End-to-end tests for the span-metrics pipeline: push batches, run
//! collection cycles against a sink, and verify the emitted samples.

use generator::config::SpanMetricsConfig;
use generator::processor::spanmetrics::SpanMetricsProcessor;
use generator::processor::Processor;
use generator::sink::{InMemorySampleSink, SampleAppender, SeriesRef, SinkError};
use shared::models::{
    Labels, Resource, ResourceSpans, Span, SpanKind, SpanStatus, BUCKET_BOUND_LABEL,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn span_with_latency(name: &str, latency_ms: u64) -> Span {
    Span::new(name)
        .with_kind(SpanKind::Server)
        .with_status(SpanStatus::Ok)
        .with_times(1_000_000_000, 1_000_000_000 + latency_ms * 1_000_000)
}

/// A sink that fails every append once `fail_after` samples have been
/// written, keeping the ones written before the failure.
struct FailAfterSink {
    inner: InMemorySampleSink,
    fail_after: usize,
}

impl SampleAppender for FailAfterSink {
    fn append(
        &mut self,
        labels: Labels,
        timestamp_ms: i64,
        value: f64,
    ) -> Result<SeriesRef, SinkError> {
        if self.inner.len() >= self.fail_after {
            return Err(SinkError::Unavailable("storage shard down".to_string()));
        }
        self.inner.append(labels, timestamp_ms, value)
    }
}

#[test]
fn aggregates_calls_and_latency_for_one_key() {
    let processor =
        SpanMetricsProcessor::new("tenant-a", &SpanMetricsConfig::default()).unwrap();

    // Three spans for (svcA, op1, SERVER, OK) with latencies 5, 20, 200 ms.
    let batch = ResourceSpans::for_service("svcA")
        .with_span(span_with_latency("op1", 5))
        .with_span(span_with_latency("op1", 20))
        .with_span(span_with_latency("op1", 200));
    processor.push_batch(&[batch]);

    let mut sink = InMemorySampleSink::new();
    processor.collect(&mut sink).unwrap();

    let calls = sink.samples_named("tracelight_calls_total");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].value, 3.0);

    let count = sink.samples_named("tracelight_latency_count");
    assert_eq!(count.len(), 1);
    assert_eq!(count[0].value, 3.0);

    let sum = sink.samples_named("tracelight_latency_sum");
    assert_eq!(sum.len(), 1);
    assert_eq!(sum[0].value, 225.0);

    // Cumulative convention: each observation counts in every bucket whose
    // bound is >= the latency, and in the overflow bucket.
    let buckets = sink.samples_named("tracelight_latency_bucket");
    let by_bound: Vec<(&str, f64)> = buckets
        .iter()
        .map(|s| (s.labels.get(BUCKET_BOUND_LABEL).unwrap(), s.value))
        .collect();
    assert_eq!(
        by_bound,
        vec![
            ("1", 0.0),
            ("10", 1.0),
            ("50", 2.0),
            ("100", 2.0),
            ("500", 3.0),
            ("+Inf", 3.0),
        ]
    );
}

#[test]
fn emits_expected_sample_count_per_live_series() {
    let processor =
        SpanMetricsProcessor::new("tenant-a", &SpanMetricsConfig::default()).unwrap();

    let batch = ResourceSpans::for_service("svcA")
        .with_span(span_with_latency("op1", 5))
        .with_span(span_with_latency("op2", 5));
    processor.push_batch(&[batch]);

    let mut sink = InMemorySampleSink::new();
    processor.collect(&mut sink).unwrap();

    // Per series: calls + latency_count + latency_sum + 5 buckets + overflow.
    assert_eq!(sink.len(), 2 * (3 + 5 + 1));
}

#[test]
fn distinct_dimensions_produce_distinct_series() {
    let processor =
        SpanMetricsProcessor::new("tenant-a", &SpanMetricsConfig::default()).unwrap();

    let ok = span_with_latency("op1", 5);
    let error = span_with_latency("op1", 5).with_status(SpanStatus::Error);
    let client = span_with_latency("op1", 5).with_kind(SpanKind::Client);
    processor.push_batch(&[ResourceSpans::for_service("svcA")
        .with_span(ok)
        .with_span(error)
        .with_span(client)]);
    processor.push_batch(&[
        ResourceSpans::for_service("svcB").with_span(span_with_latency("op1", 5))
    ]);

    assert_eq!(processor.active_series(), 4);
}

#[test]
fn spans_without_service_name_produce_no_samples() {
    let processor =
        SpanMetricsProcessor::new("tenant-a", &SpanMetricsConfig::default()).unwrap();

    let batch = ResourceSpans::new(Resource::new().with_attribute("host.name", "node-1"))
        .with_span(span_with_latency("op1", 5));
    processor.push_batch(&[batch]);

    let mut sink = InMemorySampleSink::new();
    processor.collect(&mut sink).unwrap();

    assert!(sink.is_empty());
}

#[test]
fn series_present_for_three_cycles_absent_after_fourth() {
    let processor =
        SpanMetricsProcessor::new("tenant-a", &SpanMetricsConfig::default()).unwrap();
    processor.push_batch(&[
        ResourceSpans::for_service("svcA").with_span(span_with_latency("op1", 5))
    ]);

    for cycle in 1..=3 {
        let mut sink = InMemorySampleSink::new();
        processor.collect(&mut sink).unwrap();
        assert_eq!(
            sink.samples_named("tracelight_calls_total").len(),
            1,
            "series should still be emitted on cycle {cycle}"
        );
    }

    let mut sink = InMemorySampleSink::new();
    processor.collect(&mut sink).unwrap();
    assert!(sink.is_empty(), "series should be evicted on cycle 4");
}

#[test]
fn series_touched_between_sweeps_survives() {
    let processor =
        SpanMetricsProcessor::new("tenant-a", &SpanMetricsConfig::default()).unwrap();

    for _ in 0..6 {
        processor.push_batch(&[
            ResourceSpans::for_service("svcA").with_span(span_with_latency("op1", 5))
        ]);
        let mut sink = InMemorySampleSink::new();
        processor.collect(&mut sink).unwrap();
        assert_eq!(sink.samples_named("tracelight_calls_total").len(), 1);
    }

    // Cumulative totals keep growing across cycles.
    let mut sink = InMemorySampleSink::new();
    processor.push_batch(&[
        ResourceSpans::for_service("svcA").with_span(span_with_latency("op1", 5))
    ]);
    processor.collect(&mut sink).unwrap();
    assert_eq!(sink.samples_named("tracelight_calls_total")[0].value, 7.0);
}

#[test]
fn gauge_tracks_cardinality_through_eviction() {
    let observed = Arc::new(AtomicUsize::new(usize::MAX));
    let observed_in_gauge = Arc::clone(&observed);

    let processor = SpanMetricsProcessor::new("tenant-a", &SpanMetricsConfig::default())
        .unwrap()
        .with_active_series_gauge(Box::new(move |value| {
            observed_in_gauge.store(value as usize, Ordering::SeqCst);
        }));

    processor.push_batch(&[ResourceSpans::for_service("svcA")
        .with_span(span_with_latency("op1", 5))
        .with_span(span_with_latency("op2", 5))
        .with_span(span_with_latency("op3", 5))]);

    let mut sink = InMemorySampleSink::new();
    processor.collect(&mut sink).unwrap();
    assert_eq!(observed.load(Ordering::SeqCst), 3);

    for _ in 0..4 {
        processor.collect(&mut sink).unwrap();
    }
    assert_eq!(observed.load(Ordering::SeqCst), 0);
}

#[test]
fn failed_cycle_keeps_state_and_next_cycle_reemits_everything() {
    let processor =
        SpanMetricsProcessor::new("tenant-a", &SpanMetricsConfig::default()).unwrap();
    processor.push_batch(&[ResourceSpans::for_service("svcA")
        .with_span(span_with_latency("op1", 5))
        .with_span(span_with_latency("op1", 20))
        .with_span(span_with_latency("op1", 200))]);

    // Third append fails; the two samples before it stay written.
    let mut failing = FailAfterSink {
        inner: InMemorySampleSink::new(),
        fail_after: 2,
    };
    let result = processor.collect(&mut failing);
    assert!(matches!(result, Err(SinkError::Unavailable(_))));
    assert_eq!(failing.inner.len(), 2);

    // A retried cycle re-emits the full cumulative values: no data was
    // lost, consumers just see a duplicate delivery.
    let mut sink = InMemorySampleSink::new();
    processor.collect(&mut sink).unwrap();
    assert_eq!(sink.len(), 9);
    assert_eq!(sink.samples_named("tracelight_calls_total")[0].value, 3.0);
    assert_eq!(sink.samples_named("tracelight_latency_sum")[0].value, 225.0);
}

#[test]
fn custom_namespace_prefixes_metric_names() {
    let config = SpanMetricsConfig {
        namespace: "acme".to_string(),
        ..SpanMetricsConfig::default()
    };
    let processor = SpanMetricsProcessor::new("tenant-a", &config).unwrap();
    processor.push_batch(&[
        ResourceSpans::for_service("svcA").with_span(span_with_latency("op1", 5))
    ]);

    let mut sink = InMemorySampleSink::new();
    processor.collect(&mut sink).unwrap();

    assert_eq!(sink.samples_named("acme_calls_total").len(), 1);
    assert_eq!(sink.samples_named("tracelight_calls_total").len(), 0);
}

#[test]
fn custom_bucket_boundaries_shape_emission() {
    let config = SpanMetricsConfig {
        latency_buckets: vec![2.5, 25.0],
        ..SpanMetricsConfig::default()
    };
    let processor = SpanMetricsProcessor::new("tenant-a", &config).unwrap();
    processor.push_batch(&[
        ResourceSpans::for_service("svcA").with_span(span_with_latency("op1", 5))
    ]);

    let mut sink = InMemorySampleSink::new();
    processor.collect(&mut sink).unwrap();

    let buckets = sink.samples_named("tracelight_latency_bucket");
    let by_bound: Vec<(&str, f64)> = buckets
        .iter()
        .map(|s| (s.labels.get(BUCKET_BOUND_LABEL).unwrap(), s.value))
        .collect();
    assert_eq!(by_bound, vec![("2.5", 0.0), ("25", 1.0), ("+Inf", 1.0)]);
    assert_eq!(sink.len(), 3 + 2 + 1);
}

#[test]
fn processor_registers_under_its_pipeline_name() {
    let processor =
        SpanMetricsProcessor::new("tenant-a", &SpanMetricsConfig::default()).unwrap();
    let processor: &dyn Processor = &processor;

    assert_eq!(processor.name(), "spanmetrics");
    assert!(processor.shutdown().is_ok());
}

#[test]
fn concurrent_ingestion_is_fully_counted() {
    let processor = Arc::new(
        SpanMetricsProcessor::new("tenant-a", &SpanMetricsConfig::default()).unwrap(),
    );

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let processor = Arc::clone(&processor);
            std::thread::spawn(move || {
                for _ in 0..100 {
                    processor.push_batch(&[ResourceSpans::for_service("svcA")
                        .with_span(span_with_latency("op1", 5))]);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut sink = InMemorySampleSink::new();
    processor.collect(&mut sink).unwrap();
    assert_eq!(sink.samples_named("tracelight_calls_total")[0].value, 800.0);
    assert_eq!(
        sink.samples_named("tracelight_latency_count")[0].value,
        800.0
    );
}
