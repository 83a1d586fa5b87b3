//! Cumulative latency histogram accumulator.
//!
//! Bucket counts follow the conventional cumulative rule: an observation
//! increments every bucket whose upper bound is greater than or equal to
//! the observed latency, and always the overflow bucket. A bucket with
//! bound `le` therefore counts all observations `<= le`, accumulated over
//! the lifetime of the series.

/// Cumulative per-series latency statistics: bucket counts, sum, and count.
///
/// Bucket boundaries are shared by all series of a processor and passed in
/// on each observation; the accumulator only holds the counts (one per
/// boundary plus the overflow bucket).
#[derive(Debug, Clone, PartialEq)]
pub struct LatencyHistogram {
    bucket_counts: Vec<f64>,
    sum_ms: f64,
    count: f64,
}

impl LatencyHistogram {
    /// Creates an empty accumulator for `num_bounds` configured boundaries.
    #[must_use]
    pub fn new(num_bounds: usize) -> Self {
        Self {
            bucket_counts: vec![0.0; num_bounds + 1],
            sum_ms: 0.0,
            count: 0.0,
        }
    }

    /// Records one latency observation against the given boundaries.
    ///
    /// `bounds` must be the sorted boundary list this accumulator was
    /// created for. Negative and zero latencies are recorded as-is.
    pub fn observe(&mut self, bounds: &[f64], latency_ms: f64) {
        debug_assert_eq!(bounds.len() + 1, self.bucket_counts.len());

        self.count += 1.0;
        self.sum_ms += latency_ms;

        // First bucket whose bound covers the observation; every bucket
        // from there up, including overflow, counts it.
        let idx = bounds.partition_point(|b| *b < latency_ms);
        for count in &mut self.bucket_counts[idx..] {
            *count += 1.0;
        }
    }

    /// Returns the cumulative observation count.
    #[must_use]
    pub fn count(&self) -> f64 {
        self.count
    }

    /// Returns the cumulative latency sum in milliseconds.
    #[must_use]
    pub fn sum_ms(&self) -> f64 {
        self.sum_ms
    }

    /// Returns the cumulative bucket counts, overflow bucket last.
    #[must_use]
    pub fn bucket_counts(&self) -> &[f64] {
        &self.bucket_counts
    }
}
