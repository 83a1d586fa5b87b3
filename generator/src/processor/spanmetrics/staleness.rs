//! Staleness tracking and eviction policy.
//!
//! Each series carries an idle-cycle counter: a matching update resets it
//! to zero, and every collection cycle increments it. The policy decides
//! when a counter value means the series is dead. Keeping the decision
//! behind a trait lets a smarter policy (LRU, time-based TTL) replace the
//! counter without touching the aggregation logic.

/// Decides when an idle series is evicted.
pub trait StalenessPolicy: Send + Sync {
    /// Records a matching update for a series.
    fn touch(&self, cycles_idle: &mut u32);

    /// Advances the series by one collection cycle.
    ///
    /// Returns true if the series should be evicted.
    fn advance(&self, cycles_idle: &mut u32) -> bool;
}

/// Counter-based staleness: evict after a fixed number of idle cycles.
///
/// With the default threshold of 4 cycles and a 15 second collection
/// period, a series untouched for about a minute is evicted.
#[derive(Debug, Clone, Copy)]
pub struct CycleStaleness {
    threshold: u32,
}

impl CycleStaleness {
    /// Creates a policy evicting after `threshold` idle cycles.
    #[must_use]
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }
}

impl StalenessPolicy for CycleStaleness {
    fn touch(&self, cycles_idle: &mut u32) {
        *cycles_idle = 0;
    }

    fn advance(&self, cycles_idle: &mut u32) -> bool {
        *cycles_idle += 1;
        *cycles_idle >= self.threshold
    }
}
