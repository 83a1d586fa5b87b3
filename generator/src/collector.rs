//! Timer-driven collection loop.
//!
//! The engine itself is caller-driven; this module provides a ready-made
//! driver that invokes [`Processor::collect`] on a fixed period. Cycles
//! for one processor never overlap: the loop awaits each collection
//! before scheduling the next tick. A failed cycle is logged and retried
//! implicitly on the next tick, which re-emits the full cumulative values
//! (safe for consumers, since values are cumulative rather than deltas).

use crate::processor::Processor;
use crate::sink::SampleAppender;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error};

/// Runs the collection loop until the shutdown signal fires.
///
/// The first collection happens one full `period` after the loop starts.
pub async fn run_collection_loop(
    processor: Arc<dyn Processor>,
    mut appender: Box<dyn SampleAppender>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // interval fires immediately; swallow the first tick so the initial
    // collection waits a full period.
    ticker.tick().await;

    debug!(processor = processor.name(), "collection loop started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = processor.collect(appender.as_mut()) {
                    error!(
                        processor = processor.name(),
                        error = %e,
                        "collection cycle failed"
                    );
                }
            }
            _ = shutdown.changed() => {
                debug!(processor = processor.name(), "collection loop stopping");
                break;
            }
        }
    }
}
