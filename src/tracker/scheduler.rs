use crate::tracker::{TickSummary, Tracker};
use crate::utils::fmt_duration;
use std::time::Duration;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, info_span, trace};

/// Runs [`Tracker::run_tick`] once per period until cancelled.
///
/// Ticks never overlap. The first tick starts immediately; later ticks start
/// one period after the previous one *started*, or right away if that tick
/// overran the period.
pub struct Scheduler {
    tracker: Tracker,
    period: Duration,
    cancel: CancellationToken,
}

impl Scheduler {
    pub fn new(tracker: Tracker, period: Duration) -> Self {
        Self {
            tracker,
            period,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops [`Scheduler::run`]. A tick already in progress runs
    /// to completion first.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run a single tick outside the loop.
    pub async fn run_once(&self) -> TickSummary {
        self.tracker
            .run_tick()
            .instrument(info_span!("tick", tick = 1u64))
            .await
    }

    pub async fn run(&self) {
        info!(
            period = fmt_duration(self.period),
            courses = self.tracker.config().courses.len(),
            "Scheduler started"
        );

        let mut next_run = time::Instant::now();
        let mut ticks: u64 = 0;

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!("Scheduler received shutdown signal");
                    break;
                }
                _ = time::sleep_until(next_run) => {
                    let started = time::Instant::now();
                    ticks += 1;

                    let summary = self
                        .tracker
                        .run_tick()
                        .instrument(info_span!("tick", tick = ticks))
                        .await;
                    trace!(outcome = ?summary.outcome, "tick outcome");

                    next_run = started + self.period;
                    if next_run <= time::Instant::now() {
                        trace!("Tick overran the period, starting next one immediately");
                    }
                }
            }
        }

        info!(ticks, "Scheduler stopped");
    }
}
