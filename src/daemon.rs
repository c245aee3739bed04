//! Collection loop: sleep, poll, extract, write, repeat.
//!
//! ```text
//! Idle ──► Sleeping ──► Polling ──► Extracting ──► Writing ─┐
//!             ▲            │                                │
//!             │            └─ poll failed + process gone ─► Stopped
//!             └─────────────────────────────────────────────┘
//! ```
//!
//! A failed poll is resolved through the liveness check: if the target has
//! exited the loop stops cleanly, otherwise it fails with [`DaemonError`].
//! Sink failures are logged and the loop carries on with the next cycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::collector::{
    Capture, Collector, DiagnosticSource, Liveness, PollError, SourceError, SourceKind,
};
use crate::model::Point;
use crate::sink::Sink;

/// Granularity of the interruptible sleep.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Error type for loop failures.
#[derive(Debug)]
pub enum DaemonError {
    /// A dump failed while the target process was still running.
    Source {
        source: SourceKind,
        cause: SourceError,
    },
}

impl std::fmt::Display for DaemonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DaemonError::Source { source, cause } => write!(
                f,
                "{} collection failed (gops {}): {}",
                source,
                source.subcommand(),
                cause
            ),
        }
    }
}

impl std::error::Error for DaemonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DaemonError::Source { cause, .. } => Some(cause),
        }
    }
}

/// Why the loop stopped without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The target process is gone.
    TargetExited,
    /// The shutdown flag was cleared.
    Shutdown,
}

/// Counters reported when the loop ends cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopSummary {
    pub reason: StopReason,
    pub cycles: u64,
    pub points_written: u64,
    pub failed_writes: u64,
}

/// Loop state. Payload-carrying states own the data of the current cycle.
#[derive(Debug)]
enum State {
    Idle,
    Sleeping,
    Polling,
    Extracting(Capture),
    Writing(Vec<Point>),
    Stopped(StopReason),
}

/// Drives a [`Collector`] until the target exits or shutdown is requested.
pub struct CollectionLoop<S: DiagnosticSource, L: Liveness, K: Sink> {
    collector: Collector<S>,
    liveness: L,
    sink: K,
    interval: Duration,
    running: Arc<AtomicBool>,
    cycles: u64,
    points_written: u64,
    failed_writes: u64,
}

impl<S: DiagnosticSource, L: Liveness, K: Sink> CollectionLoop<S, L, K> {
    pub fn new(collector: Collector<S>, liveness: L, sink: K, interval: Duration) -> Self {
        Self {
            collector,
            liveness,
            sink,
            interval,
            running: Arc::new(AtomicBool::new(true)),
            cycles: 0,
            points_written: 0,
            failed_writes: 0,
        }
    }

    /// Uses an externally owned shutdown flag (set to `false` to stop).
    pub fn with_shutdown_flag(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = running;
        self
    }

    /// Flag that stops the loop at the next cycle boundary when cleared.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn collector(&self) -> &Collector<S> {
        &self.collector
    }

    pub fn liveness(&self) -> &L {
        &self.liveness
    }

    /// Runs until a stop condition is reached.
    pub fn run(&mut self) -> Result<LoopSummary, DaemonError> {
        let mut state = State::Idle;

        let reason = loop {
            state = match state {
                State::Idle => State::Sleeping,
                State::Sleeping => {
                    if self.sleep() {
                        State::Polling
                    } else {
                        State::Stopped(StopReason::Shutdown)
                    }
                }
                State::Polling => match self.collector.poll() {
                    Ok(capture) => State::Extracting(capture),
                    Err(e) => self.on_poll_failure(e)?,
                },
                State::Extracting(capture) => State::Writing(self.collector.extract(&capture)),
                State::Writing(points) => {
                    self.write(&points);
                    State::Sleeping
                }
                State::Stopped(reason) => break reason,
            };
            trace!("state -> {}", state_name(&state));
        };

        let summary = LoopSummary {
            reason,
            cycles: self.cycles,
            points_written: self.points_written,
            failed_writes: self.failed_writes,
        };
        info!(
            "Collection stopped ({:?}): {} cycles, {} points written, {} failed writes",
            summary.reason, summary.cycles, summary.points_written, summary.failed_writes
        );
        Ok(summary)
    }

    /// Sleeps for the interval, waking early on shutdown.
    ///
    /// Returns `false` if shutdown was requested.
    fn sleep(&self) -> bool {
        let mut remaining = self.interval;
        while remaining > Duration::ZERO && self.running.load(Ordering::SeqCst) {
            let slice = remaining.min(SLEEP_SLICE);
            std::thread::sleep(slice);
            remaining = remaining.saturating_sub(slice);
        }
        self.running.load(Ordering::SeqCst)
    }

    fn on_poll_failure(&self, err: PollError) -> Result<State, DaemonError> {
        let pid = self.collector.pid();
        if !self.liveness.is_running(pid) {
            info!(
                "Process {} is no longer running (gops {}: {})",
                pid,
                err.source.subcommand(),
                err.cause
            );
            return Ok(State::Stopped(StopReason::TargetExited));
        }
        Err(DaemonError::Source {
            source: err.source,
            cause: err.cause,
        })
    }

    fn write(&mut self, points: &[Point]) {
        self.cycles += 1;
        let start = Instant::now();

        match self.sink.write(points) {
            Ok(()) => self.points_written += points.len() as u64,
            Err(e) => {
                self.failed_writes += 1;
                warn!("Failed to write {} points: {}", points.len(), e);
            }
        }

        let timing = self.collector.last_timing();
        debug!(
            "Cycle #{}: {} points (memstats {:?}, stats {:?}, extract {:?}, write {:?})",
            self.cycles,
            points.len(),
            timing.memstats,
            timing.stats,
            timing.extract,
            start.elapsed()
        );
    }
}

fn state_name(state: &State) -> &'static str {
    match state {
        State::Idle => "Idle",
        State::Sleeping => "Sleeping",
        State::Polling => "Polling",
        State::Extracting(_) => "Extracting",
        State::Writing(_) => "Writing",
        State::Stopped(_) => "Stopped",
    }
}
