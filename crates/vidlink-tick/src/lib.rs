//! Fixed-timestep tick clock for the vidlink client.
//!
//! The client loop is a single cooperative task: each tick the scripted
//! server sends, the router dispatches, the handler polls, and the engine
//! advances. [`TickScheduler`] paces that loop and hands out the tick's
//! `now` explicitly, so nothing downstream reads a global clock.
//!
//! ```ignore
//! let mut scheduler = TickScheduler::new(TickConfig::with_rate(60));
//! loop {
//!     let info = scheduler.wait_for_tick().await;
//!     client.tick(info.now)?;
//!     scheduler.record_tick_end();
//! }
//! ```
//!
//! All timing goes through `tokio::time`, so tests can pause and advance
//! the clock deterministically.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};
use vidlink_protocol::Millis;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What to do when the loop falls behind.
///
/// A tick counts as late (an overrun) when it fires more than a tenth of a
/// tick after its deadline, usually because the previous tick's work or
/// the host stalled. Both policies still report the late tick; they differ
/// in when the *next* one is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickPolicy {
    /// Forget the missed ticks and schedule the next one a full tick after
    /// the late one fired.
    ///
    /// The missed count is reported in [`TickInfo::ticks_skipped`] and
    /// [`TickMetrics::total_skipped`]. `now` jumps forward, so movement and
    /// action expiry catch up in one step rather than tick by tick. This
    /// can't spiral: a slow tick never causes more ticks to be queued.
    #[default]
    Skip,
    /// Keep the original cadence. Every deadline stays on the grid laid
    /// down when the scheduler started, so late ticks fire back to back
    /// until the loop has caught up.
    ///
    /// Useful when each tick must be observed, e.g. when comparing runs.
    /// If the work per tick is consistently over budget the backlog never
    /// clears, so prefer [`Skip`](Self::Skip) for a live client.
    Drop,
}

/// Tick loop configuration.
///
/// Values are not checked at construction. [`TickScheduler::new`] runs
/// [`validated`](Self::validated) first, so an out-of-range rate is clamped
/// with a warning instead of panicking or dividing by zero.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Ticks per second.
    pub tick_rate_hz: u32,
    /// Overrun handling.
    pub policy: TickPolicy,
    /// Fraction of the tick budget (0.0–1.0) above which
    /// [`TickScheduler::record_tick_end`] logs a warning.
    pub budget_warn_threshold: f64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            policy: TickPolicy::default(),
            budget_warn_threshold: 0.80,
        }
    }
}

impl TickConfig {
    /// Slowest supported rate.
    pub const MIN_TICK_RATE_HZ: u32 = 1;
    /// Fastest supported rate.
    pub const MAX_TICK_RATE_HZ: u32 = 240;

    /// Default config at `tick_rate_hz`.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            ..Default::default()
        }
    }

    /// Clamps out-of-range values. Called by [`TickScheduler::new`].
    pub fn validated(mut self) -> Self {
        let clamped = self
            .tick_rate_hz
            .clamp(Self::MIN_TICK_RATE_HZ, Self::MAX_TICK_RATE_HZ);
        if clamped != self.tick_rate_hz {
            warn!(
                requested = self.tick_rate_hz,
                using = clamped,
                "tick rate out of range, clamping"
            );
            self.tick_rate_hz = clamped;
        }
        self.budget_warn_threshold = self.budget_warn_threshold.clamp(0.0, 1.0);
        self
    }

    /// Length of one tick.
    pub fn tick_duration(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.tick_rate_hz.max(1)))
    }
}

// ---------------------------------------------------------------------------
// Per-tick info and metrics
// ---------------------------------------------------------------------------

/// What [`TickScheduler::wait_for_tick`] returns.
#[derive(Debug, Clone, PartialEq)]
pub struct TickInfo {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// Milliseconds since the scheduler was created. This is the `now`
    /// passed to every time-dependent call during the tick.
    pub now: Millis,
    /// Nominal tick length.
    pub dt: Duration,
    /// The tick fired more than 10% late.
    pub overrun: bool,
    /// Whole ticks skipped because of the overrun (Skip policy only).
    pub ticks_skipped: u64,
}

/// Running totals kept by the scheduler.
///
/// Updated on every [`TickScheduler::wait_for_tick`] and
/// [`TickScheduler::record_tick_end`]; read them through
/// [`TickScheduler::metrics`]. The client logs them when its loop ends.
#[derive(Debug, Clone, Default)]
pub struct TickMetrics {
    /// Ticks fired.
    pub total_ticks: u64,
    /// Ticks that fired more than a tenth of a tick late.
    pub total_overruns: u64,
    /// Ticks skipped under [`TickPolicy::Skip`].
    pub total_skipped: u64,
    /// Work time of the most recent tick, as measured by `record_tick_end`.
    pub last_tick_time: Duration,
    /// Longest work time seen so far.
    pub max_tick_time: Duration,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Paces the client loop at a fixed rate.
///
/// The scheduler owns the client's clock. Its origin is the moment it was
/// created, and every [`TickInfo::now`] is measured from there in whole
/// milliseconds. Deadlines are kept as `tokio::time::Instant`s, so a test
/// runtime started with `start_paused = true` drives the loop without
/// real sleeping: each `wait_for_tick` advances the paused clock exactly
/// to the next deadline.
///
/// One tick has two halves. [`wait_for_tick`](Self::wait_for_tick) sleeps
/// to the deadline and marks the start of the tick's work.
/// [`record_tick_end`](Self::record_tick_end) marks the end and compares
/// the work time with the budget. Skipping `record_tick_end` is harmless;
/// the tick just goes unmeasured.
pub struct TickScheduler {
    config: TickConfig,
    tick_duration: Duration,
    tick_count: u64,
    origin: Instant,
    next_tick: Instant,
    tick_start: Option<Instant>,
    metrics: TickMetrics,
}

impl TickScheduler {
    /// Creates a scheduler whose first tick is one tick from now.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let tick_duration = config.tick_duration();
        let origin = Instant::now();

        debug!(
            rate_hz = config.tick_rate_hz,
            budget_ms = tick_duration.as_secs_f64() * 1000.0,
            policy = ?config.policy,
            "tick scheduler created"
        );

        Self {
            config,
            tick_duration,
            tick_count: 0,
            origin,
            next_tick: origin + tick_duration,
            tick_start: None,
            metrics: TickMetrics::default(),
        }
    }

    /// Scheduler at `tick_rate_hz` with default settings.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self::new(TickConfig::with_rate(tick_rate_hz))
    }

    /// Sleeps until the next tick is due and returns its [`TickInfo`].
    ///
    /// If the deadline has already passed the call returns at once, and the
    /// lateness decides the overrun handling per [`TickPolicy`]. Cancel
    /// safe: dropping the future before it completes leaves the schedule
    /// untouched, so it can sit in a `tokio::select!` next to a shutdown
    /// signal.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let due = self.next_tick;
        let dt = self.tick_duration;
        time::sleep_until(due).await;

        let fired = Instant::now();
        self.tick_count += 1;
        self.tick_start = Some(fired);

        let late_by = fired.saturating_duration_since(due);
        let overrun = late_by > dt / 10;
        let mut ticks_skipped = 0;

        self.next_tick = match self.config.policy {
            TickPolicy::Skip => {
                if overrun {
                    ticks_skipped = (late_by.as_nanos() / dt.as_nanos()) as u64;
                    warn!(
                        tick = self.tick_count,
                        skipped = ticks_skipped,
                        late_ms = late_by.as_secs_f64() * 1000.0,
                        "tick overrun, skipping ahead"
                    );
                }
                fired + dt
            }
            TickPolicy::Drop => {
                if overrun {
                    warn!(
                        tick = self.tick_count,
                        late_ms = late_by.as_secs_f64() * 1000.0,
                        "tick overrun, keeping cadence"
                    );
                }
                due + dt
            }
        };

        self.metrics.total_ticks += 1;
        self.metrics.total_skipped += ticks_skipped;
        if overrun {
            self.metrics.total_overruns += 1;
        }

        let now = self.millis_at(fired);
        trace!(tick = self.tick_count, now, overrun, "tick fired");

        TickInfo {
            tick: self.tick_count,
            now,
            dt,
            overrun,
            ticks_skipped,
        }
    }

    /// Marks the end of the current tick's work and checks it against the
    /// budget. Does nothing if no tick is in progress.
    pub fn record_tick_end(&mut self) {
        let Some(start) = self.tick_start.take() else {
            return;
        };
        let elapsed = start.elapsed();

        let utilization = elapsed.as_secs_f64() / self.tick_duration.as_secs_f64();
        if utilization >= self.config.budget_warn_threshold {
            warn!(
                tick = self.tick_count,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                budget_ms = self.tick_duration.as_secs_f64() * 1000.0,
                utilization_pct = format!("{:.1}", utilization * 100.0),
                "tick close to or over budget"
            );
        }

        self.metrics.last_tick_time = elapsed;
        if elapsed > self.metrics.max_tick_time {
            self.metrics.max_tick_time = elapsed;
        }
    }

    /// Milliseconds since the scheduler was created.
    pub fn elapsed_ms(&self) -> Millis {
        self.millis_at(Instant::now())
    }

    /// Ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Length of one tick.
    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    /// The configured (validated) rate.
    pub fn tick_rate_hz(&self) -> u32 {
        self.config.tick_rate_hz
    }

    pub fn metrics(&self) -> &TickMetrics {
        &self.metrics
    }

    fn millis_at(&self, at: Instant) -> Millis {
        at.saturating_duration_since(self.origin).as_millis() as Millis
    }
}
