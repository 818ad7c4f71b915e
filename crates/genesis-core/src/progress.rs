//! Hash rate measurement and progress reporting for the nonce search.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::info;

/// Default number of nonces between progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: u32 = 1_000_000;

/// Size of the full nonce space, used for time estimates.
pub const NONCE_SPACE: f64 = 4_294_967_296.0;

/// A progress observation emitted during the search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressReport {
    /// Nonce that completed the interval.
    pub nonce: u32,
    /// Header time being searched.
    pub time: u32,
    /// Hashes per second over the last interval (rounded).
    pub hashrate: u64,
    /// Estimated hours to sweep the whole nonce space at this rate.
    pub estimate_hours: f64,
    /// Wall-clock time of the last interval.
    pub elapsed: Duration,
}

/// Hash rate over `hashes` computed in `elapsed`, rounded to an integer.
pub fn hashrate(hashes: u64, elapsed: Duration) -> u64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return u64::MAX;
    }
    (hashes as f64 / secs).round() as u64
}

/// Hours needed to try all 2^32 nonces at `hashrate`, to one decimal.
pub fn estimate_hours(hashrate: u64) -> f64 {
    if hashrate == 0 {
        return f64::INFINITY;
    }
    (NONCE_SPACE / hashrate as f64 / 3600.0 * 10.0).round() / 10.0
}

/// Turns interval boundaries into [`ProgressReport`]s.
#[derive(Debug, Clone)]
pub struct HashrateMeter {
    interval: u32,
    last_report: Instant,
}

impl HashrateMeter {
    /// Create a meter reporting every `interval` hashes, starting now.
    pub fn new(interval: u32) -> Self {
        HashrateMeter {
            interval: interval.max(1),
            last_report: Instant::now(),
        }
    }

    /// Hashes per report.
    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Whether `nonce` closes a reporting interval.
    #[inline]
    pub fn is_boundary(&self, nonce: u32) -> bool {
        nonce % self.interval == self.interval - 1
    }

    /// Close an interval at `now` and produce its report.
    pub fn record_at(&mut self, nonce: u32, time: u32, now: Instant) -> ProgressReport {
        let elapsed = now.saturating_duration_since(self.last_report);
        self.last_report = now;

        let rate = hashrate(self.interval as u64, elapsed);
        ProgressReport {
            nonce,
            time,
            hashrate: rate,
            estimate_hours: estimate_hours(rate),
            elapsed,
        }
    }

    /// Close an interval now.
    pub fn record(&mut self, nonce: u32, time: u32) -> ProgressReport {
        self.record_at(nonce, time, Instant::now())
    }
}

/// Receives progress reports from the search.
///
/// Called from the mining loop, so implementations should return quickly.
pub trait ProgressSink: Send + Sync {
    /// Handle one report.
    fn report(&self, report: &ProgressReport);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressReport) + Send + Sync,
{
    fn report(&self, report: &ProgressReport) {
        self(report)
    }
}

/// Logs progress reports at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, report: &ProgressReport) {
        info!(
            nonce = report.nonce,
            time = report.time,
            estimate_hours = report.estimate_hours,
            "{} hash/s",
            report.hashrate
        );
    }
}

/// Discards progress reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _report: &ProgressReport) {}
}
