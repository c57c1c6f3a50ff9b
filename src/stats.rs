//! Runtime statistics and data structures.
//!
//! [Stats] accumulates per-attempt outcomes for one probe and is consumed
//! into the final [ProbeResult]. Round trips are summed as [Duration]s, so
//! the aggregate is the same whatever order attempts land in.
//! [AttemptReport] and [ProbeResult] are serde-serialisable so the
//! formatting layer can dump them directly.

use serde::Serialize;
use std::{net::SocketAddr, time::Duration};

/// Average reported when no attempt succeeded. A long enough connect
/// timeout could produce a real average of this size, so check
/// [`ProbeResult::is_unmeasurable`] or [`ProbeResult::average`] rather than
/// comparing against it.
pub const LATENCY_UNMEASURABLE: f64 = 99_999.0;

/// Outcome of a single connect attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptOutcome {
    Connected(Duration),
    Failed(String),
}

/// One attempt as shown to listeners and formatters.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttemptReport {
    pub seq: u32,
    pub addr: SocketAddr,
    pub success: bool,
    pub duration_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AttemptReport {
    pub fn new(seq: u32, addr: SocketAddr, outcome: &AttemptOutcome) -> Self {
        match outcome {
            AttemptOutcome::Connected(rtt) => Self {
                seq,
                addr,
                success: true,
                duration_ms: as_ms(*rtt),
                error: None,
            },
            AttemptOutcome::Failed(reason) => Self {
                seq,
                addr,
                success: false,
                duration_ms: 0.0,
                error: Some(reason.clone()),
            },
        }
    }
}

/// Final roll-up of a probe.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProbeResult {
    pub addr: Option<SocketAddr>,
    pub total_count: u32,
    pub success_count: u32,
    pub failed_count: u32,
    pub avg_ms: f64,
    pub best_ms: f64,
    pub worst_ms: f64,
    pub resolve_time_ms: f64,
    pub error: String,
}

impl ProbeResult {
    /// `true` when no attempt succeeded and `avg_ms` holds the sentinel.
    pub fn is_unmeasurable(&self) -> bool {
        self.success_count == 0
    }

    pub fn average(&self) -> Option<f64> {
        (!self.is_unmeasurable()).then_some(self.avg_ms)
    }

    pub fn loss_percent(&self) -> f64 {
        if self.total_count == 0 {
            0.0
        } else {
            100.0 * f64::from(self.failed_count) / f64::from(self.total_count)
        }
    }
}

/// Mutable accumulator owned by a single probe.
#[derive(Debug)]
pub struct Stats {
    expected: u32,
    issued: u32,
    ok: u32,
    failed: u32,
    total_rtt: Duration,
    min_rtt: Duration,
    max_rtt: Duration,
    last_error: String,
    addr: Option<SocketAddr>,
    resolve_time: Duration,
}

impl Stats {
    /// Accumulator for a probe of `expected` attempts.
    pub fn new(expected: u32) -> Self {
        Self {
            expected,
            issued: 0,
            ok: 0,
            failed: 0,
            total_rtt: Duration::ZERO,
            min_rtt: Duration::MAX,
            max_rtt: Duration::ZERO,
            last_error: String::new(),
            addr: None,
            resolve_time: Duration::ZERO,
        }
    }

    pub fn with_target(mut self, addr: SocketAddr, resolve_time: Duration) -> Self {
        self.addr = Some(addr);
        self.resolve_time = resolve_time;
        self
    }

    /// Count an attempt as in flight.
    pub fn issue(&mut self) {
        self.issued += 1;
    }

    /// Mark every attempt as failed without any being issued on the wire,
    /// as when the target could not be resolved.
    pub fn fail_all(&mut self, reason: String) {
        self.issued = self.expected;
        self.failed = self.expected - self.ok;
        self.last_error = reason;
    }

    /// Fold one outcome in. Returns `true` once every expected attempt has
    /// been accounted for.
    pub fn record(&mut self, outcome: &AttemptOutcome) -> bool {
        match outcome {
            AttemptOutcome::Connected(rtt) => {
                self.ok += 1;
                self.total_rtt += *rtt;
                self.min_rtt = self.min_rtt.min(*rtt);
                self.max_rtt = self.max_rtt.max(*rtt);
            }
            AttemptOutcome::Failed(reason) => {
                self.failed += 1;
                self.last_error.clone_from(reason);
            }
        }
        self.is_complete()
    }

    pub fn is_complete(&self) -> bool {
        self.ok + self.failed == self.expected
    }

    /// Produce the final [ProbeResult].
    pub fn finish(self) -> ProbeResult {
        debug_assert!(self.is_complete());

        let (avg_ms, best_ms, worst_ms, error) = if self.ok == 0 {
            (LATENCY_UNMEASURABLE, 0.0, 0.0, self.last_error)
        } else {
            (
                as_ms(self.total_rtt / self.ok),
                as_ms(self.min_rtt),
                as_ms(self.max_rtt),
                String::new(),
            )
        };

        ProbeResult {
            addr: self.addr,
            total_count: self.issued,
            success_count: self.ok,
            failed_count: self.failed,
            avg_ms,
            best_ms,
            worst_ms,
            resolve_time_ms: as_ms(self.resolve_time),
            error,
        }
    }
}

fn as_ms(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1_000_000.0
}
