//! Run clock and the per-run budget.

use chrono::{DateTime, Duration, Utc};

/// Source of "now" for the pipeline.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Wall-clock ceiling and backfill allowance of one run.
///
/// Threaded through the reconciliation loop by `&mut`; nothing else keeps
/// run-scoped counters.
#[derive(Debug, Clone)]
pub struct RunBudget {
    started_at: DateTime<Utc>,
    ceiling: Duration,
    backfills_remaining: usize,
}

impl RunBudget {
    pub fn start(started_at: DateTime<Utc>, ceiling: std::time::Duration, backfill_limit: usize) -> Self {
        Self {
            started_at,
            ceiling: Duration::from_std(ceiling).unwrap_or_else(|_| Duration::days(1)),
            backfills_remaining: backfill_limit,
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        now - self.started_at
    }

    /// True once the ceiling has been reached.
    pub fn is_exhausted(&self, now: DateTime<Utc>) -> bool {
        self.elapsed(now) >= self.ceiling
    }

    /// Claim one backfill slot. False when none are left.
    pub fn take_backfill(&mut self) -> bool {
        if self.backfills_remaining == 0 {
            return false;
        }
        self.backfills_remaining -= 1;
        true
    }

    pub fn backfills_remaining(&self) -> usize {
        self.backfills_remaining
    }
}
