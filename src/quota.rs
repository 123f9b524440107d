//! Per-run action budget and pacing.
//!
//! The quota bounds how many outbound actions one run may attempt; the
//! pacer spaces network calls out in time. Both exist to stay inside the
//! network's rate limits and carry no other invariant.

use std::time::Duration;

/// Counts actions against a per-run ceiling. Built fresh for every run.
#[derive(Debug)]
pub struct Quota {
    ceiling: usize,
    taken: usize,
}

impl Quota {
    pub fn new(ceiling: usize) -> Self {
        Self { ceiling, taken: 0 }
    }

    /// Claim one action slot. Returns true and increments iff the
    /// ceiling has not been reached; otherwise false, leaving the
    /// counter untouched. After the first false, every later call is
    /// false too.
    pub fn try_reserve(&mut self) -> bool {
        if self.taken < self.ceiling {
            self.taken += 1;
            true
        } else {
            false
        }
    }

    /// Actions reserved so far this run.
    pub fn taken(&self) -> usize {
        self.taken
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }
}

/// A fixed delay inserted between successive operations.
///
/// `pace` suspends on the tokio timer, so it is cancellable wherever the
/// surrounding future is. A zero delay returns without touching the
/// timer, which keeps tests instant.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    delay: Duration,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub async fn pace(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}
