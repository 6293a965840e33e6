// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling.
//!
//! The expiration engine needs `now()` on two independent clocks. Routing
//! both through a trait keeps [`crate::job`] and the daemon's expiration
//! pass free of `SystemTime`/`nix` calls, so tests can drive both clocks
//! independently with [`FakeClock`].

use crate::time::{ClockKind, Timestamp};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// A source of the current time on either supported clock.
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self, kind: ClockKind) -> Timestamp;
}

/// The real system clock: `CLOCK_BOOTTIME` for [`ClockKind::MonotonicBoot`],
/// `CLOCK_REALTIME` (via `SystemTime`) for [`ClockKind::Wall`].
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self, kind: ClockKind) -> Timestamp {
        match kind {
            ClockKind::MonotonicBoot => boot_time(),
            ClockKind::Wall => wall_time(),
        }
    }
}

fn boot_time() -> Timestamp {
    match nix::time::clock_gettime(nix::time::ClockId::CLOCK_BOOTTIME) {
        Ok(ts) => Timestamp::new(ts.tv_sec(), ts.tv_nsec() as u32),
        // CLOCK_BOOTTIME is always available on the kernels this daemon
        // targets; fall back to CLOCK_MONOTONIC rather than panicking so a
        // container sandbox without it still boots.
        Err(_) => match nix::time::clock_gettime(nix::time::ClockId::CLOCK_MONOTONIC) {
            Ok(ts) => Timestamp::new(ts.tv_sec(), ts.tv_nsec() as u32),
            Err(_) => Timestamp::ZERO,
        },
    }
}

fn wall_time() -> Timestamp {
    let d = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    Timestamp::new(d.as_secs() as i64, d.subsec_nanos())
}

/// Fake clock for tests: independently settable per [`ClockKind`].
#[derive(Clone)]
pub struct FakeClock {
    boot: Arc<Mutex<Timestamp>>,
    wall: Arc<Mutex<Timestamp>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            boot: Arc::new(Mutex::new(Timestamp::new(0, 0))),
            wall: Arc::new(Mutex::new(Timestamp::new(1_700_000_000, 0))),
        }
    }

    pub fn advance(&self, kind: ClockKind, d: std::time::Duration) {
        let slot = match kind {
            ClockKind::MonotonicBoot => &self.boot,
            ClockKind::Wall => &self.wall,
        };
        let mut guard = slot.lock();
        *guard = guard.plus(d);
    }

    pub fn set(&self, kind: ClockKind, t: Timestamp) {
        let slot = match kind {
            ClockKind::MonotonicBoot => &self.boot,
            ClockKind::Wall => &self.wall,
        };
        *slot.lock() = t;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self, kind: ClockKind) -> Timestamp {
        match kind {
            ClockKind::MonotonicBoot => *self.boot.lock(),
            ClockKind::Wall => *self.wall.lock(),
        }
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
