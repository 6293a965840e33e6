// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Absolute timestamps and the two clocks a job's deadline can be measured
//! against.

use std::time::Duration;

/// Which clock a job's `deadline` is measured against.
///
/// The on-disk encoding of this enum (0 = monotonic-boot, 1 = wall) is part
/// of the state file format and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ClockKind {
    /// Boot-relative monotonic time (suspend-inclusive, immune to clock jumps).
    MonotonicBoot = 0,
    /// Wall-clock time (`CLOCK_REALTIME`-equivalent), subject to jumps.
    Wall = 1,
}

impl ClockKind {
    pub fn from_u32(v: u32) -> Option<Self> {
        match v {
            0 => Some(Self::MonotonicBoot),
            1 => Some(Self::Wall),
            _ => None,
        }
    }

    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

/// An absolute point in time on one of the two supported clocks, with
/// nanosecond resolution.
///
/// Never a duration: every `Timestamp` in this system names a moment on its
/// clock, not an offset from "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    pub secs: i64,
    pub nanos: u32,
}

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp { secs: 0, nanos: 0 };

    pub fn new(secs: i64, nanos: u32) -> Self {
        let extra_secs = (nanos / 1_000_000_000) as i64;
        Timestamp { secs: secs + extra_secs, nanos: nanos % 1_000_000_000 }
    }

    /// `self + duration`, as required to turn "now plus a relative offset"
    /// into the absolute deadline this system always stores.
    pub fn plus(self, d: Duration) -> Self {
        let secs = self.secs + d.as_secs() as i64;
        Self::new(secs, self.nanos + d.subsec_nanos())
    }

    /// `self - other`, saturating at zero if `other` is later than `self`.
    pub fn saturating_duration_since(self, other: Timestamp) -> Duration {
        if self <= other {
            return Duration::ZERO;
        }
        let mut secs = self.secs - other.secs;
        let nanos = if self.nanos >= other.nanos {
            self.nanos - other.nanos
        } else {
            secs -= 1;
            self.nanos + 1_000_000_000 - other.nanos
        };
        Duration::new(secs.max(0) as u64, nanos)
    }

    pub fn is_past_or_due(self, now: Timestamp) -> bool {
        self <= now
    }
}

#[cfg(test)]
#[path = "time_tests.rs"]
mod tests;
