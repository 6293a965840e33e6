// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turns a CLI time string into an absolute deadline on one of the two
//! clocks. A pure function: callers supply "now" on each clock so this
//! module never reads the system clock itself.
//!
//! Grammar (see the CLI surface section of the design doc this crate
//! implements):
//!
//! - `+SEC[.NNNNNNNNN]`        — relative offset from now, boot-monotonic clock.
//! - `HH:MM[:SS[.NNNNNNNNN]][ [Z|z|UTC]]` — time-of-day today, wall clock.
//!   The trailing `Z`/`UTC` marker is optional; when absent, the time is
//!   still assumed to be UTC. If that time has already passed today, it is
//!   shifted forward one day.
//! - `SEC[.NNNNNNNNN]`         — an absolute Unix-epoch second count, wall clock.
//!
//! `HH` is not restricted to 0-23 (a value of 24 or more is legal and
//! carries into the day arithmetic below) and `SS` is not restricted to
//! 0-59 (a leap second, or more than one, can push it higher); only `MM`
//! is bounded to below 60.
//!
//! Nanosecond digits beyond the ninth are ignored, except the tenth digit
//! rounds the ninth up (with carry) when it is 5 or greater.

use crate::error::CoreError;
use crate::time::{ClockKind, Timestamp};
use std::time::Duration;

const SECS_PER_DAY: i64 = 86_400;

/// Parse `input` into an absolute deadline, given the caller's current time
/// on each clock.
pub fn parse_time(
    input: &str,
    now_wall: Timestamp,
    now_boot: Timestamp,
) -> Result<(Timestamp, ClockKind), CoreError> {
    let input = input.trim();
    if let Some(rest) = input.strip_prefix('+') {
        let (secs, nanos) = parse_seconds_and_nanos(rest)
            .ok_or_else(|| CoreError::BadTime(format!("bad relative offset: {input:?}")))?;
        if secs < 0 {
            return Err(CoreError::BadTime(format!("negative offset: {input:?}")));
        }
        let offset = Duration::new(secs as u64, nanos);
        return Ok((now_boot.plus(offset), ClockKind::MonotonicBoot));
    }

    if let Some(tod) = parse_time_of_day(input) {
        let candidate = time_of_day_today(now_wall, tod)?;
        let deadline = if candidate.is_past_or_due(now_wall) {
            candidate.plus(Duration::new(SECS_PER_DAY as u64, 0))
        } else {
            candidate
        };
        return Ok((deadline, ClockKind::Wall));
    }

    let (secs, nanos) = parse_seconds_and_nanos(input)
        .ok_or_else(|| CoreError::BadTime(format!("unparseable time: {input:?}")))?;
    if secs < 0 {
        return Err(CoreError::BadTime(format!("negative epoch seconds: {input:?}")));
    }
    Ok((Timestamp::new(secs, nanos), ClockKind::Wall))
}

#[derive(Debug, Clone, Copy)]
struct TimeOfDay {
    hour: u32,
    minute: u32,
    second: u32,
    nanos: u32,
}

fn parse_time_of_day(input: &str) -> Option<TimeOfDay> {
    // The trailing zone marker is optional; UTC is assumed either way. Only
    // its presence (or absence) is checked here, not stripped validation
    // against anything else, since a colon-free input never reaches this
    // function's caller as a time-of-day candidate in the first place.
    let body = input
        .strip_suffix("UTC")
        .or_else(|| input.strip_suffix('Z'))
        .or_else(|| input.strip_suffix('z'))
        .unwrap_or(input);
    let body = body.trim_end();
    if !body.contains(':') {
        return None;
    }
    let mut parts = body.splitn(3, ':');
    let hour: u32 = parts.next()?.parse().ok()?;
    let minute: u32 = parts.next()?.parse().ok()?;
    let (second, nanos) = match parts.next() {
        Some(sec_part) => parse_seconds_and_nanos(sec_part)
            .filter(|(s, _)| *s >= 0)
            .map(|(s, n)| (s as u32, n))?,
        None => (0, 0),
    };
    // `HH` and `SS` are deliberately unbounded above (24+ hours and 60+
    // seconds are both legal, matching leap seconds and large hour
    // offsets); only `MM` is a true modulus.
    if minute > 59 {
        return None;
    }
    Some(TimeOfDay { hour, minute, second, nanos })
}

/// Combine today's UTC date (derived from `now_wall`) with a time-of-day.
fn time_of_day_today(now_wall: Timestamp, tod: TimeOfDay) -> Result<Timestamp, CoreError> {
    let day_start = now_wall.secs.div_euclid(SECS_PER_DAY) * SECS_PER_DAY;
    let secs_of_day = (tod.hour as i64) * 3600 + (tod.minute as i64) * 60 + tod.second as i64;
    Ok(Timestamp::new(day_start + secs_of_day, tod.nanos))
}

/// Parse `SEC[.NNNNNNNNN]`, applying the truncate/round-with-carry rule to
/// any fractional digits beyond the ninth.
fn parse_seconds_and_nanos(s: &str) -> Option<(i64, u32)> {
    let (int_part, frac_part) = match s.split_once('.') {
        Some((a, b)) => (a, Some(b)),
        None => (s, None),
    };
    if int_part.is_empty() {
        return None;
    }
    let mut secs: i64 = int_part.parse().ok()?;
    let mut nanos = 0u32;
    if let Some(frac) = frac_part {
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let bytes = frac.as_bytes();
        let take = bytes.len().min(9);
        let mut nanos_str = String::with_capacity(9);
        nanos_str.push_str(&frac[..take]);
        while nanos_str.len() < 9 {
            nanos_str.push('0');
        }
        nanos = nanos_str.parse().ok()?;
        if bytes.len() > 9 {
            let tenth = bytes[9] - b'0';
            if tenth >= 5 {
                nanos += 1;
                if nanos == 1_000_000_000 {
                    nanos = 0;
                    secs += 1;
                }
            }
            // Digits past the tenth are ignored.
        }
    }
    Some((secs, nanos))
}

#[cfg(test)]
#[path = "parse_time_tests.rs"]
mod tests;
