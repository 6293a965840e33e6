// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn plus_carries_nanos_into_seconds() {
    let t = Timestamp::new(10, 900_000_000);
    let t = t.plus(Duration::new(0, 200_000_000));
    assert_eq!(t, Timestamp::new(11, 100_000_000));
}

#[test]
fn saturating_duration_since_clamps_to_zero() {
    let earlier = Timestamp::new(5, 0);
    let later = Timestamp::new(10, 0);
    assert_eq!(earlier.saturating_duration_since(later), Duration::ZERO);
    assert_eq!(later.saturating_duration_since(earlier), Duration::new(5, 0));
}

#[test]
fn saturating_duration_since_borrows_a_second_for_nanos() {
    let earlier = Timestamp::new(5, 500_000_000);
    let later = Timestamp::new(7, 100_000_000);
    assert_eq!(later.saturating_duration_since(earlier), Duration::new(1, 600_000_000));
}

#[test]
fn is_past_or_due() {
    let now = Timestamp::new(100, 0);
    assert!(Timestamp::new(99, 0).is_past_or_due(now));
    assert!(Timestamp::new(100, 0).is_past_or_due(now));
    assert!(!Timestamp::new(101, 0).is_past_or_due(now));
}

#[test]
fn clock_kind_roundtrips_through_wire_encoding() {
    assert_eq!(ClockKind::from_u32(0), Some(ClockKind::MonotonicBoot));
    assert_eq!(ClockKind::from_u32(1), Some(ClockKind::Wall));
    assert_eq!(ClockKind::from_u32(2), None);
    assert_eq!(ClockKind::MonotonicBoot.as_u32(), 0);
    assert_eq!(ClockKind::Wall.as_u32(), 1);
}
