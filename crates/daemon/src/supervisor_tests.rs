// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::lifecycle;
use sat_core::{ClockKind, FakeClock, Job, JobId};
use tempfile::tempdir;

fn test_config(dir: &std::path::Path) -> lifecycle::Config {
    lifecycle::Config {
        socket_path: dir.join("socket"),
        state_path: dir.join("state"),
        lock_path: dir.join("lock"),
        hook_path: None,
        runtime_dir: dir.to_path_buf(),
    }
}

#[test]
fn sleep_duration_falls_back_to_idle_poll_when_nothing_is_due() {
    let clock = FakeClock::new();
    let d = sleep_duration(&clock, ClockKind::Wall, None);
    assert_eq!(d, IDLE_POLL);
}

#[test]
fn sleep_duration_is_the_gap_to_the_next_deadline() {
    let clock = FakeClock::new();
    let now = clock.now(ClockKind::Wall);
    let deadline = now.plus(std::time::Duration::from_secs(45));
    let d = sleep_duration(&clock, ClockKind::Wall, Some(deadline));
    assert_eq!(d, std::time::Duration::from_secs(45));
}

#[tokio::test]
async fn exits_immediately_when_the_queue_starts_empty() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let startup = lifecycle::startup(&config).await.unwrap();

    let result = tokio::time::timeout(std::time::Duration::from_secs(5), run(config, startup, FakeClock::new())).await;

    assert!(result.is_ok(), "supervisor did not exit on an empty queue");
    assert!(result.unwrap().is_ok());
}

#[tokio::test]
async fn fires_an_overdue_job_before_exiting_idle() {
    let dir = tempdir().unwrap();
    let config = test_config(dir.path());
    let startup = lifecycle::startup(&config).await.unwrap();
    let clock = FakeClock::new();

    let marker = dir.path().join("ran");
    startup
        .store
        .append(Job {
            id: JobId::new(0),
            clock_kind: ClockKind::Wall,
            deadline: clock.now(ClockKind::Wall),
            argv: vec!["/bin/sh".into(), "-c".into(), format!("touch {}", marker.display())],
            cwd: std::env::temp_dir(),
            env: vec!["PATH=/usr/bin:/bin".into()],
        })
        .unwrap();

    let result = tokio::time::timeout(std::time::Duration::from_secs(5), run(config, startup, clock)).await;

    assert!(result.is_ok(), "supervisor did not exit after firing its only job");
    assert!(marker.exists());
}
