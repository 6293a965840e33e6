// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sat_core::{ClockKind, Timestamp};
use std::path::PathBuf;
use tempfile::tempdir;

fn job(argv0: &str) -> Job {
    Job {
        id: JobId::new(0),
        clock_kind: ClockKind::MonotonicBoot,
        deadline: Timestamp::new(100, 0),
        argv: vec![argv0.to_string()],
        cwd: PathBuf::from("/tmp"),
        env: vec!["PATH=/usr/bin".to_string()],
    }
}

#[test]
fn append_assigns_monotonically_increasing_ids() {
    let dir = tempdir().unwrap();
    let store = JobStore::open(dir.path().join("state")).unwrap();

    let a = store.append(job("a")).unwrap();
    let b = store.append(job("b")).unwrap();
    let c = store.append(job("c")).unwrap();

    assert_eq!((a.id.get(), b.id.get(), c.id.get()), (1, 2, 3));
}

#[test]
fn iterate_returns_jobs_in_insertion_order() {
    let dir = tempdir().unwrap();
    let store = JobStore::open(dir.path().join("state")).unwrap();
    store.append(job("a")).unwrap();
    store.append(job("b")).unwrap();
    store.append(job("c")).unwrap();

    let jobs = store.iterate().unwrap();
    let argvs: Vec<_> = jobs.iter().map(|j| j.argv[0].clone()).collect();
    assert_eq!(argvs, vec!["a", "b", "c"]);
}

#[test]
fn remove_by_id_preserves_order_of_remainder() {
    let dir = tempdir().unwrap();
    let store = JobStore::open(dir.path().join("state")).unwrap();
    let a = store.append(job("a")).unwrap();
    let b = store.append(job("b")).unwrap();
    let c = store.append(job("c")).unwrap();

    let removed = store.remove(|j| j.id == b.id).unwrap().unwrap();
    assert_eq!(removed.id, b.id);

    let remaining = store.iterate().unwrap();
    assert_eq!(remaining.iter().map(|j| j.id).collect::<Vec<_>>(), vec![a.id, c.id]);
}

#[test]
fn remove_on_missing_id_returns_none() {
    let dir = tempdir().unwrap();
    let store = JobStore::open(dir.path().join("state")).unwrap();
    store.append(job("a")).unwrap();

    let removed = store.remove(|j| j.id.get() == 999).unwrap();
    assert!(removed.is_none());
}

#[test]
fn is_nonempty_tracks_queue_state() {
    let dir = tempdir().unwrap();
    let store = JobStore::open(dir.path().join("state")).unwrap();
    assert!(!store.is_nonempty().unwrap());

    let a = store.append(job("a")).unwrap();
    assert!(store.is_nonempty().unwrap());

    store.remove(|j| j.id == a.id).unwrap();
    assert!(!store.is_nonempty().unwrap());
}

#[test]
fn counter_survives_reopen_and_stays_monotone_across_removals() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state");
    {
        let store = JobStore::open(&path).unwrap();
        let a = store.append(job("a")).unwrap();
        store.remove(|j| j.id == a.id).unwrap();
    }
    let store = JobStore::open(&path).unwrap();
    let b = store.append(job("b")).unwrap();
    assert_eq!(b.id.get(), 2);
}

#[test]
fn remove_first_present_matches_head_of_queue() {
    let dir = tempdir().unwrap();
    let store = JobStore::open(dir.path().join("state")).unwrap();
    let a = store.append(job("a")).unwrap();
    store.append(job("b")).unwrap();

    let removed = store.remove(|_| true).unwrap().unwrap();
    assert_eq!(removed.id, a.id);
}
