// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sat_core::{Clock, ClockKind, FakeClock};
use sat_storage::{record, JobStore};
use tempfile::tempdir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn job(argv: Vec<&str>, deadline: sat_core::Timestamp) -> Job {
    Job {
        id: JobId::new(0),
        clock_kind: ClockKind::Wall,
        deadline,
        argv: argv.into_iter().map(String::from).collect(),
        cwd: std::env::temp_dir(),
        env: vec!["PATH=/usr/bin:/bin".to_string()],
    }
}

fn shared(dir: &std::path::Path) -> Arc<Shared<FakeClock>> {
    let store = JobStore::open(dir.join("state")).unwrap();
    Arc::new(Shared::new(store, None, FakeClock::new()))
}

#[tokio::test]
async fn enqueue_appends_to_the_store_and_assigns_an_id() {
    let dir = tempdir().unwrap();
    let shared = shared(dir.path());
    let (mut client, server) = UnixStream::pair().unwrap();

    let j = job(vec!["/bin/true"], shared.clock.now(ClockKind::Wall));
    let payload = record::encode_job(&j);

    client.write_all(&[CommandTag::Enqueue.as_u8()]).await.unwrap();
    client.write_all(&payload).await.unwrap();
    client.shutdown().await.unwrap();

    handle_connection(Arc::clone(&shared), server).await;

    let jobs = shared.store.iterate().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].argv, vec!["/bin/true".to_string()]);

    let mut response = Vec::new();
    client.read_to_end(&mut response).await.unwrap();
    assert_eq!(response[0], StreamId::End.as_u8());
}

#[tokio::test]
async fn list_streams_one_line_per_job_on_stdout() {
    let dir = tempdir().unwrap();
    let shared = shared(dir.path());
    shared.store.append(job(vec!["/bin/true", "hello world"], shared.clock.now(ClockKind::Wall))).unwrap();

    let (mut client, server) = UnixStream::pair().unwrap();
    client.write_all(&[CommandTag::List.as_u8()]).await.unwrap();
    client.shutdown().await.unwrap();

    handle_connection(Arc::clone(&shared), server).await;

    let mut response = Vec::new();
    client.read_to_end(&mut response).await.unwrap();
    assert_eq!(response[0], StreamId::Stdout.as_u8());
    let end_frame_start = response.len() - (1 + sat_core::wire::LEN_SIZE);
    assert_eq!(response[end_frame_start], StreamId::End.as_u8());
}

#[tokio::test]
async fn remove_deletes_the_named_job() {
    let dir = tempdir().unwrap();
    let shared = shared(dir.path());
    let enqueued = shared.store.append(job(vec!["/bin/true"], shared.clock.now(ClockKind::Wall))).unwrap();

    let (mut client, server) = UnixStream::pair().unwrap();
    client.write_all(&[CommandTag::Remove.as_u8()]).await.unwrap();
    client.write_all(format!("{}\0", enqueued.id).as_bytes()).await.unwrap();
    client.shutdown().await.unwrap();

    handle_connection(Arc::clone(&shared), server).await;

    assert!(!shared.store.is_nonempty().unwrap());
}

#[tokio::test]
async fn remove_unknown_id_reports_on_stderr_but_does_not_fail() {
    let dir = tempdir().unwrap();
    let shared = shared(dir.path());

    let (mut client, server) = UnixStream::pair().unwrap();
    client.write_all(&[CommandTag::Remove.as_u8()]).await.unwrap();
    client.write_all(b"999\0").await.unwrap();
    client.shutdown().await.unwrap();

    handle_connection(Arc::clone(&shared), server).await;

    let mut response = Vec::new();
    client.read_to_end(&mut response).await.unwrap();
    assert_eq!(response[0], StreamId::Stderr.as_u8());
}

#[tokio::test]
async fn run_now_with_empty_payload_forces_every_job() {
    let dir = tempdir().unwrap();
    let shared = shared(dir.path());
    let marker = dir.path().join("ran");
    shared
        .store
        .append(job(vec!["/bin/sh", "-c", &format!("touch {}", marker.display())], shared.clock.now(ClockKind::Wall).plus(std::time::Duration::from_secs(3600))))
        .unwrap();

    let (mut client, server) = UnixStream::pair().unwrap();
    client.write_all(&[CommandTag::RunNow.as_u8()]).await.unwrap();
    client.shutdown().await.unwrap();

    handle_connection(Arc::clone(&shared), server).await;

    assert!(marker.exists());
    assert!(!shared.store.is_nonempty().unwrap());
}
