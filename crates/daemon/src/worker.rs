// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-request handlers. Each accepted connection is dispatched to one of
//! these as an async task rather than a forked worker process — see the
//! supervisor module for why.

use std::sync::Arc;

use sat_core::wire::{CommandTag, StreamId};
use sat_core::{CoreError, Job, JobId};
use sat_storage::record::{self, RecordHeader, HEADER_LEN};
use tokio::net::UnixStream;
use tracing::warn;

use crate::executor::{self, ExecOutcome};
use crate::hooks::{self, HookEvent};
use crate::protocol;
use crate::supervisor::Shared;

/// Handle one accepted connection end to end: read the command tag and
/// payload, perform the mutation, and write the response frames.
pub async fn handle_connection<C: sat_core::Clock>(shared: Arc<Shared<C>>, mut stream: UnixStream) {
    let tag = match protocol::read_command(&mut stream).await {
        Ok(Some(tag)) => tag,
        Ok(None) => return,
        Err(e) => {
            warn!(error = %e, "failed to read command tag");
            return;
        }
    };

    let payload = match protocol::read_payload(&mut stream).await {
        Ok(p) => p,
        Err(e) => {
            let _ = protocol::write_error(&mut stream, &format!("failed to read payload: {e}")).await;
            return;
        }
    };

    let result = match tag {
        CommandTag::Enqueue => handle_enqueue(&shared, &payload).await,
        CommandTag::Remove => handle_remove(&shared, &payload, &mut stream).await,
        CommandTag::List => handle_list(&shared, &mut stream).await,
        CommandTag::RunNow => handle_run_now(&shared, &payload).await,
    };

    match result {
        Ok(()) => {
            let _ = protocol::write_end(&mut stream).await;
        }
        Err(message) => {
            let _ = protocol::write_error(&mut stream, &message).await;
        }
    }

    shared.wake_after_mutation();
}

async fn handle_enqueue<C: sat_core::Clock>(shared: &Arc<Shared<C>>, payload: &[u8]) -> Result<(), String> {
    let job = decode_job_from_wire(payload)?;
    let enqueued = shared.store.append(job).map_err(|e| e.to_string())?;
    hooks::run_hook(shared.hook_path.as_deref(), HookEvent::Queued, &enqueued).await;
    Ok(())
}

async fn handle_remove<C: sat_core::Clock>(
    shared: &Arc<Shared<C>>,
    payload: &[u8],
    stream: &mut UnixStream,
) -> Result<(), String> {
    let ids = parse_id_list(payload).map_err(|e| e.to_string())?;
    for id in ids {
        match shared.store.remove(|j| j.id == id).map_err(|e| e.to_string())? {
            Some(job) => hooks::run_hook(shared.hook_path.as_deref(), HookEvent::Removed, &job).await,
            None => {
                let _ = protocol::write_frame(
                    stream,
                    StreamId::Stderr,
                    format!("no such job: {id}\n").as_bytes(),
                )
                .await;
            }
        }
    }
    Ok(())
}

async fn handle_list<C: sat_core::Clock>(shared: &Arc<Shared<C>>, stream: &mut UnixStream) -> Result<(), String> {
    let jobs = shared.store.iterate().map_err(|e| e.to_string())?;
    for job in jobs {
        let line = format_job_line(&job);
        protocol::write_frame(stream, StreamId::Stdout, line.as_bytes())
            .await
            .map_err(|e| e.to_string())?;
    }
    Ok(())
}

async fn handle_run_now<C: sat_core::Clock>(shared: &Arc<Shared<C>>, payload: &[u8]) -> Result<(), String> {
    let ids = parse_id_list(payload).map_err(|e| e.to_string())?;
    let targets: Vec<JobId> = if ids.is_empty() {
        shared.store.iterate().map_err(|e| e.to_string())?.into_iter().map(|j| j.id).collect()
    } else {
        ids
    };

    for id in targets {
        let Some(job) = shared.store.remove(|j| j.id == id).map_err(|e| e.to_string())? else {
            continue;
        };
        hooks::run_hook(shared.hook_path.as_deref(), HookEvent::Forced, &job).await;
        let outcome = executor::run_job(&job).await;
        let event = match outcome {
            ExecOutcome::Ok => HookEvent::Success,
            ExecOutcome::ExecFailed | ExecOutcome::ForkFailed => HookEvent::Failure,
        };
        hooks::run_hook(shared.hook_path.as_deref(), event, &job).await;
    }
    Ok(())
}

fn decode_job_from_wire(payload: &[u8]) -> Result<Job, String> {
    if payload.len() < HEADER_LEN {
        return Err("enqueue payload shorter than record header".to_string());
    }
    let header_bytes: [u8; HEADER_LEN] = payload[..HEADER_LEN]
        .try_into()
        .map_err(|_| "enqueue payload header truncated".to_string())?;
    let header = RecordHeader::from_bytes(&header_bytes);
    let body = &payload[HEADER_LEN..];
    if body.len() as u64 != header.payload_len {
        return Err("enqueue payload length does not match header".to_string());
    }
    record::decode_job(&header, body).map_err(|e| e.to_string())
}

/// Split a NUL-terminated list of decimal job ids.
fn parse_id_list(payload: &[u8]) -> Result<Vec<JobId>, CoreError> {
    if payload.is_empty() {
        return Ok(Vec::new());
    }
    let mut ids = Vec::new();
    for chunk in payload.split(|&b| b == 0) {
        if chunk.is_empty() {
            continue;
        }
        let s = std::str::from_utf8(chunk)
            .map_err(|_| CoreError::MalformedPayload("non-UTF-8 id in id list"))?;
        let id: u64 = s.parse().map_err(|_| CoreError::MalformedPayload("non-numeric id in id list"))?;
        ids.push(JobId::new(id));
    }
    Ok(ids)
}

fn format_job_line(job: &Job) -> String {
    let clock = match job.clock_kind {
        sat_core::ClockKind::MonotonicBoot => "boot",
        sat_core::ClockKind::Wall => "wall",
    };
    format!(
        "{}\t{}\t{}.{:09}\t{}\t{}\n",
        job.id,
        clock,
        job.deadline.secs,
        job.deadline.nanos,
        sat_core::quote::shell_quote(&job.cwd.to_string_lossy()),
        sat_core::quote::shell_quote_argv(&job.argv),
    )
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
