// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The expiration engine: fires every job whose deadline has passed, then
//! reports the minimum remaining deadline per clock so the caller can
//! re-arm its timers.

use std::path::Path;

use sat_core::{Clock, ClockKind, Timestamp};
use sat_storage::{JobStore, StorageError};

use crate::executor::{self, ExecOutcome};
use crate::hooks::{self, HookEvent};

pub struct ExpireOutcome {
    pub fired: usize,
    pub next_boot_deadline: Option<Timestamp>,
    pub next_wall_deadline: Option<Timestamp>,
}

/// Run one expiration pass: repeatedly find the first job (in scan order)
/// whose deadline has passed on its own clock, remove it, and run its
/// hooks and executor, until none remain. Re-scanning from the front after
/// each removal preserves the insertion-order tie-break for jobs that
/// share a deadline.
pub async fn run_pass<C: Clock>(
    store: &JobStore,
    hook_path: Option<&Path>,
    clock: &C,
) -> Result<ExpireOutcome, StorageError> {
    let mut fired = 0usize;
    loop {
        let now_boot = clock.now(ClockKind::MonotonicBoot);
        let now_wall = clock.now(ClockKind::Wall);
        let jobs = store.iterate()?;
        let due_job = jobs.iter().find(|job| {
            let now = now_for(job.clock_kind, now_boot, now_wall);
            job.deadline.is_past_or_due(now)
        });
        let Some(due_job) = due_job else { break };
        let due_id = due_job.id;

        hooks::run_hook(hook_path, HookEvent::Expired, due_job).await;

        let Some(job) = store.remove(|j| j.id == due_id)? else { continue };
        let outcome = executor::run_job(&job).await;
        let event = match outcome {
            ExecOutcome::Ok => HookEvent::Success,
            ExecOutcome::ExecFailed | ExecOutcome::ForkFailed => HookEvent::Failure,
        };
        hooks::run_hook(hook_path, event, &job).await;
        fired += 1;
    }

    let remaining = store.iterate()?;
    let next_boot_deadline =
        remaining.iter().filter(|j| j.clock_kind == ClockKind::MonotonicBoot).map(|j| j.deadline).min();
    let next_wall_deadline =
        remaining.iter().filter(|j| j.clock_kind == ClockKind::Wall).map(|j| j.deadline).min();

    Ok(ExpireOutcome { fired, next_boot_deadline, next_wall_deadline })
}

fn now_for(kind: ClockKind, now_boot: Timestamp, now_wall: Timestamp) -> Timestamp {
    match kind {
        ClockKind::MonotonicBoot => now_boot,
        ClockKind::Wall => now_wall,
    }
}

#[cfg(test)]
#[path = "expire_tests.rs"]
mod tests;
