// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runs a job's captured argv as a child process.
//!
//! `tokio::process::Command` performs the fork-and-exec itself; this module
//! only has to set up the captured environment, working directory, and
//! stdio, then classify the result the way the contract expects.

use sat_core::Job;
use std::process::Stdio;
use tokio::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecOutcome {
    Ok,
    ExecFailed,
    ForkFailed,
}

/// Run `job`'s argv with its captured envp and cwd. Standard streams are
/// not connected to anything the daemon reads — a job runs detached, the
/// way `at(1)` jobs do, with output left to the job's own redirection.
pub async fn run_job(job: &Job) -> ExecOutcome {
    let Some((program, args)) = job.argv.split_first() else {
        return ExecOutcome::ExecFailed;
    };

    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.current_dir(&job.cwd);
    cmd.env_clear();
    for entry in &job.env {
        if let Some((key, value)) = entry.split_once('=') {
            cmd.env(key, value);
        }
    }
    cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());

    match cmd.spawn() {
        Ok(mut child) => match child.wait().await {
            Ok(status) if status.success() => ExecOutcome::Ok,
            Ok(_) => ExecOutcome::ExecFailed,
            Err(_) => ExecOutcome::ExecFailed,
        },
        Err(_) => ExecOutcome::ForkFailed,
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
