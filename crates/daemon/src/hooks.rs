// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolves and invokes the user's lifecycle-hook script.
//!
//! The hook's exit status is never surfaced to the caller: a missing or
//! failing hook must never interfere with the job it was notified about.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use nix::unistd::{Uid, User};
use sat_core::Job;
use tokio::process::Command;
use tracing::warn;

/// The event names a hook can be invoked with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEvent {
    Queued,
    Removed,
    Expired,
    Forced,
    Success,
    Failure,
}

impl HookEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            HookEvent::Queued => "queued",
            HookEvent::Removed => "removed",
            HookEvent::Expired => "expired",
            HookEvent::Forced => "forced",
            HookEvent::Success => "success",
            HookEvent::Failure => "failure",
        }
    }
}

/// Resolve the hook script's path, first present wins:
/// `$XDG_CONFIG_HOME/sat/hook`, `$HOME/.config/sat/hook`, the passwd
/// entry's home directory variant (only for a non-root effective uid), then
/// the system fallback `/etc/sat/hook`.
pub fn resolve_hook_path() -> Option<PathBuf> {
    let candidates = hook_candidates();
    candidates.into_iter().find(|p| p.is_file())
}

fn hook_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(config_home) = std::env::var_os("XDG_CONFIG_HOME") {
        candidates.push(PathBuf::from(config_home).join("sat/hook"));
    }
    if let Some(home) = std::env::var_os("HOME") {
        candidates.push(PathBuf::from(home).join(".config/sat/hook"));
    }
    if !Uid::effective().is_root() {
        if let Ok(Some(user)) = User::from_uid(Uid::current()) {
            candidates.push(user.dir.join(".config/sat/hook"));
        }
    }
    candidates.push(PathBuf::from("/etc/sat/hook"));
    candidates
}

/// Invoke the hook (if one is configured) for `event` on `job`. Errors are
/// logged, never propagated: a hook is best-effort notification, not part
/// of the job's own outcome.
pub async fn run_hook(hook_path: Option<&Path>, event: HookEvent, job: &Job) {
    let Some(hook_path) = hook_path else { return };

    let mut cmd = Command::new(hook_path);
    cmd.arg(event.as_str());
    cmd.args(&job.argv);
    cmd.current_dir(&job.cwd);
    cmd.env_clear();
    for entry in &job.env {
        if let Some((key, value)) = entry.split_once('=') {
            cmd.env(key, value);
        }
    }
    cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());

    match cmd.status().await {
        Ok(status) if !status.success() => {
            warn!(event = event.as_str(), job_id = %job.id, status = %status, "hook exited non-zero");
        }
        Ok(_) => {}
        Err(err) => {
            warn!(event = event.as_str(), job_id = %job.id, error = %err, "failed to invoke hook");
        }
    }
}

#[cfg(test)]
#[path = "hooks_tests.rs"]
mod tests;
