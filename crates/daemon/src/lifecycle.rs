// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup: lock acquisition, state file and socket setup.
//!
//! Actual daemonisation (forking into the background, detaching from the
//! controlling terminal) happens on the client side before the daemon
//! binary is even exec'd; by the time [`startup`] runs, the process is
//! already in its final form and just needs to claim its runtime
//! directory.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use fs2::FileExt;
use sat_storage::JobStore;
use tokio::net::UnixListener;
use tracing::info;

use crate::error::{io_err, DaemonError};
use crate::{env, hooks};

#[derive(Debug, Clone)]
pub struct Config {
    pub runtime_dir: PathBuf,
    pub socket_path: PathBuf,
    pub state_path: PathBuf,
    pub lock_path: PathBuf,
    pub hook_path: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Self {
        let runtime_dir = env::runtime_dir();
        Config {
            socket_path: env::socket_path(&runtime_dir),
            state_path: env::state_path(&runtime_dir),
            lock_path: env::lock_path(&runtime_dir),
            hook_path: hooks::resolve_hook_path(),
            runtime_dir,
        }
    }
}

/// Everything the supervisor needs to start serving.
#[derive(Debug)]
pub struct StartupResult {
    pub store: JobStore,
    pub listener: UnixListener,
    /// Held for its lifetime to keep the advisory lock; never read after
    /// startup.
    #[allow(dead_code)]
    pub lock_file: File,
}

/// Claim the runtime directory and bring up the socket.
///
/// A failure to acquire the lock means another daemon is already running
/// and is reported as such rather than as a generic i/o error; every other
/// failure cleans up whatever this call created before returning.
pub async fn startup(config: &Config) -> Result<StartupResult, DaemonError> {
    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            if !matches!(e, DaemonError::AlreadyRunning(_)) {
                cleanup_partial(config);
            }
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<StartupResult, DaemonError> {
    std::fs::create_dir_all(&config.runtime_dir).map_err(|e| io_err(&config.runtime_dir, e))?;

    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)
        .map_err(|e| io_err(&config.lock_path, e))?;
    lock_file
        .try_lock_exclusive()
        .map_err(|_| DaemonError::AlreadyRunning(config.lock_path.clone()))?;

    let mut lock_file = lock_file;
    lock_file.set_len(0).map_err(|e| io_err(&config.lock_path, e))?;
    writeln!(lock_file, "{}", std::process::id()).map_err(|e| io_err(&config.lock_path, e))?;

    let store = JobStore::open(&config.state_path)?;

    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path).map_err(|e| io_err(&config.socket_path, e))?;
    }
    let listener =
        UnixListener::bind(&config.socket_path).map_err(|e| io_err(&config.socket_path, e))?;
    std::fs::set_permissions(&config.socket_path, std::fs::Permissions::from_mode(0o700))
        .map_err(|e| io_err(&config.socket_path, e))?;

    info!(
        socket = %config.socket_path.display(),
        hook = ?config.hook_path,
        "daemon started"
    );

    Ok(StartupResult { store, listener, lock_file })
}

fn cleanup_partial(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

/// Remove the files a cleanly-exiting, idle daemon owns: the socket, the
/// now-empty state file, then the lock file, in that order. Only reached on
/// the supervisor's clean `IDLE-EMPTY` exit path — an error return from the
/// loop skips this entirely, leaving the state file in place for the next
/// daemon to recover.
pub fn teardown(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
    if config.state_path.exists() {
        let _ = std::fs::remove_file(&config.state_path);
    }
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
