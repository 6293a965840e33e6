// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The daemon's main loop: wait for whichever of {a connection, a job
//! deadline, a reload signal} comes first, act on it, and re-arm.
//!
//! ```text
//! BOOTING -> IDLE-EMPTY -> IDLE-ARMED -> SERVING -> IDLE-ARMED -> ... -> DRAINING -> TERMINATED
//! ```
//! `IDLE-EMPTY` and `IDLE-ARMED` both loop back into the select below; the
//! distinction is only which timers are armed. `SERVING` is a spawned
//! worker task running concurrently with the loop, not a state the loop
//! itself occupies.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sat_core::{Clock, ClockKind, Timestamp};
use sat_storage::JobStore;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tracing::{info, warn};

use crate::error::DaemonError;
use crate::expire;
use crate::lifecycle::{self, Config, StartupResult};
use crate::worker;

/// Nothing is due and nothing is queued: re-check this often anyway, since
/// wall-clock deadlines can be invalidated by a system clock jump that no
/// local event would otherwise wake the loop for.
const IDLE_POLL: Duration = Duration::from_secs(3600);

pub struct Shared<C: Clock> {
    pub store: JobStore,
    pub hook_path: Option<std::path::PathBuf>,
    pub clock: C,
    active_workers: AtomicUsize,
    pending_work: Notify,
}

impl<C: Clock> Shared<C> {
    pub fn new(store: JobStore, hook_path: Option<std::path::PathBuf>, clock: C) -> Self {
        Self { store, hook_path, clock, active_workers: AtomicUsize::new(0), pending_work: Notify::new() }
    }

    pub fn wake_after_mutation(&self) {
        self.pending_work.notify_one();
    }
}

/// Releases one `active_workers` slot on drop, whether the worker task
/// returned normally or unwound from a panic. Mirrors the "release on
/// every exit path" discipline `sat_storage::JobStore` uses for its file
/// lock: a forked worker process would free its slot in the process table
/// just by dying, and this is the task-based equivalent of that for the
/// idle-exit counter.
struct WorkerGuard<C: Clock> {
    shared: Arc<Shared<C>>,
}

impl<C: Clock> Drop for WorkerGuard<C> {
    fn drop(&mut self) {
        self.shared.active_workers.fetch_sub(1, Ordering::SeqCst);
        self.shared.wake_after_mutation();
    }
}

/// Run the supervisor loop until the daemon exits, either because it sat
/// idle with nothing to do or because it was asked to reload.
pub async fn run<C: Clock>(config: Config, startup: StartupResult, clock: C) -> Result<(), DaemonError> {
    let StartupResult { store, listener, lock_file } = startup;
    let shared = Arc::new(Shared::new(store, config.hook_path.clone(), clock));

    let mut sighup = signal(SignalKind::hangup()).map_err(|e| crate::error::io_err("SIGHUP", e))?;

    loop {
        let outcome = expire::run_pass(&shared.store, shared.hook_path.as_deref(), &shared.clock).await?;

        let empty = !shared.store.is_nonempty()?;
        let idle = empty && shared.active_workers.load(Ordering::SeqCst) == 0;
        if idle {
            info!("queue empty and no clients connected, exiting");
            break;
        }

        let boot_sleep = tokio::time::sleep(sleep_duration(&shared.clock, ClockKind::MonotonicBoot, outcome.next_boot_deadline));
        let wall_sleep = tokio::time::sleep(sleep_duration(&shared.clock, ClockKind::Wall, outcome.next_wall_deadline));

        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, _)) => {
                        let shared = Arc::clone(&shared);
                        shared.active_workers.fetch_add(1, Ordering::SeqCst);
                        tokio::spawn(async move {
                            let _guard = WorkerGuard { shared: Arc::clone(&shared) };
                            worker::handle_connection(shared, stream).await;
                        });
                    }
                    Err(e) => warn!(error = %e, "failed to accept connection"),
                }
            }
            _ = boot_sleep => {}
            _ = wall_sleep => {}
            _ = shared.pending_work.notified() => {}
            _ = sighup.recv() => {
                info!("SIGHUP received, reloading");
                drop(lock_file);
                return Err(reexec());
            }
        }
    }

    drop(lock_file);
    lifecycle::teardown(&config);
    Ok(())
}

fn sleep_duration<C: Clock>(clock: &C, kind: ClockKind, deadline: Option<Timestamp>) -> Duration {
    match deadline {
        Some(d) => d.saturating_duration_since(clock.now(kind)),
        None => IDLE_POLL,
    }
}

/// Reload by re-executing the same binary with the same arguments.
///
/// This rebinds the socket rather than preserving the listening file
/// descriptor across the exec; clients mid-request at the moment of
/// reload see a closed connection and retry, the same as they would
/// against any other daemon restart.
fn reexec() -> DaemonError {
    use std::os::unix::process::CommandExt;
    let exe = match std::env::current_exe() {
        Ok(exe) => exe,
        Err(e) => return crate::error::io_err("current_exe", e),
    };
    let err = std::process::Command::new(exe).args(std::env::args().skip(1)).exec();
    crate::error::io_err("re-exec", err)
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
