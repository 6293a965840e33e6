// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The client half of the wire protocol: resolve the daemon's socket,
//! start it on demand if nothing answers, send one framed request, and
//! demultiplex the response back onto this process's own stdout/stderr.

use std::io::Write as _;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use fs2::FileExt;
use sat_core::wire::{CommandTag, StreamId, LEN_SIZE};
use sat_daemon::lifecycle::Config;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

/// How long a client is willing to wait for a freshly spawned daemon to
/// finish its own bootstrap and start accepting connections.
const START_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("could not reach the daemon: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not start the daemon: {0}")]
    SpawnFailed(std::io::Error),

    #[error("daemon did not start listening within {0:?}")]
    StartTimeout(Duration),
}

/// Resolve the daemon's runtime paths the same way `satd` itself does.
pub fn resolve_config() -> Config {
    Config::load()
}

/// Connect to an already-running daemon, starting one first if a probe of
/// the lock file shows none is running.
///
/// Mirrors the bootstrap contract: a shared-lock probe on the lock file is
/// authoritative for "is a daemon alive", since the daemon holds that lock
/// exclusively for its entire lifetime.
pub async fn connect_or_start(config: &Config) -> Result<UnixStream, ClientError> {
    if !daemon_is_running(config) {
        spawn_daemon()?;
        wait_for_socket(config).await?;
    }
    match UnixStream::connect(&config.socket_path).await {
        Ok(stream) => Ok(stream),
        Err(_) => {
            // Lost a race with another client starting the daemon, or the
            // daemon exited between our probe and our connect attempt.
            // One retry after a short wait covers the common case.
            wait_for_socket(config).await?;
            Ok(UnixStream::connect(&config.socket_path).await?)
        }
    }
}

fn daemon_is_running(config: &Config) -> bool {
    let file = match std::fs::OpenOptions::new().write(true).create(true).open(&config.lock_path) {
        Ok(f) => f,
        Err(_) => return false,
    };
    match file.try_lock_shared() {
        Ok(()) => {
            let _ = FileExt::unlock(&file);
            false
        }
        Err(_) => true,
    }
}

async fn wait_for_socket(config: &Config) -> Result<(), ClientError> {
    let deadline = std::time::Instant::now() + START_TIMEOUT;
    while std::time::Instant::now() < deadline {
        if UnixStream::connect(&config.socket_path).await.is_ok() {
            return Ok(());
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
    Err(ClientError::StartTimeout(START_TIMEOUT))
}

fn spawn_daemon() -> Result<(), ClientError> {
    std::process::Command::new(daemon_binary_path())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(ClientError::SpawnFailed)?;
    Ok(())
}

/// Find `satd`: next to this binary first (the common installed layout),
/// falling back to a bare `PATH` lookup.
fn daemon_binary_path() -> PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("satd");
            if sibling.exists() {
                return sibling;
            }
        }
    }
    PathBuf::from("satd")
}

/// Send one request (tag + payload), half-close, and forward every
/// response frame to this process's own stdout/stderr until the daemon
/// signals end-of-response.
///
/// Returns whether any stderr frame was seen, which the caller maps onto
/// "daemon-side failure" in its own exit code.
pub async fn run_request(stream: &mut UnixStream, tag: CommandTag, payload: &[u8]) -> std::io::Result<bool> {
    stream.write_all(&[tag.as_u8()]).await?;
    stream.write_all(payload).await?;
    stream.shutdown().await?;

    let mut saw_stderr = false;
    loop {
        let mut header = [0u8; 1 + LEN_SIZE];
        match stream.read_exact(&mut header).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e),
        }
        let len = u64::from_le_bytes(header[1..].try_into().unwrap_or_default()) as usize;
        let mut data = vec![0u8; len];
        stream.read_exact(&mut data).await?;

        match StreamId::from_u8(header[0]) {
            Some(StreamId::Stdout) => {
                std::io::stdout().write_all(&data)?;
            }
            Some(StreamId::Stderr) => {
                saw_stderr = true;
                std::io::stderr().write_all(&data)?;
            }
            Some(StreamId::End) | None => break,
        }
    }
    Ok(saw_stderr)
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
