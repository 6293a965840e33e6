// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job record: a captured command plus the deadline it fires on.

use crate::error::CoreError;
use crate::id::JobId;
use crate::time::{ClockKind, Timestamp};
use std::path::{Path, PathBuf};

/// A queued job: a captured `argv`/envp/cwd plus the absolute time it
/// becomes due.
///
/// `payload` is never stored decoded on disk — see [`Job::encode_payload`]
/// and [`Job::decode_payload`] for the concatenated-NUL-strings layout that
/// is the wire and on-disk representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub clock_kind: ClockKind,
    pub deadline: Timestamp,
    pub argv: Vec<String>,
    pub cwd: PathBuf,
    /// Raw `KEY=VALUE` environment strings, captured verbatim from the
    /// enqueuing process — never reinterpreted as a map, since a job's
    /// environment may legitimately contain malformed or duplicate entries
    /// that the exec() call should see exactly as captured.
    pub env: Vec<String>,
}

impl Job {
    pub fn argc(&self) -> usize {
        self.argv.len()
    }

    /// Concatenate `argv`, `cwd`, then `env` as NUL-terminated strings, in
    /// that order. This is the payload format described by the state file
    /// and wire protocol.
    pub fn encode_payload(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for s in self.argv.iter().chain(std::iter::once(&lossy_path(&self.cwd))).chain(self.env.iter())
        {
            out.extend_from_slice(s.as_bytes());
            out.push(0);
        }
        out
    }

    /// Inverse of [`Job::encode_payload`]: split `payload` into exactly
    /// `argc` argv strings, one cwd string, then the remaining envp
    /// strings. Every decoded string must be non-empty, matching the
    /// invariant that a NUL-terminated run of zero bytes can never appear
    /// inside a valid payload.
    pub fn decode_payload(argc: usize, payload: &[u8]) -> Result<(Vec<String>, PathBuf, Vec<String>), CoreError> {
        if argc == 0 {
            return Err(CoreError::MalformedPayload("argc must be at least 1"));
        }
        let mut strings = Vec::new();
        let mut start = 0usize;
        for (i, &b) in payload.iter().enumerate() {
            if b == 0 {
                let s = std::str::from_utf8(&payload[start..i])
                    .map_err(|_| CoreError::MalformedPayload("non-UTF-8 string in payload"))?;
                if s.is_empty() {
                    return Err(CoreError::MalformedPayload("empty string in payload"));
                }
                strings.push(s.to_string());
                start = i + 1;
            }
        }
        if start != payload.len() {
            return Err(CoreError::MalformedPayload("payload does not end on a NUL boundary"));
        }
        if strings.len() < argc + 1 {
            return Err(CoreError::MalformedPayload("payload shorter than argc + cwd"));
        }
        let env = strings.split_off(argc + 1);
        let cwd = PathBuf::from(strings.remove(argc));
        let argv = strings;
        Ok((argv, cwd, env))
    }
}

fn lossy_path(p: &Path) -> String {
    p.to_string_lossy().into_owned()
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
