// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk layout of a single job record.
//!
//! ```text
//! uint64  id
//! uint32  argc
//! uint32  clock_kind      // 0 = monotonic-boot, 1 = wall
//! int64   deadline.secs
//! uint32  deadline.nanos
//! uint64  payload_len
//! byte[payload_len] payload
//! ```
//!
//! All integers are little-endian. The header width is fixed at 64-bit ids
//! and lengths; this implementation does not need to interoperate with a
//! state file produced by a different bit width.

use sat_core::{ClockKind, Job, JobId, Timestamp};

use crate::error::StorageError;

/// Size in bytes of the fixed-width portion of a record, not counting the
/// payload itself.
pub const HEADER_LEN: usize = 8 + 4 + 4 + 8 + 4 + 8;

pub struct RecordHeader {
    pub id: u64,
    pub argc: u32,
    pub clock_kind: u32,
    pub secs: i64,
    pub nanos: u32,
    pub payload_len: u64,
}

impl RecordHeader {
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0..8].copy_from_slice(&self.id.to_le_bytes());
        buf[8..12].copy_from_slice(&self.argc.to_le_bytes());
        buf[12..16].copy_from_slice(&self.clock_kind.to_le_bytes());
        buf[16..24].copy_from_slice(&self.secs.to_le_bytes());
        buf[24..28].copy_from_slice(&self.nanos.to_le_bytes());
        buf[28..36].copy_from_slice(&self.payload_len.to_le_bytes());
        buf
    }

    pub fn from_bytes(buf: &[u8; HEADER_LEN]) -> Self {
        Self {
            id: u64::from_le_bytes(buf[0..8].try_into().unwrap_or_default()),
            argc: u32::from_le_bytes(buf[8..12].try_into().unwrap_or_default()),
            clock_kind: u32::from_le_bytes(buf[12..16].try_into().unwrap_or_default()),
            secs: i64::from_le_bytes(buf[16..24].try_into().unwrap_or_default()),
            nanos: u32::from_le_bytes(buf[24..28].try_into().unwrap_or_default()),
            payload_len: u64::from_le_bytes(buf[28..36].try_into().unwrap_or_default()),
        }
    }
}

/// Serialize a job into a complete record (header + payload), ready to
/// append to the store.
pub fn encode_job(job: &Job) -> Vec<u8> {
    let payload = job.encode_payload();
    let header = RecordHeader {
        id: job.id.get(),
        argc: job.argc() as u32,
        clock_kind: job.clock_kind.as_u32(),
        secs: job.deadline.secs,
        nanos: job.deadline.nanos,
        payload_len: payload.len() as u64,
    };
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(&payload);
    out
}

/// Reassemble a job from a decoded header and its payload bytes.
pub fn decode_job(header: &RecordHeader, payload: &[u8]) -> Result<Job, StorageError> {
    let clock_kind = ClockKind::from_u32(header.clock_kind)
        .ok_or(sat_core::CoreError::MalformedPayload("unknown clock_kind"))?;
    let (argv, cwd, env) = Job::decode_payload(header.argc as usize, payload)?;
    Ok(Job {
        id: JobId::from(header.id),
        clock_kind,
        deadline: Timestamp::new(header.secs, header.nanos),
        argv,
        cwd,
        env,
    })
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
