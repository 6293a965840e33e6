// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The durable job queue: an append-only, lock-serialised log with
//! in-place splicing on removal.
//!
//! All four operations acquire the file's advisory lock for their whole
//! duration and release it on every exit path, including error paths, so a
//! panic aside, the lock can never leak across a call.

use fs2::FileExt;
use parking_lot::Mutex;
use sat_core::{Job, JobId};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::record::{self, RecordHeader, HEADER_LEN};

#[derive(Debug)]
pub struct JobStore {
    path: PathBuf,
    file: Mutex<File>,
}

impl JobStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)
            .map_err(|source| io_err(&path, source))?;
        Ok(Self { path, file: Mutex::new(file) })
    }

    /// Assign the job the next id, append it, and return the finished
    /// record. Any id already present on `job` is overwritten.
    pub fn append(&self, mut job: Job) -> Result<Job, StorageError> {
        let mut file = self.file.lock();
        file.lock_exclusive().map_err(|source| io_err(&self.path, source))?;
        let result = (|| {
            let counter = read_counter(&mut file, &self.path)?;
            let next_id = counter + 1;
            write_counter(&mut file, &self.path, next_id)?;
            job.id = JobId::new(next_id);
            let record = record::encode_job(&job);
            file.seek(SeekFrom::End(0)).map_err(|source| io_err(&self.path, source))?;
            file.write_all(&record).map_err(|source| io_err(&self.path, source))?;
            file.sync_data().map_err(|source| io_err(&self.path, source))?;
            Ok(job)
        })();
        let _ = file.unlock();
        result
    }

    /// Take a consistent snapshot of every job currently in the store, in
    /// insertion order.
    pub fn iterate(&self) -> Result<Vec<Job>, StorageError> {
        let mut file = self.file.lock();
        file.lock_shared().map_err(|source| io_err(&self.path, source))?;
        let result = self.decode_all(&mut file);
        let _ = file.unlock();
        result
    }

    /// Remove the first record matching `predicate`, splicing the tail of
    /// the file over its offset. Returns the removed job, if any.
    pub fn remove<F>(&self, predicate: F) -> Result<Option<Job>, StorageError>
    where
        F: Fn(&Job) -> bool,
    {
        let mut file = self.file.lock();
        file.lock_exclusive().map_err(|source| io_err(&self.path, source))?;
        let result = self.remove_locked(&mut file, predicate);
        let _ = file.unlock();
        result
    }

    pub fn is_nonempty(&self) -> Result<bool, StorageError> {
        let file = self.file.lock();
        let len = file.metadata().map_err(|source| io_err(&self.path, source))?.len();
        Ok(len > 8)
    }

    fn decode_all(&self, file: &mut File) -> Result<Vec<Job>, StorageError> {
        let len = file.metadata().map_err(|source| io_err(&self.path, source))?.len();
        if len < 8 {
            return Ok(Vec::new());
        }
        let mut jobs = Vec::new();
        let mut offset = 8u64;
        file.seek(SeekFrom::Start(offset)).map_err(|source| io_err(&self.path, source))?;
        while offset < len {
            let (job, consumed) = self.read_one(file)?;
            jobs.push(job);
            offset += consumed;
        }
        Ok(jobs)
    }

    /// Read one record starting at the file's current position, leaving the
    /// cursor at the start of the next record.
    fn read_one(&self, file: &mut File) -> Result<(Job, u64), StorageError> {
        let mut header_bytes = [0u8; HEADER_LEN];
        file.read_exact(&mut header_bytes).map_err(|source| io_err(&self.path, source))?;
        let header = RecordHeader::from_bytes(&header_bytes);
        let mut payload = vec![0u8; header.payload_len as usize];
        file.read_exact(&mut payload).map_err(|source| io_err(&self.path, source))?;
        let job = record::decode_job(&header, &payload)?;
        let consumed = HEADER_LEN as u64 + header.payload_len;
        Ok((job, consumed))
    }

    fn remove_locked<F>(&self, file: &mut File, predicate: F) -> Result<Option<Job>, StorageError>
    where
        F: Fn(&Job) -> bool,
    {
        let len = file.metadata().map_err(|source| io_err(&self.path, source))?.len();
        if len < 8 {
            return Ok(None);
        }
        let mut offset = 8u64;
        file.seek(SeekFrom::Start(offset)).map_err(|source| io_err(&self.path, source))?;
        loop {
            if offset >= len {
                return Ok(None);
            }
            let record_start = offset;
            let (job, consumed) = self.read_one(file)?;
            offset += consumed;
            if predicate(&job) {
                let record_end = offset;
                let tail_len = (len - record_end) as usize;
                let mut tail = vec![0u8; tail_len];
                file.seek(SeekFrom::Start(record_end)).map_err(|source| io_err(&self.path, source))?;
                file.read_exact(&mut tail).map_err(|source| io_err(&self.path, source))?;
                file.seek(SeekFrom::Start(record_start)).map_err(|source| io_err(&self.path, source))?;
                file.write_all(&tail).map_err(|source| io_err(&self.path, source))?;
                let new_len = record_start + tail_len as u64;
                file.set_len(new_len).map_err(|source| io_err(&self.path, source))?;
                file.sync_data().map_err(|source| io_err(&self.path, source))?;
                return Ok(Some(job));
            }
        }
    }
}

fn read_counter(file: &mut File, path: &Path) -> Result<u64, StorageError> {
    let len = file.metadata().map_err(|source| io_err(path, source))?.len();
    if len < 8 {
        return Ok(0);
    }
    file.seek(SeekFrom::Start(0)).map_err(|source| io_err(path, source))?;
    let mut buf = [0u8; 8];
    file.read_exact(&mut buf).map_err(|source| io_err(path, source))?;
    Ok(u64::from_le_bytes(buf))
}

fn write_counter(file: &mut File, path: &Path, value: u64) -> Result<(), StorageError> {
    file.seek(SeekFrom::Start(0)).map_err(|source| io_err(path, source))?;
    file.write_all(&value.to_le_bytes()).map_err(|source| io_err(path, source))?;
    Ok(())
}

fn io_err(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io { path: path.to_path_buf(), source }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
