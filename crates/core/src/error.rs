// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors shared by the parsing and encoding helpers in this crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("malformed job payload: {0}")]
    MalformedPayload(&'static str),

    #[error("could not parse time: {0}")]
    BadTime(String),

    #[error("timestamp out of range")]
    TimeOutOfRange,
}
