// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared plumbing for the `enqueue`/`list`/`remove`/`run-now` binaries:
//! resolving the daemon's paths, auto-starting it on first contact, and
//! speaking the wire protocol from the client side.

pub mod client;
