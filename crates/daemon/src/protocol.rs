// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Async read/write halves of the wire protocol, built on the shared
//! constants in `sat_core::wire`.

use sat_core::wire::{CommandTag, StreamId, LEN_SIZE};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

/// Read the one-byte command tag that opens every request.
pub async fn read_command(stream: &mut UnixStream) -> std::io::Result<Option<CommandTag>> {
    let mut buf = [0u8; 1];
    match stream.read_exact(&mut buf).await {
        Ok(_) => Ok(CommandTag::from_u8(buf[0])),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e),
    }
}

/// Read the command-specific payload, which runs until the client
/// half-closes its write side.
pub async fn read_payload(stream: &mut UnixStream) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;
    Ok(buf)
}

/// Write one response frame: stream id, 8-byte little-endian length, then
/// the bytes themselves.
pub async fn write_frame(
    stream: &mut UnixStream,
    stream_id: StreamId,
    data: &[u8],
) -> std::io::Result<()> {
    let mut header = [0u8; 1 + LEN_SIZE];
    header[0] = stream_id.as_u8();
    header[1..].copy_from_slice(&(data.len() as u64).to_le_bytes());
    stream.write_all(&header).await?;
    stream.write_all(data).await?;
    Ok(())
}

/// Signal to the client that no more frames will follow.
pub async fn write_end(stream: &mut UnixStream) -> std::io::Result<()> {
    write_frame(stream, StreamId::End, &[]).await
}

/// Write a single stderr frame followed by the end sentinel, the shape of
/// every daemon-side error response.
pub async fn write_error(stream: &mut UnixStream, message: &str) -> std::io::Result<()> {
    write_frame(stream, StreamId::Stderr, message.as_bytes()).await?;
    write_end(stream).await
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
