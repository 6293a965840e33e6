// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `remove ID...`: ask the daemon to drop the named jobs from the queue.

use std::process::ExitCode;

use sat_cli::client;
use sat_core::wire::CommandTag;
use sat_core::JobId;

#[tokio::main]
async fn main() -> ExitCode {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("--") {
        args.remove(0);
    }

    if args.is_empty() {
        eprintln!("usage: remove ID...");
        return ExitCode::from(2);
    }
    if args[0].starts_with('-') {
        eprintln!("remove: unrecognized option '{}'", args[0]);
        return ExitCode::from(2);
    }

    let mut ids = Vec::with_capacity(args.len());
    for a in &args {
        match a.parse::<JobId>() {
            Ok(id) => ids.push(id),
            Err(_) => {
                eprintln!("remove: not a job id: '{a}'");
                return ExitCode::from(2);
            }
        }
    }

    let mut payload = Vec::new();
    for id in &ids {
        payload.extend_from_slice(id.to_string().as_bytes());
        payload.push(0);
    }

    let config = client::resolve_config();
    let mut stream = match client::connect_or_start(&config).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("remove: {e}");
            return ExitCode::from(1);
        }
    };

    match client::run_request(&mut stream, CommandTag::Remove, &payload).await {
        Ok(true) => ExitCode::from(3),
        Ok(false) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("remove: {e}");
            ExitCode::from(1)
        }
    }
}
