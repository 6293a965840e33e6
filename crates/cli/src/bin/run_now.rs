// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `run-now [ID...]`: force jobs to execute immediately, regardless of
//! their deadline. An empty id list means every queued job.

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
    if args.first().map(|a| a.starts_with('-')).unwrap_or(false) {
        eprintln!("run-now: unrecognized option '{}'", args[0]);
        return ExitCode::from(2);
    }

    let mut payload = Vec::new();
    for a in &args {
        match a.parse::<JobId>() {
            Ok(id) => {
                payload.extend_from_slice(id.to_string().as_bytes());
                payload.push(0);
            }
            Err(_) => {
                eprintln!("run-now: not a job id: '{a}'");
                return ExitCode::from(2);
            }
        }
    }

    let config = client::resolve_config();
    let mut stream = match client::connect_or_start(&config).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("run-now: {e}");
            return ExitCode::from(1);
        }
    };

    match client::run_request(&mut stream, CommandTag::RunNow, &payload).await {
        Ok(true) => ExitCode::from(3),
        Ok(false) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("run-now: {e}");
            ExitCode::from(1)
        }
    }
}
