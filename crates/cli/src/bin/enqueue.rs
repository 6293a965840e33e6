// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `enqueue TIME COMMAND [ARG...]`: capture the caller's cwd, environment,
//! and argv, parse TIME against both clocks, and hand the job to the
//! daemon (starting it first if nothing answers).

use std::process::ExitCode;

use sat_cli::client;
use sat_core::wire::CommandTag;
use sat_core::{Clock, ClockKind, Job, JobId, SystemClock};
use sat_storage::record;

#[tokio::main]
async fn main() -> ExitCode {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("--") {
        args.remove(0);
    }

    if args.len() < 2 {
        eprintln!("usage: enqueue TIME COMMAND [ARG...]");
        return ExitCode::from(2);
    }
    if args[0].starts_with('-') {
        eprintln!("enqueue: unrecognized option '{}'", args[0]);
        return ExitCode::from(2);
    }

    let time_str = args.remove(0);
    let argv = args;

    let clock = SystemClock;
    let (deadline, clock_kind) =
        match sat_core::parse_time::parse_time(&time_str, clock.now(ClockKind::Wall), clock.now(ClockKind::MonotonicBoot)) {
            Ok(v) => v,
            Err(e) => {
                eprintln!("enqueue: {e}");
                return ExitCode::from(2);
            }
        };

    let cwd = match std::env::current_dir() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("enqueue: could not read working directory: {e}");
            return ExitCode::from(1);
        }
    };
    let env: Vec<String> = std::env::vars().map(|(k, v)| format!("{k}={v}")).collect();

    // The id here is a placeholder: the daemon's append assigns the real
    // one from the state file's counter and is the only thing that ever
    // reads it back out of the payload.
    let job = Job { id: JobId::new(0), clock_kind, deadline, argv, cwd, env };
    let payload = record::encode_job(&job);

    let config = client::resolve_config();
    let mut stream = match client::connect_or_start(&config).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("enqueue: {e}");
            return ExitCode::from(1);
        }
    };

    match client::run_request(&mut stream, CommandTag::Enqueue, &payload).await {
        Ok(true) => ExitCode::from(3),
        Ok(false) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("enqueue: {e}");
            ExitCode::from(1)
        }
    }
}
