// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `list`: print the queue, one shell-quoted line per job.

use std::process::ExitCode;

use sat_cli::client;
use sat_core::wire::CommandTag;

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a != "--") {
        eprintln!("usage: list");
        return ExitCode::from(2);
    }

    let config = client::resolve_config();
    let mut stream = match client::connect_or_start(&config).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("list: {e}");
            return ExitCode::from(1);
        }
    };

    match client::run_request(&mut stream, CommandTag::List, &[]).await {
        Ok(true) => ExitCode::from(3),
        Ok(false) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("list: {e}");
            ExitCode::from(1)
        }
    }
}
