// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `satd`: the scheduling daemon.
//!
//! Normally started on demand by the `sat` CLI the first time a client
//! can't reach the socket; it is not meant to be invoked directly, but
//! running it in the foreground is useful for debugging.

use sat_core::SystemClock;
use sat_daemon::lifecycle::{self, Config};
use sat_daemon::supervisor;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("satd {}", env!("CARGO_PKG_VERSION"));
                return std::process::ExitCode::SUCCESS;
            }
            "--help" | "-h" => {
                print_help();
                return std::process::ExitCode::SUCCESS;
            }
            other => {
                eprintln!("satd: unrecognized argument '{other}'");
                return std::process::ExitCode::from(2);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load();

    let startup = match lifecycle::startup(&config).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("satd: {e}");
            return std::process::ExitCode::from(1);
        }
    };

    match supervisor::run(config, startup, SystemClock).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("satd: {e}");
            std::process::ExitCode::from(1)
        }
    }
}

fn print_help() {
    println!("satd {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("The sat scheduling daemon. Started automatically by `sat`;");
    println!("run directly only to watch its logs in the foreground.");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       print help information");
    println!("    -V, --version    print version information");
}
