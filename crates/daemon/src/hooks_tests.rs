// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sat_core::{ClockKind, JobId, Timestamp};
use serial_test::serial;
use std::fs;
use tempfile::tempdir;

fn job() -> Job {
    Job {
        id: JobId::new(1),
        clock_kind: ClockKind::Wall,
        deadline: Timestamp::ZERO,
        argv: vec!["/bin/true".to_string()],
        cwd: PathBuf::from("/tmp"),
        env: vec![],
    }
}

#[test]
#[serial]
fn resolve_prefers_xdg_config_home() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("sat")).unwrap();
    fs::write(dir.path().join("sat/hook"), "#!/bin/sh\n").unwrap();
    std::env::set_var("XDG_CONFIG_HOME", dir.path());
    std::env::remove_var("HOME");

    let resolved = resolve_hook_path();
    std::env::remove_var("XDG_CONFIG_HOME");

    assert_eq!(resolved, Some(dir.path().join("sat/hook")));
}

#[test]
#[serial]
fn resolve_falls_back_to_home_config() {
    let xdg_dir = tempdir().unwrap();
    let home_dir = tempdir().unwrap();
    fs::create_dir_all(home_dir.path().join(".config/sat")).unwrap();
    fs::write(home_dir.path().join(".config/sat/hook"), "#!/bin/sh\n").unwrap();

    std::env::set_var("XDG_CONFIG_HOME", xdg_dir.path());
    std::env::set_var("HOME", home_dir.path());

    let resolved = resolve_hook_path();

    std::env::remove_var("XDG_CONFIG_HOME");
    std::env::remove_var("HOME");

    assert_eq!(resolved, Some(home_dir.path().join(".config/sat/hook")));
}

#[test]
#[serial]
fn resolve_returns_none_when_nothing_present() {
    let dir = tempdir().unwrap();
    std::env::set_var("XDG_CONFIG_HOME", dir.path());
    std::env::set_var("HOME", dir.path());

    let resolved = resolve_hook_path();

    std::env::remove_var("XDG_CONFIG_HOME");
    std::env::remove_var("HOME");

    assert!(resolved.is_none() || resolved == Some(PathBuf::from("/etc/sat/hook")));
}

#[tokio::test]
async fn run_hook_with_no_path_is_a_no_op() {
    run_hook(None, HookEvent::Queued, &job()).await;
}

#[tokio::test]
async fn run_hook_invokes_script_with_event_and_argv() {
    let dir = tempdir().unwrap();
    let marker = dir.path().join("ran");
    let script = dir.path().join("hook");
    fs::write(&script, format!("#!/bin/sh\necho \"$1 $2\" > {}\n", marker.display())).unwrap();
    let mut perms = fs::metadata(&script).unwrap().permissions();
    std::os::unix::fs::PermissionsExt::set_mode(&mut perms, 0o755);
    fs::set_permissions(&script, perms).unwrap();

    run_hook(Some(&script), HookEvent::Success, &job()).await;

    let contents = fs::read_to_string(&marker).unwrap();
    assert_eq!(contents.trim(), "success /bin/true");
}
