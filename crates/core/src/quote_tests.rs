// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn safe_strings_are_left_unquoted() {
    assert_eq!(shell_quote("/bin/echo"), "/bin/echo");
    assert_eq!(shell_quote("hello-world_1.2"), "hello-world_1.2");
}

#[test]
fn strings_with_spaces_are_quoted() {
    assert_eq!(shell_quote("hello world"), "'hello world'");
}

#[test]
fn embedded_single_quote_is_escaped() {
    assert_eq!(shell_quote("it's"), "'it'\\''s'");
}

#[test]
fn empty_string_is_quoted() {
    assert_eq!(shell_quote(""), "''");
}

#[test]
fn argv_join() {
    let argv = vec!["/bin/sh", "-c", "echo hi"];
    assert_eq!(shell_quote_argv(argv), "/bin/sh -c 'echo hi'");
}
