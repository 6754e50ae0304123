//! Fuzz target: `parse_command`
//!
//! Throws arbitrary UTF-8 at the JSON command parser and asserts that it
//! either yields a well-formed event or a typed error, never a panic.
//!
//! cargo fuzz run fuzz_command_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use quakeguard::server::protocol::parse_command;

fuzz_target!(|line: &str| {
    let _ = parse_command(line);
});
