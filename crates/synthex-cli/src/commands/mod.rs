// crates/synthex-cli/src/commands/mod.rs
//
// Command module declarations for the Synthex CLI.

pub mod config;
pub mod replay;
pub mod schedule;
