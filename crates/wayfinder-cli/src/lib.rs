//! Wayfinder CLI library.
//!
//! Subcommand handlers and output rendering for the `wayfinder-cli` binary.

pub mod commands;
pub mod output;
