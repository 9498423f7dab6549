//! repgen-cli library root.
//!
//! Re-exports the argument parser, configuration and command handlers so
//! integration tests can drive them without spawning the binary.

pub mod cli;
pub mod commands;
pub mod config;
