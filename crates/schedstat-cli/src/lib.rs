//! Class schedule statistics CLI library.
//!
//! This crate provides the CLI interface: argument parsing, configuration and
//! report rendering on top of `schedstat-core` and `schedstat-ics`.

mod cli;
pub mod commands;
mod config;

pub use cli::Cli;
pub use config::Config;
