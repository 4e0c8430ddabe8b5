//! CLI module for xp-engine
//!
//! Provides a command-line interface for:
//! - evaluate: Register experiences from a file and pick one for a URL
//! - explain: Dry-run one experience and print its trace

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, EngineArgs};
pub use commands::{evaluate, explain, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_experiences, write_error, write_response};
