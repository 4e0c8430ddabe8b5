//! CLI argument definitions using clap
//!
//! Commands:
//! - xp-engine evaluate --experiences <path> [--url <url>] [--repeat <n>]
//! - xp-engine explain --experiences <path> --id <id> [--url <url>]

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// xp-engine - An explainable decision engine for targeted experiences
#[derive(Parser, Debug)]
#[command(name = "xp-engine")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command that boots a runtime
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// JSON array of experiences, each with an "id"
    #[arg(long)]
    pub experiences: PathBuf,

    /// Path to engine configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// File persisting local (daily/weekly) counters between runs.
    /// Session counters last for one invocation.
    #[arg(long, default_value = "./xp-state.json")]
    pub state: PathBuf,

    /// Page URL to evaluate against
    #[arg(long)]
    pub url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Choose the experience to show and record the impression
    Evaluate {
        #[command(flatten)]
        engine: EngineArgs,

        /// Number of consecutive evaluations in one session
        #[arg(long, default_value_t = 1)]
        repeat: u32,
    },

    /// Explain whether one experience would show, without recording
    Explain {
        #[command(flatten)]
        engine: EngineArgs,

        /// Experience id
        #[arg(long)]
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_evaluate() {
        let cli = Cli::try_parse_from([
            "xp-engine",
            "evaluate",
            "--experiences",
            "xp.json",
            "--url",
            "https://x.com/",
            "--repeat",
            "3",
        ])
        .unwrap();

        match cli.command {
            Command::Evaluate { engine, repeat } => {
                assert_eq!(engine.experiences, PathBuf::from("xp.json"));
                assert_eq!(engine.url.as_deref(), Some("https://x.com/"));
                assert_eq!(engine.state, PathBuf::from("./xp-state.json"));
                assert_eq!(repeat, 3);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_explain_requires_id() {
        assert!(Cli::try_parse_from(["xp-engine", "explain", "--experiences", "xp.json"]).is_err());
    }
}
