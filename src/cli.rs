//! Command line interface for the `gremwire` binary.
//!
//! The binary replays captured response messages through a pipeline, which
//! is handy for inspecting how a server's responses aggregate.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line arguments for the `gremwire` binary.
#[derive(Debug, Parser)]
#[command(name = "gremwire", version, about = "Inspect graph-traversal response streams")]
pub struct Cli {
    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands understood by the binary.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Feed message files through a pipeline in order and print the
    /// aggregated result for every correlation id.
    Replay {
        /// Files holding one JSON response message each.
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Treat this additional status code as a partial response.
        #[arg(long = "partial-code", value_name = "CODE")]
        partial_codes: Vec<i64>,
        /// Fail every request still pending once all files are replayed.
        #[arg(long)]
        drain: bool,
    },
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command};

    #[test]
    fn parses_replay_arguments() {
        let cli = Cli::parse_from([
            "gremwire",
            "replay",
            "a.json",
            "b.json",
            "--partial-code",
            "209",
            "--drain",
        ]);
        let Command::Replay {
            files,
            partial_codes,
            drain,
        } = cli.command;
        assert_eq!(files.len(), 2);
        assert_eq!(partial_codes, vec![209]);
        assert!(drain);
    }

    #[test]
    fn replay_requires_files() {
        assert!(Cli::try_parse_from(["gremwire", "replay"]).is_err());
    }
}
