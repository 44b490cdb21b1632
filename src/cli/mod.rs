// src/cli/mod.rs
//! CLI definitions for workon
//!
//! This module contains the command-line interface definitions using clap.
//! The command implementations are in the `commands` module.
//!
//! - `start` / `stop` - Move packages between stable and live
//! - `info` - Show package, project and checkout path
//! - `list` / `list-all` - List live (or workon-capable) packages
//! - `iterate` - Run a command in each package's source directory

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "workon")]
#[command(author = "Workon Contributors")]
#[command(version)]
#[command(about = "Toggle Portage packages between stable and live (9999) builds", long_about = None)]
pub struct Cli {
    /// Board to operate on (defaults to the configured default board)
    #[arg(long, global = true, value_name = "NAME", conflicts_with = "host")]
    pub board: Option<String>,

    /// Operate on the SDK host instead of a board
    #[arg(long, global = true)]
    pub host: bool,

    /// Configuration file (default: /etc/workon/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start working on packages (build them from the live ebuild)
    Start {
        /// Packages to start ('.' selects the current directory's project)
        packages: Vec<String>,

        /// Start every workon-capable package
        #[arg(long)]
        all: bool,

        /// Remote for projects the manifest does not track
        #[arg(long, value_name = "NAME")]
        remote: Option<String>,

        /// Revision overriding the manifest default
        #[arg(long, value_name = "REF")]
        revision: Option<String>,
    },

    /// Stop working on packages (return to the stable ebuild)
    Stop {
        /// Packages to stop ('.' selects the current directory's project)
        packages: Vec<String>,

        /// Stop every live package
        #[arg(long)]
        all: bool,
    },

    /// Show package, project and checkout path
    Info {
        /// Packages to show ('.' selects the current directory's project)
        packages: Vec<String>,

        /// Show every workon-capable package
        #[arg(long)]
        all: bool,
    },

    /// List live packages
    List {
        /// List every workon-capable package instead
        #[arg(long)]
        all: bool,
    },

    /// List live packages of every target
    ListAll,

    /// Run a command in each package's source directory
    Iterate {
        /// Packages to visit ('.' selects the current directory's project)
        packages: Vec<String>,

        /// Iterate over every live package
        #[arg(long)]
        all: bool,

        /// Shell command to run
        #[arg(long)]
        command: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_board_and_host_conflict() {
        assert!(Cli::try_parse_from(["workon", "--board=eve", "--host", "list"]).is_err());
    }

    #[test]
    fn test_unknown_command() {
        assert!(Cli::try_parse_from(["workon", "frobnicate"]).is_err());
    }

    #[test]
    fn test_iterate_requires_command() {
        assert!(Cli::try_parse_from(["workon", "iterate", "--all"]).is_err());
    }

    #[test]
    fn test_start_flags() {
        let cli = Cli::try_parse_from([
            "workon",
            "--board=eve",
            "start",
            "shill",
            "--remote=cros-internal",
            "--revision=main",
        ])
        .unwrap();
        assert_eq!(cli.board.as_deref(), Some("eve"));
        match cli.command {
            Commands::Start {
                packages,
                all,
                remote,
                revision,
            } => {
                assert_eq!(packages, vec!["shill"]);
                assert!(!all);
                assert_eq!(remote.as_deref(), Some("cros-internal"));
                assert_eq!(revision.as_deref(), Some("main"));
            }
            _ => panic!("expected start"),
        }
    }
}
