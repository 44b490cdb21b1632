// src/commands/mod.rs
//! Command handlers for the workon CLI

mod info;
mod iterate;
mod list;
mod start;
mod stop;

pub use info::cmd_info;
pub use iterate::cmd_iterate;
pub use list::{cmd_list, cmd_list_all};
pub use start::cmd_start;
pub use stop::cmd_stop;

use crate::cli::{Cli, Commands};
use anyhow::{Context, Result};
use workon::{BuildTarget, PortageTools, RepoManifest, Session, StartOptions, WorkonConfig};

/// Global options shared by the target-bound commands
pub struct GlobalOptions {
    pub board: Option<String>,
    pub host: bool,
    pub config: WorkonConfig,
}

impl GlobalOptions {
    /// Open a session on the selected target with the real portage and repo tools
    pub fn open_session(&self) -> Result<Session> {
        let target = BuildTarget::resolve(self.board.as_deref(), self.host, &self.config)?;
        let manifest = RepoManifest::new(
            &self.config.source_root,
            &self.config.tools.repo,
            &self.config.tools.loman,
            self.config.chrome.switch_command.clone(),
        );

        let session = Session::open(
            self.config.clone(),
            target.clone(),
            Box::new(PortageTools::new(target.clone())),
            Box::new(manifest),
        )?;
        session
            .link_into_sysroot()
            .with_context(|| format!("Failed to link workon files into {}", target))?;
        Ok(session)
    }
}

/// Dispatch a parsed command line
pub fn run(cli: Cli) -> Result<()> {
    let config = WorkonConfig::load(cli.config.as_deref())?;
    let global = GlobalOptions {
        board: cli.board,
        host: cli.host,
        config,
    };

    match cli.command {
        Commands::Start {
            packages,
            all,
            remote,
            revision,
        } => cmd_start(&global, packages, all, &StartOptions { remote, revision }),
        Commands::Stop { packages, all } => cmd_stop(&global, packages, all),
        Commands::Info { packages, all } => cmd_info(&global, packages, all),
        Commands::List { all } => cmd_list(&global, all),
        Commands::ListAll => cmd_list_all(&global),
        Commands::Iterate {
            packages,
            all,
            command,
        } => cmd_iterate(&global, packages, all, &command),
    }
}
