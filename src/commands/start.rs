// src/commands/start.rs

//! `workon start`

use super::GlobalOptions;
use anyhow::Result;
use tracing::info;
use workon::{AllScope, ManifestUpdate, Selection, StartOptions};

/// Move packages to live and register their projects with the manifest
pub fn cmd_start(
    global: &GlobalOptions,
    packages: Vec<String>,
    all: bool,
    options: &StartOptions,
) -> Result<()> {
    if options.revision.is_some() && options.remote.is_none() {
        info!("Using revision override with the manifest's own remotes");
    }

    let selection = Selection::from_args(packages, all, AllScope::Eligible)?;
    let session = global.open_session()?;
    let keys = workon::resolve_selection(&session, &selection)?;

    let outcome = workon::reconcile::start(&session, &keys, options)?;

    for key in &outcome.started {
        println!("Started working on {} for {}", key, session.target());
    }
    for update in &outcome.manifest_updates {
        match update {
            ManifestUpdate::Tracked { project } => {
                println!("  Tracking {} in the local manifest", project);
            }
            ManifestUpdate::Explicit {
                project,
                path,
                remote,
            } => {
                println!(
                    "  Added {} at {} from remote {}",
                    project,
                    path.display(),
                    remote
                );
            }
            ManifestUpdate::ChromeSwitched { checkout } => {
                println!("  Switched {} to the manifest checkout", checkout.display());
            }
        }
    }

    if outcome.needs_sync() {
        println!();
        println!("Run 'repo sync' to check out the live sources before building.");
    }

    Ok(())
}
