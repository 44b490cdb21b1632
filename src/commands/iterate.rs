// src/commands/iterate.rs

//! `workon iterate`

use super::GlobalOptions;
use anyhow::{Context, Result};
use workon::{AllScope, Selection};

/// Run `command` in the source directories of the selected packages
pub fn cmd_iterate(
    global: &GlobalOptions,
    packages: Vec<String>,
    all: bool,
    command: &str,
) -> Result<()> {
    let selection = Selection::from_args(packages, all, AllScope::Live)?;
    let session = global.open_session()?;
    let keys = workon::resolve_selection(&session, &selection)?;

    if keys.is_empty() {
        println!("No live packages for {}.", session.target());
        return Ok(());
    }

    workon::iterate::iterate(&session, &keys, command, |key, dir| {
        println!("==> {} ({})", key, dir.display());
    })
    .with_context(|| format!("'{}' failed", command))?;

    Ok(())
}
