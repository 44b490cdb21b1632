// src/commands/stop.rs

//! `workon stop`

use super::GlobalOptions;
use anyhow::Result;
use workon::{AllScope, Selection};

/// Move packages back to stable; the checkout is left untouched
pub fn cmd_stop(global: &GlobalOptions, packages: Vec<String>, all: bool) -> Result<()> {
    let selection = Selection::from_args(packages, all, AllScope::Live)?;
    let session = global.open_session()?;
    let keys = workon::resolve_selection(&session, &selection)?;

    let outcome = workon::reconcile::stop(&session, &keys)?;
    for key in &outcome.stopped {
        println!("Stopped working on {} for {}", key, session.target());
    }

    Ok(())
}
