// src/commands/info.rs

//! `workon info`

use super::GlobalOptions;
use anyhow::Result;
use workon::{AllScope, Selection};

/// Print `package project path` for each selected package
pub fn cmd_info(global: &GlobalOptions, packages: Vec<String>, all: bool) -> Result<()> {
    let selection = Selection::from_args(packages, all, AllScope::Eligible)?;
    let session = global.open_session()?;
    let keys = workon::resolve_selection(&session, &selection)?;

    let rows = workon::report::workon_info(&session, &keys)?;
    print!("{}", workon::report::format_info(&rows));
    Ok(())
}
