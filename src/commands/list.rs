// src/commands/list.rs

//! `workon list` and `workon list-all`

use super::GlobalOptions;
use anyhow::Result;
use workon::report;

/// List live packages of the target, or every workon-capable package with `--all`
pub fn cmd_list(global: &GlobalOptions, all: bool) -> Result<()> {
    let session = global.open_session()?;

    let keys = if all {
        report::list_workon_eligible(&session, &session.workon_keyword()?)?
    } else {
        report::list_live_for_target(&session)?
    };

    print!("{}", report::format_keys(&keys));
    Ok(())
}

/// List live packages of every target; needs no board
pub fn cmd_list_all(global: &GlobalOptions) -> Result<()> {
    let all = report::list_live_all_targets(&global.config)?;
    print!("{}", report::format_all_targets(&all));
    Ok(())
}
