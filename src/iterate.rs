// src/iterate.rs

//! Running a shell command in each package's source directories

use crate::error::{Error, Result};
use crate::key::PackageKey;
use crate::session::Session;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, warn};

/// Source directories of `key` declared by its live ebuild
pub fn source_dirs(session: &Session, key: &PackageKey) -> Result<Vec<PathBuf>> {
    let ebuild = session.ebuild_for(key)?;
    Ok(session.query().ebuild_info(&ebuild)?.srcdirs)
}

/// Run `command` with `sh -c` in every source directory of every key
///
/// Stops at the first directory where the command fails. `on_dir` is called
/// before each run, e.g. to print a header.
pub fn iterate<F>(session: &Session, keys: &[PackageKey], command: &str, mut on_dir: F) -> Result<usize>
where
    F: FnMut(&PackageKey, &std::path::Path),
{
    let mut runs = 0;

    for key in keys {
        let dirs = source_dirs(session, key)?;
        if dirs.is_empty() {
            warn!("{} declares no source directories", key);
        }

        for dir in dirs {
            if !dir.is_dir() {
                warn!("Source directory {} for {} does not exist", dir.display(), key);
                continue;
            }
            on_dir(key, &dir);
            debug!("Running '{}' in {}", command, dir.display());

            let status = Command::new("sh")
                .arg("-c")
                .arg(command)
                .current_dir(&dir)
                .status()
                .map_err(|e| Error::tool("sh", format!("Failed to run: {}", e)))?;

            if !status.success() {
                return Err(Error::tool(
                    "sh",
                    format!("'{}' in {} exited with {}", command, dir.display(), status),
                ));
            }
            runs += 1;
        }
    }

    Ok(runs)
}
