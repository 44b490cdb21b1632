// src/privilege.rs

//! Writing into root-owned sysroot configuration
//!
//! The portage configuration directories under a sysroot belong to root,
//! while the state files live in the user's checkout. Directory creation and
//! symlink replacement therefore go through `sudo` unless configured
//! otherwise.

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// How privileged filesystem operations are performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    /// Operate with the current user's permissions
    Direct,
    /// Run `mkdir`/`ln` through `sudo`
    Sudo,
}

impl Privilege {
    pub fn from_config(use_sudo: bool) -> Self {
        if use_sudo { Self::Sudo } else { Self::Direct }
    }

    /// `mkdir -p`
    pub fn create_dir_all(&self, dir: &Path) -> Result<()> {
        if dir.is_dir() {
            return Ok(());
        }
        match self {
            Self::Direct => fs::create_dir_all(dir).map_err(|e| Error::persistence(dir, e)),
            Self::Sudo => run_sudo(&["mkdir", "-p", "--"], &[dir]),
        }
    }

    /// `ln -sfT target link`: point `link` at `target`, replacing whatever is there
    pub fn symlink_force(&self, target: &Path, link: &Path) -> Result<()> {
        if fs::read_link(link).is_ok_and(|current| current == target) {
            return Ok(());
        }
        match self {
            Self::Direct => {
                if fs::symlink_metadata(link).is_ok() {
                    fs::remove_file(link).map_err(|e| Error::persistence(link, e))?;
                }
                std::os::unix::fs::symlink(target, link).map_err(|e| Error::persistence(link, e))
            }
            Self::Sudo => run_sudo(&["ln", "-sfT", "--"], &[target, link]),
        }
    }
}

fn run_sudo(args: &[&str], paths: &[&Path]) -> Result<()> {
    debug!("sudo {} {:?}", args.join(" "), paths);

    let status = Command::new("sudo")
        .args(args)
        .args(paths)
        .status()
        .map_err(|e| Error::tool("sudo", format!("Failed to run sudo: {}", e)))?;

    if !status.success() {
        return Err(Error::tool(
            "sudo",
            format!("'{}' exited with {}", args[0], status),
        ));
    }
    Ok(())
}
