// src/canonical.rs

//! Resolving user input to canonical package keys
//!
//! Users may name a package by its bare name, its full key, or an atom.
//! Everything is funneled through the package-query tool so the state files
//! only ever hold `category/package` keys of live-capable ebuilds.

use crate::error::{Error, Result};
use crate::index;
use crate::key::PackageKey;
use crate::portage::inherits_workon;
use crate::report;
use crate::session::Session;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Which packages a command operates on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Tokens given on the command line
    Tokens(Vec<String>),
    /// Packages built from the checkout project containing this directory
    CurrentDir(std::path::PathBuf),
    /// Every package in the given scope
    All(AllScope),
}

/// Meaning of `--all` for a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllScope {
    /// Every workon-capable package for the target's architecture
    Eligible,
    /// Every package currently live on the target
    Live,
}

impl Selection {
    /// Build a selection from command-line arguments
    ///
    /// A lone `.` selects the current directory's project.
    pub fn from_args(packages: Vec<String>, all: bool, scope: AllScope) -> Result<Self> {
        match (all, packages.is_empty()) {
            (true, true) => Ok(Self::All(scope)),
            (true, false) => Err(Error::Usage(
                "--all cannot be combined with package names".to_string(),
            )),
            (false, true) => Err(Error::Usage(
                "No packages specified; name packages, use '.', or pass --all".to_string(),
            )),
            (false, false) if packages.len() == 1 && packages[0] == "." => {
                Ok(Self::CurrentDir(std::env::current_dir()?))
            }
            (false, false) => Ok(Self::Tokens(packages)),
        }
    }
}

/// Canonical key for one token
///
/// Tokens already recorded verbatim in the enabled list are accepted without
/// a lookup.
pub fn canonicalize(session: &Session, token: &str) -> Result<PackageKey> {
    if let Some(key) = session.store().contains_token(token)? {
        debug!("{} is already live, skipping lookup", token);
        return Ok(key);
    }

    let (key, ebuild) = session.which(token)?;

    if is_live_eligible(session, &key, &ebuild)? {
        debug!("Resolved {} to {}", token, key);
        Ok(key)
    } else {
        Err(Error::NotLiveEligible {
            token: token.to_string(),
        })
    }
}

/// Canonical keys for a batch; any failure fails the whole batch
///
/// Duplicate keys are dropped, keeping the first occurrence.
pub fn canonicalize_all<S: AsRef<str>>(session: &Session, tokens: &[S]) -> Result<Vec<PackageKey>> {
    let mut keys: Vec<PackageKey> = Vec::with_capacity(tokens.len());
    for token in tokens {
        let key = canonicalize(session, token.as_ref())?;
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    Ok(keys)
}

/// Resolve a selection to canonical keys
pub fn resolve_selection(session: &Session, selection: &Selection) -> Result<Vec<PackageKey>> {
    match selection {
        Selection::Tokens(tokens) => canonicalize_all(session, tokens),
        Selection::CurrentDir(dir) => packages_in_dir(session, dir),
        Selection::All(AllScope::Live) => session.store().list_live(),
        Selection::All(AllScope::Eligible) => {
            report::list_workon_eligible(session, &session.workon_keyword()?)
        }
    }
}

fn is_live_eligible(session: &Session, key: &PackageKey, ebuild: &Path) -> Result<bool> {
    if session.config().is_live_exception(key) {
        debug!("{} is a configured live exception", key);
        return Ok(true);
    }
    let text = fs::read_to_string(ebuild).map_err(|e| Error::LookupFailed {
        token: key.to_string(),
        reason: format!("cannot read {}: {}", ebuild.display(), e),
    })?;
    Ok(inherits_workon(&text))
}

/// Packages backed by the checkout project that contains `dir`
fn packages_in_dir(session: &Session, dir: &Path) -> Result<Vec<PackageKey>> {
    let project = index::project_for_dir(session, dir)?.ok_or_else(|| Error::LookupFailed {
        token: ".".to_string(),
        reason: format!("{} is not inside a checkout project", dir.display()),
    })?;

    let keyword = session.workon_keyword()?;
    let mut keys: Vec<PackageKey> = index::project_ebuild_map(session, &keyword)?
        .into_iter()
        .filter(|(p, _)| *p == project)
        .map(|(_, key)| key)
        .collect();
    keys.sort();
    keys.dedup();

    if keys.is_empty() {
        return Err(Error::NotLiveEligible {
            token: format!(". (project {})", project),
        });
    }
    Ok(keys)
}
