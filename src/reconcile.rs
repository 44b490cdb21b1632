// src/reconcile.rs

//! Live/stable transitions
//!
//! Each `(target, package)` pair toggles between [`LiveState::Stable`] and
//! [`LiveState::Live`]. Starting work records the package in the state store
//! and then makes sure the local manifest checks out every project the live
//! ebuild builds from. Stopping only updates the state store: local changes
//! in the checkout are left where they are.
//!
//! The manifest is updated but never synced; the caller reminds the user to
//! run `repo sync`.

use crate::error::{Error, Result};
use crate::key::PackageKey;
use crate::manifest::RemoteSpec;
use crate::session::Session;
use crate::store::LiveState;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Flags affecting manifest updates on start
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartOptions {
    /// Remote for projects the manifest does not track
    pub remote: Option<String>,
    /// Revision overriding the manifest default
    pub revision: Option<String>,
}

impl StartOptions {
    fn remote_spec(&self) -> Option<RemoteSpec> {
        self.remote.as_ref().map(|remote| RemoteSpec {
            remote: remote.clone(),
            revision: self.revision.clone(),
        })
    }
}

/// A change requested from the manifest tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestUpdate {
    /// Project tracked from the manifest's own remote
    Tracked { project: String },
    /// Project added at a path from an explicit remote
    Explicit {
        project: String,
        path: PathBuf,
        remote: String,
    },
    /// Browser checkout switched to follow the manifest
    ChromeSwitched { checkout: PathBuf },
}

/// Result of [`start`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartOutcome {
    /// Packages moved to live
    pub started: Vec<PackageKey>,
    /// Packages that were already live
    pub skipped: Vec<PackageKey>,
    pub manifest_updates: Vec<ManifestUpdate>,
}

impl StartOutcome {
    /// Whether the checkout needs a `repo sync` to pick up the change
    pub fn needs_sync(&self) -> bool {
        !self.started.is_empty()
    }
}

/// Result of [`stop`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopOutcome {
    /// Packages moved back to stable
    pub stopped: Vec<PackageKey>,
    /// Packages that were not live
    pub skipped: Vec<PackageKey>,
}

/// Move `keys` to live and register their projects with the manifest
pub fn start(session: &Session, keys: &[PackageKey], options: &StartOptions) -> Result<StartOutcome> {
    let mut outcome = StartOutcome::default();

    for key in keys {
        if transition(session, key, LiveState::Live)? {
            outcome.started.push(key.clone());
        } else {
            outcome.skipped.push(key.clone());
        }
    }

    if outcome.started.is_empty() {
        debug!("Nothing newly live, manifest left alone");
        return Ok(outcome);
    }

    let remote = options.remote_spec();
    let mut seen: HashSet<String> = HashSet::new();

    for key in &outcome.started {
        let ebuild = session.ebuild_for(key)?;
        let sources = session.query().ebuild_info(&ebuild)?.sources()?;
        if sources.is_empty() {
            debug!("{} declares no source directories", key);
        }

        for (project, srcdir) in sources {
            if !seen.insert(project.clone()) {
                continue;
            }
            let update = match &remote {
                Some(remote) => {
                    let path = session.relative_to_checkout(&srcdir).to_path_buf();
                    session.manifest().add_explicit(&project, &path, remote)?;
                    ManifestUpdate::Explicit {
                        project,
                        path,
                        remote: remote.remote.clone(),
                    }
                }
                None => {
                    session
                        .manifest()
                        .add_tracked(&project, options.revision.as_deref())?;
                    ManifestUpdate::Tracked { project }
                }
            };
            outcome.manifest_updates.push(update);
        }

        if session.config().is_chrome(key) {
            let checkout = session.config().chrome_checkout();
            if checkout.is_dir() {
                session.manifest().switch_chrome(&checkout)?;
                outcome
                    .manifest_updates
                    .push(ManifestUpdate::ChromeSwitched { checkout });
            } else {
                debug!("No browser checkout at {}, nothing to switch", checkout.display());
            }
        }
    }

    info!(
        "Started {} package(s), {} manifest update(s)",
        outcome.started.len(),
        outcome.manifest_updates.len()
    );
    Ok(outcome)
}

/// Move `keys` back to stable
pub fn stop(session: &Session, keys: &[PackageKey]) -> Result<StopOutcome> {
    let mut outcome = StopOutcome::default();

    for key in keys {
        if transition(session, key, LiveState::Stable)? {
            outcome.stopped.push(key.clone());
        } else {
            outcome.skipped.push(key.clone());
        }
    }

    info!("Stopped {} package(s)", outcome.stopped.len());
    Ok(outcome)
}

/// Move one package to `to`; returns `false` if it was already there
fn transition(session: &Session, key: &PackageKey, to: LiveState) -> Result<bool> {
    let store = session.store();
    let changed = match to {
        LiveState::Live => store.add(key)?,
        LiveState::Stable => store.remove(key)?,
    };
    if !changed {
        warn!(
            "{}",
            Error::AlreadyInState {
                key: key.to_string(),
                state: to,
            }
        );
    }
    Ok(changed)
}
