// src/lib.rs

//! Workon: live/stable package toggling for Portage build targets
//!
//! Packages normally build from pinned ebuilds. Working on a package
//! switches its build target to the live (`-9999`) ebuild, which builds from
//! the developer's checkout instead.
//!
//! # Architecture
//!
//! - [`canonical`]: resolve user tokens to `category/package` keys
//! - [`store`]: per-target enabled/masked lists that portage reads
//! - [`index`]: project ↔ package mapping rebuilt from overlays and manifest
//! - [`reconcile`]: start/stop transitions and manifest updates
//! - [`report`]: read-only listings
//!
//! External tools (portage, repo, loman) sit behind the
//! [`PackageQuery`](portage::PackageQuery) and
//! [`ManifestTool`](manifest::ManifestTool) traits.

pub mod canonical;
pub mod config;
mod error;
pub mod index;
pub mod iterate;
pub mod key;
pub mod manifest;
pub mod portage;
pub mod privilege;
pub mod reconcile;
pub mod report;
pub mod session;
pub mod store;
pub mod target;

pub use canonical::{AllScope, Selection, canonicalize, canonicalize_all, resolve_selection};
pub use config::WorkonConfig;
pub use error::{Error, Result};
pub use index::InfoRow;
pub use key::PackageKey;
pub use manifest::{ManifestTool, ProjectPath, RemoteSpec, RepoManifest};
pub use portage::{EbuildInfo, PackageQuery, PortageEnv, PortageTools};
pub use privilege::Privilege;
pub use reconcile::{ManifestUpdate, StartOptions, StartOutcome, StopOutcome};
pub use session::Session;
pub use store::{LiveState, LiveStore};
pub use target::{BuildTarget, TargetPaths};
