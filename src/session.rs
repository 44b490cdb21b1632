// src/session.rs

//! Per-invocation context
//!
//! A [`Session`] ties one build target's state store to the external tools
//! and memoizes their answers, so each query tool runs at most once per
//! invocation for a given question.

use crate::config::WorkonConfig;
use crate::error::Result;
use crate::key::PackageKey;
use crate::manifest::{ManifestTool, ProjectPath};
use crate::portage::{PackageQuery, PortageEnv};
use crate::privilege::Privilege;
use crate::store::LiveStore;
use crate::target::{BuildTarget, TargetPaths};
use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct Session {
    config: WorkonConfig,
    store: LiveStore,
    query: Box<dyn PackageQuery>,
    manifest: Box<dyn ManifestTool>,
    env: OnceCell<PortageEnv>,
    projects: OnceCell<Vec<ProjectPath>>,
    ebuilds: RefCell<HashMap<PackageKey, PathBuf>>,
}

impl Session {
    /// Open the session for `target`
    ///
    /// Fails with `TargetNotSetUp` before any state file is created when the
    /// board sysroot is missing.
    pub fn open(
        config: WorkonConfig,
        target: BuildTarget,
        query: Box<dyn PackageQuery>,
        manifest: Box<dyn ManifestTool>,
    ) -> Result<Self> {
        let paths = TargetPaths::new(&target, &config);
        paths.ensure_set_up(&target)?;
        let store = LiveStore::open(target, paths, &config.live_version)?;

        Ok(Self {
            config,
            store,
            query,
            manifest,
            env: OnceCell::new(),
            projects: OnceCell::new(),
            ebuilds: RefCell::new(HashMap::new()),
        })
    }

    /// Recreate the sysroot symlinks for this target's state files
    pub fn link_into_sysroot(&self) -> Result<()> {
        self.store
            .link_into_sysroot(Privilege::from_config(self.config.use_sudo))
    }

    pub fn config(&self) -> &WorkonConfig {
        &self.config
    }

    pub fn target(&self) -> &BuildTarget {
        self.store.target()
    }

    pub fn store(&self) -> &LiveStore {
        &self.store
    }

    pub fn query(&self) -> &dyn PackageQuery {
        self.query.as_ref()
    }

    pub fn manifest(&self) -> &dyn ManifestTool {
        self.manifest.as_ref()
    }

    /// Portage environment of the target
    pub fn env(&self) -> Result<&PortageEnv> {
        if let Some(env) = self.env.get() {
            return Ok(env);
        }
        let env = self.query.portage_env()?;
        Ok(self.env.get_or_init(|| env))
    }

    /// Keyword selecting live ebuilds (`~<ARCH>`)
    pub fn workon_keyword(&self) -> Result<String> {
        Ok(self.env()?.workon_keyword())
    }

    /// Checkout projects and their paths
    pub fn project_paths(&self) -> Result<&[ProjectPath]> {
        if let Some(projects) = self.projects.get() {
            return Ok(projects);
        }
        let projects = self.manifest.list_projects()?;
        debug!("Manifest lists {} projects", projects.len());
        Ok(self.projects.get_or_init(|| projects))
    }

    /// Resolve `token` to its live ebuild, caching the answer under the derived key
    pub fn which(&self, token: &str) -> Result<(PackageKey, PathBuf)> {
        let keyword = self.workon_keyword()?;
        let ebuild = self.query.which(token, &keyword)?;
        let key = PackageKey::from_ebuild_path(&ebuild)?;
        self.ebuilds
            .borrow_mut()
            .insert(key.clone(), ebuild.clone());
        Ok((key, ebuild))
    }

    /// Live ebuild of a canonical key
    pub fn ebuild_for(&self, key: &PackageKey) -> Result<PathBuf> {
        if let Some(path) = self.ebuilds.borrow().get(key) {
            return Ok(path.clone());
        }
        let (_, ebuild) = self.which(&key.to_string())?;
        Ok(ebuild)
    }

    /// Absolute path of a checkout-relative project path
    pub fn checkout_path(&self, relative: &Path) -> PathBuf {
        self.config.source_root.join(relative)
    }

    /// Checkout-relative form of an absolute source directory
    pub fn relative_to_checkout<'a>(&self, srcdir: &'a Path) -> &'a Path {
        srcdir.strip_prefix(&self.config.source_root).unwrap_or(srcdir)
    }
}
