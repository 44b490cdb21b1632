// tests/common/mod.rs

//! Shared test fixtures: a temporary checkout with an overlay, a board
//! sysroot, and fake portage/manifest tools that record what they were asked.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;
use workon::{
    BuildTarget, EbuildInfo, Error, ManifestTool, PackageKey, PackageQuery, PortageEnv,
    ProjectPath, RemoteSpec, Result, Session, WorkonConfig,
};

pub const BOARD: &str = "eve";
pub const ARCH: &str = "amd64";

/// A call made to the fake manifest tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestCall {
    AddTracked {
        project: String,
        revision: Option<String>,
    },
    AddExplicit {
        project: String,
        path: PathBuf,
        remote: String,
        revision: Option<String>,
    },
    SwitchChrome(PathBuf),
}

#[derive(Debug, Clone)]
struct FakePackage {
    key: PackageKey,
    ebuild: PathBuf,
    info: EbuildInfo,
}

/// Package database answering from the fixture's overlay
pub struct FakeQuery {
    env: PortageEnv,
    packages: Vec<FakePackage>,
    lookups: Rc<RefCell<Vec<String>>>,
}

impl PackageQuery for FakeQuery {
    fn portage_env(&self) -> Result<PortageEnv> {
        Ok(self.env.clone())
    }

    fn which(&self, token: &str, _accept_keywords: &str) -> Result<PathBuf> {
        self.lookups.borrow_mut().push(token.to_string());
        self.packages
            .iter()
            .find(|p| p.key.to_string() == token || p.key.package() == token)
            .map(|p| p.ebuild.clone())
            .ok_or_else(|| Error::LookupFailed {
                token: token.to_string(),
                reason: "no matching ebuild".to_string(),
            })
    }

    fn ebuild_info(&self, ebuild: &Path) -> Result<EbuildInfo> {
        self.packages
            .iter()
            .find(|p| p.ebuild == ebuild)
            .map(|p| p.info.clone())
            .ok_or_else(|| Error::Parse(format!("no info for {}", ebuild.display())))
    }
}

/// Manifest that records every change request
pub struct FakeManifest {
    projects: Vec<ProjectPath>,
    calls: Rc<RefCell<Vec<ManifestCall>>>,
}

impl ManifestTool for FakeManifest {
    fn list_projects(&self) -> Result<Vec<ProjectPath>> {
        Ok(self.projects.clone())
    }

    fn add_tracked(&self, project: &str, revision: Option<&str>) -> Result<()> {
        self.calls.borrow_mut().push(ManifestCall::AddTracked {
            project: project.to_string(),
            revision: revision.map(str::to_string),
        });
        Ok(())
    }

    fn add_explicit(&self, project: &str, path: &Path, remote: &RemoteSpec) -> Result<()> {
        self.calls.borrow_mut().push(ManifestCall::AddExplicit {
            project: project.to_string(),
            path: path.to_path_buf(),
            remote: remote.remote.clone(),
            revision: remote.revision.clone(),
        });
        Ok(())
    }

    fn switch_chrome(&self, checkout: &Path) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(ManifestCall::SwitchChrome(checkout.to_path_buf()));
        Ok(())
    }
}

/// Temporary checkout with one overlay and one board sysroot
pub struct Fixture {
    pub dir: TempDir,
    pub config: WorkonConfig,
    pub overlay: PathBuf,
    packages: Vec<FakePackage>,
    projects: Vec<ProjectPath>,
    pub calls: Rc<RefCell<Vec<ManifestCall>>>,
    pub lookups: Rc<RefCell<Vec<String>>>,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let source_root = dir.path().join("source");
        let board_root = dir.path().join("build");
        let overlay = source_root.join("src/third_party/chromiumos-overlay");

        fs::create_dir_all(&overlay).unwrap();
        fs::create_dir_all(board_root.join(BOARD)).unwrap();

        let config = WorkonConfig {
            source_root,
            board_root,
            use_sudo: false,
            ..WorkonConfig::default()
        };

        Self {
            dir,
            config,
            overlay,
            packages: Vec::new(),
            projects: Vec::new(),
            calls: Rc::new(RefCell::new(Vec::new())),
            lookups: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn source_root(&self) -> &Path {
        &self.config.source_root
    }

    /// Add a live cros-workon ebuild for `key` built from `project`
    ///
    /// The project's source directory is `src/<last project component>`.
    pub fn add_workon_package(&mut self, key: &str, project: &str) -> PackageKey {
        let local = project.rsplit('/').next().unwrap();
        let srcdir = self.source_root().join("src").join(local);
        let text = format!(
            "EAPI=7\nCROS_WORKON_PROJECT=\"{}\"\n\ninherit cros-workon\n\nKEYWORDS=\"~*\"\n",
            project
        );
        self.add_package(key, &text, vec![srcdir], vec![project.to_string()])
    }

    /// Add a live ebuild that does not inherit cros-workon
    pub fn add_plain_package(&mut self, key: &str) -> PackageKey {
        self.add_package(
            key,
            "EAPI=7\ninherit autotools\n\nKEYWORDS=\"~*\"\n",
            Vec::new(),
            Vec::new(),
        )
    }

    /// Add a live ebuild with explicit text and checkout layout
    pub fn add_package(
        &mut self,
        key: &str,
        text: &str,
        srcdirs: Vec<PathBuf>,
        projects: Vec<String>,
    ) -> PackageKey {
        let key: PackageKey = key.parse().unwrap();
        let pkg_dir = self.overlay.join(key.category()).join(key.package());
        fs::create_dir_all(&pkg_dir).unwrap();
        let ebuild = pkg_dir.join(format!("{}-9999.ebuild", key.package()));
        fs::write(&ebuild, text).unwrap();

        self.packages.push(FakePackage {
            key: key.clone(),
            ebuild,
            info: EbuildInfo { srcdirs, projects },
        });
        key
    }

    /// Register a checkout project and create its directory
    pub fn add_checkout_project(&mut self, project: &str, path: &str) -> PathBuf {
        let abs = self.source_root().join(path);
        fs::create_dir_all(&abs).unwrap();
        self.projects.push(ProjectPath::new(project, path));
        abs
    }

    pub fn board(&self) -> BuildTarget {
        BuildTarget::Board(BOARD.to_string())
    }

    /// Open a session on the fixture board with the fake tools
    pub fn session(&self) -> Session {
        self.try_session(self.board()).unwrap()
    }

    pub fn try_session(&self, target: BuildTarget) -> Result<Session> {
        let query = FakeQuery {
            env: PortageEnv {
                arch: ARCH.to_string(),
                overlays: vec![self.overlay.clone()],
            },
            packages: self.packages.clone(),
            lookups: Rc::clone(&self.lookups),
        };
        let manifest = FakeManifest {
            projects: self.projects.clone(),
            calls: Rc::clone(&self.calls),
        };
        Session::open(
            self.config.clone(),
            target,
            Box::new(query),
            Box::new(manifest),
        )
    }

    pub fn state_dir(&self) -> PathBuf {
        self.config.state_dir()
    }

    pub fn enabled_file(&self) -> PathBuf {
        self.state_dir().join(BOARD)
    }

    pub fn masked_file(&self) -> PathBuf {
        self.state_dir().join(format!("{}.mask", BOARD))
    }

    pub fn enabled_contents(&self) -> String {
        fs::read_to_string(self.enabled_file()).unwrap()
    }

    pub fn masked_contents(&self) -> String {
        fs::read_to_string(self.masked_file()).unwrap()
    }

    pub fn manifest_calls(&self) -> Vec<ManifestCall> {
        self.calls.borrow().clone()
    }
}

pub fn keys(names: &[&str]) -> Vec<PackageKey> {
    names.iter().map(|n| n.parse().unwrap()).collect()
}
