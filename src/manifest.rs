// src/manifest.rs

//! Source-checkout manifest tooling
//!
//! The checkout is managed by `repo`; projects are added to the local
//! manifest with `loman`. Both are reached through [`ManifestTool`].

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// One checkout project and where it lives relative to the checkout root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPath {
    pub project: String,
    pub path: PathBuf,
}

impl ProjectPath {
    pub fn new(project: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            project: project.into(),
            path: path.into(),
        }
    }
}

/// Explicit remote for a project the manifest does not already track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSpec {
    pub remote: String,
    pub revision: Option<String>,
}

/// Access to the checkout manifest
pub trait ManifestTool {
    /// Every project in the checkout
    fn list_projects(&self) -> Result<Vec<ProjectPath>>;

    /// Start tracking `project` (already known to the manifest) in the local manifest
    fn add_tracked(&self, project: &str, revision: Option<&str>) -> Result<()>;

    /// Add `project` at `path` from an explicit remote
    fn add_explicit(&self, project: &str, path: &Path, remote: &RemoteSpec) -> Result<()>;

    /// Make the browser checkout follow the manifest
    fn switch_chrome(&self, checkout: &Path) -> Result<()>;
}

/// [`ManifestTool`] backed by `repo` and `loman`
#[derive(Debug, Clone)]
pub struct RepoManifest {
    source_root: PathBuf,
    repo: String,
    loman: String,
    chrome_switch: Vec<String>,
}

impl RepoManifest {
    pub fn new(
        source_root: impl Into<PathBuf>,
        repo: impl Into<String>,
        loman: impl Into<String>,
        chrome_switch: Vec<String>,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            repo: repo.into(),
            loman: loman.into(),
            chrome_switch,
        }
    }

    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<String> {
        debug!("Running {} {} in {}", program, args.join(" "), cwd.display());

        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(|e| Error::tool(program, format!("Failed to run: {}", e)))?;

        if !output.status.success() {
            return Err(Error::tool(
                program,
                format!(
                    "exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl ManifestTool for RepoManifest {
    fn list_projects(&self) -> Result<Vec<ProjectPath>> {
        let output = self.run(&self.repo, &["list"], &self.source_root)?;
        parse_repo_list(&output)
    }

    fn add_tracked(&self, project: &str, revision: Option<&str>) -> Result<()> {
        let mut args: Vec<&str> = vec!["add", "--workon"];
        if let Some(revision) = revision {
            args.extend(["--revision", revision]);
        }
        args.push(project);
        self.run(&self.loman, &args, &self.source_root)?;
        info!("Added {} to the local manifest", project);
        Ok(())
    }

    fn add_explicit(&self, project: &str, path: &Path, remote: &RemoteSpec) -> Result<()> {
        let path = path.to_string_lossy();
        let mut args: Vec<&str> = vec!["add", "--path", &*path, "--remote", remote.remote.as_str()];
        if let Some(revision) = &remote.revision {
            args.extend(["--revision", revision.as_str()]);
        }
        args.push(project);
        self.run(&self.loman, &args, &self.source_root)?;
        info!(
            "Added {} at {} from remote {} to the local manifest",
            project, path, remote.remote
        );
        Ok(())
    }

    fn switch_chrome(&self, checkout: &Path) -> Result<()> {
        let Some((program, args)) = self.chrome_switch.split_first() else {
            debug!("No chrome switch command configured");
            return Ok(());
        };
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run(program, &args, checkout)?;
        info!("Switched {} to the manifest checkout", checkout.display());
        Ok(())
    }
}

/// Parse `repo list` output (`path : project` per line)
pub fn parse_repo_list(output: &str) -> Result<Vec<ProjectPath>> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|line| {
            let (path, project) = line
                .split_once(" : ")
                .ok_or_else(|| Error::Parse(format!("Unexpected repo list line: {}", line)))?;
            Ok(ProjectPath::new(project.trim(), path.trim()))
        })
        .collect()
}
