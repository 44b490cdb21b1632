// src/portage/mod.rs

//! Portage tooling used to resolve and inspect packages
//!
//! Queries go through the [`PackageQuery`] trait so the engines can run
//! against the real portage wrappers or against fixtures. [`PortageTools`]
//! shells out to `portageq`, `equery` and `ebuild`, using the
//! `<tool>-<board>` wrappers when operating on a board.

pub mod info;
pub mod scan;

pub use info::{EbuildInfo, InfoRecord, InfoValue};
pub use scan::{
    WORKON_ECLASS, declared_projects, declares_keyword, ebuilds_to_packages, inherits_workon,
    scan_packages_by_keyword,
};

use crate::error::{Error, Result};
use crate::target::BuildTarget;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Build environment of a target, read once per invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortageEnv {
    /// Portage architecture (`amd64`, `arm64`, ...)
    pub arch: String,
    /// Main tree followed by every overlay, in portage order
    pub overlays: Vec<PathBuf>,
}

impl PortageEnv {
    pub fn from_record(record: &InfoRecord) -> Result<Self> {
        let arch = record
            .scalar("ARCH")
            .filter(|a| !a.is_empty())
            .ok_or_else(|| Error::Parse("ARCH is not set in the portage environment".to_string()))?
            .to_string();

        let mut overlays: Vec<PathBuf> = Vec::new();
        for dir in record
            .words("PORTDIR")
            .into_iter()
            .chain(record.words("PORTDIR_OVERLAY"))
        {
            let dir = PathBuf::from(dir);
            if !overlays.contains(&dir) {
                overlays.push(dir);
            }
        }

        Ok(Self { arch, overlays })
    }

    /// Keyword selecting live ebuilds for this architecture (`~amd64`)
    pub fn workon_keyword(&self) -> String {
        format!("~{}", self.arch)
    }
}

/// Read-only access to the package database of one target
pub trait PackageQuery {
    /// `ARCH` and the overlay list
    fn portage_env(&self) -> Result<PortageEnv>;

    /// Path of the ebuild that satisfies `token` under `accept_keywords`,
    /// considering masked ebuilds too
    fn which(&self, token: &str, accept_keywords: &str) -> Result<PathBuf>;

    /// Source layout declared by an ebuild
    fn ebuild_info(&self, ebuild: &Path) -> Result<EbuildInfo>;
}

/// [`PackageQuery`] backed by the portage command-line tools
#[derive(Debug, Clone)]
pub struct PortageTools {
    target: BuildTarget,
}

impl PortageTools {
    pub fn new(target: BuildTarget) -> Self {
        Self { target }
    }

    fn run<I, S>(&self, base: &str, args: I, env: &[(&str, &str)]) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let tool = self.target.tool(base);
        let program = which::which(&tool).map_err(|_| {
            Error::tool(
                &tool,
                if self.target.is_host() {
                    "not found in PATH; is this running inside the SDK?".to_string()
                } else {
                    format!("not found in PATH; run setup_board --board={}", self.target)
                },
            )
        })?;

        let mut command = Command::new(program);
        command.args(args).envs(env.iter().copied());
        debug!("Running {:?}", command);

        let output = command
            .output()
            .map_err(|e| Error::tool(&tool, format!("Failed to run: {}", e)))?;

        if !output.status.success() {
            return Err(Error::tool(
                &tool,
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

impl PackageQuery for PortageTools {
    fn portage_env(&self) -> Result<PortageEnv> {
        let output = self.run(
            "portageq",
            ["envvar", "-v", "ARCH", "PORTDIR", "PORTDIR_OVERLAY"],
            &[],
        )?;
        let env = PortageEnv::from_record(&InfoRecord::parse(&output)?)?;
        debug!("ARCH={} with {} overlays", env.arch, env.overlays.len());
        Ok(env)
    }

    fn which(&self, token: &str, accept_keywords: &str) -> Result<PathBuf> {
        let output = self
            .run(
                "equery",
                ["which", "--include-masked", token],
                &[("ACCEPT_KEYWORDS", accept_keywords)],
            )
            .map_err(|e| Error::LookupFailed {
                token: token.to_string(),
                reason: e.to_string(),
            })?;

        output
            .lines()
            .map(str::trim)
            .filter(|l| l.ends_with(".ebuild"))
            .last()
            .map(PathBuf::from)
            .ok_or_else(|| Error::LookupFailed {
                token: token.to_string(),
                reason: "no ebuild in equery output".to_string(),
            })
    }

    fn ebuild_info(&self, ebuild: &Path) -> Result<EbuildInfo> {
        let output = self.run("ebuild", [ebuild.as_os_str(), OsStr::new("info")], &[])?;
        Ok(EbuildInfo::from_record(&InfoRecord::parse(&output)?))
    }
}
