// src/key.rs

//! Canonical `category/package` keys
//!
//! A key names one package in the overlay corpus without any version or
//! operator decoration. The state files store keys decorated with the live
//! version (`=cat/pkg-9999`, `<cat/pkg-9999`); the helpers here add and
//! strip that decoration.

use crate::error::{Error, Result};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Version used by live (tip-of-tree) ebuilds
pub const DEFAULT_LIVE_VERSION: &str = "9999";

/// A `category/package` identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageKey {
    category: String,
    package: String,
}

impl PackageKey {
    /// Create a key from its two segments
    pub fn new(category: impl Into<String>, package: impl Into<String>) -> Result<Self> {
        let category = category.into();
        let package = package.into();
        validate_segment(&category, "category")?;
        validate_segment(&package, "package")?;
        Ok(Self { category, package })
    }

    /// Parse `category/package`
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (category, package) = s
            .split_once('/')
            .ok_or_else(|| Error::Parse(format!("'{}' is not of the form category/package", s)))?;
        Self::new(category, package)
    }

    /// Derive the key from an ebuild path: the two directories before the file name
    ///
    /// `/overlays/chromiumos/chromeos-base/shill/shill-9999.ebuild` becomes
    /// `chromeos-base/shill`.
    pub fn from_ebuild_path(path: &Path) -> Result<Self> {
        let invalid = || Error::Parse(format!("Cannot derive a package from {}", path.display()));

        let package_dir = path.parent().ok_or_else(invalid)?;
        let category_dir = package_dir.parent().ok_or_else(invalid)?;

        let package = package_dir.file_name().and_then(|n| n.to_str()).ok_or_else(invalid)?;
        let category = category_dir.file_name().and_then(|n| n.to_str()).ok_or_else(invalid)?;

        Self::new(category, package)
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Line written to the enabled list (`=cat/pkg-9999`)
    pub fn enabled_entry(&self, live_version: &str) -> String {
        format!("={}-{}", self, live_version)
    }

    /// Line written to the masked list (`<cat/pkg-9999`)
    pub fn masked_entry(&self, live_version: &str) -> String {
        format!("<{}-{}", self, live_version)
    }

    /// Strip the enabled-list decoration from a line
    ///
    /// Returns `None` for blank lines, comments, and lines that do not carry
    /// the expected live-version atom.
    pub fn from_enabled_entry(line: &str, live_version: &str) -> Option<Self> {
        let line = line.trim();
        let suffix = format!("-{}", live_version);
        let atom = line.strip_prefix('=')?.strip_suffix(suffix.as_str())?;
        Self::parse(atom).ok()
    }
}

impl fmt::Display for PackageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.package)
    }
}

impl FromStr for PackageKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn validate_segment(segment: &str, what: &str) -> Result<()> {
    if segment.is_empty() {
        return Err(Error::Parse(format!("Empty {} in package key", what)));
    }
    if segment.contains('/') || segment.chars().any(char::is_whitespace) {
        return Err(Error::Parse(format!("Invalid {} '{}'", what, segment)));
    }
    if segment.starts_with(['=', '<', '>', '~', '!']) {
        return Err(Error::Parse(format!(
            "{} '{}' carries an atom operator",
            what, segment
        )));
    }
    Ok(())
}
