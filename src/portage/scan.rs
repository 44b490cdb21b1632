// src/portage/scan.rs

//! Scanning overlays for live cros-workon ebuilds
//!
//! Only files named `<pkg>-<live version>.ebuild` are considered, so a
//! package with several versioned ebuilds is matched once. The ebuild text
//! is inspected statically: an `inherit` line naming `cros-workon` marks the
//! package as workon-capable, and `KEYWORDS` decides whether it applies to
//! the architecture being queried.

use crate::error::Result;
use crate::key::PackageKey;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Eclass that marks an ebuild as workon-capable
pub const WORKON_ECLASS: &str = "cros-workon";

static INHERIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*inherit\s+(.*)$").expect("valid inherit regex"));

static KEYWORDS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*KEYWORDS=["']?([^"'\n]*)["']?"#).expect("valid keywords regex")
});

static PROJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*CROS_WORKON_PROJECT=(\([^)]*\)|"[^"\n]*"|'[^'\n]*'|\S+)"#)
        .expect("valid project regex")
});

/// Whether the ebuild text inherits the cros-workon eclass
pub fn inherits_workon(ebuild: &str) -> bool {
    INHERIT_RE
        .captures_iter(ebuild)
        .any(|caps| caps[1].split_whitespace().any(|e| e == WORKON_ECLASS))
}

/// Whether the ebuild's `KEYWORDS` accept `keyword`
///
/// `keyword` is either a stable (`amd64`) or testing (`~amd64`) keyword.
/// The wildcards `*` and `~*` in the ebuild accept any architecture.
pub fn declares_keyword(ebuild: &str, keyword: &str) -> bool {
    KEYWORDS_RE.captures_iter(ebuild).any(|caps| {
        caps[1]
            .split_whitespace()
            .any(|k| k == keyword || k == "*" || k == "~*")
    })
}

/// Statically evaluate `CROS_WORKON_PROJECT`, expanding the package variables
///
/// Returns an empty list if the ebuild does not declare a project.
pub fn declared_projects(ebuild: &str, key: &PackageKey) -> Vec<String> {
    let Some(caps) = PROJECT_RE.captures_iter(ebuild).last() else {
        return Vec::new();
    };
    let raw = caps[1].trim();

    let words: Vec<&str> = match raw.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        Some(inner) => inner.split_whitespace().collect(),
        None => vec![raw],
    };

    words
        .into_iter()
        .map(|w| w.trim_matches(|c| c == '"' || c == '\''))
        .filter(|w| !w.is_empty())
        .map(|w| expand_package_vars(w, key))
        .collect()
}

fn expand_package_vars(value: &str, key: &PackageKey) -> String {
    value
        .replace("${CATEGORY}", key.category())
        .replace("${PN}", key.package())
        .replace("$PN", key.package())
}

/// Find live ebuilds in `overlays` that inherit cros-workon and accept `keyword`
///
/// Results are sorted and contain each path once.
pub fn scan_packages_by_keyword(
    overlays: &[PathBuf],
    keyword: &str,
    live_version: &str,
) -> Result<Vec<PathBuf>> {
    let suffix = format!("-{}.ebuild", live_version);
    let mut found = Vec::new();

    for overlay in overlays {
        if !overlay.exists() {
            warn!("Skipping missing overlay {}", overlay.display());
            continue;
        }
        // The overlay root itself may be a symlink; follow it but nothing below.
        for entry in WalkDir::new(overlay).follow_root_links(true).min_depth(3).max_depth(3) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry under {}: {}", overlay.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            if !is_live_ebuild_name(entry.path(), name, &suffix) {
                continue;
            }

            let text = fs::read_to_string(entry.path())?;
            if inherits_workon(&text) && declares_keyword(&text, keyword) {
                found.push(entry.into_path());
            }
        }
    }

    found.sort();
    found.dedup();
    debug!("Found {} workon ebuilds for {}", found.len(), keyword);
    Ok(found)
}

/// `<pkg>/<pkg>-9999.ebuild` where the file name repeats the directory name
fn is_live_ebuild_name(path: &Path, name: &str, suffix: &str) -> bool {
    let Some(stem) = name.strip_suffix(suffix) else {
        return false;
    };
    path.parent()
        .and_then(|p| p.file_name())
        .and_then(|p| p.to_str())
        .is_some_and(|dir| dir == stem)
}

/// Sorted, deduplicated package keys for a list of ebuild paths
pub fn ebuilds_to_packages(ebuilds: &[PathBuf]) -> Vec<PackageKey> {
    let mut keys: Vec<PackageKey> = ebuilds
        .iter()
        .filter_map(|path| match PackageKey::from_ebuild_path(path) {
            Ok(key) => Some(key),
            Err(e) => {
                warn!("{}", e);
                None
            }
        })
        .collect();
    keys.sort();
    keys.dedup();
    keys
}
