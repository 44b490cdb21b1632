// src/store/mod.rs

//! Persistent live/stable state for one build target
//!
//! Each target owns two line-oriented files in the state directory:
//!
//! - the enabled list (`<state_dir>/<target>`), one `=cat/pkg-9999` per live
//!   package; portage reads it through `package.keywords` and
//!   `package.unmask`
//! - the masked list (`<state_dir>/<target>.mask`), one `<cat/pkg-9999` per
//!   live package; portage reads it through `package.mask` so the stable
//!   ebuilds are never selected
//!
//! The enabled list is the source of truth for membership. Every mutation
//! rewrites both files through a temp file and an atomic rename while
//! holding the target's [`StateLock`].

mod lock;

pub use lock::StateLock;

use crate::error::{Error, Result};
use crate::key::PackageKey;
use crate::privilege::Privilege;
use crate::target::{BuildTarget, TargetPaths};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tracing::{debug, info, warn};

/// Whether a package builds from the pinned ebuild or the live one
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum LiveState {
    Stable,
    Live,
}

/// State files for one build target
#[derive(Debug)]
pub struct LiveStore {
    target: BuildTarget,
    paths: TargetPaths,
    live_version: String,
}

impl LiveStore {
    /// Open the store, creating the state directory and empty lists on first use
    pub fn open(target: BuildTarget, paths: TargetPaths, live_version: &str) -> Result<Self> {
        let state_dir = paths.state_dir().to_path_buf();
        fs::create_dir_all(&state_dir).map_err(|e| Error::persistence(&state_dir, e))?;

        for file in [&paths.enabled, &paths.masked] {
            if !file.exists() {
                debug!("Creating empty state file {}", file.display());
                write_lines_atomic(file, &[])?;
            }
        }

        Ok(Self {
            target,
            paths,
            live_version: live_version.to_string(),
        })
    }

    pub fn target(&self) -> &BuildTarget {
        &self.target
    }

    pub fn paths(&self) -> &TargetPaths {
        &self.paths
    }

    pub fn live_version(&self) -> &str {
        &self.live_version
    }

    /// Recreate the portage-visible symlinks pointing at the state files
    ///
    /// Run unconditionally so renamed or migrated targets always end up
    /// pointing at the current files.
    pub fn link_into_sysroot(&self, privilege: Privilege) -> Result<()> {
        for (link, target) in self.paths.symlinks() {
            if let Some(parent) = link.parent() {
                privilege.create_dir_all(parent)?;
            }
            privilege.symlink_force(target, &link)?;
        }
        debug!("Linked state files into {}", self.paths.sysroot.display());
        Ok(())
    }

    /// Current state of `key`
    pub fn state(&self, key: &PackageKey) -> Result<LiveState> {
        Ok(if self.contains(key)? {
            LiveState::Live
        } else {
            LiveState::Stable
        })
    }

    /// Whether `key` is in the enabled list
    pub fn contains(&self, key: &PackageKey) -> Result<bool> {
        let entry = key.enabled_entry(&self.live_version);
        Ok(read_lines(&self.paths.enabled)?.iter().any(|l| l.trim() == entry))
    }

    /// Whether the undecorated `token` appears verbatim in the enabled list
    pub fn contains_token(&self, token: &str) -> Result<Option<PackageKey>> {
        let entry = format!("={}-{}", token, self.live_version);
        if read_lines(&self.paths.enabled)?.iter().any(|l| l.trim() == entry) {
            return Ok(PackageKey::parse(token).ok());
        }
        Ok(None)
    }

    /// Mark `key` live; returns `false` without touching the files if it already is
    pub fn add(&self, key: &PackageKey) -> Result<bool> {
        let _lock = StateLock::acquire(self.paths.state_dir(), self.target.name())?;

        let enabled_entry = key.enabled_entry(&self.live_version);
        let masked_entry = key.masked_entry(&self.live_version);

        let mut enabled = read_lines(&self.paths.enabled)?;
        if enabled.iter().any(|l| l.trim() == enabled_entry) {
            debug!("{} is already in {}", key, self.paths.enabled.display());
            return Ok(false);
        }
        enabled.push(enabled_entry);

        let mut masked = read_lines(&self.paths.masked)?;
        if !masked.iter().any(|l| l.trim() == masked_entry) {
            masked.push(masked_entry);
        }

        write_lines_atomic(&self.paths.enabled, &enabled)?;
        write_lines_atomic(&self.paths.masked, &masked)?;

        info!("Started working on {} for {}", key, self.target);
        Ok(true)
    }

    /// Return `key` to stable; returns `false` if it is not live
    pub fn remove(&self, key: &PackageKey) -> Result<bool> {
        let _lock = StateLock::acquire(self.paths.state_dir(), self.target.name())?;

        let enabled_entry = key.enabled_entry(&self.live_version);
        let masked_entry = key.masked_entry(&self.live_version);

        let enabled = read_lines(&self.paths.enabled)?;
        let masked = read_lines(&self.paths.masked)?;
        let was_live = enabled.iter().any(|l| l.trim() == enabled_entry);
        let stray_mask = masked.iter().any(|l| l.trim() == masked_entry);

        if !was_live {
            debug!("{} is not in {}", key, self.paths.enabled.display());
            if stray_mask {
                warn!("Dropping unpaired mask entry for {}", key);
                write_lines_atomic(&self.paths.masked, &without(masked, &masked_entry))?;
            }
            return Ok(false);
        }

        write_lines_atomic(&self.paths.enabled, &without(enabled, &enabled_entry))?;
        write_lines_atomic(&self.paths.masked, &without(masked, &masked_entry))?;

        info!("Stopped working on {} for {}", key, self.target);
        Ok(true)
    }

    /// Live packages in file order
    pub fn list_live(&self) -> Result<Vec<PackageKey>> {
        parse_enabled(&self.paths.enabled, &self.live_version)
    }
}

/// Live packages of every target with a non-empty enabled list, keyed by target name
pub fn list_all_live(
    state_dir: &Path,
    live_version: &str,
) -> Result<BTreeMap<String, Vec<PackageKey>>> {
    let mut all = BTreeMap::new();

    let entries = match fs::read_dir(state_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(all),
        Err(e) => return Err(e.into()),
    };

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') || name.ends_with(".mask") || !path.is_file() {
            continue;
        }
        if entry.metadata()?.len() == 0 {
            continue;
        }

        let keys = parse_enabled(&path, live_version)?;
        if !keys.is_empty() {
            all.insert(name.to_string(), keys);
        }
    }

    Ok(all)
}

fn parse_enabled(path: &Path, live_version: &str) -> Result<Vec<PackageKey>> {
    Ok(read_lines(path)?
        .iter()
        .filter_map(|line| {
            let key = PackageKey::from_enabled_entry(line, live_version);
            if key.is_none() && !line.trim().is_empty() && !line.trim_start().starts_with('#') {
                warn!("Ignoring malformed line in {}: {}", path.display(), line);
            }
            key
        })
        .collect())
}

fn without(lines: Vec<String>, entry: &str) -> Vec<String> {
    lines.into_iter().filter(|l| l.trim() != entry).collect()
}

/// Read a state file; a missing file reads as empty
fn read_lines(path: &Path) -> Result<Vec<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content.lines().map(str::to_string).collect()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// Replace `path` with `lines` (write to a temp file in the same directory, then rename)
fn write_lines_atomic(path: &Path, lines: &[String]) -> Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::persistence(path, e))?;
    for line in lines {
        writeln!(temp, "{}", line).map_err(|e| Error::persistence(path, e))?;
    }
    temp.as_file()
        .set_permissions(fs::Permissions::from_mode(0o644))
        .map_err(|e| Error::persistence(path, e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| Error::persistence(path, e))?;

    temp.persist(path).map_err(|e| Error::persistence(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkonConfig;
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> LiveStore {
        let config = WorkonConfig {
            source_root: dir.path().to_path_buf(),
            board_root: dir.path().join("build"),
            ..WorkonConfig::default()
        };
        let target = BuildTarget::Board("eve".to_string());
        let paths = TargetPaths::new(&target, &config);
        LiveStore::open(target, paths, "9999").unwrap()
    }

    fn key(s: &str) -> PackageKey {
        PackageKey::parse(s).unwrap()
    }

    fn contents(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_open_creates_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        assert_eq!(contents(&store.paths().enabled), "");
        assert_eq!(contents(&store.paths().masked), "");
        assert!(store.list_live().unwrap().is_empty());
    }

    #[test]
    fn test_add_writes_both_lists() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        assert!(store.add(&key("cat/pkgA")).unwrap());
        assert_eq!(contents(&store.paths().enabled), "=cat/pkgA-9999\n");
        assert_eq!(contents(&store.paths().masked), "<cat/pkgA-9999\n");
        assert_eq!(store.state(&key("cat/pkgA")).unwrap(), LiveState::Live);
    }

    #[test]
    fn test_add_twice_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);

        assert!(store.add(&key("cat/pkgA")).unwrap());
        assert!(!store.add(&key("cat/pkgA")).unwrap());
        assert_eq!(contents(&store.paths().enabled), "=cat/pkgA-9999\n");
        assert_eq!(contents(&store.paths().masked), "<cat/pkgA-9999\n");
    }

    #[test]
    fn test_remove_restores_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        store.add(&key("cat/pkgA")).unwrap();
        let enabled_before = contents(&store.paths().enabled);
        let masked_before = contents(&store.paths().masked);

        store.add(&key("cat/pkgB")).unwrap();
        assert!(store.remove(&key("cat/pkgB")).unwrap());

        assert_eq!(contents(&store.paths().enabled), enabled_before);
        assert_eq!(contents(&store.paths().masked), masked_before);
    }

    #[test]
    fn test_remove_absent_warns_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        store.add(&key("cat/pkgA")).unwrap();

        assert!(!store.remove(&key("cat/other")).unwrap());
        assert_eq!(store.list_live().unwrap(), vec![key("cat/pkgA")]);
    }

    #[test]
    fn test_remove_drops_unpaired_mask() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        fs::write(&store.paths().masked, "<cat/pkgA-9999\n").unwrap();

        assert!(!store.remove(&key("cat/pkgA")).unwrap());
        assert_eq!(contents(&store.paths().masked), "");
    }

    #[test]
    fn test_remove_matches_whole_line() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        store.add(&key("cat/pkg")).unwrap();
        store.add(&key("cat/pkg-extra")).unwrap();

        store.remove(&key("cat/pkg")).unwrap();
        assert_eq!(store.list_live().unwrap(), vec![key("cat/pkg-extra")]);
        assert_eq!(contents(&store.paths().masked), "<cat/pkg-extra-9999\n");
    }

    #[test]
    fn test_contains_token() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        store.add(&key("cat/pkgA")).unwrap();

        assert_eq!(store.contains_token("cat/pkgA").unwrap(), Some(key("cat/pkgA")));
        assert_eq!(store.contains_token("pkgA").unwrap(), None);
    }

    #[test]
    fn test_list_all_live() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        store.add(&key("cat/pkgA")).unwrap();

        let state_dir = store.paths().state_dir().to_path_buf();
        fs::write(state_dir.join("host"), "=dev-util/tool-9999\n").unwrap();
        fs::write(state_dir.join("empty"), "").unwrap();

        let all = list_all_live(&state_dir, "9999").unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["eve"], vec![key("cat/pkgA")]);
        assert_eq!(all["host"], vec![key("dev-util/tool")]);
    }

    #[test]
    fn test_list_all_live_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let all = list_all_live(&dir.path().join("nope"), "9999").unwrap();
        assert!(all.is_empty());
    }

    #[test]
    fn test_link_into_sysroot() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        fs::create_dir_all(&store.paths().sysroot).unwrap();

        store.link_into_sysroot(Privilege::Direct).unwrap();
        for (link, target) in store.paths().symlinks() {
            assert_eq!(fs::read_link(&link).unwrap(), target);
        }
    }
}
