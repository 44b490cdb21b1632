// src/target.rs

//! Build targets and the paths derived from them

use crate::config::WorkonConfig;
use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the state file and symlinks inside each portage config directory
pub const WORKON_FILE_NAME: &str = "cros-workon";

/// Either the SDK host or a board sysroot
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BuildTarget {
    Host,
    Board(String),
}

impl BuildTarget {
    /// Pick the target from command-line flags, falling back to the configured default
    pub fn resolve(board: Option<&str>, host: bool, config: &WorkonConfig) -> Result<Self> {
        match (board, host) {
            (Some(_), true) => Err(Error::Usage(
                "--board and --host are mutually exclusive".to_string(),
            )),
            (Some(board), false) => Self::board(board),
            (None, true) => Ok(Self::Host),
            (None, false) => {
                if let Some(board) = &config.default_board {
                    debug!("Using default board from config: {}", board);
                    return Self::board(board);
                }
                let file = config.default_board_file();
                match std::fs::read_to_string(&file) {
                    Ok(content) if !content.trim().is_empty() => {
                        debug!("Using default board from {}", file.display());
                        Self::board(content.trim())
                    }
                    _ => Err(Error::Usage(
                        "No board specified and no default board set; use --board=NAME or --host"
                            .to_string(),
                    )),
                }
            }
        }
    }

    fn board(name: &str) -> Result<Self> {
        let name = name.trim();
        validate_board_name(name)?;
        Ok(Self::Board(name.to_string()))
    }

    /// Name used for the state file (`host` or the board name)
    pub fn name(&self) -> &str {
        match self {
            Self::Host => "host",
            Self::Board(board) => board,
        }
    }

    /// Suffix appended to portage wrapper tools (`equery-<board>`)
    pub fn tool(&self, base: &str) -> String {
        match self {
            Self::Host => base.to_string(),
            Self::Board(board) => format!("{}-{}", base, board),
        }
    }

    pub fn is_host(&self) -> bool {
        matches!(self, Self::Host)
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Filesystem locations for one target
#[derive(Debug, Clone)]
pub struct TargetPaths {
    /// Root of the target's filesystem (`/` or `/build/<board>`)
    pub sysroot: PathBuf,
    /// Enabled list (`<state_dir>/<target>`)
    pub enabled: PathBuf,
    /// Masked list (`<state_dir>/<target>.mask`)
    pub masked: PathBuf,
}

impl TargetPaths {
    pub fn new(target: &BuildTarget, config: &WorkonConfig) -> Self {
        let sysroot = match target {
            BuildTarget::Host => PathBuf::from("/"),
            BuildTarget::Board(board) => config.board_root.join(board),
        };
        let state_dir = config.state_dir();
        Self {
            sysroot,
            enabled: state_dir.join(target.name()),
            masked: state_dir.join(format!("{}.mask", target.name())),
        }
    }

    /// Directory holding both state files
    pub fn state_dir(&self) -> &Path {
        self.enabled.parent().unwrap_or(Path::new("/"))
    }

    /// Portage-visible symlinks and the state file each must point at
    pub fn symlinks(&self) -> Vec<(PathBuf, &Path)> {
        let portage = self.sysroot.join("etc/portage");
        vec![
            (
                portage.join("package.keywords").join(WORKON_FILE_NAME),
                self.enabled.as_path(),
            ),
            (
                portage.join("package.unmask").join(WORKON_FILE_NAME),
                self.enabled.as_path(),
            ),
            (
                portage.join("package.mask").join(WORKON_FILE_NAME),
                self.masked.as_path(),
            ),
        ]
    }

    /// Fail unless the board name is usable and its sysroot exists
    pub fn ensure_set_up(&self, target: &BuildTarget) -> Result<()> {
        let BuildTarget::Board(board) = target else {
            return Ok(());
        };
        validate_board_name(board)?;
        if self.sysroot.is_dir() {
            return Ok(());
        }
        Err(Error::TargetNotSetUp {
            board: target.name().to_string(),
            path: self.sysroot.display().to_string(),
        })
    }
}

/// Board names become file names in the state directory and under the
/// board root; only `[A-Za-z0-9_-]` is accepted.
fn validate_board_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name != "host"
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(Error::Usage(format!("Invalid board name '{}'", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WorkonConfig {
        WorkonConfig {
            source_root: PathBuf::from("/src"),
            ..WorkonConfig::default()
        }
    }

    #[test]
    fn test_resolve_explicit() {
        let config = config();
        assert_eq!(
            BuildTarget::resolve(Some("eve"), false, &config).unwrap(),
            BuildTarget::Board("eve".to_string())
        );
        assert_eq!(
            BuildTarget::resolve(None, true, &config).unwrap(),
            BuildTarget::Host
        );
    }

    #[test]
    fn test_resolve_ambiguous() {
        let err = BuildTarget::resolve(Some("eve"), true, &config()).unwrap_err();
        assert!(matches!(err, Error::Usage(_)));
    }

    #[test]
    fn test_resolve_rejects_unsafe_board_names() {
        let config = config();
        for name in ["..", ".", ".eve.lock", "eve.mask", "a/b", "host", "eve board", ""] {
            let err = BuildTarget::resolve(Some(name), false, &config).unwrap_err();
            assert!(matches!(err, Error::Usage(_)), "accepted board name {:?}", name);
        }
        assert_eq!(
            BuildTarget::resolve(Some("amd64-generic"), false, &config).unwrap(),
            BuildTarget::Board("amd64-generic".to_string())
        );
        assert_eq!(
            BuildTarget::resolve(Some("veyron_jerry"), false, &config).unwrap(),
            BuildTarget::Board("veyron_jerry".to_string())
        );
    }

    #[test]
    fn test_unsafe_board_not_set_up() {
        let dir = tempfile::tempdir().unwrap();
        let config = WorkonConfig {
            board_root: dir.path().join("build"),
            ..WorkonConfig::default()
        };
        std::fs::create_dir_all(&config.board_root).unwrap();

        // `..` resolves to an existing directory but must still be refused
        let target = BuildTarget::Board("..".to_string());
        let paths = TargetPaths::new(&target, &config);
        assert!(paths.sysroot.is_dir());
        assert!(matches!(paths.ensure_set_up(&target), Err(Error::Usage(_))));
    }

    #[test]
    fn test_resolve_default_from_config() {
        let config = WorkonConfig {
            default_board: Some("kevin".to_string()),
            ..config()
        };
        assert_eq!(
            BuildTarget::resolve(None, false, &config).unwrap(),
            BuildTarget::Board("kevin".to_string())
        );
    }

    #[test]
    fn test_resolve_default_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let scripts = dir.path().join("src/scripts");
        std::fs::create_dir_all(&scripts).unwrap();
        std::fs::write(scripts.join(".default_board"), "octopus\n").unwrap();

        let config = WorkonConfig {
            source_root: dir.path().to_path_buf(),
            ..WorkonConfig::default()
        };
        assert_eq!(
            BuildTarget::resolve(None, false, &config).unwrap(),
            BuildTarget::Board("octopus".to_string())
        );
    }

    #[test]
    fn test_resolve_no_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = WorkonConfig {
            source_root: dir.path().to_path_buf(),
            ..WorkonConfig::default()
        };
        let err = BuildTarget::resolve(None, false, &config).unwrap_err();
        assert!(matches!(err, Error::Usage(_)));
    }

    #[test]
    fn test_tool_names() {
        assert_eq!(BuildTarget::Host.tool("equery"), "equery");
        assert_eq!(
            BuildTarget::Board("eve".to_string()).tool("equery"),
            "equery-eve"
        );
    }

    #[test]
    fn test_paths() {
        let config = config();
        let paths = TargetPaths::new(&BuildTarget::Board("eve".to_string()), &config);
        assert_eq!(paths.sysroot, PathBuf::from("/build/eve"));
        assert_eq!(paths.enabled, PathBuf::from("/src/.config/cros_workon/eve"));
        assert_eq!(paths.masked, PathBuf::from("/src/.config/cros_workon/eve.mask"));
        assert_eq!(paths.state_dir(), Path::new("/src/.config/cros_workon"));

        let links = paths.symlinks();
        assert_eq!(
            links[2].0,
            PathBuf::from("/build/eve/etc/portage/package.mask/cros-workon")
        );
        assert_eq!(links[2].1, paths.masked.as_path());

        let host = TargetPaths::new(&BuildTarget::Host, &config);
        assert_eq!(host.sysroot, PathBuf::from("/"));
        assert_eq!(host.enabled, PathBuf::from("/src/.config/cros_workon/host"));
    }

    #[test]
    fn test_board_not_set_up() {
        let dir = tempfile::tempdir().unwrap();
        let config = WorkonConfig {
            board_root: dir.path().to_path_buf(),
            ..WorkonConfig::default()
        };
        let target = BuildTarget::Board("missing".to_string());
        let paths = TargetPaths::new(&target, &config);
        assert!(matches!(
            paths.ensure_set_up(&target),
            Err(Error::TargetNotSetUp { .. })
        ));
    }
}
