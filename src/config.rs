// src/config.rs

//! Configuration for workon
//!
//! Settings are read from a TOML file. Every key is optional; a missing
//! file yields the built-in defaults, which match the layout of a standard
//! SDK chroot.
//!
//! # Example config.toml
//!
//! ```toml
//! source_root = "/mnt/host/source"
//! state_dir = ".config/cros_workon"
//! board_root = "/build"
//! default_board = "amd64-generic"
//!
//! # Packages that may be worked on without inheriting cros-workon
//! live_exceptions = ["chromeos-base/chromeos-chrome"]
//!
//! [chrome]
//! package = "chromeos-base/chromeos-chrome"
//! checkout = "chromium"
//! switch_command = ["chrome_set_ver", "--runhooks"]
//!
//! [tools]
//! repo = "repo"
//! loman = "loman"
//! ```

use crate::error::{Error, Result};
use crate::key::{DEFAULT_LIVE_VERSION, PackageKey};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default path for the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "/etc/workon/config.toml";

/// Environment variable overriding the configuration path
pub const CONFIG_ENV: &str = "WORKON_CONFIG";

const CHROME_PACKAGE: &str = "chromeos-base/chromeos-chrome";

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkonConfig {
    /// Root of the source checkout
    pub source_root: PathBuf,

    /// Directory holding the per-target state files (relative to `source_root`
    /// unless absolute)
    pub state_dir: PathBuf,

    /// Directory containing board sysroots
    pub board_root: PathBuf,

    /// Board used when neither `--board` nor `--host` is given
    pub default_board: Option<String>,

    /// Version marking live ebuilds
    pub live_version: String,

    /// Escalate through sudo when writing sysroot configuration
    pub use_sudo: bool,

    /// Packages accepted as live-eligible without the cros-workon marker
    pub live_exceptions: Vec<String>,

    pub chrome: ChromeConfig,

    pub tools: ToolsConfig,
}

/// Companion handling for the browser package
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChromeConfig {
    /// Package key that triggers the switch
    pub package: String,

    /// Browser checkout directory (relative to `source_root` unless absolute)
    pub checkout: PathBuf,

    /// Command run inside the checkout to follow the manifest
    pub switch_command: Vec<String>,
}

/// Names of external manifest tools
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub repo: String,
    pub loman: String,
}

impl Default for WorkonConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("/mnt/host/source"),
            state_dir: PathBuf::from(".config/cros_workon"),
            board_root: PathBuf::from("/build"),
            default_board: None,
            live_version: DEFAULT_LIVE_VERSION.to_string(),
            use_sudo: true,
            live_exceptions: vec![CHROME_PACKAGE.to_string()],
            chrome: ChromeConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            package: CHROME_PACKAGE.to_string(),
            checkout: PathBuf::from("chromium"),
            switch_command: vec!["chrome_set_ver".to_string(), "--runhooks".to_string()],
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            repo: "repo".to_string(),
            loman: "loman".to_string(),
        }
    }
}

impl WorkonConfig {
    /// Load configuration from `path`, `$WORKON_CONFIG`, or the default location
    ///
    /// An explicitly named file must exist; the default location may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        match explicit {
            Some(path) => Self::from_file(&path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::from_file(path)
                } else {
                    debug!("No config at {}, using defaults", DEFAULT_CONFIG_PATH);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let config = Self::parse(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.live_version.is_empty() {
            return Err(Error::Config("live_version must not be empty".to_string()));
        }
        for exception in &self.live_exceptions {
            PackageKey::parse(exception)
                .map_err(|e| Error::Config(format!("live_exceptions: {}", e)))?;
        }
        PackageKey::parse(&self.chrome.package)
            .map_err(|e| Error::Config(format!("chrome.package: {}", e)))?;
        Ok(())
    }

    /// Absolute directory holding the state files
    pub fn state_dir(&self) -> PathBuf {
        self.source_root.join(&self.state_dir)
    }

    /// Absolute browser checkout directory
    pub fn chrome_checkout(&self) -> PathBuf {
        self.source_root.join(&self.chrome.checkout)
    }

    /// File naming the default board in the source checkout
    pub fn default_board_file(&self) -> PathBuf {
        self.source_root.join("src/scripts/.default_board")
    }

    /// Whether `key` is exempt from the cros-workon marker requirement
    pub fn is_live_exception(&self, key: &PackageKey) -> bool {
        let key = key.to_string();
        self.live_exceptions.iter().any(|e| *e == key)
    }

    /// Whether `key` is the browser package
    pub fn is_chrome(&self, key: &PackageKey) -> bool {
        key.to_string() == self.chrome.package
    }
}
