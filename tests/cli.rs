// tests/cli.rs

//! Exit status of the `workon` binary for rejected invocations.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Temp checkout with a config file pointing at it; no board is set up
struct Sandbox {
    dir: TempDir,
    config: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let source_root = dir.path().join("source");
        let board_root = dir.path().join("build");
        std::fs::create_dir_all(&source_root).unwrap();
        std::fs::create_dir_all(board_root.join("eve")).unwrap();

        let config = dir.path().join("config.toml");
        std::fs::write(
            &config,
            format!(
                "source_root = \"{}\"\nboard_root = \"{}\"\nuse_sudo = false\n",
                source_root.display(),
                board_root.display()
            ),
        )
        .unwrap();

        Self { dir, config }
    }

    fn state_dir(&self) -> PathBuf {
        self.dir.path().join("source/.config/cros_workon")
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_workon"))
            .arg("--config")
            .arg(&self.config)
            .args(args)
            .env_remove("WORKON_CONFIG")
            .current_dir(self.dir.path())
            .output()
            .expect("Failed to run workon")
    }
}

fn sysroot_untouched(board_dir: &Path) -> bool {
    !board_dir.join("etc").exists()
}

#[test]
fn test_unknown_command_is_usage_error() {
    let sandbox = Sandbox::new();

    let output = sandbox.run(&["--board=eve", "frobnicate", "shill"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(!output.stderr.is_empty());
    assert!(!sandbox.state_dir().exists());
    assert!(sysroot_untouched(&sandbox.dir.path().join("build/eve")));
}

#[test]
fn test_start_without_packages_is_usage_error() {
    let sandbox = Sandbox::new();

    let output = sandbox.run(&["--board=eve", "start"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(!sandbox.state_dir().exists());
}

#[test]
fn test_unsafe_board_name_is_usage_error() {
    let sandbox = Sandbox::new();

    for board in ["--board=..", "--board=eve.mask"] {
        let output = sandbox.run(&[board, "start", "shill"]);
        assert_eq!(output.status.code(), Some(2), "{}", board);
    }
    assert!(!sandbox.state_dir().exists());
    assert!(!sandbox.dir.path().join("etc").exists());
}

#[test]
fn test_missing_board_fails_without_writes() {
    let sandbox = Sandbox::new();

    let output = sandbox.run(&["--board=kevin", "list"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("kevin"), "stderr: {}", stderr);
    assert!(!sandbox.state_dir().exists());
}
