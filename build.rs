// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Common argument: package names
fn packages_arg() -> Arg {
    Arg::new("packages")
        .num_args(0..)
        .help("Packages to operate on ('.' selects the current directory's project)")
}

/// Common argument: all packages
fn all_arg(help: &'static str) -> Arg {
    Arg::new("all").long("all").action(ArgAction::SetTrue).help(help)
}

fn build_cli() -> Command {
    Command::new("workon")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Workon Contributors")
        .about("Toggle Portage packages between stable and live (9999) builds")
        .subcommand_required(true)
        .arg(
            Arg::new("board")
                .long("board")
                .global(true)
                .value_name("NAME")
                .help("Board to operate on"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Operate on the SDK host instead of a board"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_name("PATH")
                .help("Configuration file (default: /etc/workon/config.toml)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Show debug logging"),
        )
        .subcommand(
            Command::new("start")
                .about("Start working on packages (build them from the live ebuild)")
                .arg(packages_arg())
                .arg(all_arg("Start every workon-capable package"))
                .arg(
                    Arg::new("remote")
                        .long("remote")
                        .value_name("NAME")
                        .help("Remote for projects the manifest does not track"),
                )
                .arg(
                    Arg::new("revision")
                        .long("revision")
                        .value_name("REF")
                        .help("Revision overriding the manifest default"),
                ),
        )
        .subcommand(
            Command::new("stop")
                .about("Stop working on packages (return to the stable ebuild)")
                .arg(packages_arg())
                .arg(all_arg("Stop every live package")),
        )
        .subcommand(
            Command::new("info")
                .about("Show package, project and checkout path")
                .arg(packages_arg())
                .arg(all_arg("Show every workon-capable package")),
        )
        .subcommand(
            Command::new("list")
                .about("List live packages")
                .arg(all_arg("List every workon-capable package instead")),
        )
        .subcommand(Command::new("list-all").about("List live packages of every target"))
        .subcommand(
            Command::new("iterate")
                .about("Run a command in each package's source directory")
                .arg(packages_arg())
                .arg(all_arg("Iterate over every live package"))
                .arg(
                    Arg::new("command")
                        .long("command")
                        .required(true)
                        .value_name("CMD")
                        .help("Shell command to run"),
                ),
        )
}

/// Render `workon.1` from the builder definition into `out_dir`
fn render_man_page(out_dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(out_dir)?;
    let mut page = Vec::new();
    Man::new(build_cli()).render(&mut page)?;
    let path = out_dir.join("workon.1");
    fs::write(&path, page)?;
    Ok(path)
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // A missing man page must never fail the build
    let Some(manifest_dir) = env::var_os("CARGO_MANIFEST_DIR") else {
        println!("cargo:warning=CARGO_MANIFEST_DIR is unset, skipping man page");
        return;
    };
    if let Err(e) = render_man_page(&Path::new(&manifest_dir).join("man")) {
        println!("cargo:warning=man page not generated: {}", e);
    }
}
