// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Common argument: content root directory
fn root_arg() -> Arg {
    Arg::new("root")
        .value_name("ROOT")
        .required(true)
        .help("Content root containing AppxManifest.xml")
}

fn build_cli() -> Command {
    Command::new("appx-content")
        .version(env!("CARGO_PKG_VERSION"))
        .author("appx-content Contributors")
        .about("Apply content changes to application package manifests")
        .subcommand_required(false)
        .subcommand(
            Command::new("apply")
                .about("Apply every change of a plan file to a content root")
                .arg(root_arg())
                .arg(
                    Arg::new("plan")
                        .short('p')
                        .long("plan")
                        .value_name("FILE")
                        .required(true)
                        .help("Change plan (TOML)"),
                ),
        )
        .subcommand(
            Command::new("add-capability")
                .about("Append a single capability declaration to the manifest")
                .arg(root_arg())
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .required(true)
                        .help("Value of the Name attribute"),
                )
                .arg(
                    Arg::new("namespace")
                        .long("namespace")
                        .help("Registered namespace prefix (std, mp, uap, iot, build)"),
                )
                .arg(
                    Arg::new("element")
                        .long("element")
                        .help("Element name (default: Capability)"),
                )
                .arg(
                    Arg::new("device_id")
                        .long("device-id")
                        .help("Bind the capability to a device"),
                )
                .arg(
                    Arg::new("function_type")
                        .long("function-type")
                        .requires("device_id")
                        .help("Device function type (requires --device-id)"),
                ),
        )
        .subcommand(Command::new("namespaces").about("List the registered namespace prefixes"))
}

/// Render the man page for the CLI into `dir`
fn write_man_page(dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let mut page = Vec::new();
    Man::new(build_cli()).render(&mut page)?;
    let path = dir.join("appx-content.1");
    fs::write(&path, page)?;
    Ok(path)
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/main.rs");

    let Some(manifest_dir) = env::var_os("CARGO_MANIFEST_DIR") else {
        println!("cargo:warning=CARGO_MANIFEST_DIR not set, skipping man page");
        return;
    };

    // Man page generation must never fail the build
    if let Err(e) = write_man_page(&Path::new(&manifest_dir).join("man")) {
        println!("cargo:warning=appx-content.1 not generated: {}", e);
    }
}
