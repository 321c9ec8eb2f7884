#![allow(clippy::multiple_crate_versions)]

//! Fences command-line interface.
//!
//! Inspects and edits the fence document through the same engine the desktop
//! shell runs, on the headless host.

fn main() {
    if let Err(err) = fences_lib::cli::run() {
        eprintln!("fences: {err}");
        std::process::exit(1);
    }
}
