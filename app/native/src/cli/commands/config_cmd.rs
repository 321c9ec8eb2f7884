//! Config CLI commands.

use std::path::PathBuf;

use clap::Subcommand;
use colored::Colorize;

use crate::config::config_paths;
use crate::config::template::{create_config_file, generate_config_template};
use crate::error::FencesError;

/// Config management commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Write a configuration file with every option documented.
    ///
    /// All options are commented out and show their defaults.
    #[command(
        name = "init",
        after_long_help = r#"Examples:
  fences config init              # Create config at default location
  fences config init --force      # Overwrite existing config
  fences config init --path ~/fences.jsonc
  fences config init --stdout     # Print template to stdout"#
    )]
    Init {
        /// Overwrite an existing configuration file.
        #[arg(long, short)]
        force: bool,

        /// Where to write the file instead of the default location.
        #[arg(long, short, value_name = "PATH")]
        path: Option<PathBuf>,

        /// Print the template instead of writing a file.
        #[arg(long)]
        stdout: bool,
    },

    /// Show where configuration files are looked up.
    Path,
}

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cmd: &ConfigCommands) -> Result<(), FencesError> {
    match cmd {
        ConfigCommands::Init { stdout: true, .. } => {
            println!("{}", generate_config_template());
            Ok(())
        }
        ConfigCommands::Init { force, path, .. } => init_config(*force, path.clone()),
        ConfigCommands::Path => {
            show_config_path();
            Ok(())
        }
    }
}

fn init_config(force: bool, custom_path: Option<PathBuf>) -> Result<(), FencesError> {
    let config_path = custom_path
        .or_else(|| config_paths().into_iter().next())
        .unwrap_or_else(|| PathBuf::from("config.jsonc"));

    if config_path.exists() && !force {
        return Err(FencesError::ConfigError(format!(
            "Configuration file already exists at: {}\nUse --force to overwrite.",
            config_path.display()
        )));
    }

    create_config_file(&config_path).map_err(|e| {
        FencesError::ConfigError(format!("Failed to create config file {}: {e}", config_path.display()))
    })?;

    println!("Configuration file created at: {}", config_path.display().to_string().bold());
    println!("\nAll options are commented out by default.");
    Ok(())
}

fn show_config_path() {
    println!("Configuration file search paths (in priority order):\n");

    let mut found_config = false;
    for (i, path) in config_paths().iter().enumerate() {
        let marker = match (path.exists(), found_config) {
            (true, false) => {
                found_config = true;
                " (active)".green().to_string()
            }
            (true, true) => " (exists)".dimmed().to_string(),
            _ => String::new(),
        };
        println!("  {}. {}{marker}", i + 1, path.display());
    }

    if !found_config {
        println!("\nNo configuration file found.");
        println!("Run 'fences config init' to create one.");
    }
}
