//! CLI command definitions using Clap.
//!
//! - `config_cmd` - configuration file management
//! - `fence` - commands that read or change the fence document
//! - `types` - argument types shared across commands

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::config::{self, FencesConfig};
use crate::error::FencesError;
use crate::{logging, schema};

pub mod config_cmd;
pub mod fence;
pub mod types;

pub use config_cmd::ConfigCommands;
use fence::SessionOptions;
use types::{CliFenceKind, Position, Switch};

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fences CLI - inspect and edit desktop fences.
#[derive(Parser, Debug)]
#[command(name = "fences")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Directory holding `fences.json`, overriding the configured one.
    #[arg(long, short, global = true, value_name = "DIR")]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// List every fence.
    List {
        /// Output as JSON.
        #[arg(long, short)]
        json: bool,
    },

    /// Print one fence record as JSON.
    Show {
        /// Fence id, id prefix, or title.
        fence: String,
    },

    /// Create a fence.
    #[command(after_long_help = r#"Examples:
  fences create                           # Data fence at 100,100
  fences create --kind note --at 400,300 --title Todo
  fences create --kind portal --path ~/Downloads"#)]
    Create {
        #[arg(long, short, value_enum, default_value = "data")]
        kind: CliFenceKind,

        /// Top-left corner as X,Y.
        #[arg(long, default_value = "100,100")]
        at: Position,

        #[arg(long, short)]
        title: Option<String>,

        /// Folder mirrored by a Portal fence.
        #[arg(long, short, value_name = "FOLDER")]
        path: Option<PathBuf>,
    },

    /// Delete a fence.
    Delete {
        /// Fence id, id prefix, or title.
        fence: String,

        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },

    /// Set one field of a fence.
    ///
    /// The value is read as JSON when it parses, otherwise as a string.
    #[command(after_long_help = r#"Examples:
  fences set Work Title "Work stuff"
  fences set Work CustomColor Blue
  fences set Work CustomColor null   # back to the global color
  fences set Work IconSize 48"#)]
    Set {
        /// Fence id, id prefix, or title.
        fence: String,

        /// Document field name, e.g. `Title` or `IsLocked`.
        field: String,

        value: String,
    },

    /// Hide a fence.
    Hide {
        /// Fence id, id prefix, or title.
        fence: String,
    },

    /// Show a hidden fence again.
    Unhide {
        /// Fence id, id prefix, or title.
        fence: String,
    },

    /// List hidden fences.
    Hidden {
        /// Output as JSON.
        #[arg(long, short)]
        json: bool,
    },

    /// Add files to a fence as if they were dropped onto it.
    AddItem {
        /// Fence id, id prefix, or title.
        fence: String,

        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Roll a fence up to its title bar, or back down.
    Roll {
        /// Fence id, id prefix, or title.
        fence: String,

        #[arg(value_enum, default_value = "toggle")]
        state: Switch,
    },

    /// Lock or unlock a fence.
    Lock {
        /// Fence id, id prefix, or title.
        fence: String,

        #[arg(value_enum, default_value = "toggle")]
        state: Switch,
    },

    /// Upgrade the fence document to the current format.
    Migrate {
        /// Report what would change without writing.
        #[arg(long)]
        dry_run: bool,
    },

    /// Configuration file management commands.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Output the configuration JSON Schema.
    Schema,

    /// Generate shell completions.
    ///
    /// Usage:
    ///   eval "$(fences completions --shell zsh)"
    ///   fences completions --shell fish > ~/.config/fish/completions/fences.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), FencesError> {
        if let Some(ref path) = self.config {
            let path_buf = PathBuf::from(path);
            if !path_buf.exists() {
                return Err(FencesError::ConfigError(format!("Configuration file not found: {path}")));
            }
            config::set_custom_config_path(path_buf);
        }

        match &self.command {
            Commands::Config(cmd) => return config_cmd::execute(cmd),
            Commands::Schema => {
                println!("{}", schema::print_schema());
                return Ok(());
            }
            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                return Ok(());
            }
            _ => {}
        }

        let settings = config::init();
        logging::init(&settings.logging);
        let mut options = SessionOptions { config: self.session_config(settings), ..SessionOptions::default() };

        match &self.command {
            Commands::List { json } => fence::list(&options, *json),
            Commands::Show { fence } => fence::show(&options, fence),
            Commands::Create { kind, at, title, path } => {
                options.folder.clone_from(path);
                fence::create(&options, *kind, *at, title.as_deref())
            }
            Commands::Delete { fence, yes } => {
                options.assume_yes = *yes;
                fence::delete(&options, fence)
            }
            Commands::Set { fence, field, value } => fence::set(&options, fence, field, value),
            Commands::Hide { fence } => fence::set_hidden(&options, fence, true),
            Commands::Unhide { fence } => fence::set_hidden(&options, fence, false),
            Commands::Hidden { json } => fence::hidden(&options, *json),
            Commands::AddItem { fence, paths } => fence::add_items(&options, fence, paths),
            Commands::Roll { fence, state } => fence::roll(&options, fence, *state),
            Commands::Lock { fence, state } => fence::lock(&options, fence, *state),
            Commands::Migrate { dry_run } => fence::migrate(&options, *dry_run),
            Commands::Config(_) | Commands::Schema | Commands::Completions { .. } => Ok(()),
        }
    }

    /// The loaded settings with `--data` applied.
    fn session_config(&self, settings: &FencesConfig) -> FencesConfig {
        let mut config = settings.clone();
        if let Some(dir) = &self.data {
            config.data_dir = Some(dir.to_string_lossy().into_owned());
        }
        config
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, "fences", &mut io::stdout());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // CLI parsing tests
    // ========================================================================

    #[test]
    fn test_cli_parses_list_json() {
        let cli = Cli::try_parse_from(["fences", "list", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::List { json: true }));
    }

    #[test]
    fn test_cli_parses_global_data_dir() {
        let cli = Cli::try_parse_from(["fences", "list", "--data", "/tmp/fences"]).unwrap();
        assert_eq!(cli.data, Some(PathBuf::from("/tmp/fences")));

        let config = cli.session_config(&FencesConfig::default());
        assert_eq!(config.document_path(), PathBuf::from("/tmp/fences/fences.json"));
    }

    #[test]
    fn test_cli_parses_create_defaults() {
        let cli = Cli::try_parse_from(["fences", "create"]).unwrap();
        match cli.command {
            Commands::Create { kind, at, title, path } => {
                assert_eq!(kind, CliFenceKind::Data);
                assert_eq!(at, Position { x: 100.0, y: 100.0 });
                assert!(title.is_none());
                assert!(path.is_none());
            }
            _ => panic!("Expected Create command"),
        }
    }

    #[test]
    fn test_cli_parses_create_portal() {
        let cli =
            Cli::try_parse_from(["fences", "create", "--kind", "portal", "--path", "/srv/inbox", "--at", "10,20"])
                .unwrap();
        match cli.command {
            Commands::Create { kind, at, path, .. } => {
                assert_eq!(kind, CliFenceKind::Portal);
                assert_eq!(at, Position { x: 10.0, y: 20.0 });
                assert_eq!(path, Some(PathBuf::from("/srv/inbox")));
            }
            _ => panic!("Expected Create command"),
        }
    }

    #[test]
    fn test_cli_rejects_bad_position() {
        assert!(Cli::try_parse_from(["fences", "create", "--at", "left"]).is_err());
    }

    #[test]
    fn test_cli_parses_set() {
        let cli = Cli::try_parse_from(["fences", "set", "Work", "Title", "Work stuff"]).unwrap();
        match cli.command {
            Commands::Set { fence, field, value } => {
                assert_eq!(fence, "Work");
                assert_eq!(field, "Title");
                assert_eq!(value, "Work stuff");
            }
            _ => panic!("Expected Set command"),
        }
    }

    #[test]
    fn test_cli_parses_roll_and_lock_states() {
        let cli = Cli::try_parse_from(["fences", "roll", "Work"]).unwrap();
        assert!(matches!(cli.command, Commands::Roll { state: Switch::Toggle, .. }));

        let cli = Cli::try_parse_from(["fences", "lock", "Work", "off"]).unwrap();
        assert!(matches!(cli.command, Commands::Lock { state: Switch::Off, .. }));
    }

    #[test]
    fn test_cli_add_item_requires_paths() {
        assert!(Cli::try_parse_from(["fences", "add-item", "Work"]).is_err());

        let cli = Cli::try_parse_from(["fences", "add-item", "Work", "a.txt", "b.txt"]).unwrap();
        match cli.command {
            Commands::AddItem { paths, .. } => assert_eq!(paths.len(), 2),
            _ => panic!("Expected AddItem command"),
        }
    }

    #[test]
    fn test_cli_parses_delete_yes() {
        let cli = Cli::try_parse_from(["fences", "delete", "Work", "-y"]).unwrap();
        assert!(matches!(cli.command, Commands::Delete { yes: true, .. }));
    }

    #[test]
    fn test_cli_parses_migrate_dry_run() {
        let cli = Cli::try_parse_from(["fences", "migrate", "--dry-run"]).unwrap();
        assert!(matches!(cli.command, Commands::Migrate { dry_run: true }));
    }

    #[test]
    fn test_cli_parses_completions_zsh() {
        let cli = Cli::try_parse_from(["fences", "completions", "--shell", "zsh"]).unwrap();
        match cli.command {
            Commands::Completions { shell } => assert_eq!(shell, Shell::Zsh),
            _ => panic!("Expected Completions command"),
        }
    }

    #[test]
    fn test_cli_parses_config_init() {
        let cli = Cli::try_parse_from(["fences", "config", "init", "--stdout"]).unwrap();
        assert!(matches!(cli.command, Commands::Config(ConfigCommands::Init { stdout: true, .. })));
    }

    #[test]
    fn test_cli_verify() { Cli::command().debug_assert(); }
}
