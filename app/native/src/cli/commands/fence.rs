//! Fence commands.
//!
//! Each command opens a [`Session`]: the configured document loaded into a
//! manager backed by a headless window host.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use colored::Colorize;
use serde_json::Value;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use super::types::{CliFenceKind, Position, Switch};
use crate::cli::output::{self, format_bool, format_outcome, truncate};
use crate::cli::prompt::TerminalPrompt;
use crate::config::FencesConfig;
use crate::error::FencesError;
use crate::modules::fences::host::{HeadlessHost, HeadlessShell};
use crate::modules::fences::manager::prepare_records;
use crate::modules::fences::poller::ThreadedPoller;
use crate::modules::fences::shortcuts::InternetShortcutResolver;
use crate::modules::fences::state::{FenceRecord, ItemsType};
use crate::modules::fences::{FenceEvent, FenceManager, FenceProperty, Services, UpdateOutcome};

const ID_WIDTH: usize = 8;
const TITLE_WIDTH: usize = 32;

// ============================================================================
// Session
// ============================================================================

/// Options shared by every fence command.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Settings with any `--data` override already applied.
    pub config: FencesConfig,
    pub assume_yes: bool,
    /// Folder handed to Portal creation.
    pub folder: Option<PathBuf>,
}

/// A loaded fence document.
pub struct Session {
    manager: FenceManager,
}

impl Session {
    /// Loads the document named by the configuration and `options`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or written back.
    pub fn open(options: &SessionOptions) -> Result<Self, FencesError> {
        let config = options.config.clone();
        let services = Services {
            poller: Arc::new(ThreadedPoller::new()),
            resolver: Arc::new(InternetShortcutResolver),
            prompt: Arc::new(TerminalPrompt::new(options.assume_yes, options.folder.clone())),
            shell: Arc::new(HeadlessShell::new()),
        };

        let mut manager = FenceManager::new(config, Box::new(HeadlessHost::new()), services);
        manager.load()?;
        Ok(Self { manager })
    }

    /// Finds a fence by id, unique id prefix, or case-insensitive title.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing matches or the query is ambiguous.
    pub fn resolve(&self, query: &str) -> Result<String, FencesError> {
        resolve_fence(&self.manager.get_all_records(), query)
    }

    fn record(&self, id: &str) -> Result<&FenceRecord, FencesError> {
        self.manager.record(id).ok_or_else(|| FencesError::FenceNotFound(id.to_string()))
    }
}

impl Drop for Session {
    fn drop(&mut self) { self.manager.shutdown(); }
}

/// Matches `query` against `records`: exact id first, then a unique id
/// prefix, then a unique title.
///
/// # Errors
///
/// Returns an error if nothing matches or more than one fence does.
pub fn resolve_fence(records: &[FenceRecord], query: &str) -> Result<String, FencesError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(FencesError::InvalidArguments("Fence id or title is required".to_string()));
    }
    if let Some(record) = records.iter().find(|r| r.id == query) {
        return Ok(record.id.clone());
    }

    let by_prefix: Vec<&FenceRecord> = records.iter().filter(|r| r.id.starts_with(query)).collect();
    let matches = if by_prefix.is_empty() {
        records.iter().filter(|r| r.title.eq_ignore_ascii_case(query)).collect()
    } else {
        by_prefix
    };

    match matches.as_slice() {
        [] => Err(FencesError::FenceNotFound(query.to_string())),
        [record] => Ok(record.id.clone()),
        _ => Err(FencesError::InvalidArguments(format!(
            "'{query}' matches {} fences, use a longer id",
            matches.len()
        ))),
    }
}

// ============================================================================
// Queries
// ============================================================================

#[derive(Tabled)]
struct FenceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Position")]
    position: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Items")]
    items: usize,
    #[tabled(rename = "Locked")]
    locked: String,
    #[tabled(rename = "Rolled")]
    rolled: String,
    #[tabled(rename = "Hidden")]
    hidden: String,
}

impl From<&FenceRecord> for FenceRow {
    fn from(record: &FenceRecord) -> Self {
        let items = record.items().len() + record.tabs.iter().map(|tab| tab.items.len()).sum::<usize>();
        Self {
            id: truncate(&record.id, ID_WIDTH),
            title: truncate(&record.title, TITLE_WIDTH),
            kind: record.items_type.as_str(),
            position: format!("{:.0}, {:.0}", record.x, record.y),
            size: format!("{:.0} × {:.0}", record.width, record.height),
            items,
            locked: format_bool(record.is_locked()),
            rolled: format_bool(record.is_rolled()),
            hidden: format_bool(record.is_hidden()),
        }
    }
}

/// `fences list`
///
/// # Errors
///
/// Returns an error if the document cannot be loaded.
pub fn list(options: &SessionOptions, json: bool) -> Result<(), FencesError> {
    let session = Session::open(options)?;
    let records = session.manager.get_all_records();

    if json {
        output::print_highlighted_json(&serde_json::to_value(&records)?);
        return Ok(());
    }

    let rows: Vec<FenceRow> = records.iter().map(FenceRow::from).collect();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(5..6)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}

/// `fences show`
///
/// # Errors
///
/// Returns an error if the document cannot be loaded or the fence is unknown.
pub fn show(options: &SessionOptions, query: &str) -> Result<(), FencesError> {
    let session = Session::open(options)?;
    let id = session.resolve(query)?;
    output::print_highlighted_json(&serde_json::to_value(session.record(&id)?)?);
    Ok(())
}

#[derive(Tabled)]
struct HiddenRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
}

/// `fences hidden`
///
/// # Errors
///
/// Returns an error if the document cannot be loaded.
pub fn hidden(options: &SessionOptions, json: bool) -> Result<(), FencesError> {
    let session = Session::open(options)?;
    let hidden = session.manager.hidden_fences();

    if json {
        output::print_highlighted_json(&serde_json::to_value(hidden)?);
    } else if hidden.is_empty() {
        println!("{}", "No hidden fences.".dimmed());
    } else {
        let rows: Vec<HiddenRow> = hidden
            .iter()
            .map(|fence| HiddenRow { id: fence.id.clone(), title: fence.title.clone() })
            .collect();
        println!("{}", Table::new(rows).with(Style::rounded()));
    }
    Ok(())
}

// ============================================================================
// Mutations
// ============================================================================

/// `fences create`
///
/// # Errors
///
/// Returns an error if the fence cannot be created or titled.
pub fn create(
    options: &SessionOptions,
    kind: CliFenceKind,
    at: Position,
    title: Option<&str>,
) -> Result<(), FencesError> {
    let mut session = Session::open(options)?;
    let manager = &mut session.manager;

    let id = match ItemsType::from(kind) {
        ItemsType::Portal => {
            let folder = options.folder.as_deref().ok_or_else(|| {
                FencesError::InvalidArguments("Portal fences need --path <FOLDER>".to_string())
            })?;
            manager.create_portal_fence(&absolute(folder)?, at.x, at.y)?
        }
        other => manager.create_fence(other, at.x, at.y)?,
    };

    if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
        expect_written("Title", manager.update_property(&id, FenceProperty::Title(title.to_string())))?;
    }

    println!("{} {id}", "Created".green().bold());
    Ok(())
}

/// `fences delete`
///
/// # Errors
///
/// Returns an error if the fence is unknown.
pub fn delete(options: &SessionOptions, query: &str) -> Result<(), FencesError> {
    let mut session = Session::open(options)?;
    let id = session.resolve(query)?;

    if session.manager.delete_fence(&id) {
        println!("{} {id}", "Deleted".red().bold());
    } else {
        println!("{}", "Cancelled.".dimmed());
    }
    Ok(())
}

/// Parses a `set` value: JSON when it parses, a plain string otherwise.
#[must_use]
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// `fences set`
///
/// # Errors
///
/// Returns an error if the field is unknown, read-only, or the value invalid.
pub fn set(options: &SessionOptions, query: &str, field: &str, value: &str) -> Result<(), FencesError> {
    let mut session = Session::open(options)?;
    let id = session.resolve(query)?;

    let outcome = session
        .manager
        .update_property_by_name(&id, field, parse_value(value))
        .map_err(|err| FencesError::PropertyError(err.to_string()))?;
    expect_written(field, outcome)
}

/// `fences hide` and `fences unhide`
///
/// # Errors
///
/// Returns an error if the fence is unknown.
pub fn set_hidden(options: &SessionOptions, query: &str, hidden: bool) -> Result<(), FencesError> {
    let mut session = Session::open(options)?;
    let id = session.resolve(query)?;

    let outcome = if hidden { session.manager.hide_fence(&id) } else { session.manager.show_fence(&id) };
    expect_written("IsHidden", outcome)
}

/// `fences roll`
///
/// # Errors
///
/// Returns an error if the fence is unknown.
pub fn roll(options: &SessionOptions, query: &str, state: Switch) -> Result<(), FencesError> {
    let mut session = Session::open(options)?;
    let id = session.resolve(query)?;
    let rolled = state.apply(session.record(&id)?.is_rolled());

    let outcome = session.manager.update_property(&id, FenceProperty::IsRolled(rolled));
    session.manager.finish_animations();
    expect_written("IsRolled", outcome)
}

/// `fences lock`
///
/// # Errors
///
/// Returns an error if the fence is unknown.
pub fn lock(options: &SessionOptions, query: &str, state: Switch) -> Result<(), FencesError> {
    let mut session = Session::open(options)?;
    let id = session.resolve(query)?;
    let locked = state.apply(session.record(&id)?.is_locked());

    expect_written("IsLocked", session.manager.update_property(&id, FenceProperty::IsLocked(locked)))
}

/// `fences add-item`
///
/// Behaves like dropping the files onto the fence.
///
/// # Errors
///
/// Returns an error if the fence is unknown or is a Note fence.
pub fn add_items(options: &SessionOptions, query: &str, paths: &[PathBuf]) -> Result<(), FencesError> {
    let mut session = Session::open(options)?;
    let id = session.resolve(query)?;
    if session.record(&id)?.items_type == ItemsType::Note {
        return Err(FencesError::InvalidArguments("Note fences do not hold items".to_string()));
    }

    let paths = paths.iter().map(|path| absolute(path)).collect::<Result<Vec<_>, _>>()?;
    session.manager.handle_event(&id, FenceEvent::FilesDropped(paths));

    let count = session.record(&id)?.active_items().len();
    println!("{} {count} item(s) in {id}", "✓".green());
    Ok(())
}

/// `fences migrate`
///
/// # Errors
///
/// Returns an error if the document cannot be read or written.
pub fn migrate(options: &SessionOptions, dry_run: bool) -> Result<(), FencesError> {
    let path = options.config.document_path();

    if dry_run {
        let prepared = prepare_records(&path, &InternetShortcutResolver)?;
        println!("Document: {}", path.display());
        println!("Fences: {}", prepared.records.len());
        println!("Portal fences to remove: {}", prepared.purged);
        println!("Needs rewrite: {}", format_bool(prepared.modified));
        return Ok(());
    }

    let session = Session::open(options)?;
    println!(
        "{} {} ({} fences)",
        "Migrated".green().bold(),
        path.display(),
        session.manager.get_all_records().len()
    );
    Ok(())
}

fn expect_written(field: &str, outcome: UpdateOutcome) -> Result<(), FencesError> {
    match outcome {
        UpdateOutcome::Applied | UpdateOutcome::Unchanged => {
            println!("{}", format_outcome(field, &outcome));
            Ok(())
        }
        UpdateOutcome::Rejected(reason) => Err(FencesError::PropertyError(reason)),
        other => Err(FencesError::CommandError(format_outcome(field, &other))),
    }
}

fn absolute(path: &Path) -> Result<PathBuf, FencesError> { Ok(std::path::absolute(path)?) }
