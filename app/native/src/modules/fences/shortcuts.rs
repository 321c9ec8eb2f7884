//! Shortcut files.
//!
//! Items dropped onto a Data fence are stored as shortcut files in a managed
//! folder. The only format written is the INI-style internet shortcut
//! (`.url`), which can point at web URLs and `file://` targets alike. Other
//! shortcut formats are treated as opaque: their own path is the target.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use url::Url;

use crate::platform::path::{display_stem, is_web_link, unique_path};

/// What a shortcut file points at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShortcutTarget {
    pub target: String,
    pub arguments: Option<String>,
}

/// Reads and writes shortcut files.
pub trait ShortcutResolver: Send + Sync {
    /// Whether `path` is a shortcut file this resolver understands.
    fn is_shortcut(&self, path: &Path) -> bool;

    /// Reads the target of a shortcut file.
    fn resolve(&self, path: &Path) -> Option<ShortcutTarget>;

    /// Writes a new shortcut to `target` inside `dir`, never overwriting an
    /// existing file. Returns the path of the created shortcut.
    fn create(&self, dir: &Path, target: &str) -> io::Result<PathBuf>;
}

/// Returns the ultimate target of an item filename: the shortcut's target
/// when it resolves, otherwise the filename itself.
#[must_use]
pub fn resolve_target(resolver: &dyn ShortcutResolver, filename: &str) -> ShortcutTarget {
    let path = Path::new(filename);
    if resolver.is_shortcut(path)
        && let Some(target) = resolver.resolve(path)
    {
        return target;
    }
    ShortcutTarget { target: filename.to_string(), arguments: None }
}

// ============================================================================
// Internet Shortcuts
// ============================================================================

const SECTION: &str = "[InternetShortcut]";
const EXTENSION: &str = "url";

#[derive(Clone, Copy, Debug, Default)]
pub struct InternetShortcutResolver;

impl ShortcutResolver for InternetShortcutResolver {
    fn is_shortcut(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(EXTENSION))
    }

    fn resolve(&self, path: &Path) -> Option<ShortcutTarget> {
        let content = fs::read_to_string(path).ok()?;
        let url = read_url(&content)?;
        let target = file_url_to_path(&url).unwrap_or(url);
        Some(ShortcutTarget { target, arguments: None })
    }

    fn create(&self, dir: &Path, target: &str) -> io::Result<PathBuf> {
        fs::create_dir_all(dir)?;

        let url = if is_web_link(target) {
            target.trim().to_string()
        } else {
            path_to_file_url(target)
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("cannot encode path: {target}")))?
                .into()
        };
        let path = unique_path(dir, &format!("{}.{EXTENSION}", shortcut_name(target)));

        fs::write(&path, format!("{SECTION}\r\nURL={url}\r\n"))?;
        tracing::debug!(
            target: crate::logging::ICONS,
            shortcut = %path.display(),
            target_path = %target,
            "created shortcut"
        );
        Ok(path)
    }
}

/// Extracts the `URL=` value of the internet shortcut section.
fn read_url(content: &str) -> Option<String> {
    let mut in_section = false;
    for line in content.lines().map(str::trim) {
        if line.starts_with('[') {
            in_section = line.eq_ignore_ascii_case(SECTION);
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some((key, value)) = line.split_once('=')
            && key.trim().eq_ignore_ascii_case("URL")
        {
            let value = value.trim();
            return (!value.is_empty()).then(|| value.to_string());
        }
    }
    None
}

/// File name (without extension) for a new shortcut to `target`.
fn shortcut_name(target: &str) -> String {
    let base = if is_web_link(target) {
        let trimmed = target.trim();
        let without_scheme = trimmed.split_once("://").map_or(trimmed, |(_, rest)| rest);
        let without_scheme = without_scheme.strip_prefix("mailto:").unwrap_or(without_scheme);
        without_scheme.split(['/', '?', '#']).next().unwrap_or(without_scheme).to_string()
    } else {
        let trimmed = target.trim_end_matches(['/', '\\']);
        let file_name = trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed);
        if Path::new(target).is_dir() { file_name.to_string() } else { display_stem(file_name) }
    };

    let sanitized: String = base
        .chars()
        .map(|c| if matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|') { '_' } else { c })
        .collect();

    if sanitized.trim().is_empty() { "Shortcut".to_string() } else { sanitized }
}

/// Encodes a filesystem path as a `file://` URL.
///
/// Drive-letter and UNC paths are encoded even on hosts that do not use
/// them, so documents stay portable.
fn path_to_file_url(path: &str) -> Option<Url> {
    let trimmed = path.trim();
    if let Ok(url) = Url::from_file_path(trimmed) {
        return Some(url);
    }

    let normalized = trimmed.replace('\\', "/");
    let mut url = Url::parse("file:///").ok()?;
    if let Some(unc) = normalized.strip_prefix("//") {
        let (host, rest) = unc.split_once('/').unwrap_or((unc, ""));
        url.set_host(Some(host)).ok()?;
        url.set_path(rest);
    } else {
        url.set_path(&normalized);
    }
    Some(url)
}

/// Decodes a `file://` URL back to a filesystem path.
fn file_url_to_path(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    if url.scheme() != "file" {
        return None;
    }
    if let Ok(path) = url.to_file_path() {
        return Some(path.to_string_lossy().into_owned());
    }

    // A share on another machine, on a host without UNC paths.
    let host = url.host_str()?;
    let local = Url::parse(&format!("file://{}", url.path())).ok()?.to_file_path().ok()?;
    Some(format!("//{host}{}", local.to_string_lossy()))
}
