//! Path utilities.
//!
//! Shell-like path expansion plus the classification helpers fences use to
//! decide how an item target is treated (web link, network share, local
//! file) and how new files get collision-safe names.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

/// Matches targets that are web URLs rather than filesystem paths.
static WEB_LINK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(?:(?:https?|ftps?)://|mailto:|www\.)").ok());

/// File extensions treated as directly executable (run-as-admin capable).
const EXECUTABLE_EXTENSIONS: [&str; 8] = ["exe", "bat", "cmd", "com", "msi", "ps1", "sh", "app"];

/// Expands shell-like paths (tilde) to absolute paths.
///
/// The path can be:
/// - Absolute (starts with `/`): returned as-is
/// - Home-relative (starts with `~`): expanded to the user's home directory
/// - Relative: returned as-is
#[must_use]
pub fn expand(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return PathBuf::new();
    }

    let expanded = shellexpand::tilde(path);
    PathBuf::from(expanded.as_ref())
}

/// Returns whether a target is a web URL.
#[must_use]
pub fn is_web_link(target: &str) -> bool {
    let target = target.trim().to_ascii_lowercase();
    WEB_LINK.as_ref().is_some_and(|re| re.is_match(&target))
}

/// Returns whether a target is a UNC / network share path.
///
/// Both `\\server\share` and `//server/share` spellings count.
#[must_use]
pub fn is_network_path(target: &str) -> bool {
    let target = target.trim();
    (target.starts_with(r"\\") || target.starts_with("//"))
        && !target.starts_with("///")
        && target.len() > 2
}

/// Returns whether a path looks directly executable.
#[must_use]
pub fn is_executable(path: &Path) -> bool {
    if path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXECUTABLE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
    {
        return true;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = std::fs::metadata(path) {
            return metadata.is_file() && metadata.permissions().mode() & 0o111 != 0;
        }
    }

    false
}

/// Returns the label for a path: its file name without the extension.
#[must_use]
pub fn display_stem(path: &str) -> String {
    let trimmed = path.trim_end_matches(['/', '\\']);
    let file_name = trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed);

    match file_name.rfind('.') {
        Some(0) | None => file_name.to_string(),
        Some(idx) => file_name[..idx].to_string(),
    }
}

/// Returns a path inside `dir` named `file_name` that does not exist yet.
///
/// Collisions are resolved by appending ` (1)`, ` (2)`, ... before the
/// extension, the same way file managers do.
#[must_use]
pub fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let as_path = Path::new(file_name);
    let stem = as_path.file_stem().and_then(|s| s.to_str()).unwrap_or(file_name);
    let extension = as_path.extension().and_then(|s| s.to_str());

    (1..)
        .map(|n| match extension {
            Some(ext) => dir.join(format!("{stem} ({n}).{ext}")),
            None => dir.join(format!("{stem} ({n})")),
        })
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}
