//! CLI output formatting.

use std::fmt::Write;

use colored::Colorize;

use crate::modules::fences::UpdateOutcome;

/// Prints a JSON value pretty-printed with syntax highlighting.
pub fn print_highlighted_json(value: &serde_json::Value) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
    println!("{}", highlight_json(&json));
}

/// Colors pretty-printed JSON: keys cyan, strings green, numbers yellow,
/// literals magenta, punctuation white.
#[must_use]
pub fn highlight_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len() * 2);
    let mut chars = json.chars().peekable();
    let mut expect_value = false;

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                let mut literal = String::from('"');
                let mut escaped = false;
                for next in chars.by_ref() {
                    literal.push(next);
                    if escaped {
                        escaped = false;
                    } else if next == '\\' {
                        escaped = true;
                    } else if next == '"' {
                        break;
                    }
                }
                let colored = if expect_value { literal.green() } else { literal.cyan() };
                let _ = write!(out, "{colored}");
                expect_value = false;
            }
            ':' => {
                let _ = write!(out, "{}", ":".white());
                expect_value = true;
            }
            ',' => {
                let _ = write!(out, "{}", ",".white());
                expect_value = false;
            }
            '{' | '}' => {
                let _ = write!(out, "{}", ch.to_string().white().bold());
                expect_value = false;
            }
            '[' | ']' => {
                let _ = write!(out, "{}", ch.to_string().white().bold());
                expect_value = ch == '[';
            }
            c if c.is_whitespace() => out.push(c),
            c => {
                let mut scalar = String::from(c);
                while let Some(&next) = chars.peek() {
                    if matches!(next, ',' | '}' | ']') || next.is_whitespace() {
                        break;
                    }
                    scalar.push(next);
                    chars.next();
                }
                let colored = match scalar.as_str() {
                    "true" | "false" | "null" => scalar.magenta(),
                    _ => scalar.yellow(),
                };
                let _ = write!(out, "{colored}");
            }
        }
    }

    out
}

/// Truncates to `max_chars` characters, ending with an ellipsis when cut.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 1 {
        return "…".to_string();
    }
    let kept: String = s.chars().take(max_chars - 1).collect();
    format!("{kept}…")
}

#[must_use]
pub fn format_bool(value: bool) -> String {
    if value { "✓".green().to_string() } else { "✗".red().to_string() }
}

/// One-line report of a property update.
#[must_use]
pub fn format_outcome(field: &str, outcome: &UpdateOutcome) -> String {
    match outcome {
        UpdateOutcome::Applied => format!("{} {field} updated", "✓".green()),
        UpdateOutcome::Unchanged => format!("{} {field} already set", "•".dimmed()),
        UpdateOutcome::Suppressed => format!("{} {field} skipped while the fence is rolling", "!".yellow()),
        UpdateOutcome::NotFound => format!("{} fence not found", "✗".red()),
        UpdateOutcome::Rejected(reason) => format!("{} {field} rejected: {reason}", "✗".red()),
        UpdateOutcome::Failed => format!("{} {field} update failed", "✗".red()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(s: &str) -> String {
        colored::control::set_override(false);
        let out = highlight_json(s);
        colored::control::unset_override();
        out
    }

    #[test]
    fn test_highlight_preserves_text() {
        let json = "{\n  \"Title\": \"a \\\"quoted\\\" name\",\n  \"X\": 10.5,\n  \"IsLocked\": null,\n  \"Items\": [\n    true\n  ]\n}";
        assert_eq!(plain(json), json);
    }

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate("hello world", 8), "hello w…");
        assert_eq!(truncate("hello", 1), "…");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("Bureau à été", 9), "Bureau à…");
        assert_eq!(truncate("hello 🌍 world", 8), "hello 🌍…");
    }

    #[test]
    fn test_format_bool() {
        assert!(format_bool(true).contains('✓'));
        assert!(format_bool(false).contains('✗'));
    }

    #[test]
    fn test_format_outcome_mentions_field() {
        assert!(format_outcome("Title", &UpdateOutcome::Applied).contains("Title updated"));
        assert!(format_outcome("X", &UpdateOutcome::Rejected("bad".to_string())).contains("rejected: bad"));
    }
}
