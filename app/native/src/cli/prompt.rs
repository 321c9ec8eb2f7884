//! Terminal implementation of the user prompt.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use colored::Colorize;

use crate::modules::fences::host::UserPrompt;

/// Asks on stdin, reports on stderr.
pub struct TerminalPrompt {
    assume_yes: bool,
    folder: Option<PathBuf>,
}

impl TerminalPrompt {
    /// `assume_yes` answers every confirmation without asking; `folder` is
    /// what a folder pick returns.
    #[must_use]
    pub const fn new(assume_yes: bool, folder: Option<PathBuf>) -> Self { Self { assume_yes, folder } }
}

impl UserPrompt for TerminalPrompt {
    fn confirm(&self, title: &str, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        let mut stderr = io::stderr();
        let _ = write!(stderr, "{} {message} [y/N] ", format!("{title}:").bold());
        let _ = stderr.flush();

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }

    fn notify(&self, title: &str, message: &str) {
        eprintln!("{} {message}", format!("{title}:").yellow().bold());
    }

    fn show_wait(&self, message: &str) { eprintln!("{}", message.dimmed()); }

    fn hide_wait(&self) {}

    fn pick_folder(&self) -> Option<PathBuf> { self.folder.clone() }
}

fn is_yes(answer: &str) -> bool { matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") }
