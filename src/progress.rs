//! Progress output for user-facing status updates.
//!
//! In verbose mode output is suppressed since tracing handles everything.
//! In normal mode output is shown with colors to give feedback while
//! lookups and renames are running.

use colored::Colorize;
use std::io::{self, IsTerminal, Write};
use std::path::Path;

/// Progress reporter for user-facing output
pub struct Progress {
    writer: Box<dyn Write + Send>,
    /// When true, all output is suppressed (verbose mode uses tracing instead)
    silent: bool,
    colors_enabled: bool,
}

/// Check if we should use colors in output
pub fn should_use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }
    io::stderr().is_terminal()
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress {
    /// Create a new progress reporter writing to stderr
    pub fn new() -> Self {
        Self::new_with_ui(false, should_use_colors())
    }

    /// When `verbose` is set, output is suppressed (tracing handles it)
    pub fn new_with_ui(verbose: bool, colors_enabled: bool) -> Self {
        Self {
            writer: Box::new(io::stderr()),
            silent: verbose,
            colors_enabled,
        }
    }

    /// Create a progress reporter with a custom writer (for testing)
    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer,
            silent: false,
            colors_enabled: false,
        }
    }

    pub fn silent() -> Self {
        Self {
            writer: Box::new(io::sink()),
            silent: true,
            colors_enabled: false,
        }
    }

    pub fn scan_complete(&mut self, dir: &Path, count: usize) {
        if self.silent {
            return;
        }
        let line = format!("Found {} file(s) in {}", count, dir.display());
        if self.colors_enabled {
            let _ = writeln!(self.writer, "{}", line.dimmed());
        } else {
            let _ = writeln!(self.writer, "{}", line);
        }
    }

    /// Report that episode lookups have started
    pub fn lookup_start(&mut self, count: usize) {
        if self.silent {
            return;
        }
        let line = format!("Looking up {} episode(s) on TheTVDB...", count);
        if self.colors_enabled {
            let _ = write!(self.writer, "{}", line.dimmed());
        } else {
            let _ = write!(self.writer, "{}", line);
        }
        let _ = self.writer.flush();
    }

    /// Report lookups finished (same line)
    pub fn lookup_complete(&mut self) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let _ = writeln!(self.writer, " {}", "done".green());
        } else {
            let _ = writeln!(self.writer, " done");
        }
    }

    /// Report progress on a single rename
    pub fn rename_progress(&mut self, current: usize, total: usize, from: &str, to: &str) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let counter = format!("[{}/{}]", current, total);
            let _ = writeln!(
                self.writer,
                "{} {} {} {}",
                counter.cyan(),
                from.dimmed(),
                "→".cyan(),
                to
            );
        } else {
            let _ = writeln!(self.writer, "[{}/{}] {} -> {}", current, total, from, to);
        }
    }

    /// Report a failed item (non-fatal)
    pub fn item_failed(&mut self, file_name: &str, reason: &str) {
        self.warn(&format!("{}: {}", file_name, reason));
    }

    /// Report an error during operation (non-fatal)
    pub fn warn(&mut self, message: &str) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let _ = writeln!(self.writer, "{} {}", "!".yellow().bold(), message.yellow());
        } else {
            let _ = writeln!(self.writer, "Warning: {}", message);
        }
    }

    pub fn journal_written(&mut self, path: &Path) {
        if self.silent {
            return;
        }
        let line = format!("Journal saved to: {}", path.display());
        if self.colors_enabled {
            let _ = writeln!(self.writer, "{}", line.dimmed());
        } else {
            let _ = writeln!(self.writer, "{}", line);
        }
    }

    /// Report starting an undo
    pub fn undo_start(&mut self, total: usize, from_timestamp: &str) {
        if self.silent {
            return;
        }
        let line = format!("Undoing {} rename(s) from journal ({})", total, from_timestamp);
        let _ = writeln!(self.writer);
        if self.colors_enabled {
            let _ = writeln!(self.writer, "{}", line.bold());
        } else {
            let _ = writeln!(self.writer, "{}", line);
        }
    }

    /// Report undo complete
    pub fn undo_complete(&mut self, restored: usize, failed: usize) {
        if self.silent {
            return;
        }
        let _ = writeln!(self.writer);
        if self.colors_enabled {
            let mark = if failed == 0 { "✓".green().bold() } else { "!".yellow().bold() };
            let _ = writeln!(
                self.writer,
                "{} {}",
                mark,
                format!("{} file(s) restored, {} failed", restored, failed).green()
            );
        } else {
            let _ = writeln!(
                self.writer,
                "Undo complete. {} file(s) restored, {} failed.",
                restored, failed
            );
        }
    }
}
