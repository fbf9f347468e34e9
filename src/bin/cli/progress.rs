//! Console rendering of archive events.

use std::path::Path;

use console::Term;
use ntfs_streams::{ArchiveObserver, Warning};

use crate::output::{content_line, directory_line, warning_line};

/// Prints one line per directory, file, stream and warning, indented by
/// nesting depth.
pub struct ConsoleReporter {
    term: Term,
}

impl ConsoleReporter {
    /// Creates a reporter writing to stdout
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }

    fn print(&self, line: &str) {
        if let Err(e) = self.term.write_line(line) {
            log::debug!("console write failed: {}", e);
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl ArchiveObserver for ConsoleReporter {
    fn on_directory(&mut self, path: &Path, depth: usize) {
        self.print(&directory_line(&display_name(path), depth));
    }

    fn on_file(&mut self, path: &Path, size: u64, depth: usize) {
        self.print(&content_line(&display_name(path), size, depth, false));
    }

    fn on_stream(&mut self, path: &Path, size: u64, depth: usize) {
        self.print(&content_line(&display_name(path), size, depth, true));
    }

    fn on_warning(&mut self, warning: &Warning, depth: usize) {
        let path = warning.path().display().to_string();
        self.print(&warning_line(&path, &warning.to_string(), depth));
    }
}
