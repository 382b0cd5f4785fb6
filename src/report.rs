use std::io::{self, Write};
use std::path::{Path, PathBuf};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Status of formatting a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// File was already formatted correctly.
    Unchanged,
    /// File was reformatted (or would be, in check mode).
    Changed,
    /// An error occurred while processing the file.
    Error,
}

/// Result of formatting a single file.
#[derive(Debug, Clone)]
pub struct FileResult {
    pub path: PathBuf,
    pub status: FileStatus,
    pub error: Option<String>,
    /// Formatted text, kept when the run prints it to stdout.
    pub output: Option<String>,
    /// Unified diff against the file on disk.
    pub diff: Option<String>,
}

impl FileResult {
    pub fn new(path: &Path, status: FileStatus) -> Self {
        Self {
            path: path.to_path_buf(),
            status,
            error: None,
            output: None,
            diff: None,
        }
    }

    pub fn failed(path: &Path, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::new(path, FileStatus::Error)
        }
    }
}

/// Aggregated report of formatting results.
#[derive(Debug, Default)]
pub struct Report {
    pub results: Vec<FileResult>,
}

impl Report {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
        }
    }

    pub fn add(&mut self, result: FileResult) {
        self.results.push(result);
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn unchanged(&self) -> usize {
        self.count(FileStatus::Unchanged)
    }

    pub fn changed(&self) -> usize {
        self.count(FileStatus::Changed)
    }

    pub fn errors(&self) -> usize {
        self.count(FileStatus::Error)
    }

    fn count(&self, status: FileStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    pub fn has_errors(&self) -> bool {
        self.errors() > 0
    }

    pub fn has_changes(&self) -> bool {
        self.changed() > 0
    }

    /// Paths of files whose formatting changed.
    pub fn changed_paths(&self) -> impl Iterator<Item = &Path> {
        self.results
            .iter()
            .filter(|r| r.status == FileStatus::Changed)
            .map(|r| r.path.as_path())
    }

    /// Generate a summary string.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("{} file(s) processed", self.total()));
        if self.changed() > 0 {
            parts.push(format!("{} reformatted", self.changed()));
        }
        if self.unchanged() > 0 {
            parts.push(format!("{} unchanged", self.unchanged()));
        }
        if self.errors() > 0 {
            parts.push(format!("{} error(s)", self.errors()));
        }
        parts.join(", ")
    }

    /// Print error details.
    pub fn print_errors(&self) {
        for result in &self.results {
            if let Some(ref error) = result.error {
                eprintln!("error: {}: {}", result.path.display(), error);
            }
        }
    }
}

/// Print a unified diff to stdout, coloring added, removed and hunk lines.
pub fn print_diff(diff: &str, color: bool) -> io::Result<()> {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    for line in diff.split_inclusive('\n') {
        let paint = match line.as_bytes().first() {
            Some(b'+') => Some(Color::Green),
            Some(b'-') => Some(Color::Red),
            Some(b'@') => Some(Color::Cyan),
            _ => None,
        };
        if let Some(c) = paint {
            stdout.set_color(ColorSpec::new().set_fg(Some(c)))?;
        }
        write!(stdout, "{}", line)?;
        if paint.is_some() {
            stdout.reset()?;
        }
    }
    stdout.flush()
}
