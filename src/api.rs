use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::embedded;
use crate::error::{FormatError, SqlreindentError};
use crate::lexer;
use crate::mode::{FormatOptions, Mode};
use crate::reindent;
use crate::report::{FileResult, FileStatus, Report};
use crate::retriever;

/// Reindent one SQL string.
///
/// Runs lexer, retriever and renderer, then checks that the result differs
/// from the input in whitespace and letter case only. On a mismatch the
/// error carries the untouched input.
pub fn format(source: &str, options: &FormatOptions) -> Result<String, FormatError> {
    let tokens = lexer::tokenize(source)?;
    let segments = retriever::parse(&tokens)?;
    let formatted = reindent::render(&segments, options)?;

    if normalize(source) != normalize(&formatted) {
        warn!(
            bytes = source.len(),
            "reindented SQL is not equivalent to its input; keeping the original"
        );
        return Err(FormatError::RoundtripMismatch {
            original: source.to_string(),
        });
    }

    debug!(
        tokens = tokens.len(),
        segments = segments.len(),
        "reindented SQL"
    );
    Ok(formatted)
}

/// Reindent a whole SQL document: like [`format`], with a trailing line
/// break on non-empty output.
pub fn format_document(source: &str, options: &FormatOptions) -> Result<String, FormatError> {
    let mut formatted = format(source, options)?;
    if !formatted.is_empty() {
        formatted.push_str(&options.newline);
    }
    Ok(formatted)
}

/// Drop all whitespace and fold case.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Run the formatter on a collection of files.
pub fn run(files: &[PathBuf], mode: &Mode) -> Report {
    let matching_paths = get_matching_paths(files, mode);
    debug!(files = matching_paths.len(), "formatting files");
    let mut report = Report::new();

    if mode.single_process || matching_paths.len() <= 1 {
        for path in &matching_paths {
            report.add(format_file(path, mode));
        }
        return report;
    }

    use rayon::prelude::*;

    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(mode.threads)
        .build()
    {
        Ok(pool) => pool,
        Err(e) => {
            warn!(error = %e, "could not build thread pool; formatting sequentially");
            for path in &matching_paths {
                report.add(format_file(path, mode));
            }
            return report;
        }
    };

    let results: Vec<FileResult> = pool.install(|| {
        matching_paths
            .par_iter()
            .map(|path| format_file(path, mode))
            .collect()
    });
    for result in results {
        report.add(result);
    }
    report
}

/// Format a single file.
fn format_file(path: &Path, mode: &Mode) -> FileResult {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => return FileResult::failed(path, format!("Read error: {}", e)),
    };

    let formatted = match format_source(path, &source, mode) {
        Ok(f) => f,
        Err(e) => return FileResult::failed(path, e.to_string()),
    };

    let status = if source == formatted {
        FileStatus::Unchanged
    } else {
        FileStatus::Changed
    };
    let mut result = FileResult::new(path, status);

    if status == FileStatus::Changed {
        if mode.diff {
            result.diff = Some(unified_diff(path, &source, &formatted));
        }
        if mode.write {
            if let Err(e) = std::fs::write(path, &formatted) {
                return FileResult::failed(path, format!("Write error: {}", e));
            }
        }
    }
    if mode.prints_output() {
        result.output = Some(formatted);
    }
    result
}

/// Whole-document SQL for `.sql` files, literal rewriting for Go sources.
fn format_source(path: &Path, source: &str, mode: &Mode) -> Result<String, SqlreindentError> {
    if has_extension(path, mode.embedded_extensions()) {
        let rewrite = embedded::rewrite_source(source, &mode.options, &mode.methods)?;
        debug!(
            path = %path.display(),
            replaced = rewrite.replaced,
            skipped = rewrite.failures.len(),
            "rewrote embedded SQL"
        );
        return Ok(rewrite.text);
    }
    Ok(format_document(source, &mode.options)?)
}

/// Get all SQL and Go file paths that match the given inputs.
pub fn get_matching_paths(paths: &[PathBuf], mode: &Mode) -> Vec<PathBuf> {
    let extensions: Vec<&str> = mode
        .sql_extensions()
        .iter()
        .chain(mode.embedded_extensions())
        .copied()
        .collect();
    let mut result = HashSet::new();

    for path in paths {
        if path.is_file() {
            if has_extension(path, &extensions) {
                result.insert(path.clone());
            }
        } else if path.is_dir() {
            collect_files(path, &extensions, &mode.exclude, &mut result);
        }
    }

    let mut sorted: Vec<PathBuf> = result.into_iter().collect();
    sorted.sort();
    sorted
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| extensions.contains(&ext.as_str()))
}

/// Recursively collect matching files from a directory.
fn collect_files(
    dir: &Path,
    extensions: &[&str],
    exclude: &[String],
    result: &mut HashSet<PathBuf>,
) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        // Skip hidden entries and excluded patterns
        if name.starts_with('.') {
            continue;
        }
        if exclude.iter().any(|pattern| {
            glob::Pattern::new(pattern)
                .map(|p| p.matches(&name))
                .unwrap_or(false)
        }) {
            continue;
        }

        if path.is_dir() {
            collect_files(&path, extensions, exclude, result);
        } else if has_extension(&path, extensions) {
            result.insert(path);
        }
    }
}

/// Unified diff between original and formatted content.
fn unified_diff(path: &Path, original: &str, formatted: &str) -> String {
    let name = path.display().to_string();
    similar::TextDiff::from_lines(original, formatted)
        .unified_diff()
        .context_radius(3)
        .header(&name, &name)
        .to_string()
}
