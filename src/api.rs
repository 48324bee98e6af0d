use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::config::Config;
use crate::error::FormatError;
use crate::formatter::SqlFormatter;
use crate::mode::Mode;
use crate::report::{FileResult, FileStatus, Report};

/// Format a SQL string according to the given config.
/// This is the core API function.
pub fn format_string(source: &str, config: &Config) -> Result<String, FormatError> {
    SqlFormatter::new(config.clone()).format(source)
}

/// Outcome of the format command on one document.
#[derive(Debug)]
pub struct Formatted {
    /// Formatted text, or the untouched source when `error` is set.
    pub text: String,
    pub error: Option<FormatError>,
}

impl Formatted {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Message to show the user, if formatting gave up.
    pub fn user_message(&self) -> Option<String> {
        self.error.as_ref().map(FormatError::user_message)
    }
}

/// The format command: format a whole document, falling back to the
/// original text when the input cannot be formatted.
pub fn format_document(source: &str, config: &Config) -> Formatted {
    match format_string(source, config) {
        Ok(text) => Formatted { text, error: None },
        Err(e) => {
            tracing::warn!(error = %e, "keeping original text");
            Formatted {
                text: source.to_string(),
                error: Some(e),
            }
        }
    }
}

/// Run the formatter on a collection of files.
pub fn run(files: &[PathBuf], mode: &Mode) -> Report {
    let matching_paths = get_matching_paths(files, mode);
    let mut report = Report::new();

    let progress = if mode.show_progress(matching_paths.len()) {
        let bar = ProgressBar::new(matching_paths.len() as u64);
        if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {wide_msg}") {
            bar.set_style(style);
        }
        bar
    } else {
        ProgressBar::hidden()
    };

    if mode.single_process || matching_paths.len() <= 1 {
        for path in &matching_paths {
            report.add(format_file(path, mode));
            progress.inc(1);
        }
    } else {
        // Parallel processing with rayon
        use rayon::prelude::*;

        let format_all = || -> Vec<FileResult> {
            matching_paths
                .par_iter()
                .map(|path| {
                    let result = format_file(path, mode);
                    progress.inc(1);
                    result
                })
                .collect()
        };

        // 0 threads: rayon default, all available cores
        let results = match rayon::ThreadPoolBuilder::new()
            .num_threads(mode.threads)
            .build()
        {
            Ok(pool) => pool.install(format_all),
            Err(e) => {
                tracing::warn!(error = %e, "falling back to the global thread pool");
                format_all()
            }
        };
        for result in results {
            report.add(result);
        }
    }

    progress.finish_and_clear();
    report
}

/// Format a single file.
pub(crate) fn format_file(path: &Path, mode: &Mode) -> FileResult {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            return FileResult::error(path, format!("Read error: {}", e));
        }
    };

    let formatted = match format_string(&source, &mode.config) {
        Ok(f) => f,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "left unchanged");
            return FileResult::error(path, e.user_message());
        }
    };

    if source == formatted {
        tracing::debug!(path = %path.display(), "unchanged");
        return FileResult::new(path, FileStatus::Unchanged);
    }

    if !mode.should_write() {
        if mode.diff {
            print_diff(path, &source, &formatted, mode.color());
        }
        return FileResult::new(path, FileStatus::Changed);
    }

    match std::fs::write(path, &formatted) {
        Ok(_) => {
            tracing::debug!(path = %path.display(), "reformatted");
            FileResult::new(path, FileStatus::Changed)
        }
        Err(e) => FileResult::error(path, format!("Write error: {}", e)),
    }
}

/// Get all SQL file paths that match the given inputs.
pub fn get_matching_paths(paths: &[PathBuf], mode: &Mode) -> Vec<PathBuf> {
    let extensions = mode.sql_extensions();
    let exclude = compile_excludes(&mode.config.exclude);
    let mut result = HashSet::new();

    for path in paths {
        if path.is_file() {
            if is_sql_file(path, extensions) {
                result.insert(path.clone());
            }
        } else if path.is_dir() {
            collect_sql_files(path, extensions, &exclude, &mut result);
        } else {
            tracing::warn!(path = %path.display(), "no such file or directory");
        }
    }

    let mut sorted: Vec<PathBuf> = result.into_iter().collect();
    sorted.sort();
    sorted
}

/// Compile exclude patterns, skipping (and logging) invalid ones.
fn compile_excludes(patterns: &[String]) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|pattern| match glob::Pattern::new(pattern) {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!(pattern = %pattern, error = %e, "ignoring invalid exclude pattern");
                None
            }
        })
        .collect()
}

/// Check if a file has a SQL extension.
pub(crate) fn is_sql_file(path: &Path, extensions: &[&str]) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    extensions
        .iter()
        .any(|ext| name.strip_suffix(ext).is_some_and(|stem| stem.ends_with('.')))
}

/// Recursively collect SQL files from a directory.
fn collect_sql_files(
    dir: &Path,
    extensions: &[&str],
    exclude: &[glob::Pattern],
    result: &mut HashSet<PathBuf>,
) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!(path = %dir.display(), error = %e, "cannot read directory");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        // Skip hidden directories and excluded patterns
        if name.starts_with('.') {
            continue;
        }
        if exclude
            .iter()
            .any(|pattern| pattern.matches(&name) || pattern.matches_path(&path))
        {
            continue;
        }

        if path.is_dir() {
            collect_sql_files(&path, extensions, exclude, result);
        } else if is_sql_file(&path, extensions) {
            result.insert(path);
        }
    }
}

/// Print a diff between original and formatted content.
fn print_diff(path: &Path, original: &str, formatted: &str, color: bool) {
    use similar::{ChangeTag, TextDiff};

    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stderr = StandardStream::stderr(choice);

    let _ = writeln!(stderr, "--- {}", path.display());
    let _ = writeln!(stderr, "+++ {}", path.display());

    let diff = TextDiff::from_lines(original, formatted);
    for change in diff.iter_all_changes() {
        let (sign, fg) = match change.tag() {
            ChangeTag::Delete => ("-", Some(Color::Red)),
            ChangeTag::Insert => ("+", Some(Color::Green)),
            ChangeTag::Equal => (" ", None),
        };
        let _ = stderr.set_color(ColorSpec::new().set_fg(fg));
        let _ = write!(stderr, "{}{}", sign, change);
        if change.missing_newline() {
            let _ = writeln!(stderr);
        }
    }
    let _ = stderr.reset();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_simple_select() {
        let result = format_string("select 1", &Config::default()).unwrap();
        assert!(result.contains("SELECT"));
        assert!(result.contains("1"));
    }

    #[test]
    fn test_format_empty_string() {
        assert_eq!(format_string("", &Config::default()).unwrap(), "");
    }

    #[test]
    fn test_format_document_keeps_original_on_error() {
        let source = "select 'unterminated";
        let outcome = format_document(source, &Config::default());
        assert!(!outcome.is_ok());
        assert_eq!(outcome.text, source);
        assert!(outcome
            .user_message()
            .unwrap()
            .starts_with("SQL format error: syntax error"));
    }

    #[test]
    fn test_format_document_success() {
        let outcome = format_document("select a, b from t", &Config::default());
        assert!(outcome.is_ok());
        assert!(outcome.user_message().is_none());
        assert!(outcome.text.starts_with("SELECT a,"));
    }

    #[test]
    fn test_is_sql_file() {
        let extensions = &["sql", "ddl"];
        assert!(is_sql_file(Path::new("test.sql"), extensions));
        assert!(is_sql_file(Path::new("TEST.SQL"), extensions));
        assert!(is_sql_file(Path::new("schema.ddl"), extensions));
        assert!(!is_sql_file(Path::new("test.py"), extensions));
        assert!(!is_sql_file(Path::new("nosql"), extensions));
    }

    #[test]
    fn test_matching_paths_respect_exclude_and_hidden() {
        let dir = tempfile::TempDir::new().unwrap();
        for name in ["a.sql", "b.txt", ".hidden/c.sql", "target/d.sql", "nested/e.sql"] {
            let path = dir.path().join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, "select 1\n").unwrap();
        }
        let mut mode = Mode::default();
        mode.config.exclude = vec!["target".to_string()];

        let paths = get_matching_paths(&[dir.path().to_path_buf()], &mode);
        let names: Vec<String> = paths
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["a.sql".to_string(), format!("nested{}e.sql", std::path::MAIN_SEPARATOR)]);
    }
}
