use std::path::{Path, PathBuf};

/// Status of formatting a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// File was already formatted correctly.
    Unchanged,
    /// File was reformatted (or would be, in check or diff mode).
    Changed,
    /// The file could not be read, formatted or written; it is left as is.
    Error,
}

/// Result of formatting a single file.
#[derive(Debug, Clone)]
pub struct FileResult {
    pub path: PathBuf,
    pub status: FileStatus,
    pub error: Option<String>,
}

impl FileResult {
    pub fn new(path: &Path, status: FileStatus) -> Self {
        Self {
            path: path.to_path_buf(),
            status,
            error: None,
        }
    }

    pub fn error(path: &Path, message: String) -> Self {
        Self {
            path: path.to_path_buf(),
            status: FileStatus::Error,
            error: Some(message),
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
        Self::default()
    }

    pub fn add(&mut self, result: FileResult) {
        self.results.push(result);
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    fn count(&self, status: FileStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
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

    pub fn has_errors(&self) -> bool {
        self.errors() > 0
    }

    pub fn has_changes(&self) -> bool {
        self.changed() > 0
    }

    /// Files that were left untouched because of an error, with the message.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.results
            .iter()
            .filter_map(|r| r.error.as_deref().map(|e| (r.path.as_path(), e)))
    }

    /// One-line summary, e.g. `3 file(s) processed, 1 reformatted, 2 unchanged`.
    pub fn summary(&self) -> String {
        let mut summary = format!("{} file(s) processed", self.total());
        for (n, label) in [
            (self.changed(), "reformatted"),
            (self.unchanged(), "unchanged"),
            (self.errors(), "error(s)"),
        ] {
            if n > 0 {
                summary.push_str(&format!(", {} {}", n, label));
            }
        }
        summary
    }

    /// Print each failure to stderr.
    pub fn print_errors(&self) {
        for (path, error) in self.failures() {
            eprintln!("error: {}: {}", path.display(), error);
        }
    }
}
