//! Format-on-save.
//!
//! A save of a SQL document runs the same per-file format command as the
//! CLI, provided `formatOnSave` is enabled. `watch` drives the hook from
//! filesystem events so that saves from any editor are picked up.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Duration;

use notify::{EventKind, RecursiveMode, Watcher};

use crate::api::{format_file, is_sql_file};
use crate::config::Config;
use crate::error::FormatError;
use crate::mode::{Mode, SQL_EXTENSIONS};
use crate::report::{FileResult, FileStatus};

/// Language id of documents the hook formats.
pub const SQL_LANGUAGE_ID: &str = "sql";

/// Quiet period after the last event before a batch of saves is handled.
const DEBOUNCE: Duration = Duration::from_millis(200);

/// How often a blocked watcher checks its stop flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A document was saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveEvent {
    pub path: PathBuf,
    pub language_id: String,
}

impl SaveEvent {
    pub fn new(path: impl Into<PathBuf>, language_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            language_id: language_id.into(),
        }
    }

    /// A save event whose language is derived from the file extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let language_id = language_id_for_path(&path);
        Self { path, language_id }
    }
}

/// `sql` for SQL file extensions, otherwise the lowercased extension
/// (`plaintext` when there is none).
pub fn language_id_for_path(path: &Path) -> String {
    if is_sql_file(path, SQL_EXTENSIONS) {
        return SQL_LANGUAGE_ID.to_string();
    }
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| "plaintext".to_string())
}

pub fn should_format_on_save(event: &SaveEvent, config: &Config) -> bool {
    config.format_on_save && event.language_id == SQL_LANGUAGE_ID
}

/// Run the format command for a save. `None` when the hook does not apply.
pub fn handle_save(event: &SaveEvent, mode: &Mode) -> Option<FileResult> {
    if !should_format_on_save(event, &mode.config) {
        tracing::trace!(path = %event.path.display(), language = %event.language_id, "save ignored");
        return None;
    }
    let result = format_file(&event.path, mode);
    match result.status {
        FileStatus::Changed => {
            tracing::info!(path = %event.path.display(), "formatted on save")
        }
        FileStatus::Unchanged => {
            tracing::debug!(path = %event.path.display(), "already formatted")
        }
        FileStatus::Error => tracing::warn!(
            path = %event.path.display(),
            error = result.error.as_deref().unwrap_or("unknown error"),
            "format on save failed"
        ),
    }
    Some(result)
}

/// Watch paths and format SQL files as they are saved. Blocks forever.
pub fn watch(paths: &[PathBuf], mode: &Mode) -> Result<(), FormatError> {
    watch_until(paths, mode, &AtomicBool::new(false))
}

/// Watch paths and format SQL files as they are saved, until `stop` is set.
pub fn watch_until(paths: &[PathBuf], mode: &Mode, stop: &AtomicBool) -> Result<(), FormatError> {
    if !mode.config.format_on_save {
        tracing::warn!("formatOnSave is disabled; saved files will not be formatted");
    }

    let (tx, rx) = mpsc::channel::<notify::Result<notify::Event>>();
    let mut watcher = notify::recommended_watcher(tx)?;
    for path in paths {
        let recursive = if path.is_dir() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(path, recursive)?;
        tracing::info!(path = %path.display(), "watching");
    }

    // Contents this watcher wrote, so its own write-back is not a save.
    let mut written: HashMap<PathBuf, String> = HashMap::new();

    while !stop.load(Ordering::SeqCst) {
        let first = match rx.recv_timeout(POLL_INTERVAL) {
            Ok(event) => event,
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Err(FormatError::Watch("event channel closed".to_string()));
            }
        };

        let mut saved = HashSet::new();
        collect_saved(first, &mut saved);
        while let Ok(event) = rx.recv_timeout(DEBOUNCE) {
            collect_saved(event, &mut saved);
        }

        let mut saved: Vec<PathBuf> = saved.into_iter().collect();
        saved.sort();
        for path in saved {
            let current = std::fs::read_to_string(&path).ok();
            if current.is_some() && current.as_ref() == written.get(&path) {
                continue;
            }
            let event = SaveEvent::from_path(&path);
            if let Some(result) = handle_save(&event, mode) {
                if result.status == FileStatus::Changed && mode.should_write() {
                    if let Ok(content) = std::fs::read_to_string(&path) {
                        written.insert(path, content);
                    }
                }
            }
        }
    }

    Ok(())
}

/// Add the files touched by a create or modify event.
fn collect_saved(event: notify::Result<notify::Event>, saved: &mut HashSet<PathBuf>) {
    match event {
        Ok(event) => {
            if matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                saved.extend(event.paths.into_iter().filter(|p| p.is_file()));
            }
        }
        Err(e) => tracing::warn!(error = %e, "watch error"),
    }
}
