use crate::config::Config;

/// SQL file extensions picked up from directories.
pub const SQL_EXTENSIONS: &[&str] = &["sql", "ddl", "dml", "pgsql", "psql"];

/// Mode holds the formatting config plus how a run treats its files.
#[derive(Debug, Clone, Default)]
pub struct Mode {
    pub config: Config,

    /// Report files that would change without writing them.
    pub check: bool,

    /// Print a diff for files that would change.
    pub diff: bool,

    pub verbose: bool,

    pub quiet: bool,

    pub no_progressbar: bool,

    pub no_color: bool,

    pub force_color: bool,

    /// Number of threads for parallel processing (0 = all cores).
    pub threads: usize,

    pub single_process: bool,
}

impl Mode {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Whether color output is enabled.
    pub fn color(&self) -> bool {
        if self.force_color {
            return true;
        }
        if self.no_color {
            return false;
        }
        if std::env::var_os("NO_COLOR").is_some() {
            return false;
        }
        true
    }

    /// Whether formatted output is written back to disk.
    pub fn should_write(&self) -> bool {
        !self.check && !self.diff
    }

    /// Whether a progress bar is drawn for a run over `file_count` files.
    pub fn show_progress(&self, file_count: usize) -> bool {
        !self.no_progressbar && !self.quiet && !self.verbose && file_count > 1
    }

    /// SQL file extensions to process.
    pub fn sql_extensions(&self) -> &[&str] {
        SQL_EXTENSIONS
    }
}
