use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::FormatError;
use crate::language::{self, Language};

/// Config file names searched for in the inputs' parent directories.
pub const CONFIG_FILE_NAMES: &[&str] = &["sqlformatter.toml", ".sqlformatter.toml"];

/// Optional table wrapping the options inside a config file.
const CONFIG_SECTION: &str = "sqlFormatter";

/// Keyword casing applied by the external formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeywordCase {
    #[default]
    Upper,
    Lower,
    Preserve,
}

impl KeywordCase {
    /// The `uppercase` option understood by `sqlformat`.
    pub fn uppercase(self) -> Option<bool> {
        match self {
            KeywordCase::Upper => Some(true),
            KeywordCase::Lower => Some(false),
            KeywordCase::Preserve => None,
        }
    }
}

impl FromStr for KeywordCase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upper" => Ok(KeywordCase::Upper),
            "lower" => Ok(KeywordCase::Lower),
            "preserve" => Ok(KeywordCase::Preserve),
            _ => Err(format!(
                "unknown keyword case '{}' (expected upper, lower or preserve)",
                s
            )),
        }
    }
}

impl fmt::Display for KeywordCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeywordCase::Upper => "upper",
            KeywordCase::Lower => "lower",
            KeywordCase::Preserve => "preserve",
        })
    }
}

/// Layout style handed to the external formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IndentStyle {
    #[default]
    Standard,
    TabularLeft,
    TabularRight,
}

impl IndentStyle {
    /// Indent width in spaces for one nesting step.
    /// Tabular styles align clause bodies after a 10-column keyword slot.
    pub fn width(self) -> u8 {
        match self {
            IndentStyle::Standard => 2,
            IndentStyle::TabularLeft | IndentStyle::TabularRight => 10,
        }
    }
}

impl FromStr for IndentStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(IndentStyle::Standard),
            "tabularLeft" => Ok(IndentStyle::TabularLeft),
            "tabularRight" => Ok(IndentStyle::TabularRight),
            _ => Err(format!(
                "unknown indent style '{}' (expected standard, tabularLeft or tabularRight)",
                s
            )),
        }
    }
}

impl fmt::Display for IndentStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IndentStyle::Standard => "standard",
            IndentStyle::TabularLeft => "tabularLeft",
            IndentStyle::TabularRight => "tabularRight",
        })
    }
}

/// Formatting options. Only `language`, `lines_between_queries`,
/// `indent_style` and `keyword_case` reach the external formatter; the
/// post-processing rule pass ignores all of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Blank lines inserted between top-level statements.
    #[serde(default = "default_lines_between_queries")]
    pub lines_between_queries: u8,

    #[serde(default)]
    pub indent_style: IndentStyle,

    #[serde(default)]
    pub keyword_case: KeywordCase,

    #[serde(default = "default_language")]
    pub language: String,

    /// Format SQL documents when they are saved (see `hook`).
    #[serde(default)]
    pub format_on_save: bool,

    /// Glob patterns to exclude from directory walks.
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_lines_between_queries() -> u8 {
    2
}

/// Zero blank lines means "not set" and falls back to the default.
pub fn lines_between_queries_or_default(n: u8) -> u8 {
    if n == 0 {
        default_lines_between_queries()
    } else {
        n
    }
}
fn default_language() -> String {
    "sql".to_string()
}

impl Config {
    /// Create the language for the configured `language` name.
    pub fn language(&self) -> Result<Box<dyn Language>, FormatError> {
        language::language_from_name(&self.language)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lines_between_queries: 2,
            indent_style: IndentStyle::Standard,
            keyword_case: KeywordCase::Upper,
            language: "sql".to_string(),
            format_on_save: false,
            exclude: Vec::new(),
        }
    }
}

/// Load configuration for the given inputs.
/// An explicit `config_path` must exist; otherwise parent directories of the
/// inputs are searched, then the per-user config directory.
pub fn load_config(files: &[PathBuf], config_path: Option<&Path>) -> Result<Config, FormatError> {
    let config_file = match config_path {
        Some(path) => {
            if path.exists() {
                Some(path.to_path_buf())
            } else {
                return Err(FormatError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
        }
        None => find_config_file(files).or_else(user_config_file),
    };

    match config_file {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            load_config_from_path(&path)
        }
        None => Ok(Config::default()),
    }
}

/// Search for a config file in the common parent directories of the given files.
fn find_config_file(files: &[PathBuf]) -> Option<PathBuf> {
    for parent in get_common_parents(files) {
        for name in CONFIG_FILE_NAMES {
            let config = parent.join(name);
            if config.is_file() {
                return Some(config);
            }
        }
    }
    None
}

/// `<config_dir>/sqlformatter/sqlformatter.toml`, if it exists.
fn user_config_file() -> Option<PathBuf> {
    let path = dirs::config_dir()?
        .join("sqlformatter")
        .join(CONFIG_FILE_NAMES[0]);
    path.is_file().then_some(path)
}

/// Get the common parent directories of the given file paths, ordered
/// from most specific to least specific.
fn get_common_parents(files: &[PathBuf]) -> Vec<PathBuf> {
    let mut parents = Vec::new();

    for file in files {
        let parent = if file.is_dir() {
            file.clone()
        } else {
            file.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        };
        let parent = parent.canonicalize().unwrap_or(parent);

        let mut current = Some(parent.as_path());
        while let Some(dir) = current {
            let dir_buf = dir.to_path_buf();
            if !parents.contains(&dir_buf) {
                parents.push(dir_buf);
            }
            current = dir.parent();
        }
    }

    parents
}

/// Load and parse a TOML config file.
pub fn load_config_from_path(path: &Path) -> Result<Config, FormatError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
        .map_err(|e| FormatError::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Parse config file contents. Options may sit at top level or inside a
/// `[sqlFormatter]` table, but not both.
pub fn parse_config(content: &str) -> Result<Config, FormatError> {
    let mut parsed: toml::Table = toml::from_str(content)?;

    let section = match parsed.remove(CONFIG_SECTION) {
        Some(toml::Value::Table(table)) => {
            if let Some(key) = parsed.keys().next() {
                return Err(FormatError::Config(format!(
                    "unknown top-level key '{}' next to [{}]",
                    key, CONFIG_SECTION
                )));
            }
            table
        }
        Some(_) => {
            return Err(FormatError::Config(format!(
                "[{}] must be a table",
                CONFIG_SECTION
            )))
        }
        None => parsed,
    };

    let mut config: Config = toml::Value::Table(section).try_into()?;
    config.lines_between_queries = lines_between_queries_or_default(config.lines_between_queries);
    config.language()?;
    Ok(config)
}
