use thiserror::Error;

/// User-facing errors.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("watch error: {0}")]
    Watch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl FormatError {
    /// Message shown to the user when a format command gives up and keeps
    /// the original text.
    pub fn user_message(&self) -> String {
        format!("SQL format error: {}", self)
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, FormatError::Syntax { .. })
    }
}

impl From<notify::Error> for FormatError {
    fn from(e: notify::Error) -> Self {
        FormatError::Watch(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FormatError>;
