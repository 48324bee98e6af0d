pub mod api;
pub mod config;
pub mod error;
pub mod formatter;
pub mod hook;
pub mod language;
pub mod logging;
pub mod mode;
pub mod report;
pub mod rule;
pub mod rules;
pub mod syntax;

// Re-export the main public API
pub use api::{format_document, format_string, get_matching_paths, run, Formatted};
pub use config::{load_config, Config, IndentStyle, KeywordCase};
pub use error::FormatError;
pub use mode::Mode;
pub use rules::post_process;
