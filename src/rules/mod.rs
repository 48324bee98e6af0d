//! Post-processing rule pass applied to the external formatter's output.
//!
//! 1. Clause rules (`clause`): regex rewrites over the whole text.
//! 2. Indentation (`indent`): every line re-leveled to 4-space steps.
//!
//! The pass is a total function: any input, including non-SQL text,
//! produces some output and nothing here can fail.

pub mod clause;
pub mod indent;

use crate::config::Config;

pub use clause::normalize_clauses;
pub use indent::normalize_indentation;

/// Run the full rule pass on already-formatted SQL.
/// The config is accepted for the command contract; no rule reads it.
pub fn post_process(text: &str, _config: &Config) -> String {
    normalize_indentation(&normalize_clauses(text))
}
