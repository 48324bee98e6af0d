use sqlformat::{FormatOptions, Indent, QueryParams};

use crate::config::Config;
use crate::error::FormatError;
use crate::rules;
use crate::syntax;

/// SqlFormatter runs the 3-stage formatting pipeline:
///   1. Reject lexically malformed input
///   2. Lay out with the external formatter (`sqlformat`)
///   3. Post-process (clause rules, indentation)
#[derive(Debug, Clone)]
pub struct SqlFormatter {
    config: Config,
}

impl SqlFormatter {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the full pipeline. On error nothing has been rewritten; callers
    /// decide whether to fall back to the source text.
    pub fn format(&self, source: &str) -> Result<String, FormatError> {
        let language = self.config.language()?;
        if source.trim().is_empty() {
            return Ok(String::new());
        }

        // Stage 1: well-formedness
        syntax::check(source, language.as_ref())?;

        // Stage 2: external layout
        let options = self.build_format_options(language.dialect());
        let laid_out = sqlformat::format(source, &QueryParams::None, &options);

        // Stage 3: rule pass
        Ok(rules::post_process(&laid_out, &self.config))
    }

    fn build_format_options(&self, dialect: sqlformat::Dialect) -> FormatOptions<'static> {
        FormatOptions {
            indent: Indent::Spaces(self.config.indent_style.width()),
            uppercase: self.config.keyword_case.uppercase(),
            // sqlformat counts the newlines between statements, not blank lines
            lines_between_queries: self.config.lines_between_queries.saturating_add(1),
            dialect,
            ..Default::default()
        }
    }
}
