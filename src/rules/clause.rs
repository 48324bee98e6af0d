use std::borrow::Cow;
use std::sync::LazyLock;

use crate::rule::Rule;

/// Clause rules, in application order.
///
/// Keywords match in any case but the replacements write them uppercase,
/// so `with cte as (` becomes `WITH cte AS (` even when the formatter was
/// asked to lowercase keywords.
static CLAUSE_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        // WITH <name> AS ( on one line, single-spaced. Joins lines when
        // the formatter broke inside the header. Names are ASCII word chars.
        Rule::new(
            "with_clause_join",
            r"WITH\s+([A-Za-z0-9_]+)\s+AS\s*\(",
            "WITH ${1} AS (",
        ),
        // SELECT and its first field on one line.
        Rule::new("select_list_comma_join", r"SELECT\s+([^,\n]+),", "SELECT ${1},"),
    ]
});

pub fn clause_rules() -> &'static [Rule] {
    &CLAUSE_RULES
}

/// Apply every clause rule to the whole text, in order.
pub fn normalize_clauses(text: &str) -> String {
    let mut current = text.to_string();
    for rule in clause_rules() {
        let rewritten = match rule.apply(&current) {
            Cow::Borrowed(_) => None,
            Cow::Owned(s) => Some(s),
        };
        if let Some(s) = rewritten {
            current = s;
        }
    }
    current
}
