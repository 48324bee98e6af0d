use std::borrow::Cow;

use regex::Regex;

/// A rewrite rule: name, compiled regex, and replacement template.
/// The pattern is matched against the whole text, so `\s` may span lines.
#[derive(Clone)]
pub struct Rule {
    pub name: &'static str,
    pub pattern: Regex,
    pub replacement: &'static str,
}

impl Rule {
    /// Create a new rule. The pattern is compiled case-insensitive.
    /// The replacement uses `regex` template syntax (`${1}` for group 1).
    pub fn new(name: &'static str, pattern: &str, replacement: &'static str) -> Self {
        let full_pattern = format!(r"(?i){}", pattern);
        let compiled = Regex::new(&full_pattern)
            .unwrap_or_else(|e| panic!("Invalid regex for rule '{}': {}", name, e));
        Self {
            name,
            pattern: compiled,
            replacement,
        }
    }

    /// Rewrite every non-overlapping match. Borrows the input when nothing matches.
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.pattern.replace_all(text, self.replacement)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .field("replacement", &self.replacement)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_creation_and_matching() {
        let rule = Rule::new("test_from", r"from\s+(\w+)", "FROM ${1}");
        assert_eq!(rule.name, "test_from");
        assert_eq!(rule.apply("select * from   users"), "select * FROM users");
    }

    #[test]
    fn test_rule_case_insensitive() {
        let rule = Rule::new("test_from", r"from\s+(\w+)", "FROM ${1}");
        assert_eq!(rule.apply("SELECT * From Users"), "SELECT * FROM Users");
    }

    #[test]
    fn test_rule_no_match_borrows() {
        let rule = Rule::new("test_from", r"from\s+(\w+)", "FROM ${1}");
        assert!(matches!(rule.apply("select 1"), Cow::Borrowed("select 1")));
    }

    #[test]
    fn test_rule_matches_across_lines() {
        let rule = Rule::new("test_from", r"from\s+(\w+)", "FROM ${1}");
        assert_eq!(rule.apply("select *\nfrom\n  users"), "select *\nFROM users");
    }
}
