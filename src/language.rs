use crate::error::FormatError;

/// A SQL language selects the external formatter's dialect handling.
pub trait Language: Send + Sync {
    /// Name as written in configuration.
    fn name(&self) -> &'static str;

    /// Dialect passed through to `sqlformat`.
    fn dialect(&self) -> sqlformat::Dialect {
        sqlformat::Dialect::Generic
    }

    /// Whether `#` starts a line comment.
    fn hash_comments(&self) -> bool {
        true
    }

    /// Whether `[...]` is a quoted identifier rather than a subscript.
    fn bracket_identifiers(&self) -> bool {
        false
    }

    /// Whether `$tag$ ... $tag$` delimits a string.
    fn dollar_quotes(&self) -> bool {
        false
    }
}

/// The default language: standard SQL with common extensions.
pub struct StandardSql;

impl Language for StandardSql {
    fn name(&self) -> &'static str {
        "sql"
    }
}

/// PostgreSQL: `#` is an operator, not a comment.
pub struct PostgreSql;

impl Language for PostgreSql {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn dialect(&self) -> sqlformat::Dialect {
        sqlformat::Dialect::PostgreSql
    }

    fn hash_comments(&self) -> bool {
        false
    }

    fn dollar_quotes(&self) -> bool {
        true
    }
}

/// Transact-SQL: `[name]` quotes identifiers, `#name` is a temp table.
pub struct TransactSql;

impl Language for TransactSql {
    fn name(&self) -> &'static str {
        "tsql"
    }

    fn dialect(&self) -> sqlformat::Dialect {
        sqlformat::Dialect::SQLServer
    }

    fn hash_comments(&self) -> bool {
        false
    }

    fn bracket_identifiers(&self) -> bool {
        true
    }
}

/// Create a language from a string name.
pub fn language_from_name(name: &str) -> Result<Box<dyn Language>, FormatError> {
    match name.to_ascii_lowercase().as_str() {
        "sql" => Ok(Box::new(StandardSql)),
        "postgresql" | "postgres" => Ok(Box::new(PostgreSql)),
        "tsql" | "transactsql" => Ok(Box::new(TransactSql)),
        _ => Err(FormatError::Config(format!("Unknown language: {}", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_sql() {
        let language = StandardSql;
        assert_eq!(language.name(), "sql");
        assert!(language.hash_comments());
        assert!(!language.bracket_identifiers());
    }

    #[test]
    fn test_tsql_brackets() {
        let language = TransactSql;
        assert!(language.bracket_identifiers());
        assert!(!language.hash_comments());
    }

    #[test]
    fn test_language_from_name() {
        assert_eq!(language_from_name("sql").unwrap().name(), "sql");
        assert_eq!(language_from_name("PostgreSQL").unwrap().name(), "postgresql");
        assert_eq!(language_from_name("postgres").unwrap().name(), "postgresql");
        assert_eq!(language_from_name("tsql").unwrap().name(), "tsql");
        assert!(language_from_name("oracle").is_err());
    }
}
