//! Lexical well-formedness check run before the external formatter.
//!
//! `sqlformat` accepts any input and never reports a failure, so a document
//! with an unterminated string or unbalanced brackets would come back
//! mangled. This pass rejects such input up front; only then does the
//! format command keep the original text and surface an error.

use memchr::{memchr, memchr2, memmem};

use crate::error::FormatError;
use crate::language::Language;

/// Check that strings, quoted identifiers and comments are terminated and
/// that brackets balance. Errors carry the 1-based position of the
/// offending character.
pub fn check(source: &str, language: &dyn Language) -> Result<(), FormatError> {
    let bytes = source.as_bytes();
    let mut open: Vec<usize> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' => {
                i = skip_quoted(bytes, i, true)
                    .ok_or_else(|| error_at(source, i, "unterminated string literal"))?;
            }
            b'"' | b'`' => {
                i = skip_quoted(bytes, i, false)
                    .ok_or_else(|| error_at(source, i, "unterminated quoted identifier"))?;
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => i = skip_line(bytes, i),
            b'#' if language.hash_comments() => i = skip_line(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = memmem::find(&bytes[i + 2..], b"*/")
                    .map(|end| i + 2 + end + 2)
                    .ok_or_else(|| error_at(source, i, "unterminated block comment"))?;
            }
            b'$' if language.dollar_quotes() => match dollar_tag(bytes, i) {
                Some(tag) => {
                    let body = i + tag.len();
                    i = memmem::find(&bytes[body..], tag)
                        .map(|end| body + end + tag.len())
                        .ok_or_else(|| error_at(source, i, "unterminated dollar-quoted string"))?;
                }
                None => i += 1,
            },
            b'[' if language.bracket_identifiers() => {
                i = skip_bracket_identifier(bytes, i)
                    .ok_or_else(|| error_at(source, i, "unterminated bracketed identifier"))?;
            }
            b'(' | b'[' => {
                open.push(i);
                i += 1;
            }
            close @ (b')' | b']') => {
                let expected_open = if close == b')' { b'(' } else { b'[' };
                match open.pop() {
                    Some(o) if bytes[o] == expected_open => {}
                    Some(o) => {
                        let message = format!(
                            "expected '{}' but found '{}'",
                            closing_for(bytes[o]) as char,
                            close as char
                        );
                        return Err(error_at(source, i, &message));
                    }
                    None => {
                        let message = format!("unmatched '{}'", close as char);
                        return Err(error_at(source, i, &message));
                    }
                }
                i += 1;
            }
            _ => i += 1,
        }
    }

    match open.pop() {
        Some(o) => {
            let message = format!("unclosed '{}'", bytes[o] as char);
            Err(error_at(source, o, &message))
        }
        None => Ok(()),
    }
}

fn closing_for(open: u8) -> u8 {
    if open == b'(' {
        b')'
    } else {
        b']'
    }
}

/// Skip a quoted run starting at `i` (which must point to the quote).
/// A doubled quote is an escaped quote. Returns the position after the
/// closing quote, or `None` if the input ends first.
fn skip_quoted(bytes: &[u8], i: usize, backslash_escapes: bool) -> Option<usize> {
    let quote = bytes[i];
    let mut j = i + 1;
    while j < bytes.len() {
        let offset = if backslash_escapes {
            memchr2(quote, b'\\', &bytes[j..])?
        } else {
            memchr(quote, &bytes[j..])?
        };
        let end = j + offset;
        if bytes[end] == b'\\' {
            j = end + 2;
            continue;
        }
        if bytes.get(end + 1) == Some(&quote) {
            j = end + 2;
            continue;
        }
        return Some(end + 1);
    }
    None
}

/// T-SQL `[identifier]`, where `]]` is an escaped bracket.
fn skip_bracket_identifier(bytes: &[u8], i: usize) -> Option<usize> {
    let mut j = i + 1;
    while j < bytes.len() {
        let end = j + memchr(b']', &bytes[j..])?;
        if bytes.get(end + 1) == Some(&b']') {
            j = end + 2;
            continue;
        }
        return Some(end + 1);
    }
    None
}

/// Position of the newline ending the comment at `i`, or end of input.
fn skip_line(bytes: &[u8], i: usize) -> usize {
    memchr(b'\n', &bytes[i..]).map_or(bytes.len(), |offset| i + offset)
}

/// The opening `$tag$` of a dollar-quoted string starting at `i`, if any.
/// `$1` style parameters are not tags.
fn dollar_tag(bytes: &[u8], i: usize) -> Option<&[u8]> {
    let rest = &bytes[i + 1..];
    let len = rest
        .iter()
        .position(|&b| !(b.is_ascii_alphanumeric() || b == b'_'))?;
    if rest[len] != b'$' || rest.first().is_some_and(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(&bytes[i..i + len + 2])
}

fn error_at(source: &str, offset: usize, message: &str) -> FormatError {
    let before = &source[..offset];
    let line_start = before.rfind('\n').map_or(0, |p| p + 1);
    FormatError::Syntax {
        line: memchr::memchr_iter(b'\n', before.as_bytes()).count() + 1,
        column: before[line_start..].chars().count() + 1,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{PostgreSql, StandardSql, TransactSql};

    fn check_sql(source: &str) -> Result<(), FormatError> {
        check(source, &StandardSql)
    }

    fn position(result: Result<(), FormatError>) -> (usize, usize, String) {
        match result {
            Err(FormatError::Syntax {
                line,
                column,
                message,
            }) => (line, column, message),
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_well_formed_query() {
        assert!(check_sql("select a, (b + 1) * 2 from t where c in (1, 2)").is_ok());
        assert!(check_sql("").is_ok());
    }

    #[test]
    fn test_brackets_inside_strings_and_comments_ignored() {
        assert!(check_sql("select ')' -- (\n/* ( */ from t").is_ok());
        assert!(check_sql("select \"weird)name\" from `t(`").is_ok());
    }

    #[test]
    fn test_escaped_quotes() {
        assert!(check_sql("select 'it''s', 'it\\'s'").is_ok());
    }

    #[test]
    fn test_backslash_does_not_escape_identifier_quote() {
        assert!(check_sql("select \"a\\\" from t").is_ok());
        assert!(check_sql("select `a\\` from t").is_ok());
        assert!(check_sql("select \"a\"\"b\" from t").is_ok());
    }

    #[test]
    fn test_unterminated_string() {
        let (line, column, message) = position(check_sql("select 1,\n  'abc"));
        assert_eq!((line, column), (2, 3));
        assert_eq!(message, "unterminated string literal");
    }

    #[test]
    fn test_unterminated_block_comment() {
        let (line, column, _) = position(check_sql("select 1 /* never closed"));
        assert_eq!((line, column), (1, 10));
    }

    #[test]
    fn test_unclosed_paren() {
        let (line, column, message) = position(check_sql("select (1 + (2)"));
        assert_eq!((line, column), (1, 8));
        assert_eq!(message, "unclosed '('");
    }

    #[test]
    fn test_unmatched_close() {
        let (_, column, message) = position(check_sql("select 1)"));
        assert_eq!(column, 9);
        assert_eq!(message, "unmatched ')'");
    }

    #[test]
    fn test_mismatched_brackets() {
        let (_, _, message) = position(check_sql("select a[1)"));
        assert_eq!(message, "expected ']' but found ')'");
    }

    #[test]
    fn test_hash_comment_depends_on_language() {
        assert!(check_sql("select 1 # (").is_ok());
        assert!(check("select 1 # (", &PostgreSql).is_err());
    }

    #[test]
    fn test_tsql_bracket_identifiers() {
        assert!(check("select [weird ( name] from [t]]x]", &TransactSql).is_ok());
        assert!(check("select [open", &TransactSql).is_err());
    }

    #[test]
    fn test_postgres_dollar_quotes() {
        let body = "create function f() returns int as $body$ select ( ' $body$ language sql";
        assert!(check(body, &PostgreSql).is_ok());
        assert!(check("select $1 + $2", &PostgreSql).is_ok());
        assert!(check("select $$ never closed", &PostgreSql).is_err());
    }

    #[test]
    fn test_column_counts_chars_not_bytes() {
        let (_, column, _) = position(check_sql("select 'é', )"));
        assert_eq!(column, 13);
    }
}
