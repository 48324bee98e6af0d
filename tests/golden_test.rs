use pretty_assertions::assert_eq;
use sqlformatter::{post_process, Config};
use std::fs;

const SENTINEL: &str = ")))))__SQLFORMATTER_OUTPUT__(((((";

/// Read a golden test data file and return (source, expected) tuple.
///
/// - If the file contains the sentinel, lines above = source, lines below = expected
/// - If no sentinel, the file is already post-processed: expected = source
/// - Source is trimmed + "\n"; expected preserves exact whitespace
fn read_test_data(path: &str) -> (String, String) {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read test file {}: {}", path, e));

    let mut source_lines: Vec<&str> = Vec::new();
    let mut expected_lines: Vec<&str> = Vec::new();
    let mut found_sentinel = false;

    for line in content.lines() {
        if line.trim() == SENTINEL {
            found_sentinel = true;
            continue;
        }
        if found_sentinel {
            expected_lines.push(line);
        } else {
            source_lines.push(line);
        }
    }

    if !found_sentinel {
        expected_lines = source_lines.clone();
    }

    let source = {
        let joined = source_lines.join("\n");
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("{}\n", trimmed)
        }
    };

    let expected = if expected_lines.is_empty() {
        String::new()
    } else {
        let mut result = expected_lines.join("\n");
        if content.ends_with('\n') {
            result.push('\n');
        }
        result
    };

    (source, expected)
}

fn run_golden_test(path: &str) {
    let (source, expected) = read_test_data(path);
    let actual = post_process(&source, &Config::default());
    assert_eq!(actual, expected, "golden mismatch for {}", path);

    // a second pass must not move anything further
    let again = post_process(&actual, &Config::default());
    assert_eq!(again, actual, "rule pass not stable for {}", path);
}

#[test]
fn test_golden_cte_header() {
    run_golden_test("tests/data/postprocess/01_cte_header.sql");
}

#[test]
fn test_golden_lowercase_statements() {
    run_golden_test("tests/data/postprocess/02_lowercase_statements.sql");
}

#[test]
fn test_golden_no_clause_matches() {
    run_golden_test("tests/data/postprocess/03_no_clause_matches.sql");
}

#[test]
fn test_golden_preformatted() {
    run_golden_test("tests/data/postprocess/04_preformatted.sql");
}

#[test]
fn test_golden_multi_cte() {
    run_golden_test("tests/data/postprocess/05_multi_cte.sql");
}
