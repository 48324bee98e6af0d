/// Spaces per indent level in post-processed output.
pub const INDENT_WIDTH: usize = 4;

/// Indent level for a line with `leading` whitespace characters.
/// Any partial level rounds up: 1-4 → 1, 5-8 → 2.
pub fn indent_level(leading: usize) -> usize {
    leading.div_ceil(INDENT_WIDTH)
}

/// Re-level each line's leading whitespace to a multiple of `INDENT_WIDTH`
/// spaces. Tabs count as one character and are not expanded. Trailing
/// whitespace, line count and line order are untouched.
pub fn normalize_indentation(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            result.push('\n');
        }
        let content = line.trim_start();
        let leading = line[..line.len() - content.len()].chars().count();
        let width = indent_level(leading) * INDENT_WIDTH;
        result.extend(std::iter::repeat(' ').take(width));
        result.push_str(content);
    }
    result
}
