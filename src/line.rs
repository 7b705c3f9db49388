//! Per-line analysis: indentation, prefix tests, tag and table cell spans.
//!
//! Columns are counted in Unicode code points so that locations stay
//! correct for multi-byte text.

use crate::token::LineSpan;

pub const TAG_PREFIX: &str = "@";
pub const COMMENT_PREFIX: &str = "#";
pub const TITLE_KEYWORD_SEPARATOR: char = ':';
pub const TABLE_CELL_SEPARATOR: &str = "|";
pub const DOCSTRING_SEPARATOR: &str = "\"\"\"";
pub const DOCSTRING_ALTERNATIVE_SEPARATOR: &str = "```";

/// One physical line of a feature document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GherkinLine {
    text: String,
    /// Byte offset of the first non-whitespace character.
    trim_offset: usize,
    indent: usize,
}

impl GherkinLine {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let trimmed = text.trim_start();
        let trim_offset = text.len() - trimmed.len();
        let indent = text.chars().count() - trimmed.chars().count();
        Self {
            text,
            trim_offset,
            indent,
        }
    }

    /// Number of leading whitespace code points.
    #[must_use]
    pub const fn indent(&self) -> usize {
        self.indent
    }

    /// Line text with its leading whitespace removed.
    #[must_use]
    pub fn trimmed(&self) -> &str {
        self.text.get(self.trim_offset..).unwrap_or_default()
    }

    /// Line text after dropping `indent_to_remove` leading code points.
    ///
    /// Asking for more than the line's own indentation yields the trimmed
    /// text instead of eating into content.
    #[must_use]
    pub fn text_without_indent(&self, indent_to_remove: usize) -> &str {
        if indent_to_remove > self.indent {
            return self.trimmed();
        }
        self.text
            .char_indices()
            .nth(indent_to_remove)
            .map_or("", |(offset, _)| self.text.get(offset..).unwrap_or_default())
    }

    /// Whole line, indentation included.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trimmed().is_empty()
    }

    #[must_use]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.trimmed().starts_with(prefix)
    }

    /// True when the trimmed text is `keyword` immediately followed by `:`.
    #[must_use]
    pub fn starts_with_title_keyword(&self, keyword: &str) -> bool {
        self.trimmed()
            .strip_prefix(keyword)
            .is_some_and(|rest| rest.starts_with(TITLE_KEYWORD_SEPARATOR))
    }

    /// Trimmed remainder after `prefix`; empty when the prefix is absent.
    #[must_use]
    pub fn rest_trimmed(&self, prefix: &str) -> &str {
        self.trimmed()
            .strip_prefix(prefix)
            .map_or("", str::trim)
    }

    /// Trimmed title after `keyword:`.
    #[must_use]
    pub fn title_after(&self, keyword: &str) -> &str {
        self.trimmed()
            .strip_prefix(keyword)
            .and_then(|rest| rest.strip_prefix(TITLE_KEYWORD_SEPARATOR))
            .map_or("", str::trim)
    }

    /// Whitespace-separated words, each with its starting column.
    #[must_use]
    pub fn tags(&self) -> Vec<LineSpan> {
        let mut spans = Vec::new();
        let mut current = String::new();
        let mut start = 0;

        for (col, c) in self.trimmed().chars().enumerate() {
            if c.is_whitespace() {
                if !current.is_empty() {
                    spans.push(LineSpan {
                        column: self.indent + start + 1,
                        text: std::mem::take(&mut current),
                    });
                }
            } else {
                if current.is_empty() {
                    start = col;
                }
                current.push(c);
            }
        }
        if !current.is_empty() {
            spans.push(LineSpan {
                column: self.indent + start + 1,
                text: current,
            });
        }

        spans
    }

    /// Pipe-delimited cells of a table row.
    ///
    /// Cells are trimmed; `\|` and `\\` unescape to `|` and `\`, `\n`
    /// becomes a newline and any other escape is kept verbatim. Text after
    /// the last pipe is not a cell. Each cell reports the column of its
    /// first non-whitespace character.
    #[must_use]
    pub fn table_cells(&self) -> Vec<LineSpan> {
        let mut spans = Vec::new();
        let mut cell = String::new();
        let mut before_first = true;
        let mut start_col = 0;
        let mut chars = self.trimmed().chars().enumerate();

        while let Some((col, c)) = chars.next() {
            match c {
                '|' if before_first => {
                    before_first = false;
                    start_col = col;
                    cell.clear();
                }
                '|' => {
                    let leading = cell.chars().take_while(|c| c.is_whitespace()).count();
                    let content_start = if leading == cell.chars().count() {
                        0
                    } else {
                        leading
                    };
                    spans.push(LineSpan {
                        column: self.indent + start_col + content_start + 2,
                        text: cell.trim().to_string(),
                    });
                    start_col = col;
                    cell.clear();
                }
                '\\' => match chars.next() {
                    Some((_, 'n')) => cell.push('\n'),
                    Some((_, escaped @ ('|' | '\\'))) => cell.push(escaped),
                    Some((_, other)) => {
                        cell.push('\\');
                        cell.push(other);
                    }
                    None => cell.push('\\'),
                },
                _ => cell.push(c),
            }
        }

        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn texts(spans: &[LineSpan]) -> Vec<&str> {
        spans.iter().map(|s| s.text.as_str()).collect()
    }

    fn columns(spans: &[LineSpan]) -> Vec<usize> {
        spans.iter().map(|s| s.column).collect()
    }

    #[test]
    fn indent_counts_code_points() {
        let line = GherkinLine::new("\u{3000}\u{3000}前提 x");
        assert_eq!(line.indent(), 2);
        assert_eq!(line.trimmed(), "前提 x");
    }

    #[test]
    fn blank_line_is_empty() {
        assert!(GherkinLine::new("   \t ").is_empty());
        assert!(!GherkinLine::new("  x").is_empty());
    }

    #[test]
    fn title_keyword_requires_separator() {
        let line = GherkinLine::new("  Scenario: hello ");
        assert!(line.starts_with_title_keyword("Scenario"));
        assert!(!line.starts_with_title_keyword("Scenario Outline"));
        assert_eq!(line.title_after("Scenario"), "hello");

        let no_colon = GherkinLine::new("Scenario hello");
        assert!(!no_colon.starts_with_title_keyword("Scenario"));
    }

    #[test]
    fn text_without_indent_keeps_extra_whitespace() {
        let line = GherkinLine::new("      nested");
        assert_eq!(line.text_without_indent(4), "  nested");
        assert_eq!(line.text_without_indent(0), "      nested");
        assert_eq!(line.text_without_indent(10), "nested");
    }

    #[test]
    fn tags_report_columns() {
        let line = GherkinLine::new("  @fast   @slow\t@wip");
        let tags = line.tags();
        assert_eq!(texts(&tags), vec!["@fast", "@slow", "@wip"]);
        assert_eq!(columns(&tags), vec![3, 11, 17]);
    }

    #[test]
    fn table_cells_report_first_content_column() {
        let line = GherkinLine::new("    | name  |   age |");
        let cells = line.table_cells();
        assert_eq!(texts(&cells), vec!["name", "age"]);
        assert_eq!(columns(&cells), vec![7, 17]);
    }

    #[test]
    fn table_cells_drop_text_after_last_pipe() {
        let cells = GherkinLine::new("| a | b | trailing").table_cells();
        assert_eq!(texts(&cells), vec!["a", "b"]);
    }

    #[rstest]
    #[case(r"| a\|b |", "a|b")]
    #[case(r"| back\\slash |", r"back\slash")]
    #[case(r"| line\nbreak |", "line\nbreak")]
    #[case(r"| keep\t |", r"keep\t")]
    fn table_cell_escapes(#[case] input: &str, #[case] expected: &str) {
        let cells = GherkinLine::new(input).table_cells();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].text, expected);
    }

    #[test]
    fn empty_cell_column_points_after_pipe() {
        let cells = GherkinLine::new("|   | x |").table_cells();
        assert_eq!(cells[0].text, "");
        assert_eq!(cells[0].column, 2);
        assert_eq!(cells[1].column, 7);
    }
}
