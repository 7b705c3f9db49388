use std::fmt;
use std::sync::Arc;

use crate::dialect::Dialect;
use crate::line::GherkinLine;

/// Source location, both components 1-based.
///
/// A `column` of `0` means the column is unspecified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Classification of one scanned line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// End of input.
    Eof,
    /// Blank or whitespace-only line.
    Empty,
    /// `# ...`
    Comment,
    /// `@tag @other`
    TagLine,
    FeatureLine,
    BackgroundLine,
    ScenarioLine,
    ScenarioOutlineLine,
    ExamplesLine,
    StepLine,
    /// `"""` or `` ``` ``, opening or closing.
    DocStringSeparator,
    /// `| a | b |`
    TableRow,
    /// `# language: xx`
    Language,
    /// Free text: descriptions and doc string content.
    Other,
}

impl TokenKind {
    /// Name used in diagnostics, e.g. `#StepLine`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eof => "#EOF",
            Self::Empty => "#Empty",
            Self::Comment => "#Comment",
            Self::TagLine => "#TagLine",
            Self::FeatureLine => "#FeatureLine",
            Self::BackgroundLine => "#BackgroundLine",
            Self::ScenarioLine => "#ScenarioLine",
            Self::ScenarioOutlineLine => "#ScenarioOutlineLine",
            Self::ExamplesLine => "#ExamplesLine",
            Self::StepLine => "#StepLine",
            Self::DocStringSeparator => "#DocStringSeparator",
            Self::TableRow => "#TableRow",
            Self::Language => "#Language",
            Self::Other => "#Other",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tag word or table cell together with its 1-based column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSpan {
    pub column: usize,
    pub text: String,
}

/// One scanned line and, once a matcher accepted it, its classification.
///
/// An end-of-input token has no underlying line.
#[derive(Debug, Clone)]
pub struct Token {
    line: Option<GherkinLine>,
    pub location: Location,
    pub kind: Option<TokenKind>,
    pub keyword: Option<String>,
    pub text: Option<String>,
    pub items: Vec<LineSpan>,
    pub indent: usize,
    pub dialect: Option<Arc<Dialect>>,
}

impl Token {
    /// Wrap a physical line; the column stays unspecified until matched.
    #[must_use]
    pub const fn from_line(line: GherkinLine, line_number: usize) -> Self {
        Self::new(Some(line), line_number)
    }

    #[must_use]
    pub const fn eof(line_number: usize) -> Self {
        Self::new(None, line_number)
    }

    const fn new(line: Option<GherkinLine>, line_number: usize) -> Self {
        Self {
            line,
            location: Location::new(line_number, 0),
            kind: None,
            keyword: None,
            text: None,
            items: Vec::new(),
            indent: 0,
            dialect: None,
        }
    }

    #[must_use]
    pub const fn is_eof(&self) -> bool {
        self.line.is_none()
    }

    #[must_use]
    pub const fn line(&self) -> Option<&GherkinLine> {
        self.line.as_ref()
    }

    /// Indentation of the underlying line, `0` at end of input.
    #[must_use]
    pub fn line_indent(&self) -> usize {
        self.line.as_ref().map_or(0, GherkinLine::indent)
    }

    /// Text shown in diagnostics: the trimmed line, or `EOF`.
    #[must_use]
    pub fn value(&self) -> &str {
        self.line.as_ref().map_or("EOF", |line| line.trimmed().trim_end())
    }

    /// Matched text, or the empty string when the matcher recorded none.
    #[must_use]
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// Record a successful match.
    ///
    /// `indent` overrides the line's own indentation; the location column
    /// becomes `indent + 1`.
    pub(crate) fn set_matched(
        &mut self,
        kind: TokenKind,
        dialect: &Arc<Dialect>,
        matched: Matched,
    ) {
        self.kind = Some(kind);
        self.keyword = matched.keyword;
        self.text = matched.text;
        self.items = matched.items;
        self.dialect = Some(Arc::clone(dialect));
        self.indent = matched.indent.unwrap_or_else(|| self.line_indent());
        self.location = Location::new(self.location.line, self.indent + 1);
    }
}

/// Fields filled in by a successful match.
#[derive(Debug, Default)]
pub(crate) struct Matched {
    pub keyword: Option<String>,
    pub text: Option<String>,
    pub items: Vec<LineSpan>,
    pub indent: Option<usize>,
}

impl Matched {
    pub(crate) fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub(crate) const fn at_indent(mut self, indent: usize) -> Self {
        self.indent = Some(indent);
        self
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind.map_or("#None", TokenKind::as_str);
        write!(
            f,
            "{kind}: {}/{}",
            self.keyword.as_deref().unwrap_or_default(),
            self.text.as_deref().unwrap_or_default()
        )
    }
}
