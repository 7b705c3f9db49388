//! Line classification against the active dialect.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::dialect::{Dialect, DialectError, DialectResolver, KeywordKind};
use crate::line::{
    COMMENT_PREFIX, DOCSTRING_ALTERNATIVE_SEPARATOR, DOCSTRING_SEPARATOR, GherkinLine,
    TABLE_CELL_SEPARATOR, TAG_PREFIX,
};
use crate::token::{Location, Matched, Token, TokenKind};

static LANGUAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*#\s*language\s*:\s*([a-zA-Z\-_]+)\s*$").unwrap_or_else(|_| unreachable!())
});

/// Order in which [`TokenMatcher::classify`] tries each kind.
const CLASSIFY_ORDER: [TokenKind; 14] = [
    TokenKind::Eof,
    TokenKind::Empty,
    TokenKind::Language,
    TokenKind::Comment,
    TokenKind::TagLine,
    TokenKind::DocStringSeparator,
    TokenKind::TableRow,
    TokenKind::FeatureLine,
    TokenKind::BackgroundLine,
    TokenKind::ScenarioLine,
    TokenKind::ScenarioOutlineLine,
    TokenKind::ExamplesLine,
    TokenKind::StepLine,
    TokenKind::Other,
];

/// Classifies tokens one kind at a time.
///
/// A matcher carries per-document state: the active dialect, which a
/// `# language:` line may switch, and the separator of an open doc string.
/// Use one matcher per document.
#[derive(Debug)]
pub struct TokenMatcher {
    resolver: Arc<DialectResolver>,
    dialect: Arc<Dialect>,
    active_doc_string_separator: Option<&'static str>,
    indent_to_remove: usize,
}

impl TokenMatcher {
    /// Matcher starting in the resolver's default dialect.
    ///
    /// # Errors
    ///
    /// Returns `DialectError` when the default language cannot be resolved.
    pub fn new(resolver: Arc<DialectResolver>) -> Result<Self, DialectError> {
        let dialect = resolver.default_dialect()?;
        Ok(Self {
            resolver,
            dialect,
            active_doc_string_separator: None,
            indent_to_remove: 0,
        })
    }

    /// Return to the default dialect with no open doc string.
    ///
    /// # Errors
    ///
    /// Returns `DialectError` when the default language cannot be resolved.
    pub fn reset(&mut self) -> Result<(), DialectError> {
        self.dialect = self.resolver.default_dialect()?;
        self.active_doc_string_separator = None;
        self.indent_to_remove = 0;
        Ok(())
    }

    #[must_use]
    pub const fn dialect(&self) -> &Arc<Dialect> {
        &self.dialect
    }

    /// Try to match `token` as `kind`, filling in its match fields on
    /// success.
    ///
    /// # Errors
    ///
    /// Only a `# language:` line naming an unknown language fails.
    pub fn matches(&mut self, kind: TokenKind, token: &mut Token) -> Result<bool, DialectError> {
        Ok(match kind {
            TokenKind::Eof => self.match_eof(token),
            TokenKind::Empty => self.match_empty(token),
            TokenKind::Comment => self.match_comment(token),
            TokenKind::TagLine => self.match_tag_line(token),
            TokenKind::FeatureLine => {
                self.match_title_line(token, TokenKind::FeatureLine, KeywordKind::Feature)
            }
            TokenKind::BackgroundLine => {
                self.match_title_line(token, TokenKind::BackgroundLine, KeywordKind::Background)
            }
            TokenKind::ScenarioLine => {
                self.match_title_line(token, TokenKind::ScenarioLine, KeywordKind::Scenario)
            }
            TokenKind::ScenarioOutlineLine => self.match_title_line(
                token,
                TokenKind::ScenarioOutlineLine,
                KeywordKind::ScenarioOutline,
            ),
            TokenKind::ExamplesLine => {
                self.match_title_line(token, TokenKind::ExamplesLine, KeywordKind::Examples)
            }
            TokenKind::StepLine => self.match_step_line(token),
            TokenKind::DocStringSeparator => self.match_doc_string_separator(token),
            TokenKind::TableRow => self.match_table_row(token),
            TokenKind::Language => return self.match_language(token),
            TokenKind::Other => self.match_other(token),
        })
    }

    /// Classify `token` without grammar context, trying every kind in
    /// canonical order.
    ///
    /// # Errors
    ///
    /// Returns `DialectError` for a `# language:` line naming an unknown
    /// language.
    pub fn classify(&mut self, token: &mut Token) -> Result<TokenKind, DialectError> {
        for kind in CLASSIFY_ORDER {
            if self.matches(kind, token)? {
                return Ok(kind);
            }
        }
        Ok(TokenKind::Other)
    }

    fn set(&self, token: &mut Token, kind: TokenKind, matched: Matched) {
        token.set_matched(kind, &self.dialect, matched);
        log::trace!("line {}: {token}", token.location.line);
    }

    fn match_eof(&self, token: &mut Token) -> bool {
        if !token.is_eof() {
            return false;
        }
        self.set(token, TokenKind::Eof, Matched::default());
        true
    }

    fn match_empty(&self, token: &mut Token) -> bool {
        if !token.line().is_some_and(GherkinLine::is_empty) {
            return false;
        }
        self.set(token, TokenKind::Empty, Matched::default());
        true
    }

    fn match_comment(&self, token: &mut Token) -> bool {
        let Some(text) = token
            .line()
            .filter(|line| line.starts_with(COMMENT_PREFIX))
            .map(|line| line.raw().to_string())
        else {
            return false;
        };
        self.set(token, TokenKind::Comment, Matched::text(text).at_indent(0));
        true
    }

    fn match_tag_line(&self, token: &mut Token) -> bool {
        let Some(items) = token
            .line()
            .filter(|line| line.starts_with(TAG_PREFIX))
            .map(GherkinLine::tags)
        else {
            return false;
        };
        self.set(
            token,
            TokenKind::TagLine,
            Matched {
                items,
                ..Matched::default()
            },
        );
        true
    }

    fn match_table_row(&self, token: &mut Token) -> bool {
        let Some(items) = token
            .line()
            .filter(|line| line.starts_with(TABLE_CELL_SEPARATOR))
            .map(GherkinLine::table_cells)
        else {
            return false;
        };
        self.set(
            token,
            TokenKind::TableRow,
            Matched {
                items,
                ..Matched::default()
            },
        );
        true
    }

    fn match_title_line(&self, token: &mut Token, kind: TokenKind, keywords: KeywordKind) -> bool {
        let found = token.line().and_then(|line| {
            self.dialect
                .keywords(keywords)
                .iter()
                .find(|keyword| line.starts_with_title_keyword(keyword))
                .map(|keyword| (keyword.clone(), line.title_after(keyword).to_string()))
        });
        let Some((keyword, title)) = found else {
            return false;
        };
        self.set(
            token,
            kind,
            Matched {
                keyword: Some(keyword),
                text: Some(title),
                ..Matched::default()
            },
        );
        true
    }

    fn match_step_line(&self, token: &mut Token) -> bool {
        let found = token.line().and_then(|line| {
            self.dialect
                .keywords(KeywordKind::Step)
                .iter()
                .find(|keyword| line.starts_with(keyword))
                .map(|keyword| (keyword.clone(), line.rest_trimmed(keyword).to_string()))
        });
        let Some((keyword, text)) = found else {
            return false;
        };
        self.set(
            token,
            TokenKind::StepLine,
            Matched {
                keyword: Some(keyword),
                text: Some(text),
                ..Matched::default()
            },
        );
        true
    }

    fn match_doc_string_separator(&mut self, token: &mut Token) -> bool {
        match self.active_doc_string_separator {
            Some(separator) => self.close_doc_string(token, separator),
            None => {
                self.open_doc_string(token, DOCSTRING_SEPARATOR)
                    || self.open_doc_string(token, DOCSTRING_ALTERNATIVE_SEPARATOR)
            }
        }
    }

    fn open_doc_string(&mut self, token: &mut Token, separator: &'static str) -> bool {
        let Some((content_type, indent)) = token
            .line()
            .filter(|line| line.starts_with(separator))
            .map(|line| (line.rest_trimmed(separator).to_string(), line.indent()))
        else {
            return false;
        };
        self.active_doc_string_separator = Some(separator);
        self.indent_to_remove = indent;
        self.set(
            token,
            TokenKind::DocStringSeparator,
            Matched {
                keyword: Some(separator.to_string()),
                text: Some(content_type),
                ..Matched::default()
            },
        );
        true
    }

    fn close_doc_string(&mut self, token: &mut Token, separator: &'static str) -> bool {
        if !token.line().is_some_and(|line| line.starts_with(separator)) {
            return false;
        }
        self.active_doc_string_separator = None;
        self.indent_to_remove = 0;
        self.set(
            token,
            TokenKind::DocStringSeparator,
            Matched {
                keyword: Some(separator.to_string()),
                text: Some(String::new()),
                ..Matched::default()
            },
        );
        true
    }

    fn match_language(&mut self, token: &mut Token) -> Result<bool, DialectError> {
        let Some(language) = token
            .line()
            .and_then(|line| LANGUAGE_PATTERN.captures(line.raw()))
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
        else {
            return Ok(false);
        };
        let location = Location::new(token.location.line, token.line_indent() + 1);
        self.dialect = self.resolver.dialect_for(&language, location)?;
        log::debug!(
            "line {}: switched dialect to {}",
            location.line,
            self.dialect.language()
        );
        self.set(token, TokenKind::Language, Matched::text(language));
        Ok(true)
    }

    fn match_other(&self, token: &mut Token) -> bool {
        let Some(text) = token
            .line()
            .map(|line| line.text_without_indent(self.indent_to_remove))
            .map(|text| self.unescape_doc_string(text))
        else {
            return false;
        };
        self.set(token, TokenKind::Other, Matched::text(text).at_indent(0));
        true
    }

    /// Inside a doc string, a backslash-escaped closing separator stands
    /// for the literal separator.
    fn unescape_doc_string(&self, text: &str) -> String {
        match self.active_doc_string_separator {
            Some(DOCSTRING_SEPARATOR) => text.replace(r#"\"\"\""#, DOCSTRING_SEPARATOR),
            Some(DOCSTRING_ALTERNATIVE_SEPARATOR) => {
                text.replace(r"\`\`\`", DOCSTRING_ALTERNATIVE_SEPARATOR)
            }
            _ => text.to_string(),
        }
    }
}
