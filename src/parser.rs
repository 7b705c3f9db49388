use std::collections::VecDeque;
use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::mem;
use std::sync::Arc;

use crate::Error;
use crate::ast::GherkinDocument;
use crate::builder::AstBuilder;
use crate::dialect::DialectResolver;
use crate::grammar::{self, RuleKind, STATES};
use crate::matcher::TokenMatcher;
use crate::scanner::Scanner;
use crate::token::{Location, Token, TokenKind};

/// Number of recoverable errors tolerated before a parse gives up.
pub const MAX_ERRORS: usize = 10;

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Line not accepted in the current grammar state.
    UnexpectedToken {
        expected: Vec<TokenKind>,
        found: String,
    },
    /// Input ended where more lines were required.
    UnexpectedEof { expected: Vec<TokenKind> },
    /// Table row with a different cell count than the first row.
    InconsistentCellCount { expected: usize, found: usize },
}

fn write_kinds(f: &mut fmt::Formatter<'_>, kinds: &[TokenKind]) -> fmt::Result {
    for (i, kind) in kinds.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        f.write_str(kind.as_str())?;
    }
    Ok(())
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken { expected, found } => {
                write!(f, "expected: ")?;
                write_kinds(f, expected)?;
                write!(f, ", got '{found}'")
            }
            Self::UnexpectedEof { expected } => {
                write!(f, "unexpected end of file, expected: ")?;
                write_kinds(f, expected)
            }
            Self::InconsistentCellCount { expected, found } => {
                write!(
                    f,
                    "inconsistent cell count within the table, \
                     expected {expected} cells, found {found}"
                )
            }
        }
    }
}

/// Recoverable error found while parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", .location.line, .location.column)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub location: Location,
}

/// Every recoverable error of a failed parse, in source order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("parser errors:{}", render_errors(.errors))]
pub struct ParseErrors {
    pub errors: Vec<ParseError>,
}

fn render_errors(errors: &[ParseError]) -> String {
    errors.iter().map(|error| format!("\n  {error}")).collect()
}

/// Gherkin parser.
///
/// A parser is cheap to clone and can be shared between threads. Every
/// parser built from the same resolver shares its dialect cache.
#[derive(Debug, Clone)]
pub struct Parser {
    resolver: Arc<DialectResolver>,
}

impl Parser {
    /// Parser with the built-in keyword tables and English as default.
    #[must_use]
    pub fn new() -> Self {
        Self::with_resolver(Arc::new(DialectResolver::default()))
    }

    #[must_use]
    pub const fn with_resolver(resolver: Arc<DialectResolver>) -> Self {
        Self { resolver }
    }

    #[must_use]
    pub const fn resolver(&self) -> &Arc<DialectResolver> {
        &self.resolver
    }

    /// Parse every line `scanner` yields.
    ///
    /// # Errors
    ///
    /// Returns `Error::Scan` or `Error::Dialect` as soon as reading or
    /// dialect resolution fails, and `Error::Parse` with every recorded
    /// error when the document is malformed.
    pub fn parse<R: BufRead>(&self, scanner: Scanner<R>) -> Result<GherkinDocument, Error> {
        ParseContext {
            scanner,
            matcher: TokenMatcher::new(Arc::clone(&self.resolver))?,
            builder: AstBuilder::new(),
            queue: VecDeque::new(),
            errors: Vec::new(),
        }
        .run()
    }

    pub fn parse_str(&self, input: &str) -> Result<GherkinDocument, Error> {
        self.parse(Scanner::from_text(input))
    }

    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<GherkinDocument, Error> {
        self.parse(Scanner::new(BufReader::new(reader)))
    }

    /// Parse UTF-8 bytes; invalid UTF-8 fails with `Error::Scan`.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<GherkinDocument, Error> {
        self.parse(Scanner::new(bytes))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// State of one parse run.
struct ParseContext<R> {
    scanner: Scanner<R>,
    matcher: TokenMatcher,
    builder: AstBuilder,
    /// Tokens read ahead by the Examples lookahead, oldest first.
    queue: VecDeque<Token>,
    errors: Vec<ParseError>,
}

impl<R: BufRead> ParseContext<R> {
    fn run(mut self) -> Result<GherkinDocument, Error> {
        self.builder.reset();
        self.matcher.reset()?;
        self.builder.start_rule(RuleKind::GherkinDocument);
        let mut state = grammar::START;
        loop {
            let token = self.read_token()?;
            let eof = token.is_eof();
            state = self.match_token(state, token)?;
            if eof {
                break;
            }
        }
        self.end_rule()?;

        if !self.errors.is_empty() {
            return Err(Error::Parse(ParseErrors {
                errors: self.errors,
            }));
        }
        Ok(self.builder.result().unwrap_or_default())
    }

    fn read_token(&mut self) -> Result<Token, Error> {
        match self.queue.pop_front() {
            Some(token) => Ok(token),
            None => Ok(self.scanner.read()?),
        }
    }

    /// Run the first transition of `state` that accepts `token`.
    ///
    /// A rejected token is recorded as an error and the state is kept.
    fn match_token(&mut self, state: usize, mut token: Token) -> Result<usize, Error> {
        let transitions = STATES.get(state).copied().unwrap_or_default();
        for transition in transitions {
            if self.matcher.matches(transition.kind, &mut token)?
                && (!transition.lookahead || self.lookahead_examples()?)
            {
                for _ in 0..transition.end {
                    self.end_rule()?;
                }
                for &rule in transition.start {
                    self.builder.start_rule(rule);
                }
                self.builder.build(token);
                return Ok(transition.next);
            }
        }

        let expected = grammar::expected(state);
        let error = if token.is_eof() {
            ParseError {
                kind: ParseErrorKind::UnexpectedEof { expected },
                location: token.location,
            }
        } else {
            ParseError {
                kind: ParseErrorKind::UnexpectedToken {
                    expected,
                    found: token.value().to_string(),
                },
                location: Location::new(token.location.line, token.line_indent() + 1),
            }
        };
        self.add_error(error)?;
        Ok(state)
    }

    /// Decide whether the tag line just matched belongs to an Examples
    /// block: skip forward over blank, comment and tag lines and report
    /// whether an Examples line follows. Read tokens stay queued.
    fn lookahead_examples(&mut self) -> Result<bool, Error> {
        let mut index = 0;
        loop {
            if index == self.queue.len() {
                let token = self.scanner.read()?;
                self.queue.push_back(token);
            }
            let Some(token) = self.queue.get_mut(index) else {
                return Ok(false);
            };
            index += 1;

            if self.matcher.matches(TokenKind::ExamplesLine, token)? {
                log::trace!("tags at line {} belong to examples", token.location.line);
                return Ok(true);
            }
            let continues = self.matcher.matches(TokenKind::Empty, token)?
                || self.matcher.matches(TokenKind::Comment, token)?
                || self.matcher.matches(TokenKind::TagLine, token)?;
            if !continues {
                log::trace!(
                    "tags before line {} belong to a scenario",
                    token.location.line
                );
                return Ok(false);
            }
        }
    }

    fn end_rule(&mut self) -> Result<(), Error> {
        match self.builder.end_rule() {
            Ok(()) => Ok(()),
            Err(error) => self.add_error(error),
        }
    }

    fn add_error(&mut self, error: ParseError) -> Result<(), Error> {
        log::debug!("{error}");
        self.errors.push(error);
        if self.errors.len() > MAX_ERRORS {
            log::warn!("giving up after {} errors", self.errors.len());
            return Err(Error::Parse(ParseErrors {
                errors: mem::take(&mut self.errors),
            }));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ScenarioDefinition;

    fn parse(input: &str) -> Result<GherkinDocument, Error> {
        Parser::new().parse_str(input)
    }

    fn errors(input: &str) -> Vec<ParseError> {
        match parse(input) {
            Err(Error::Parse(ParseErrors { errors })) => errors,
            other => panic!("expected parse errors, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_has_no_feature() {
        assert_eq!(parse("").unwrap(), GherkinDocument::default());
        assert_eq!(parse("\n  \n# only a comment\n").unwrap().feature, None);
    }

    #[test]
    fn minimal_feature() {
        let doc = parse("Feature: Minimal\n").unwrap();
        let feature = doc.feature.unwrap();
        assert_eq!(feature.name, "Minimal");
        assert_eq!(feature.keyword, "Feature");
        assert_eq!(feature.language, "en");
        assert_eq!(feature.location, Location::new(1, 1));
        assert!(feature.children.is_empty());
    }

    #[test]
    fn step_before_feature_is_unexpected() {
        let errs = errors("Given nothing\nFeature: x\n");
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].location, Location::new(1, 1));
        let ParseErrorKind::UnexpectedToken { expected, found } = &errs[0].kind else {
            panic!("unexpected kind {:?}", errs[0].kind);
        };
        assert_eq!(found, "Given nothing");
        assert_eq!(
            expected,
            &[
                TokenKind::Eof,
                TokenKind::Language,
                TokenKind::TagLine,
                TokenKind::FeatureLine,
                TokenKind::Comment,
                TokenKind::Empty,
            ]
        );
    }

    #[test]
    fn unexpected_token_column_follows_indent() {
        let errs = errors("Feature: x\n  Scenario: y\n    Given z\n    | a |\n  Feature: again\n");
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].location, Location::new(5, 3));
    }

    #[test]
    fn unterminated_doc_string_is_unexpected_eof() {
        let errs = errors("Feature: x\nScenario: y\nGiven z\n\"\"\"\nopen\n");
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].location, Location::new(6, 0));
        assert_eq!(
            errs[0].kind,
            ParseErrorKind::UnexpectedEof {
                expected: vec![TokenKind::DocStringSeparator, TokenKind::Other],
            }
        );
    }

    #[test]
    fn tags_resolve_to_examples_or_scenario() {
        let input = "\
Feature: f
  Scenario Outline: o
    Given <x>

    @ex
    # between
    Examples:
      | x |
      | 1 |

    @next
    Scenario: s
";
        let feature = parse(input).unwrap().feature.unwrap();
        assert_eq!(feature.children.len(), 2);
        let ScenarioDefinition::ScenarioOutline(outline) = &feature.children[0] else {
            panic!("expected an outline");
        };
        assert_eq!(outline.examples.len(), 1);
        assert_eq!(outline.examples[0].tags[0].name, "@ex");
        assert!(outline.tags.is_empty());
        assert_eq!(feature.children[1].tags()[0].name, "@next");
    }

    #[test]
    fn error_count_below_limit_is_reported_at_end() {
        let errs = errors("Feature: f\nScenario: s\nGiven a\nfree 1\nfree 2\nfree 3\n");
        assert_eq!(errs.len(), 3);
        assert_eq!(errs[0].location, Location::new(4, 1));
    }

    #[test]
    fn parse_aborts_after_too_many_errors() {
        let mut input = String::from("Feature: f\nScenario: s\nGiven a\n");
        for i in 0..20 {
            input.push_str(&format!("free text {i}\n"));
        }
        let errs = errors(&input);
        assert_eq!(errs.len(), MAX_ERRORS + 1);
    }

    #[test]
    fn composite_error_lists_every_error() {
        let err = parse("Feature: f\nScenario: s\nGiven a\nfree 1\n  free 2\n").unwrap_err();
        let Error::Parse(errors) = &err else {
            panic!("expected parse errors, got {err:?}");
        };
        let expected = "expected: #EOF, #TableRow, #DocStringSeparator, #StepLine, #TagLine, \
                        #ScenarioLine, #ScenarioOutlineLine, #Comment, #Empty";
        assert_eq!(
            errors.to_string(),
            format!(
                "parser errors:\n  {expected}, got 'free 1' at line 4, column 1\
                 \n  {expected}, got 'free 2' at line 5, column 3"
            )
        );
        let source: &dyn std::error::Error = errors;
        assert!(source.source().is_none());
    }

    #[test]
    fn run_starts_from_default_dialect_and_empty_builder() {
        let resolver = Arc::new(DialectResolver::default());
        let mut matcher = TokenMatcher::new(Arc::clone(&resolver)).unwrap();
        let mut pragma = Scanner::from_text("# language: fr\n").read().unwrap();
        assert!(matcher.matches(TokenKind::Language, &mut pragma).unwrap());
        assert_eq!(matcher.dialect().language(), "fr");

        let mut builder = AstBuilder::new();
        builder.start_rule(RuleKind::GherkinDocument);
        builder.start_rule(RuleKind::Feature);

        let doc = ParseContext {
            scanner: Scanner::from_text("Feature: clean\n"),
            matcher,
            builder,
            queue: VecDeque::new(),
            errors: Vec::new(),
        }
        .run()
        .unwrap();
        let feature = doc.feature.unwrap();
        assert_eq!(feature.name, "clean");
        assert_eq!(feature.language, "en");
    }

    #[test]
    fn parser_is_reusable() {
        let parser = Parser::new();
        let first = parser.parse_str("# language: fr\nFonctionnalité: a\n").unwrap();
        let second = parser.parse_str("Feature: b\n").unwrap();
        assert_eq!(first.feature.unwrap().language, "fr");
        assert_eq!(second.feature.unwrap().language, "en");
    }
}
