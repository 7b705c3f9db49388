//! Gherkin feature file parser.
//!
//! Turns `.feature` documents into an immutable AST that keeps source
//! locations, comments and the keywords of the document's natural
//! language. Malformed documents yield every located syntax error at once.
//!
//! # Quick start
//!
//! ## Parse a feature
//!
//! ```
//! use gherkin_parser_rs::parse_str;
//!
//! let input = "\
//! Feature: Login
//!   Scenario: Valid password
//!     Given a registered user
//!     When they log in
//!     Then they see the dashboard
//! ";
//! let doc = parse_str(input).unwrap();
//! let feature = doc.feature.unwrap();
//! assert_eq!(feature.name, "Login");
//! assert_eq!(feature.children[0].steps().len(), 3);
//! ```
//!
//! ## Other languages
//!
//! ```
//! use gherkin_parser_rs::parse_str;
//!
//! let input = "\
//! ## language: fr
//! Fonctionnalité: Connexion
//!   Scénario: Mot de passe valide
//!     Étant donné un utilisateur inscrit
//! ";
//! let feature = parse_str(input).unwrap().feature.unwrap();
//! assert_eq!(feature.language, "fr");
//! assert_eq!(feature.children[0].steps()[0].keyword, "Étant donné ");
//! ```
//!
//! ## Sharing a dialect cache
//!
//! ```
//! use std::sync::Arc;
//! use gherkin_parser_rs::{BuiltinKeywords, DialectResolver, Parser};
//!
//! let resolver = Arc::new(DialectResolver::new(BuiltinKeywords).with_default_language("de"));
//! let parser = Parser::with_resolver(Arc::clone(&resolver));
//! let doc = parser.parse_str("Funktionalität: Anmeldung\n").unwrap();
//! assert_eq!(doc.feature.unwrap().language, "de");
//! assert_eq!(resolver.cached(), 1);
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod builder;
pub mod dialect;
pub mod grammar;
pub mod languages;
pub mod line;
pub mod matcher;
pub mod parser;
pub mod scanner;
pub mod token;

use std::io::Read;
use std::sync::LazyLock;

pub use ast::{
    Background, Comment, DataTable, DocString, Examples, Feature, GherkinDocument, Scenario,
    ScenarioDefinition, ScenarioOutline, Step, StepArgument, TableCell, TableRow, Tag,
};
pub use builder::AstBuilder;
pub use dialect::{
    AggregateProvider, DEFAULT_LANGUAGE, Dialect, DialectError, DialectErrorKind, DialectResolver,
    KeywordKind, KeywordMap, KeywordMapProvider,
};
pub use grammar::RuleKind;
pub use languages::BuiltinKeywords;
pub use line::GherkinLine;
pub use matcher::TokenMatcher;
pub use parser::{MAX_ERRORS, ParseError, ParseErrorKind, ParseErrors, Parser};
pub use scanner::{ScanError, Scanner};
pub use token::{LineSpan, Location, Token, TokenKind};

/// Unified error type for a parse.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input could not be read.
    #[error("{0}")]
    Scan(#[from] ScanError),
    /// A language could not be resolved.
    #[error("{0}")]
    Dialect(#[from] DialectError),
    /// The document is malformed.
    #[error("{0}")]
    Parse(#[from] ParseErrors),
}

impl Error {
    /// Location-bearing errors, flattened.
    ///
    /// A scan error has no column and reports none.
    #[must_use]
    pub fn locations(&self) -> Vec<Location> {
        match self {
            Self::Scan(_) => Vec::new(),
            Self::Dialect(error) => vec![error.location],
            Self::Parse(errors) => errors.errors.iter().map(|e| e.location).collect(),
        }
    }
}

/// Parser behind the free functions. Its dialect cache lives as long as
/// the process, so every document parsed through them shares it.
static SHARED: LazyLock<Parser> = LazyLock::new(Parser::new);

/// Parse a feature document held in memory, using the built-in keywords.
///
/// Use [`Parser::with_resolver`] to pick another default language or
/// keyword provider.
pub fn parse_str(input: &str) -> Result<GherkinDocument, Error> {
    SHARED.parse_str(input)
}

/// Parse a feature document from any reader, decoding UTF-8.
pub fn parse_reader(reader: impl Read) -> Result<GherkinDocument, Error> {
    SHARED.parse_reader(reader)
}

/// Parse a UTF-8 encoded feature document.
pub fn parse_bytes(bytes: &[u8]) -> Result<GherkinDocument, Error> {
    SHARED.parse_bytes(bytes)
}
