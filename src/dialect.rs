//! Keyword dialects: per-locale keyword lists and their resolution.
//!
//! A [`KeywordMapProvider`] supplies raw keyword maps; the
//! [`DialectResolver`] flattens them into ready-to-match [`Dialect`]s and
//! caches the result per normalized language tag. One resolver is meant to
//! be built at startup and shared by every parse, across threads.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::languages::BuiltinKeywords;
use crate::token::Location;

/// Language used when no `# language:` pragma is present.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Keyword category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordKind {
    Feature,
    Background,
    Scenario,
    ScenarioOutline,
    Examples,
    Given,
    When,
    Then,
    And,
    But,
    /// Union of `Given`, `When`, `Then`, `And` and `But`, in that order.
    Step,
}

impl KeywordKind {
    /// Every category, composites included.
    pub const ALL: [Self; 11] = [
        Self::Feature,
        Self::Background,
        Self::Scenario,
        Self::ScenarioOutline,
        Self::Examples,
        Self::Given,
        Self::When,
        Self::Then,
        Self::And,
        Self::But,
        Self::Step,
    ];

    /// Dictionary key for this category.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Feature => "feature",
            Self::Background => "background",
            Self::Scenario => "scenario",
            Self::ScenarioOutline => "scenarioOutline",
            Self::Examples => "examples",
            Self::Given => "given",
            Self::When => "when",
            Self::Then => "then",
            Self::And => "and",
            Self::But => "but",
            Self::Step => "step",
        }
    }

    /// Primitive categories this one is made of; itself when primitive.
    #[must_use]
    pub fn components(self) -> &'static [Self] {
        match self {
            Self::Step => &[Self::Given, Self::When, Self::Then, Self::And, Self::But],
            Self::Feature => &[Self::Feature],
            Self::Background => &[Self::Background],
            Self::Scenario => &[Self::Scenario],
            Self::ScenarioOutline => &[Self::ScenarioOutline],
            Self::Examples => &[Self::Examples],
            Self::Given => &[Self::Given],
            Self::When => &[Self::When],
            Self::Then => &[Self::Then],
            Self::And => &[Self::And],
            Self::But => &[Self::But],
        }
    }
}

impl fmt::Display for KeywordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Raw keyword lists for one locale, as a provider hands them over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordMap {
    entries: HashMap<KeywordKind, Vec<String>>,
}

impl KeywordMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the keywords of one category, replacing any previous list.
    #[must_use]
    pub fn with<I, S>(mut self, kind: KeywordKind, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(kind, keywords);
        self
    }

    pub fn insert<I, S>(&mut self, kind: KeywordKind, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .insert(kind, keywords.into_iter().map(Into::into).collect());
    }

    /// Keywords of a category; empty when the map has none.
    #[must_use]
    pub fn keywords(&self, kind: KeywordKind) -> &[String] {
        self.entries.get(&kind).map_or(&[], Vec::as_slice)
    }
}

/// Source of keyword maps, keyed by language tag.
pub trait KeywordMapProvider: Send + Sync {
    /// Keyword map for `language`, or `None` when the language is unknown.
    fn keyword_map(&self, language: &str) -> Option<KeywordMap>;
}

impl<F> KeywordMapProvider for F
where
    F: Fn(&str) -> Option<KeywordMap> + Send + Sync,
{
    fn keyword_map(&self, language: &str) -> Option<KeywordMap> {
        self(language)
    }
}

/// Several providers consulted in order; the first that knows the
/// language wins.
#[derive(Default)]
pub struct AggregateProvider {
    providers: Vec<Box<dyn KeywordMapProvider>>,
}

impl AggregateProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, provider: impl KeywordMapProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }
}

impl KeywordMapProvider for AggregateProvider {
    fn keyword_map(&self, language: &str) -> Option<KeywordMap> {
        self.providers
            .iter()
            .find_map(|provider| provider.keyword_map(language))
    }
}

impl fmt::Debug for AggregateProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregateProvider")
            .field("providers", &self.providers.len())
            .finish()
    }
}

/// Flattened, ready-to-match keywords for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    language: String,
    keywords: HashMap<KeywordKind, Vec<String>>,
}

impl Dialect {
    /// Flatten `map` so that every category, composites included, has its
    /// own ordered list.
    #[must_use]
    pub fn new(language: impl Into<String>, map: &KeywordMap) -> Self {
        let keywords = KeywordKind::ALL
            .iter()
            .map(|&kind| {
                let flattened = kind
                    .components()
                    .iter()
                    .flat_map(|&component| map.keywords(component).iter().cloned())
                    .collect();
                (kind, flattened)
            })
            .collect();
        Self {
            language: language.into(),
            keywords,
        }
    }

    /// Normalized language tag, e.g. `fr` or `pt-BR`.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Keywords of a category in declaration order; empty for categories
    /// the dialect lacks.
    #[must_use]
    pub fn keywords(&self, kind: KeywordKind) -> &[String] {
        self.keywords.get(&kind).map_or(&[], Vec::as_slice)
    }

    fn missing_categories(&self) -> impl Iterator<Item = KeywordKind> + '_ {
        KeywordKind::ALL
            .into_iter()
            .filter(|&kind| self.keywords(kind).is_empty())
    }
}

/// Why a language could not be turned into a dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialectErrorKind {
    /// No keyword map is registered for the language.
    Unsupported,
    /// The keyword map leaves these categories empty.
    Incomplete { missing: Vec<KeywordKind> },
}

impl fmt::Display for DialectErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported => f.write_str("language not supported"),
            Self::Incomplete { missing } => {
                f.write_str("incomplete keyword map, no keywords for ")?;
                for (i, kind) in missing.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{kind}")?;
                }
                f.write_str(" in language")
            }
        }
    }
}

/// Raised when a language has no usable keyword map.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "{kind}: {language} at line {}, column {}",
    .location.line,
    .location.column
)]
pub struct DialectError {
    pub kind: DialectErrorKind,
    pub language: String,
    pub location: Location,
}

/// Resolves language tags to dialects, caching every successful lookup.
///
/// Concurrent first lookups of the same language may both build the
/// dialect; the last insert wins and either value is equivalent.
pub struct DialectResolver {
    provider: Box<dyn KeywordMapProvider>,
    default_language: String,
    cache: RwLock<HashMap<String, Arc<Dialect>>>,
}

impl DialectResolver {
    #[must_use]
    pub fn new(provider: impl KeywordMapProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            default_language: DEFAULT_LANGUAGE.to_string(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Language resolved when a document carries no pragma.
    #[must_use]
    pub fn with_default_language(mut self, language: &str) -> Self {
        self.default_language = normalize_language(language);
        self
    }

    #[must_use]
    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Dialect of the configured default language.
    ///
    /// # Errors
    ///
    /// Returns `DialectError` located at the document start when the
    /// default language is unknown.
    pub fn default_dialect(&self) -> Result<Arc<Dialect>, DialectError> {
        self.dialect_for(&self.default_language, Location::new(1, 1))
    }

    /// Dialect for `language`; `location` is reported on failure.
    ///
    /// # Errors
    ///
    /// Returns `DialectError` when the provider has no keyword map for the
    /// language.
    pub fn dialect_for(
        &self,
        language: &str,
        location: Location,
    ) -> Result<Arc<Dialect>, DialectError> {
        let language = normalize_language(language);

        let cached = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&language)
            .cloned();
        if let Some(dialect) = cached {
            log::trace!("dialect cache hit for {language}");
            return Ok(dialect);
        }

        let map = self
            .provider
            .keyword_map(&language)
            .ok_or_else(|| DialectError {
                kind: DialectErrorKind::Unsupported,
                language: language.clone(),
                location,
            })?;
        let dialect = Arc::new(Dialect::new(language.clone(), &map));
        let missing: Vec<_> = dialect.missing_categories().collect();
        if !missing.is_empty() {
            log::warn!("dialect {language} has no keywords for {missing:?}");
            return Err(DialectError {
                kind: DialectErrorKind::Incomplete { missing },
                language,
                location,
            });
        }
        log::debug!("resolved dialect {language}");

        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(language, Arc::clone(&dialect));
        Ok(dialect)
    }

    /// Number of cached dialects.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for DialectResolver {
    fn default() -> Self {
        Self::new(BuiltinKeywords)
    }
}

impl fmt::Debug for DialectResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialectResolver")
            .field("default_language", &self.default_language)
            .field("cached", &self.cached())
            .finish_non_exhaustive()
    }
}

/// Canonical form of a language tag: `pt_br` becomes `pt-BR`,
/// `zh-hant-tw` becomes `zh-Hant-TW`.
#[must_use]
pub fn normalize_language(tag: &str) -> String {
    tag.trim()
        .split(['-', '_'])
        .filter(|part| !part.is_empty())
        .enumerate()
        .map(|(i, part)| {
            if i == 0 {
                part.to_ascii_lowercase()
            } else if part.len() == 2 {
                part.to_ascii_uppercase()
            } else if part.len() == 4 {
                let mut chars = part.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                })
            } else {
                part.to_ascii_lowercase()
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tiny_map() -> KeywordMap {
        KeywordMap::new()
            .with(KeywordKind::Feature, ["Feature"])
            .with(KeywordKind::Background, ["Background"])
            .with(KeywordKind::Scenario, ["Scenario"])
            .with(KeywordKind::ScenarioOutline, ["Scenario Outline"])
            .with(KeywordKind::Examples, ["Examples"])
            .with(KeywordKind::Given, ["Given "])
            .with(KeywordKind::When, ["When "])
            .with(KeywordKind::Then, ["Then "])
            .with(KeywordKind::And, ["And "])
            .with(KeywordKind::But, ["But "])
    }

    #[test]
    fn step_is_flattened_in_fixed_order() {
        let dialect = Dialect::new("en", &tiny_map());
        assert_eq!(
            dialect.keywords(KeywordKind::Step),
            ["Given ", "When ", "Then ", "And ", "But "]
        );
    }

    #[test]
    fn missing_category_lookup_is_empty() {
        let map = KeywordMap::new().with(KeywordKind::Feature, ["Feature"]);
        let dialect = Dialect::new("en", &map);
        assert!(dialect.keywords(KeywordKind::Examples).is_empty());
    }

    #[test]
    fn incomplete_map_is_rejected_and_not_cached() {
        let resolver = DialectResolver::new(|_: &str| {
            Some(tiny_map().with(KeywordKind::Examples, Vec::<String>::new()))
        });
        let err = resolver
            .dialect_for("en", Location::new(2, 5))
            .unwrap_err();
        assert_eq!(
            err.kind,
            DialectErrorKind::Incomplete {
                missing: vec![KeywordKind::Examples]
            }
        );
        assert_eq!(err.location, Location::new(2, 5));
        assert_eq!(
            err.to_string(),
            "incomplete keyword map, no keywords for examples in language: en at line 2, column 5"
        );
        assert_eq!(resolver.cached(), 0);
    }

    #[rstest]
    #[case("fr", "fr")]
    #[case(" EN ", "en")]
    #[case("pt_br", "pt-BR")]
    #[case("zh-hant-tw", "zh-Hant-TW")]
    #[case("en-US", "en-US")]
    fn normalizes_tags(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_language(input), expected);
    }

    #[test]
    fn unknown_language_reports_location() {
        let resolver = DialectResolver::new(|_: &str| None);
        let err = resolver
            .dialect_for("xx", Location::new(3, 1))
            .unwrap_err();
        assert_eq!(err.kind, DialectErrorKind::Unsupported);
        assert_eq!(err.language, "xx");
        assert_eq!(err.location, Location::new(3, 1));
        assert!(err.to_string().contains("language not supported: xx"));
    }

    #[test]
    fn default_dialect_failure_points_at_document_start() {
        let resolver = DialectResolver::new(|_: &str| None).with_default_language("en");
        let err = resolver.default_dialect().unwrap_err();
        assert_eq!(err.location, Location::new(1, 1));
    }

    #[test]
    fn resolution_is_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let resolver = DialectResolver::new(move |_: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(tiny_map())
        });

        let first = resolver.dialect_for("en", Location::default()).unwrap();
        let second = resolver.dialect_for("EN", Location::default()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.cached(), 1);
    }

    #[test]
    fn aggregate_uses_first_match() {
        let provider = AggregateProvider::new()
            .with(|lang: &str| (lang == "en").then(tiny_map))
            .with(|_: &str| Some(KeywordMap::new().with(KeywordKind::Feature, ["Fallback"])));

        let en = provider.keyword_map("en").unwrap();
        assert_eq!(en.keywords(KeywordKind::Feature), ["Feature"]);
        let other = provider.keyword_map("fr").unwrap();
        assert_eq!(other.keywords(KeywordKind::Feature), ["Fallback"]);
    }

    #[test]
    fn concurrent_resolution_is_consistent() {
        let resolver = Arc::new(DialectResolver::default());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                std::thread::spawn(move || {
                    resolver
                        .dialect_for("fr", Location::default())
                        .map(|d| d.language().to_string())
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), "fr");
        }
        assert_eq!(resolver.cached(), 1);
    }
}
