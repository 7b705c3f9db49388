//! Built-in keyword tables, following the Cucumber Gherkin dictionaries.

use crate::dialect::KeywordKind::{
    And, Background, But, Examples, Feature, Given, Scenario, ScenarioOutline, Then, When,
};
use crate::dialect::{KeywordKind, KeywordMap, KeywordMapProvider};

type Table = &'static [(KeywordKind, &'static [&'static str])];

const EN: Table = &[
    (Feature, &["Feature", "Business Need", "Ability"]),
    (Background, &["Background"]),
    (Scenario, &["Example", "Scenario"]),
    (ScenarioOutline, &["Scenario Outline", "Scenario Template"]),
    (Examples, &["Examples", "Scenarios"]),
    (Given, &["* ", "Given "]),
    (When, &["* ", "When "]),
    (Then, &["* ", "Then "]),
    (And, &["* ", "And "]),
    (But, &["* ", "But "]),
];

const FR: Table = &[
    (Feature, &["Fonctionnalité"]),
    (Background, &["Contexte"]),
    (Scenario, &["Exemple", "Scénario"]),
    (ScenarioOutline, &["Plan du scénario", "Plan du Scénario"]),
    (Examples, &["Exemples"]),
    (
        Given,
        &[
            "* ",
            "Soit ",
            "Sachant que ",
            "Sachant qu'",
            "Sachant ",
            "Etant donné que ",
            "Etant donné qu'",
            "Etant donné ",
            "Etant donnée ",
            "Etant donnés ",
            "Etant données ",
            "Étant donné que ",
            "Étant donné qu'",
            "Étant donné ",
            "Étant donnée ",
            "Étant donnés ",
            "Étant données ",
        ],
    ),
    (When, &["* ", "Quand ", "Lorsque ", "Lorsqu'"]),
    (Then, &["* ", "Alors ", "Donc "]),
    (And, &["* ", "Et que ", "Et qu'", "Et "]),
    (But, &["* ", "Mais que ", "Mais qu'", "Mais "]),
];

const ES: Table = &[
    (Feature, &["Característica", "Necesidad del negocio", "Requisito"]),
    (Background, &["Antecedentes"]),
    (Scenario, &["Ejemplo", "Escenario"]),
    (ScenarioOutline, &["Esquema del escenario"]),
    (Examples, &["Ejemplos"]),
    (Given, &["* ", "Dado ", "Dada ", "Dados ", "Dadas "]),
    (When, &["* ", "Cuando "]),
    (Then, &["* ", "Entonces "]),
    (And, &["* ", "Y ", "E "]),
    (But, &["* ", "Pero "]),
];

const DE: Table = &[
    (Feature, &["Funktionalität", "Funktion"]),
    (
        Background,
        &["Grundlage", "Hintergrund", "Voraussetzungen", "Vorbedingungen"],
    ),
    (Scenario, &["Beispiel", "Szenario"]),
    (ScenarioOutline, &["Szenariogrundriss", "Szenarien"]),
    (Examples, &["Beispiele"]),
    (Given, &["* ", "Angenommen ", "Gegeben sei ", "Gegeben seien "]),
    (When, &["* ", "Wenn "]),
    (Then, &["* ", "Dann "]),
    (And, &["* ", "Und "]),
    (But, &["* ", "Aber "]),
];

const IT: Table = &[
    (Feature, &["Funzionalità", "Esigenza di Business", "Abilità"]),
    (Background, &["Contesto"]),
    (Scenario, &["Esempio", "Scenario"]),
    (ScenarioOutline, &["Schema dello scenario"]),
    (Examples, &["Esempi"]),
    (Given, &["* ", "Dato ", "Data ", "Dati ", "Date "]),
    (When, &["* ", "Quando "]),
    (Then, &["* ", "Allora "]),
    (And, &["* ", "E "]),
    (But, &["* ", "Ma "]),
];

const PT: Table = &[
    (Feature, &["Funcionalidade", "Característica", "Caracteristica"]),
    (
        Background,
        &["Contexto", "Cenário de Fundo", "Cenario de Fundo", "Fundo"],
    ),
    (Scenario, &["Exemplo", "Cenário", "Cenario"]),
    (
        ScenarioOutline,
        &[
            "Esquema do Cenário",
            "Esquema do Cenario",
            "Delineação do Cenário",
            "Delineacao do Cenario",
        ],
    ),
    (Examples, &["Exemplos", "Cenários", "Cenarios"]),
    (Given, &["* ", "Dado ", "Dada ", "Dados ", "Dadas "]),
    (When, &["* ", "Quando "]),
    (Then, &["* ", "Então ", "Entao "]),
    (And, &["* ", "E "]),
    (But, &["* ", "Mas "]),
];

const NL: Table = &[
    (Feature, &["Functionaliteit"]),
    (Background, &["Achtergrond"]),
    (Scenario, &["Voorbeeld", "Scenario"]),
    (ScenarioOutline, &["Abstract Scenario"]),
    (Examples, &["Voorbeelden"]),
    (Given, &["* ", "Gegeven ", "Stel "]),
    (When, &["* ", "Als ", "Wanneer "]),
    (Then, &["* ", "Dan "]),
    (And, &["* ", "En "]),
    (But, &["* ", "Maar "]),
];

const RU: Table = &[
    (
        Feature,
        &["Функция", "Функциональность", "Функционал", "Свойство", "Фича"],
    ),
    (Background, &["Предыстория", "Контекст"]),
    (Scenario, &["Пример", "Сценарий"]),
    (ScenarioOutline, &["Структура сценария", "Шаблон сценария"]),
    (Examples, &["Примеры"]),
    (Given, &["* ", "Допустим ", "Дано ", "Пусть "]),
    (When, &["* ", "Когда ", "Если "]),
    (Then, &["* ", "То ", "Затем ", "Тогда "]),
    (And, &["* ", "И ", "К тому же ", "Также "]),
    (But, &["* ", "Но ", "А ", "Иначе "]),
];

// No trailing spaces on Japanese step keywords: words are not space-separated.
const JA: Table = &[
    (Feature, &["フィーチャ", "機能"]),
    (Background, &["背景"]),
    (Scenario, &["シナリオ"]),
    (
        ScenarioOutline,
        &["シナリオアウトライン", "シナリオテンプレート", "テンプレ", "シナリオテンプレ"],
    ),
    (Examples, &["例", "サンプル"]),
    (Given, &["* ", "前提"]),
    (When, &["* ", "もし"]),
    (Then, &["* ", "ならば"]),
    (And, &["* ", "且つ", "かつ"]),
    (But, &["* ", "然し", "しかし", "但し", "ただし"]),
];

const TABLES: &[(&str, Table)] = &[
    ("en", EN),
    ("fr", FR),
    ("es", ES),
    ("de", DE),
    ("it", IT),
    ("pt", PT),
    ("nl", NL),
    ("ru", RU),
    ("ja", JA),
];

/// Keyword maps compiled into the crate.
///
/// A regional tag such as `pt-BR` falls back to its primary language when
/// no table exists for the full tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinKeywords;

impl BuiltinKeywords {
    /// Language tags with a built-in table.
    pub fn languages() -> impl Iterator<Item = &'static str> {
        TABLES.iter().map(|(language, _)| *language)
    }

    fn table(language: &str) -> Option<Table> {
        let lookup = |tag: &str| {
            TABLES
                .iter()
                .find(|(language, _)| *language == tag)
                .map(|(_, table)| *table)
        };
        lookup(language).or_else(|| {
            let primary = language.split('-').next()?;
            (primary != language).then(|| lookup(primary)).flatten()
        })
    }
}

impl KeywordMapProvider for BuiltinKeywords {
    fn keyword_map(&self, language: &str) -> Option<KeywordMap> {
        let table = Self::table(language)?;
        Some(
            table
                .iter()
                .fold(KeywordMap::new(), |map, (kind, keywords)| {
                    map.with(*kind, keywords.iter().copied())
                }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use rstest::rstest;

    #[rstest]
    #[case("en", "Feature", "Given ")]
    #[case("fr", "Fonctionnalité", "Soit ")]
    #[case("es", "Característica", "Dado ")]
    #[case("de", "Funktionalität", "Angenommen ")]
    #[case("it", "Funzionalità", "Dato ")]
    #[case("pt", "Funcionalidade", "Dado ")]
    #[case("nl", "Functionaliteit", "Gegeven ")]
    #[case("ru", "Функция", "Допустим ")]
    #[case("ja", "フィーチャ", "前提")]
    fn builtin_tables(#[case] language: &str, #[case] feature: &str, #[case] given: &str) {
        let map = BuiltinKeywords.keyword_map(language).unwrap();
        assert_eq!(map.keywords(KeywordKind::Feature)[0], feature);
        assert!(map.keywords(KeywordKind::Given).iter().any(|k| k == given));
    }

    #[test]
    fn every_table_fills_every_category() {
        for language in BuiltinKeywords::languages() {
            let map = BuiltinKeywords.keyword_map(language).unwrap();
            let dialect = Dialect::new(language, &map);
            for kind in KeywordKind::ALL {
                assert!(
                    !dialect.keywords(kind).is_empty(),
                    "{language} lacks {kind}"
                );
            }
        }
    }

    #[test]
    fn regional_tag_falls_back_to_primary() {
        let map = BuiltinKeywords.keyword_map("pt-BR").unwrap();
        assert_eq!(map.keywords(KeywordKind::Feature)[0], "Funcionalidade");
    }

    #[test]
    fn unknown_language_is_none() {
        assert!(BuiltinKeywords.keyword_map("tlh").is_none());
        assert!(BuiltinKeywords.keyword_map("").is_none());
    }
}
