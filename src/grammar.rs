//! Grammar rules and the parser's transition table.
//!
//! ```text
//! Document        := Feature?
//! Feature         := FeatureHeader Background? ScenarioDefinition*
//! FeatureHeader   := #Language? Tags? #FeatureLine Description?
//! Background      := #BackgroundLine Description? Step*
//! ScenarioDef     := Tags? (Scenario | ScenarioOutline)
//! Scenario        := #ScenarioLine Description? Step*
//! ScenarioOutline := #ScenarioOutlineLine Description? Step* ExamplesDef*
//! ExamplesDef     := Tags? Examples
//! Examples        := #ExamplesLine Description? ExamplesTable?
//! Step            := #StepLine (DataTable | DocString)?
//! DataTable       := #TableRow+
//! DocString       := #DocStringSeparator #Other* #DocStringSeparator
//! Tags            := #TagLine+
//! Description     := #Other+
//! ```
//!
//! Blank and comment lines are accepted wherever free text may appear.

use crate::token::TokenKind;

/// Grammar production the parser can open and close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Root scope that receives the finished document.
    None,
    GherkinDocument,
    Feature,
    FeatureHeader,
    Background,
    ScenarioDefinition,
    Scenario,
    ScenarioOutline,
    ExamplesDefinition,
    Examples,
    ExamplesTable,
    Step,
    DataTable,
    DocString,
    Tags,
    Description,
}

/// One accepted token kind in a state.
///
/// On a match the parser closes `end` rules, opens every rule in `start`,
/// hands the token to the builder and moves to `next`. A `lookahead`
/// transition additionally requires the Examples lookahead to succeed.
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub kind: TokenKind,
    pub lookahead: bool,
    pub end: u8,
    pub start: &'static [RuleKind],
    pub next: usize,
}

/// State entered at the start of every document.
pub const START: usize = 0;

/// State after end of input was accepted.
pub const END: usize = 27;

use RuleKind as R;
use TokenKind as K;

const fn stay(kind: K, next: usize) -> Transition {
    Transition {
        kind,
        lookahead: false,
        end: 0,
        start: &[],
        next,
    }
}

const fn to(kind: K, end: u8, start: &'static [R], next: usize) -> Transition {
    Transition {
        kind,
        lookahead: false,
        end,
        start,
        next,
    }
}

const fn peek(kind: K, end: u8, start: &'static [R], next: usize) -> Transition {
    Transition {
        kind,
        lookahead: true,
        end,
        start,
        next,
    }
}

const FEATURE: &[R] = &[R::Feature, R::FeatureHeader];
const FEATURE_TAGS: &[R] = &[R::Feature, R::FeatureHeader, R::Tags];
const TAGS: &[R] = &[R::Tags];
const BACKGROUND: &[R] = &[R::Background];
const DEFINITION_TAGS: &[R] = &[R::ScenarioDefinition, R::Tags];
const SCENARIO: &[R] = &[R::ScenarioDefinition, R::Scenario];
const OUTLINE: &[R] = &[R::ScenarioDefinition, R::ScenarioOutline];
const EXAMPLES_TAGS: &[R] = &[R::ExamplesDefinition, R::Tags];
const EXAMPLES: &[R] = &[R::ExamplesDefinition, R::Examples];
const STEP: &[R] = &[R::Step];
const DATA_TABLE: &[R] = &[R::DataTable];
const DOC_STRING: &[R] = &[R::DocString];
const DESCRIPTION: &[R] = &[R::Description];
const EXAMPLES_TABLE: &[R] = &[R::ExamplesTable];

/// Transitions per state, tried in order.
pub static STATES: [&[Transition]; 34] = [
    // 0: start of document
    &[
        to(K::Eof, 0, &[], END),
        to(K::Language, 0, FEATURE, 1),
        to(K::TagLine, 0, FEATURE_TAGS, 2),
        to(K::FeatureLine, 0, FEATURE, 3),
        stay(K::Comment, 0),
        stay(K::Empty, 0),
    ],
    // 1: after the language pragma
    &[
        to(K::TagLine, 0, TAGS, 2),
        stay(K::FeatureLine, 3),
        stay(K::Comment, 1),
        stay(K::Empty, 1),
    ],
    // 2: feature tags
    &[
        stay(K::TagLine, 2),
        to(K::FeatureLine, 1, &[], 3),
        stay(K::Comment, 2),
        stay(K::Empty, 2),
    ],
    // 3: feature line
    &[
        to(K::Eof, 2, &[], END),
        stay(K::Empty, 3),
        stay(K::Comment, 5),
        to(K::BackgroundLine, 1, BACKGROUND, 6),
        to(K::TagLine, 1, DEFINITION_TAGS, 11),
        to(K::ScenarioLine, 1, SCENARIO, 12),
        to(K::ScenarioOutlineLine, 1, OUTLINE, 17),
        to(K::Other, 0, DESCRIPTION, 4),
    ],
    // 4: feature description
    &[
        to(K::Eof, 3, &[], END),
        to(K::Comment, 1, &[], 5),
        to(K::BackgroundLine, 2, BACKGROUND, 6),
        to(K::TagLine, 2, DEFINITION_TAGS, 11),
        to(K::ScenarioLine, 2, SCENARIO, 12),
        to(K::ScenarioOutlineLine, 2, OUTLINE, 17),
        stay(K::Other, 4),
    ],
    // 5: comments after the feature header
    &[
        to(K::Eof, 2, &[], END),
        stay(K::Comment, 5),
        to(K::BackgroundLine, 1, BACKGROUND, 6),
        to(K::TagLine, 1, DEFINITION_TAGS, 11),
        to(K::ScenarioLine, 1, SCENARIO, 12),
        to(K::ScenarioOutlineLine, 1, OUTLINE, 17),
        stay(K::Empty, 5),
    ],
    // 6: background line
    &[
        to(K::Eof, 2, &[], END),
        stay(K::Empty, 6),
        stay(K::Comment, 8),
        to(K::StepLine, 0, STEP, 9),
        to(K::TagLine, 1, DEFINITION_TAGS, 11),
        to(K::ScenarioLine, 1, SCENARIO, 12),
        to(K::ScenarioOutlineLine, 1, OUTLINE, 17),
        to(K::Other, 0, DESCRIPTION, 7),
    ],
    // 7: background description
    &[
        to(K::Eof, 3, &[], END),
        to(K::Comment, 1, &[], 8),
        to(K::StepLine, 1, STEP, 9),
        to(K::TagLine, 2, DEFINITION_TAGS, 11),
        to(K::ScenarioLine, 2, SCENARIO, 12),
        to(K::ScenarioOutlineLine, 2, OUTLINE, 17),
        stay(K::Other, 7),
    ],
    // 8: comments after the background header
    &[
        to(K::Eof, 2, &[], END),
        stay(K::Comment, 8),
        to(K::StepLine, 0, STEP, 9),
        to(K::TagLine, 1, DEFINITION_TAGS, 11),
        to(K::ScenarioLine, 1, SCENARIO, 12),
        to(K::ScenarioOutlineLine, 1, OUTLINE, 17),
        stay(K::Empty, 8),
    ],
    // 9: background step
    &[
        to(K::Eof, 3, &[], END),
        to(K::TableRow, 0, DATA_TABLE, 10),
        to(K::DocStringSeparator, 0, DOC_STRING, 32),
        to(K::StepLine, 1, STEP, 9),
        to(K::TagLine, 2, DEFINITION_TAGS, 11),
        to(K::ScenarioLine, 2, SCENARIO, 12),
        to(K::ScenarioOutlineLine, 2, OUTLINE, 17),
        stay(K::Comment, 9),
        stay(K::Empty, 9),
    ],
    // 10: background step data table
    &[
        to(K::Eof, 4, &[], END),
        stay(K::TableRow, 10),
        to(K::StepLine, 2, STEP, 9),
        to(K::TagLine, 3, DEFINITION_TAGS, 11),
        to(K::ScenarioLine, 3, SCENARIO, 12),
        to(K::ScenarioOutlineLine, 3, OUTLINE, 17),
        stay(K::Comment, 10),
        stay(K::Empty, 10),
    ],
    // 11: scenario definition tags
    &[
        stay(K::TagLine, 11),
        to(K::ScenarioLine, 1, &[R::Scenario], 12),
        to(K::ScenarioOutlineLine, 1, &[R::ScenarioOutline], 17),
        stay(K::Comment, 11),
        stay(K::Empty, 11),
    ],
    // 12: scenario line
    &[
        to(K::Eof, 3, &[], END),
        stay(K::Empty, 12),
        stay(K::Comment, 14),
        to(K::StepLine, 0, STEP, 15),
        to(K::TagLine, 2, DEFINITION_TAGS, 11),
        to(K::ScenarioLine, 2, SCENARIO, 12),
        to(K::ScenarioOutlineLine, 2, OUTLINE, 17),
        to(K::Other, 0, DESCRIPTION, 13),
    ],
    // 13: scenario description
    &[
        to(K::Eof, 4, &[], END),
        to(K::Comment, 1, &[], 14),
        to(K::StepLine, 1, STEP, 15),
        to(K::TagLine, 3, DEFINITION_TAGS, 11),
        to(K::ScenarioLine, 3, SCENARIO, 12),
        to(K::ScenarioOutlineLine, 3, OUTLINE, 17),
        stay(K::Other, 13),
    ],
    // 14: comments after the scenario header
    &[
        to(K::Eof, 3, &[], END),
        stay(K::Comment, 14),
        to(K::StepLine, 0, STEP, 15),
        to(K::TagLine, 2, DEFINITION_TAGS, 11),
        to(K::ScenarioLine, 2, SCENARIO, 12),
        to(K::ScenarioOutlineLine, 2, OUTLINE, 17),
        stay(K::Empty, 14),
    ],
    // 15: scenario step
    &[
        to(K::Eof, 4, &[], END),
        to(K::TableRow, 0, DATA_TABLE, 16),
        to(K::DocStringSeparator, 0, DOC_STRING, 30),
        to(K::StepLine, 1, STEP, 15),
        to(K::TagLine, 3, DEFINITION_TAGS, 11),
        to(K::ScenarioLine, 3, SCENARIO, 12),
        to(K::ScenarioOutlineLine, 3, OUTLINE, 17),
        stay(K::Comment, 15),
        stay(K::Empty, 15),
    ],
    // 16: scenario step data table
    &[
        to(K::Eof, 5, &[], END),
        stay(K::TableRow, 16),
        to(K::StepLine, 2, STEP, 15),
        to(K::TagLine, 4, DEFINITION_TAGS, 11),
        to(K::ScenarioLine, 4, SCENARIO, 12),
        to(K::ScenarioOutlineLine, 4, OUTLINE, 17),
        stay(K::Comment, 16),
        stay(K::Empty, 16),
    ],
    // 17: scenario outline line
    &[
        to(K::Eof, 3, &[], END),
        stay(K::Empty, 17),
        stay(K::Comment, 19),
        to(K::StepLine, 0, STEP, 20),
        peek(K::TagLine, 0, EXAMPLES_TAGS, 22),
        to(K::TagLine, 2, DEFINITION_TAGS, 11),
        to(K::ExamplesLine, 0, EXAMPLES, 23),
        to(K::ScenarioLine, 2, SCENARIO, 12),
        to(K::ScenarioOutlineLine, 2, OUTLINE, 17),
        to(K::Other, 0, DESCRIPTION, 18),
    ],
    // 18: scenario outline description
    &[
        to(K::Eof, 4, &[], END),
        to(K::Comment, 1, &[], 19),
        to(K::StepLine, 1, STEP, 20),
        peek(K::TagLine, 1, EXAMPLES_TAGS, 22),
        to(K::TagLine, 3, DEFINITION_TAGS, 11),
        to(K::ExamplesLine, 1, EXAMPLES, 23),
        to(K::ScenarioLine, 3, SCENARIO, 12),
        to(K::ScenarioOutlineLine, 3, OUTLINE, 17),
        stay(K::Other, 18),
    ],
    // 19: comments after the scenario outline header
    &[
        to(K::Eof, 3, &[], END),
        stay(K::Comment, 19),
        to(K::StepLine, 0, STEP, 20),
        peek(K::TagLine, 0, EXAMPLES_TAGS, 22),
        to(K::TagLine, 2, DEFINITION_TAGS, 11),
        to(K::ExamplesLine, 0, EXAMPLES, 23),
        to(K::ScenarioLine, 2, SCENARIO, 12),
        to(K::ScenarioOutlineLine, 2, OUTLINE, 17),
        stay(K::Empty, 19),
    ],
    // 20: scenario outline step
    &[
        to(K::Eof, 4, &[], END),
        to(K::TableRow, 0, DATA_TABLE, 21),
        to(K::DocStringSeparator, 0, DOC_STRING, 28),
        to(K::StepLine, 1, STEP, 20),
        peek(K::TagLine, 1, EXAMPLES_TAGS, 22),
        to(K::TagLine, 3, DEFINITION_TAGS, 11),
        to(K::ExamplesLine, 1, EXAMPLES, 23),
        to(K::ScenarioLine, 3, SCENARIO, 12),
        to(K::ScenarioOutlineLine, 3, OUTLINE, 17),
        stay(K::Comment, 20),
        stay(K::Empty, 20),
    ],
    // 21: scenario outline step data table
    &[
        to(K::Eof, 5, &[], END),
        stay(K::TableRow, 21),
        to(K::StepLine, 2, STEP, 20),
        peek(K::TagLine, 2, EXAMPLES_TAGS, 22),
        to(K::TagLine, 4, DEFINITION_TAGS, 11),
        to(K::ExamplesLine, 2, EXAMPLES, 23),
        to(K::ScenarioLine, 4, SCENARIO, 12),
        to(K::ScenarioOutlineLine, 4, OUTLINE, 17),
        stay(K::Comment, 21),
        stay(K::Empty, 21),
    ],
    // 22: examples tags
    &[
        stay(K::TagLine, 22),
        to(K::ExamplesLine, 1, &[R::Examples], 23),
        stay(K::Comment, 22),
        stay(K::Empty, 22),
    ],
    // 23: examples line
    &[
        to(K::Eof, 5, &[], END),
        stay(K::Empty, 23),
        stay(K::Comment, 25),
        to(K::TableRow, 0, EXAMPLES_TABLE, 26),
        peek(K::TagLine, 2, EXAMPLES_TAGS, 22),
        to(K::TagLine, 4, DEFINITION_TAGS, 11),
        to(K::ExamplesLine, 2, EXAMPLES, 23),
        to(K::ScenarioLine, 4, SCENARIO, 12),
        to(K::ScenarioOutlineLine, 4, OUTLINE, 17),
        to(K::Other, 0, DESCRIPTION, 24),
    ],
    // 24: examples description
    &[
        to(K::Eof, 6, &[], END),
        to(K::Comment, 1, &[], 25),
        to(K::TableRow, 1, EXAMPLES_TABLE, 26),
        peek(K::TagLine, 3, EXAMPLES_TAGS, 22),
        to(K::TagLine, 5, DEFINITION_TAGS, 11),
        to(K::ExamplesLine, 3, EXAMPLES, 23),
        to(K::ScenarioLine, 5, SCENARIO, 12),
        to(K::ScenarioOutlineLine, 5, OUTLINE, 17),
        stay(K::Other, 24),
    ],
    // 25: comments after the examples header
    &[
        to(K::Eof, 5, &[], END),
        stay(K::Comment, 25),
        to(K::TableRow, 0, EXAMPLES_TABLE, 26),
        peek(K::TagLine, 2, EXAMPLES_TAGS, 22),
        to(K::TagLine, 4, DEFINITION_TAGS, 11),
        to(K::ExamplesLine, 2, EXAMPLES, 23),
        to(K::ScenarioLine, 4, SCENARIO, 12),
        to(K::ScenarioOutlineLine, 4, OUTLINE, 17),
        stay(K::Empty, 25),
    ],
    // 26: examples table
    &[
        to(K::Eof, 6, &[], END),
        stay(K::TableRow, 26),
        peek(K::TagLine, 3, EXAMPLES_TAGS, 22),
        to(K::TagLine, 5, DEFINITION_TAGS, 11),
        to(K::ExamplesLine, 3, EXAMPLES, 23),
        to(K::ScenarioLine, 5, SCENARIO, 12),
        to(K::ScenarioOutlineLine, 5, OUTLINE, 17),
        stay(K::Comment, 26),
        stay(K::Empty, 26),
    ],
    // 27: end of input accepted
    &[],
    // 28: scenario outline step doc string
    &[stay(K::DocStringSeparator, 29), stay(K::Other, 28)],
    // 29: after a scenario outline step doc string
    &[
        to(K::Eof, 5, &[], END),
        to(K::StepLine, 2, STEP, 20),
        peek(K::TagLine, 2, EXAMPLES_TAGS, 22),
        to(K::TagLine, 4, DEFINITION_TAGS, 11),
        to(K::ExamplesLine, 2, EXAMPLES, 23),
        to(K::ScenarioLine, 4, SCENARIO, 12),
        to(K::ScenarioOutlineLine, 4, OUTLINE, 17),
        stay(K::Comment, 29),
        stay(K::Empty, 29),
    ],
    // 30: scenario step doc string
    &[stay(K::DocStringSeparator, 31), stay(K::Other, 30)],
    // 31: after a scenario step doc string
    &[
        to(K::Eof, 5, &[], END),
        to(K::StepLine, 2, STEP, 15),
        to(K::TagLine, 4, DEFINITION_TAGS, 11),
        to(K::ScenarioLine, 4, SCENARIO, 12),
        to(K::ScenarioOutlineLine, 4, OUTLINE, 17),
        stay(K::Comment, 31),
        stay(K::Empty, 31),
    ],
    // 32: background step doc string
    &[stay(K::DocStringSeparator, 33), stay(K::Other, 32)],
    // 33: after a background step doc string
    &[
        to(K::Eof, 4, &[], END),
        to(K::StepLine, 2, STEP, 9),
        to(K::TagLine, 3, DEFINITION_TAGS, 11),
        to(K::ScenarioLine, 3, SCENARIO, 12),
        to(K::ScenarioOutlineLine, 3, OUTLINE, 17),
        stay(K::Comment, 33),
        stay(K::Empty, 33),
    ],
];

/// Token kinds a state accepts, in table order without repeats.
#[must_use]
pub fn expected(state: usize) -> Vec<TokenKind> {
    let mut kinds: Vec<TokenKind> = Vec::new();
    for transition in STATES.get(state).copied().unwrap_or_default() {
        if !kinds.contains(&transition.kind) {
            kinds.push(transition.kind);
        }
    }
    kinds
}
