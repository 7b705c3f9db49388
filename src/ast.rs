use crate::parser::{ParseError, ParseErrorKind};
use crate::token::Location;

/// Parsed feature document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GherkinDocument {
    pub feature: Option<Feature>,
}

/// `Feature:` block with its background and scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub location: Location,
    pub comments: Vec<Comment>,
    pub tags: Vec<Tag>,
    pub keyword: String,
    pub name: String,
    pub description: Option<String>,
    /// Background first when present, then scenarios in source order.
    pub children: Vec<ScenarioDefinition>,
    /// Normalized tag of the dialect the feature was written in.
    pub language: String,
}

impl Feature {
    #[must_use]
    pub fn background(&self) -> Option<&Background> {
        self.children.iter().find_map(|child| match child {
            ScenarioDefinition::Background(background) => Some(background),
            ScenarioDefinition::Scenario(_) | ScenarioDefinition::ScenarioOutline(_) => None,
        })
    }

    /// Scenarios and outlines, skipping the background.
    pub fn scenarios(&self) -> impl Iterator<Item = &ScenarioDefinition> {
        self.children
            .iter()
            .filter(|child| !matches!(child, ScenarioDefinition::Background(_)))
    }
}

/// One child of a feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioDefinition {
    Background(Background),
    Scenario(Scenario),
    ScenarioOutline(ScenarioOutline),
}

impl ScenarioDefinition {
    #[must_use]
    pub const fn location(&self) -> Location {
        match self {
            Self::Background(b) => b.location,
            Self::Scenario(s) => s.location,
            Self::ScenarioOutline(o) => o.location,
        }
    }

    #[must_use]
    pub fn keyword(&self) -> &str {
        match self {
            Self::Background(b) => &b.keyword,
            Self::Scenario(s) => &s.keyword,
            Self::ScenarioOutline(o) => &o.keyword,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Background(b) => &b.name,
            Self::Scenario(s) => &s.name,
            Self::ScenarioOutline(o) => &o.name,
        }
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Background(b) => b.description.as_deref(),
            Self::Scenario(s) => s.description.as_deref(),
            Self::ScenarioOutline(o) => o.description.as_deref(),
        }
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        match self {
            Self::Background(b) => &b.steps,
            Self::Scenario(s) => &s.steps,
            Self::ScenarioOutline(o) => &o.steps,
        }
    }

    /// Tags above the definition; a background never has any.
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        match self {
            Self::Background(_) => &[],
            Self::Scenario(s) => &s.tags,
            Self::ScenarioOutline(o) => &o.tags,
        }
    }

    #[must_use]
    pub fn comments(&self) -> &[Comment] {
        match self {
            Self::Background(b) => &b.comments,
            Self::Scenario(s) => &s.comments,
            Self::ScenarioOutline(o) => &o.comments,
        }
    }
}

/// Steps shared by every scenario of a feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Background {
    pub location: Location,
    pub comments: Vec<Comment>,
    pub keyword: String,
    pub name: String,
    pub description: Option<String>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub location: Location,
    pub comments: Vec<Comment>,
    pub tags: Vec<Tag>,
    pub keyword: String,
    pub name: String,
    pub description: Option<String>,
    pub steps: Vec<Step>,
}

/// Templated scenario expanded once per examples row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioOutline {
    pub location: Location,
    pub comments: Vec<Comment>,
    pub tags: Vec<Tag>,
    pub keyword: String,
    pub name: String,
    pub description: Option<String>,
    pub steps: Vec<Step>,
    pub examples: Vec<Examples>,
}

/// `Examples:` block of an outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Examples {
    pub location: Location,
    pub comments: Vec<Comment>,
    pub tags: Vec<Tag>,
    pub keyword: String,
    pub name: String,
    pub description: Option<String>,
    /// First table row; `None` when the block has no table.
    pub header: Option<TableRow>,
    pub body: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub location: Location,
    pub comments: Vec<Comment>,
    /// Keyword as written, including any trailing space (`"Given "`).
    pub keyword: String,
    pub text: String,
    pub argument: Option<StepArgument>,
}

/// Block attached to a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepArgument {
    DataTable(DataTable),
    DocString(DocString),
}

/// Table with the same number of cells in every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTable {
    location: Location,
    rows: Vec<TableRow>,
}

impl DataTable {
    /// Build a table located at its first row.
    ///
    /// # Errors
    ///
    /// Returns an `InconsistentCellCount` error located at the first row
    /// whose cell count differs from the first row's.
    pub fn try_new(rows: Vec<TableRow>) -> Result<Self, ParseError> {
        ensure_uniform_cell_count(&rows)?;
        let location = rows.first().map(|row| row.location).unwrap_or_default();
        Ok(Self { location, rows })
    }

    #[must_use]
    pub const fn location(&self) -> Location {
        self.location
    }

    #[must_use]
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }
}

/// Check that every row has as many cells as the first.
///
/// # Errors
///
/// Returns an `InconsistentCellCount` error at the first offending row.
pub fn ensure_uniform_cell_count(rows: &[TableRow]) -> Result<(), ParseError> {
    let Some(expected) = rows.first().map(|row| row.cells.len()) else {
        return Ok(());
    };
    match rows.iter().find(|row| row.cells.len() != expected) {
        Some(row) => Err(ParseError {
            kind: ParseErrorKind::InconsistentCellCount {
                expected,
                found: row.cells.len(),
            },
            location: row.location,
        }),
        None => Ok(()),
    }
}

/// Literal block between `"""` or `` ``` `` separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocString {
    /// Location of the opening separator.
    pub location: Location,
    /// Text after the opening separator, e.g. `json`.
    pub content_type: Option<String>,
    /// Content lines joined with `\n`.
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub location: Location,
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCell {
    pub location: Location,
    pub value: String,
}

/// `@name` tag, stored with its `@`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub location: Location,
    pub name: String,
}

/// Comment line, stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub location: Location,
    pub text: String,
}
