//! Folds matched tokens into document nodes as grammar rules close.

use std::mem;

use crate::ast::{
    self, Background, Comment, DataTable, DocString, Examples, Feature, GherkinDocument, Scenario,
    ScenarioDefinition, ScenarioOutline, Step, StepArgument, TableCell, TableRow, Tag,
};
use crate::grammar::RuleKind;
use crate::parser::ParseError;
use crate::token::{Location, Token, TokenKind};

/// Child of an open rule scope.
#[derive(Debug)]
enum Node {
    /// Matched line and the comments that preceded it.
    Token(Token, Vec<Comment>),
    /// Closed rule kept as-is for its parent to take apart.
    Rule(Scope),
    Description(String),
    Step(Step),
    DataTable(DataTable),
    DocString(DocString),
    Background(Background),
    ScenarioDefinition(ScenarioDefinition),
    Examples(Examples),
    ExamplesTable(Vec<TableRow>),
    Feature(Feature),
    Document(GherkinDocument),
}

#[derive(Debug)]
struct Scope {
    rule: RuleKind,
    children: Vec<Node>,
}

impl Scope {
    const fn new(rule: RuleKind) -> Self {
        Self {
            rule,
            children: Vec::new(),
        }
    }

    fn take_token(&mut self, kind: TokenKind) -> Option<(Token, Vec<Comment>)> {
        let index = self
            .children
            .iter()
            .position(|node| matches!(node, Node::Token(token, _) if token.kind == Some(kind)))?;
        match self.children.remove(index) {
            Node::Token(token, comments) => Some((token, comments)),
            _ => None,
        }
    }

    fn tokens(&self, kind: TokenKind) -> impl Iterator<Item = &Token> {
        self.children.iter().filter_map(move |node| match node {
            Node::Token(token, _) if token.kind == Some(kind) => Some(token),
            _ => None,
        })
    }

    fn take_rule(&mut self, rule: RuleKind) -> Option<Self> {
        let index = self
            .children
            .iter()
            .position(|node| matches!(node, Node::Rule(scope) if scope.rule == rule))?;
        match self.children.remove(index) {
            Node::Rule(scope) => Some(scope),
            _ => None,
        }
    }

    fn description(&self) -> Option<String> {
        self.children.iter().find_map(|node| match node {
            Node::Description(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            }
            _ => None,
        })
    }

    fn tags(&mut self) -> Vec<Tag> {
        let Some(scope) = self.take_rule(RuleKind::Tags) else {
            return Vec::new();
        };
        scope
            .tokens(TokenKind::TagLine)
            .flat_map(|token| {
                token.items.iter().map(move |item| Tag {
                    location: Location::new(token.location.line, item.column),
                    name: item.text.clone(),
                })
            })
            .collect()
    }

    fn steps(&mut self) -> Vec<Step> {
        self.drain_nodes(|node| match node {
            Node::Step(step) => Ok(step),
            other => Err(other),
        })
    }

    fn drain_nodes<T>(&mut self, mut pick: impl FnMut(Node) -> Result<T, Node>) -> Vec<T> {
        let mut picked = Vec::new();
        let mut kept = Vec::new();
        for node in mem::take(&mut self.children) {
            match pick(node) {
                Ok(value) => picked.push(value),
                Err(node) => kept.push(node),
            }
        }
        self.children = kept;
        picked
    }
}

/// Stack of open rule scopes, parallel to the parser's rule stack.
///
/// Comment lines are held back and attached to the next Feature,
/// Background, Scenario, Scenario Outline, Examples or Step line.
#[derive(Debug)]
pub struct AstBuilder {
    stack: Vec<Scope>,
    pending_comments: Vec<Comment>,
}

impl AstBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stack: vec![Scope::new(RuleKind::None)],
            pending_comments: Vec::new(),
        }
    }

    /// Drop all scopes and pending comments.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.stack.push(Scope::new(RuleKind::None));
        self.pending_comments.clear();
    }

    pub fn start_rule(&mut self, rule: RuleKind) {
        log::trace!("start rule {rule:?}");
        self.stack.push(Scope::new(rule));
    }

    /// Close the innermost rule and hand its node to the parent scope.
    ///
    /// # Errors
    ///
    /// Returns `InconsistentCellCount` when a closing table has ragged
    /// rows; nothing is added to the parent in that case.
    pub fn end_rule(&mut self) -> Result<(), ParseError> {
        if self.stack.len() < 2 {
            return Ok(());
        }
        let Some(scope) = self.stack.pop() else {
            return Ok(());
        };
        log::trace!("end rule {:?}", scope.rule);
        let node = transform(scope)?;
        if let (Some(node), Some(parent)) = (node, self.stack.last_mut()) {
            parent.children.push(node);
        }
        Ok(())
    }

    /// Add a matched token to the innermost scope.
    pub fn build(&mut self, token: Token) {
        let Some(kind) = token.kind else {
            return;
        };
        let comments = match kind {
            TokenKind::Comment => {
                self.pending_comments.push(Comment {
                    location: token.location,
                    text: token.text_or_empty().to_string(),
                });
                return;
            }
            TokenKind::FeatureLine
            | TokenKind::BackgroundLine
            | TokenKind::ScenarioLine
            | TokenKind::ScenarioOutlineLine
            | TokenKind::ExamplesLine
            | TokenKind::StepLine => mem::take(&mut self.pending_comments),
            _ => Vec::new(),
        };
        if let Some(scope) = self.stack.last_mut() {
            scope.children.push(Node::Token(token, comments));
        }
    }

    /// Finished document, once the document rule has closed.
    pub fn result(&mut self) -> Option<GherkinDocument> {
        let root = self.stack.first_mut()?;
        root.children.iter_mut().rev().find_map(|node| match node {
            Node::Document(document) => Some(mem::take(document)),
            _ => None,
        })
    }
}

impl Default for AstBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn transform(mut scope: Scope) -> Result<Option<Node>, ParseError> {
    let node = match scope.rule {
        RuleKind::Step => build_step(scope).map(Node::Step),
        RuleKind::DocString => build_doc_string(&scope).map(Node::DocString),
        RuleKind::DataTable => Some(Node::DataTable(DataTable::try_new(table_rows(&scope))?)),
        RuleKind::ExamplesTable => {
            let rows = table_rows(&scope);
            ast::ensure_uniform_cell_count(&rows)?;
            Some(Node::ExamplesTable(rows))
        }
        RuleKind::Description => Some(Node::Description(description_text(&scope))),
        RuleKind::Background => build_background(&mut scope).map(Node::Background),
        RuleKind::ScenarioDefinition => {
            build_scenario_definition(&mut scope).map(Node::ScenarioDefinition)
        }
        RuleKind::ExamplesDefinition => build_examples(&mut scope).map(Node::Examples),
        RuleKind::Feature => build_feature(&mut scope).map(Node::Feature),
        RuleKind::GherkinDocument => {
            let feature = scope.children.into_iter().find_map(|node| match node {
                Node::Feature(feature) => Some(feature),
                _ => None,
            });
            Some(Node::Document(GherkinDocument { feature }))
        }
        RuleKind::None
        | RuleKind::FeatureHeader
        | RuleKind::Scenario
        | RuleKind::ScenarioOutline
        | RuleKind::Examples
        | RuleKind::Tags => Some(Node::Rule(scope)),
    };
    Ok(node)
}

fn build_step(mut scope: Scope) -> Option<Step> {
    let (token, comments) = scope.take_token(TokenKind::StepLine)?;
    let argument = scope.children.into_iter().find_map(|node| match node {
        Node::DataTable(table) => Some(StepArgument::DataTable(table)),
        Node::DocString(doc) => Some(StepArgument::DocString(doc)),
        _ => None,
    });
    Some(Step {
        location: token.location,
        comments,
        keyword: token.keyword.unwrap_or_default(),
        text: token.text.unwrap_or_default(),
        argument,
    })
}

fn build_doc_string(scope: &Scope) -> Option<DocString> {
    let opening = scope.tokens(TokenKind::DocStringSeparator).next()?;
    let content_type = opening
        .text
        .as_deref()
        .filter(|content_type| !content_type.is_empty())
        .map(str::to_string);
    let content = scope
        .tokens(TokenKind::Other)
        .map(Token::text_or_empty)
        .collect::<Vec<_>>()
        .join("\n");
    Some(DocString {
        location: opening.location,
        content_type,
        content,
    })
}

fn table_rows(scope: &Scope) -> Vec<TableRow> {
    scope
        .tokens(TokenKind::TableRow)
        .map(|token| TableRow {
            location: token.location,
            cells: token
                .items
                .iter()
                .map(|item| TableCell {
                    location: Location::new(token.location.line, item.column),
                    value: item.text.clone(),
                })
                .collect(),
        })
        .collect()
}

fn description_text(scope: &Scope) -> String {
    let mut lines: Vec<&str> = scope
        .tokens(TokenKind::Other)
        .map(Token::text_or_empty)
        .collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

fn build_background(scope: &mut Scope) -> Option<Background> {
    let (token, comments) = scope.take_token(TokenKind::BackgroundLine)?;
    Some(Background {
        location: token.location,
        comments,
        keyword: token.keyword.unwrap_or_default(),
        name: token.text.unwrap_or_default(),
        description: scope.description(),
        steps: scope.steps(),
    })
}

fn build_scenario_definition(scope: &mut Scope) -> Option<ScenarioDefinition> {
    let tags = scope.tags();

    if let Some(mut inner) = scope.take_rule(RuleKind::Scenario) {
        let (token, comments) = inner.take_token(TokenKind::ScenarioLine)?;
        return Some(ScenarioDefinition::Scenario(Scenario {
            location: token.location,
            comments,
            tags,
            keyword: token.keyword.unwrap_or_default(),
            name: token.text.unwrap_or_default(),
            description: inner.description(),
            steps: inner.steps(),
        }));
    }

    let mut inner = scope.take_rule(RuleKind::ScenarioOutline)?;
    let (token, comments) = inner.take_token(TokenKind::ScenarioOutlineLine)?;
    let examples = inner.drain_nodes(|node| match node {
        Node::Examples(examples) => Ok(examples),
        other => Err(other),
    });
    Some(ScenarioDefinition::ScenarioOutline(ScenarioOutline {
        location: token.location,
        comments,
        tags,
        keyword: token.keyword.unwrap_or_default(),
        name: token.text.unwrap_or_default(),
        description: inner.description(),
        steps: inner.steps(),
        examples,
    }))
}

fn build_examples(scope: &mut Scope) -> Option<Examples> {
    let tags = scope.tags();
    let mut inner = scope.take_rule(RuleKind::Examples)?;
    let (token, comments) = inner.take_token(TokenKind::ExamplesLine)?;
    let mut rows = inner
        .drain_nodes(|node| match node {
            Node::ExamplesTable(rows) => Ok(rows),
            other => Err(other),
        })
        .into_iter()
        .flatten();
    let header = rows.next();
    Some(Examples {
        location: token.location,
        comments,
        tags,
        keyword: token.keyword.unwrap_or_default(),
        name: token.text.unwrap_or_default(),
        description: inner.description(),
        header,
        body: rows.collect(),
    })
}

fn build_feature(scope: &mut Scope) -> Option<Feature> {
    let mut header = scope.take_rule(RuleKind::FeatureHeader)?;
    let tags = header.tags();
    let (token, comments) = header.take_token(TokenKind::FeatureLine)?;
    let language = token.dialect.as_ref()?.language().to_string();
    let children = scope.drain_nodes(|node| match node {
        Node::Background(background) => Ok(ScenarioDefinition::Background(background)),
        Node::ScenarioDefinition(definition) => Ok(definition),
        other => Err(other),
    });
    Some(Feature {
        location: token.location,
        comments,
        tags,
        keyword: token.keyword.unwrap_or_default(),
        name: token.text.unwrap_or_default(),
        description: header.description(),
        children,
        language,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectResolver;
    use crate::line::GherkinLine;
    use crate::matcher::TokenMatcher;
    use crate::parser::ParseErrorKind;
    use std::sync::Arc;

    fn matched(kind: TokenKind, text: &str, line: usize) -> Token {
        let mut matcher = TokenMatcher::new(Arc::new(DialectResolver::default())).unwrap();
        let mut token = Token::from_line(GherkinLine::new(text), line);
        assert!(matcher.matches(kind, &mut token).unwrap());
        token
    }

    #[test]
    fn step_with_data_table() {
        let mut builder = AstBuilder::new();
        builder.start_rule(RuleKind::Step);
        builder.build(matched(TokenKind::StepLine, "Given users", 1));
        builder.start_rule(RuleKind::DataTable);
        builder.build(matched(TokenKind::TableRow, "| a | b |", 2));
        builder.build(matched(TokenKind::TableRow, "| 1 | 2 |", 3));
        builder.end_rule().unwrap();
        builder.end_rule().unwrap();

        let root = &builder.stack[0];
        let Some(Node::Step(step)) = root.children.first() else {
            panic!("expected a step, got {:?}", root.children);
        };
        assert_eq!(step.keyword, "Given ");
        let Some(StepArgument::DataTable(table)) = &step.argument else {
            panic!("expected a data table");
        };
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.location(), Location::new(2, 1));
    }

    #[test]
    fn ragged_table_adds_nothing_to_parent() {
        let mut builder = AstBuilder::new();
        builder.start_rule(RuleKind::DataTable);
        builder.build(matched(TokenKind::TableRow, "| a | b |", 4));
        builder.build(matched(TokenKind::TableRow, "| 1 |", 5));
        let err = builder.end_rule().unwrap_err();
        assert_eq!(err.location, Location::new(5, 1));
        assert!(matches!(
            err.kind,
            ParseErrorKind::InconsistentCellCount { .. }
        ));
        assert!(builder.stack[0].children.is_empty());
    }

    #[test]
    fn comments_attach_to_next_structural_line() {
        let mut builder = AstBuilder::new();
        builder.start_rule(RuleKind::Step);
        builder.build(matched(TokenKind::Comment, "# first", 1));
        builder.build(matched(TokenKind::Comment, "  # second", 2));
        builder.build(matched(TokenKind::StepLine, "When it runs", 3));
        builder.end_rule().unwrap();

        let Some(Node::Step(step)) = builder.stack[0].children.first() else {
            panic!("expected a step");
        };
        let texts: Vec<_> = step.comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["# first", "  # second"]);
        assert!(builder.pending_comments.is_empty());
    }

    #[test]
    fn description_drops_trailing_blank_lines() {
        let mut builder = AstBuilder::new();
        builder.start_rule(RuleKind::Description);
        builder.build(matched(TokenKind::Other, "  first line", 1));
        builder.build(matched(TokenKind::Other, "  second line", 2));
        builder.build(matched(TokenKind::Other, "   ", 3));
        builder.end_rule().unwrap();

        let Some(Node::Description(text)) = builder.stack[0].children.first() else {
            panic!("expected a description");
        };
        assert_eq!(text, "  first line\n  second line");
    }

    #[test]
    fn end_rule_never_pops_root() {
        let mut builder = AstBuilder::new();
        builder.end_rule().unwrap();
        assert_eq!(builder.stack.len(), 1);
        assert!(builder.result().is_none());
    }
}
