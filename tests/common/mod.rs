#![allow(dead_code)]

use gherkin_parser_rs::{Error, Feature, ParseError, ParseErrors, parse_str};

/// Parse `input` and return its feature, failing loudly otherwise.
pub fn feature(input: &str) -> Feature {
    parse_str(input)
        .unwrap_or_else(|e| panic!("failed to parse:\n{input}\n--- error ---\n{e}"))
        .feature
        .unwrap_or_else(|| panic!("no feature in:\n{input}"))
}

/// Parse `input`, expecting a composite syntax failure.
pub fn parse_errors(input: &str) -> Vec<ParseError> {
    match parse_str(input) {
        Err(Error::Parse(ParseErrors { errors })) => errors,
        Err(other) => panic!("expected parse errors, got {other}"),
        Ok(doc) => panic!("expected parse errors, got {doc:#?}"),
    }
}

/// `(line, column)` of every error.
pub fn positions(errors: &[ParseError]) -> Vec<(usize, usize)> {
    errors
        .iter()
        .map(|e| (e.location.line, e.location.column))
        .collect()
}

pub const FULL_FEATURE: &str = "\
# leading comment
@billing @slow
Feature: Invoices
  Invoices are generated monthly.
  They can be downloaded.

  Background:
    Given a customer account

  @smoke
  Scenario: Download an invoice
    When I download invoice \"42\"
    Then I receive a PDF
      \"\"\"application/pdf
      %PDF-1.4
      \"\"\"

  Scenario Outline: Totals
    Given an invoice with <lines> lines
    Then the total is <total>

    @eur
    Examples: Euro
      | lines | total |
      | 1     | 10    |
      | 2     | 20    |

    Examples: Empty
";
