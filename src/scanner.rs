use std::io::{self, BufRead};

use crate::line::GherkinLine;
use crate::token::Token;

const BOM: char = '\u{feff}';

/// Error reading the underlying stream.
#[derive(Debug, thiserror::Error)]
#[error("failed to read line {line}")]
pub struct ScanError {
    /// Line that was being read when the stream failed.
    pub line: usize,
    #[source]
    pub source: io::Error,
}

/// Turns a buffered stream into one unclassified token per physical line.
///
/// `\n` and `\r\n` terminators are stripped and a UTF-8 byte order mark on
/// the first line is dropped. Once the stream is exhausted every call
/// returns an end-of-input token carrying the line number past the last
/// line.
pub struct Scanner<R> {
    reader: R,
    line: usize,
    done: bool,
    buf: String,
}

impl<R: BufRead> Scanner<R> {
    #[must_use]
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            done: false,
            buf: String::new(),
        }
    }

    /// Read the next line.
    ///
    /// # Errors
    ///
    /// Returns `ScanError` when the underlying reader fails, including on
    /// invalid UTF-8.
    pub fn read(&mut self) -> Result<Token, ScanError> {
        if self.done {
            return Ok(Token::eof(self.line + 1));
        }

        self.buf.clear();
        let read = self
            .reader
            .read_line(&mut self.buf)
            .map_err(|source| ScanError {
                line: self.line + 1,
                source,
            })?;
        if read == 0 {
            self.done = true;
            return Ok(Token::eof(self.line + 1));
        }

        self.line += 1;
        let mut text = self.buf.as_str();
        if let Some(stripped) = text.strip_suffix('\n') {
            text = stripped.strip_suffix('\r').unwrap_or(stripped);
        }
        if self.line == 1 {
            text = text.strip_prefix(BOM).unwrap_or(text);
        }

        Ok(Token::from_line(GherkinLine::new(text), self.line))
    }

    /// Number of lines read so far.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }
}

impl<'a> Scanner<&'a [u8]> {
    /// Scanner over an in-memory document.
    #[must_use]
    pub fn from_text(input: &'a str) -> Self {
        Self::new(input.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(input: &str) -> Vec<(usize, String)> {
        let mut scanner = Scanner::from_text(input);
        let mut out = Vec::new();
        loop {
            let token = scanner.read().unwrap();
            if token.is_eof() {
                break;
            }
            let text = token.line().map(|l| l.raw().to_string()).unwrap_or_default();
            out.push((token.location.line, text));
        }
        out
    }

    #[test]
    fn numbers_lines_from_one() {
        assert_eq!(
            lines("a\nb\n"),
            vec![(1, "a".to_string()), (2, "b".to_string())]
        );
    }

    #[test]
    fn strips_crlf() {
        assert_eq!(
            lines("a\r\nb\r\n"),
            vec![(1, "a".to_string()), (2, "b".to_string())]
        );
    }

    #[test]
    fn keeps_last_line_without_newline() {
        assert_eq!(lines("a\nb").len(), 2);
    }

    #[test]
    fn drops_byte_order_mark() {
        assert_eq!(lines("\u{feff}Feature: x"), vec![(1, "Feature: x".to_string())]);
    }

    #[test]
    fn eof_repeats_with_stable_line() {
        let mut scanner = Scanner::from_text("only\n");
        assert!(!scanner.read().unwrap().is_eof());
        let first = scanner.read().unwrap();
        let second = scanner.read().unwrap();
        assert!(first.is_eof() && second.is_eof());
        assert_eq!(first.location.line, 2);
        assert_eq!(second.location.line, 2);
        assert_eq!(scanner.line(), 1);
    }

    #[test]
    fn empty_input_is_immediately_eof() {
        let mut scanner = Scanner::from_text("");
        assert!(scanner.read().unwrap().is_eof());
    }

    #[test]
    fn invalid_utf8_is_a_scan_error() {
        let bytes: &[u8] = b"ok\n\xff\xfe\n";
        let mut scanner = Scanner::new(bytes);
        assert!(scanner.read().is_ok());
        let err = scanner.read().unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.source.kind(), io::ErrorKind::InvalidData);
    }
}
