//! Token reader shared by the scene, model and material parsers.
//!
//! The loaders in this crate report failures through [`TokenError`] and never
//! consult the cursor's sticky state. [`LineCursor::fail`] and
//! [`LineCursor::at_end`] are for callers driving a cursor by hand over their
//! own directive formats, who can check the flag once after a run of reads.

use std::path::Path;
use std::str::FromStr;

use crate::error::LoadError;

/// A token that could not be read as the value a directive asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenError {
    pub line: usize,
    pub expected: &'static str,
    pub found: String,
}

impl TokenError {
    /// Attaches the file the token came from.
    pub fn at(self, path: &Path) -> LoadError {
        LoadError::MalformedToken {
            path: path.to_path_buf(),
            line: self.line,
            expected: self.expected,
            found: self.found,
        }
    }
}

/// Whitespace-delimited reader over an in-memory text source.
///
/// Tokens never span lines. Reads that cross line boundaries
/// ([`next_token`](Self::next_token), [`peek_char`](Self::peek_char)) are
/// used to find the next directive; the `*_arg` readers stay on the current
/// line so that a directive missing its operands fails where it is instead
/// of consuming the next record.
#[derive(Debug, Clone)]
pub struct LineCursor<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    failed: bool,
    last_token: &'a str,
}

impl<'a> LineCursor<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            failed: false,
            last_token: "",
        }
    }

    /// Returns the next token, skipping any whitespace including newlines.
    pub fn next_token(&mut self) -> Option<&'a str> {
        self.skip_whitespace(true);
        self.take_token()
    }

    /// Returns the next token on the current line, if any.
    pub fn next_arg(&mut self) -> Option<&'a str> {
        self.skip_whitespace(false);
        if self.rest().starts_with('\n') {
            return None;
        }
        self.take_token()
    }

    /// Parses the next token on the current line.
    ///
    /// A missing or unparseable token puts the cursor in the fail state.
    pub fn parse_arg<T: FromStr>(&mut self, expected: &'static str) -> Result<T, TokenError> {
        match self.next_arg() {
            Some(token) => token.parse().map_err(|_| self.mark_failed(expected, token)),
            None => Err(self.mark_failed(expected, "end of line")),
        }
    }

    /// Parses `N` floats from the current line.
    pub fn parse_floats<const N: usize>(
        &mut self,
        expected: &'static str,
    ) -> Result<[f32; N], TokenError> {
        let mut values = [0.0; N];
        for value in &mut values {
            *value = self.parse_arg(expected)?;
        }
        Ok(values)
    }

    /// Advances past the next occurrence of `delimiter`, or to the end of input.
    pub fn skip_past(&mut self, delimiter: char) {
        let rest = self.rest();
        let len = rest
            .find(delimiter)
            .map(|at| at + delimiter.len_utf8())
            .unwrap_or(rest.len());
        self.advance(len);
    }

    /// Advances to the start of the next line.
    pub fn skip_line(&mut self) {
        self.skip_past('\n');
    }

    /// Advances to the start of the next line, stopping early in front of `stop`.
    pub fn skip_line_until(&mut self, stop: char) {
        let rest = self.rest();
        match rest.find(|c: char| c == '\n' || c == stop) {
            Some(at) if rest[at..].starts_with('\n') => self.advance(at + 1),
            Some(at) => self.advance(at),
            None => self.advance(rest.len()),
        }
    }

    /// Reads raw text up to `delimiter` and consumes the delimiter.
    ///
    /// Returns `None` and enters the fail state when the delimiter never appears.
    pub fn read_until(&mut self, delimiter: char) -> Option<&'a str> {
        let rest = self.rest();
        match rest.find(delimiter) {
            Some(at) => {
                let text = &rest[..at];
                self.advance(at + delimiter.len_utf8());
                self.last_token = text;
                Some(text)
            }
            None => {
                self.failed = true;
                self.advance(rest.len());
                None
            }
        }
    }

    /// Peeks the next non-whitespace character without consuming it.
    pub fn peek_char(&mut self) -> Option<char> {
        self.skip_whitespace(true);
        self.rest().chars().next()
    }

    /// Consumes a single character.
    pub fn bump(&mut self) -> Option<char> {
        let c = self.rest().chars().next()?;
        self.advance(c.len_utf8());
        Some(c)
    }

    /// True when nothing but whitespace remains.
    pub fn at_end(&self) -> bool {
        self.rest().trim_start().is_empty()
    }

    /// True once a read has failed. The flag is never cleared.
    pub fn fail(&self) -> bool {
        self.failed
    }

    /// One-based line number of the cursor position.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The most recently read token.
    pub fn last_token(&self) -> &'a str {
        self.last_token
    }

    fn mark_failed(&mut self, expected: &'static str, found: &str) -> TokenError {
        self.failed = true;
        TokenError {
            line: self.line,
            expected,
            found: found.to_string(),
        }
    }

    fn rest(&self) -> &'a str {
        let src = self.src;
        &src[self.pos..]
    }

    fn take_token(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        if rest.is_empty() {
            return None;
        }
        let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
        self.pos += len;
        self.last_token = &rest[..len];
        Some(self.last_token)
    }

    fn skip_whitespace(&mut self, cross_lines: bool) {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !c.is_whitespace() || (!cross_lines && c == '\n'))
            .unwrap_or(rest.len());
        self.advance(len);
    }

    fn advance(&mut self, len: usize) {
        let skipped = &self.src[self.pos..self.pos + len];
        self.line += skipped.bytes().filter(|b| *b == b'\n').count();
        self.pos += len;
    }
}
