//! Error types for the lead-sheet parser.

use std::fmt;

use thiserror::Error;

/// An error raised while lexing or parsing a lead sheet.
///
/// Every error is terminal for the parse that produced it. `context` holds
/// the rendered source window with a caret under the failure point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} error: {message}\n{context}")]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub line: usize,
    pub col: usize,
    /// Name of the source being parsed, when one was given.
    pub source_name: Option<String>,
    pub context: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed delimiter pair (fences, quotes, annotation markers).
    Lexical,
    /// Token did not match the grammar at the current position.
    Syntax,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Lexical => f.write_str("lexical"),
            ErrorKind::Syntax => f.write_str("syntax"),
        }
    }
}

impl ParseError {
    pub fn lexical(
        message: impl Into<String>,
        line: usize,
        col: usize,
        context: impl Into<String>,
    ) -> Self {
        Self {
            kind: ErrorKind::Lexical,
            message: message.into(),
            line,
            col,
            source_name: None,
            context: context.into(),
        }
    }

    pub fn syntax(
        message: impl Into<String>,
        line: usize,
        col: usize,
        context: impl Into<String>,
    ) -> Self {
        Self {
            kind: ErrorKind::Syntax,
            message: message.into(),
            line,
            col,
            source_name: None,
            context: context.into(),
        }
    }

    pub fn with_source_name(mut self, name: Option<&str>) -> Self {
        self.source_name = name.map(str::to_string);
        self
    }

    pub fn is_lexical(&self) -> bool {
        self.kind == ErrorKind::Lexical
    }

    pub fn is_syntax(&self) -> bool {
        self.kind == ErrorKind::Syntax
    }
}

/// Message for an unterminated or malformed delimiter.
pub(crate) fn unexpected_string(want: &str, got: &str) -> String {
    format!("unexpected string Want: {want} Got: {got}")
}

/// Message for a malformed front matter fence.
pub(crate) fn invalid_frontmatter(want: &str, got: &str) -> String {
    format!("invalid frontmatter Want: {want} Got: {got}")
}
