//! Token types for the lead-sheet lexer.

use std::fmt;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub line: usize,
    pub col: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            line,
            col,
        }
    }

    /// Whether this is a bar line token with exactly this spelling.
    pub fn is_bar(&self, spelling: &str) -> bool {
        self.kind == TokenKind::Bar && self.value == spelling
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.value.replace('\n', "\\n"))
    }
}

/// The kind of token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    FrontMatter,
    /// `# name`
    Header,
    /// `#- name`
    HeaderBreak,
    /// `|`, `||`, `||:` or `:||`
    Bar,
    /// End of a musical line.
    Return,
    /// `"text"`
    BarNote,
    /// `!text!`
    Annotation,
    /// `` `abc` ``
    Backtick,
    /// ```` ``` ... ``` ````
    BacktickMultiline,
    Chord,
    Eof,
}

impl TokenKind {
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::FrontMatter => "FrontMatter",
            TokenKind::Header => "Header",
            TokenKind::HeaderBreak => "HeaderBreak",
            TokenKind::Bar => "Bar",
            TokenKind::Return => "Return",
            TokenKind::BarNote => "BarNote",
            TokenKind::Annotation => "Annotation",
            TokenKind::Backtick => "Backtick",
            TokenKind::BacktickMultiline => "BacktickMultiline",
            TokenKind::Chord => "Chord",
            TokenKind::Eof => "Eof",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
