//! Recursive-descent parser for lead sheets.
//!
//! Pulls tokens from the [`Lexer`] one at a time with a single token of
//! lookahead. Grammar:
//!
//! ```text
//! Song     := [FrontMatter] Body
//! Body     := Lines (Header Lines)*
//! Line     := BacktickMultiline | Bar* Return
//! Bar      := ("||:" | BarNote)* BarBody [closing bar line]
//! BarBody  := Backtick | Chord+
//! Chord    := [Annotation] Chord
//! ```
//!
//! The parser is fail-fast: the first error aborts the parse.

use std::collections::BTreeMap;

use super::ast::*;
use super::error::ParseError;
use super::front_matter::parse_front_matter;
use super::lexer::Lexer;
use super::token::{Token, TokenKind};
use crate::config::SheetConfig;

const BAR_BODY: &str = "Chord/Annotation/Backtick";

pub struct Parser {
    lexer: Lexer,
    source_name: String,
    fallback_length: String,
    default_length: String,
    next_bar_id: usize,
    next_backtick_id: usize,
    next_multiline_id: usize,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        Self::with_config(source, &SheetConfig::default())
    }

    pub fn with_config(source: &str, config: &SheetConfig) -> Self {
        Self {
            lexer: Lexer::new(source).with_context_width(config.error_context),
            source_name: String::new(),
            fallback_length: config.default_length.clone(),
            default_length: config.default_length.clone(),
            next_bar_id: 0,
            next_backtick_id: 0,
            next_multiline_id: 0,
        }
    }

    /// Tag the source for diagnostics and for fenced blocks' `source_file`.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.lexer = self.lexer.with_name(name.clone());
        self.source_name = name;
        self
    }

    pub fn parse(&mut self) -> Result<Song, ParseError> {
        self.lexer.consume_whitespace_and_newlines();

        let front_matter = if self.peek()?.kind == TokenKind::FrontMatter {
            let tok = self.advance()?;
            parse_front_matter(&tok.value)
        } else {
            BTreeMap::new()
        };

        // Resolved once, before any bar is built.
        self.default_length = match front_matter.get("L") {
            Some(l) if !l.is_empty() => l.clone(),
            _ => self.fallback_length.clone(),
        };

        let sections = self.parse_body()?;
        log::debug!(
            "parsed {} section(s), {} bar(s), {} backtick(s), {} multiline block(s)",
            sections.len(),
            self.next_bar_id,
            self.next_backtick_id,
            self.next_multiline_id
        );

        Ok(Song {
            front_matter,
            sections,
        })
    }

    fn parse_body(&mut self) -> Result<Vec<Section>, ParseError> {
        let mut sections = Vec::new();

        // Content before the first header forms an unnamed section. It is
        // kept when it has lines or when there are no headers at all.
        let leading = Section {
            lines: self.parse_lines()?,
            ..Section::default()
        };
        if !leading.is_empty() || self.peek()?.kind == TokenKind::Eof {
            sections.push(leading);
        }

        loop {
            let tok = self.peek()?;
            match tok.kind {
                TokenKind::Header | TokenKind::HeaderBreak => {
                    self.advance()?;
                    let lines = self.parse_lines()?;
                    sections.push(Section {
                        name: tok.value,
                        lines,
                        hard_break: tok.kind == TokenKind::HeaderBreak,
                    });
                }
                TokenKind::Eof => break,
                _ => return Err(self.unexpected(&tok, "Header/HeaderBreak/Eof")),
            }
        }

        Ok(sections)
    }

    /// Lines up to the next header or end of input. Blank lines are dropped.
    fn parse_lines(&mut self) -> Result<Vec<Line>, ParseError> {
        let mut lines = Vec::new();

        loop {
            let tok = self.peek()?;
            match tok.kind {
                TokenKind::Header | TokenKind::HeaderBreak | TokenKind::Eof => break,
                TokenKind::Return => {
                    self.advance()?;
                }
                TokenKind::BacktickMultiline => {
                    self.advance()?;
                    let block = self.multiline_backtick(tok.value);
                    lines.push(Line::with_multiline(block));
                }
                TokenKind::FrontMatter => {
                    return Err(self.unexpected(&tok, "front matter only at the top"));
                }
                TokenKind::Bar
                | TokenKind::BarNote
                | TokenKind::Annotation
                | TokenKind::Backtick
                | TokenKind::Chord => {
                    let bars = self.parse_line()?;
                    if !bars.is_empty() {
                        lines.push(Line::with_bars(bars));
                    }
                }
            }
        }

        Ok(lines)
    }

    /// Bars up to and including the `Return` that ends the line.
    fn parse_line(&mut self) -> Result<Vec<Bar>, ParseError> {
        let mut bars = Vec::new();
        let mut previous_was_repeat_end = false;

        loop {
            let tok = self.peek()?;
            match tok.kind {
                TokenKind::Return => {
                    self.advance()?;
                    break;
                }
                TokenKind::Eof
                | TokenKind::Header
                | TokenKind::HeaderBreak
                | TokenKind::BacktickMultiline => break,
                // A separator not closing any bar, e.g. a leading `|`.
                TokenKind::Bar if tok.is_bar("|") || tok.is_bar("||") => {
                    self.advance()?;
                }
                _ => {
                    let bar = self.parse_bar(previous_was_repeat_end)?;
                    previous_was_repeat_end = bar.repeat_end;
                    bars.push(bar);
                }
            }
        }

        Ok(bars)
    }

    fn parse_bar(&mut self, previous_was_repeat_end: bool) -> Result<Bar, ParseError> {
        let mut bar = Bar {
            previous_was_repeat_end,
            ..Bar::default()
        };

        // Repeat openers and bar notes, in any order.
        loop {
            let tok = self.peek()?;
            match tok.kind {
                TokenKind::Bar if tok.is_bar("||:") => {
                    self.advance()?;
                    bar.repeat_start = true;
                }
                TokenKind::BarNote => {
                    self.advance()?;
                    bar.bar_note = tok.value;
                }
                _ => break,
            }
        }

        let tok = self.peek()?;
        match tok.kind {
            TokenKind::Backtick => {
                self.advance()?;
                bar.backtick = Some(self.backtick(tok.value));
            }
            TokenKind::Annotation | TokenKind::Chord => {
                while matches!(
                    self.peek()?.kind,
                    TokenKind::Annotation | TokenKind::Chord
                ) {
                    bar.chords.push(self.parse_chord()?);
                }
            }
            _ => return Err(self.unexpected(&tok, BAR_BODY)),
        }

        let tok = self.peek()?;
        if tok.kind == TokenKind::Bar {
            match tok.value.as_str() {
                ":||" => {
                    self.advance()?;
                    bar.repeat_end = true;
                }
                "||" => {
                    self.advance()?;
                    bar.double_bar_end = true;
                }
                "|" => {
                    self.advance()?;
                }
                // `||:` belongs to the bar that follows.
                _ => {}
            }
        }

        bar.id = self.next_bar_id;
        self.next_bar_id += 1;
        Ok(bar)
    }

    fn parse_chord(&mut self) -> Result<Chord, ParseError> {
        let mut annotation = Annotation::default();
        if self.peek()?.kind == TokenKind::Annotation {
            annotation.value = self.advance()?.value;
        }

        let tok = self.expect(TokenKind::Chord)?;
        Ok(Chord {
            value: tok.value,
            annotation,
        })
    }

    fn backtick(&mut self, value: String) -> Backtick {
        let id = self.next_backtick_id;
        self.next_backtick_id += 1;
        Backtick {
            id,
            value,
            default_length: self.default_length.clone(),
        }
    }

    fn multiline_backtick(&mut self, value: String) -> MultilineBacktick {
        let id = self.next_multiline_id;
        self.next_multiline_id += 1;
        MultilineBacktick {
            id,
            value,
            default_length: self.default_length.clone(),
            source_file: self.source_name.clone(),
        }
    }

    // --- token helpers ---

    fn peek(&mut self) -> Result<Token, ParseError> {
        self.lexer.lookahead()
    }

    fn advance(&mut self) -> Result<Token, ParseError> {
        let tok = self.lexer.next_token()?;
        log::trace!("{}:{} {tok}", tok.line, tok.col);
        Ok(tok)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let tok = self.peek()?;
        if tok.kind != kind {
            return Err(self.unexpected(&tok, kind.name()));
        }
        self.advance()
    }

    fn unexpected(&self, tok: &Token, want: &str) -> ParseError {
        ParseError::syntax(
            format!("unexpected token {}({:?}), want {want}", tok.kind, tok.value),
            tok.line,
            tok.col,
            self.lexer.surrounding_string(),
        )
        .with_source_name(self.lexer.name())
    }
}
