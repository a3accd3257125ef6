//! Lexer for lead-sheet source text.
//!
//! Produces [`Token`]s on demand. The cursor (position, line, column) is
//! plain data, so [`Lexer::lookahead`] peeks by saving and restoring it.

use super::error::{invalid_frontmatter, unexpected_string, ParseError};
use super::token::{Token, TokenKind};

/// Characters of source shown on each side of the caret in error messages.
pub const DEFAULT_CONTEXT_WIDTH: usize = 20;

#[derive(Debug, Clone)]
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    name: Option<String>,
    context_width: usize,
    finished: bool,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            name: None,
            context_width: DEFAULT_CONTEXT_WIDTH,
            finished: false,
        }
    }

    /// Tag the source with a name that is reported in error messages.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_context_width(mut self, width: usize) -> Self {
        self.context_width = width;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn line(&self) -> usize {
        self.line
    }

    /// Collect the remaining stream, terminated by a single `Eof` token.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, ParseError> {
        self.by_ref().collect()
    }

    /// Peek at the next token without consuming it.
    pub fn lookahead(&mut self) -> Result<Token, ParseError> {
        let saved = (self.pos, self.line, self.col);
        let result = self.next_token();
        (self.pos, self.line, self.col) = saved;
        result
    }

    /// Consume and return the next token.
    ///
    /// At end of input this keeps returning `Eof`.
    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_comments();

        let line = self.line;
        let col = self.col;
        let Some(ch) = self.peek() else {
            return Ok(Token::new(TokenKind::Eof, "", line, col));
        };

        if self.starts_with("---") && self.only_whitespace_before() {
            return self.lex_front_matter();
        }
        if self.starts_with(":||") {
            return Ok(self.take(TokenKind::Bar, ":||"));
        }
        if ch == '|' {
            let spelling = if self.starts_with("||:") {
                "||:"
            } else if self.starts_with("||") {
                "||"
            } else {
                "|"
            };
            return Ok(self.take(TokenKind::Bar, spelling));
        }

        match ch {
            '!' => self.lex_delimited(TokenKind::Annotation, '!'),
            '"' => self.lex_delimited(TokenKind::BarNote, '"'),
            '`' if self.starts_with("```") => self.lex_multiline_backtick(),
            '`' => self.lex_delimited(TokenKind::Backtick, '`'),
            '#' if self.at_line_start() => Ok(self.lex_header()),
            '\n' => {
                self.consume_whitespace_and_newlines();
                Ok(Token::new(TokenKind::Return, "\n", line, col))
            }
            _ => {
                let value = self.take_while(|c| !c.is_whitespace() && c != '|');
                Ok(Token::new(TokenKind::Chord, value, line, col))
            }
        }
    }

    /// Skip all whitespace except newlines. Must agree with the chord
    /// terminator, or a chord run could come back empty.
    pub fn consume_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace() && c != '\n') {
            self.advance();
        }
    }

    pub fn consume_whitespace_and_newlines(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    /// Render the cursor position with a window of source and a caret.
    pub fn surrounding_string(&self) -> String {
        let start = self.pos.saturating_sub(self.context_width);
        let end = (self.pos + self.context_width).min(self.chars.len());

        let mut out = String::new();
        if let Some(name) = &self.name {
            out.push_str(&format!("in {name} "));
        }
        out.push_str(&format!("at pos {} line {} near:\n", self.pos, self.line));

        let mut caret = 0;
        for i in start..end {
            let ch = self.chars[i];
            if ch == '\n' {
                out.push_str("\\n");
            } else {
                out.push(ch);
            }
            if i < self.pos {
                caret += if ch == '\n' { 2 } else { 1 };
            }
        }
        out.push('\n');
        out.push_str(&" ".repeat(caret));
        out.push_str("^\n");
        out
    }

    // Comments never become tokens. A comment that starts its line takes
    // the newline with it; a trailing comment leaves it for `Return`.
    fn skip_comments(&mut self) {
        loop {
            self.consume_whitespace();
            if !self.starts_with("//") {
                return;
            }
            let own_line = self.only_whitespace_since_newline();
            while !self.is_at_end() && self.peek() != Some('\n') {
                self.advance();
            }
            if own_line && self.peek() == Some('\n') {
                self.advance();
            }
        }
    }

    fn lex_front_matter(&mut self) -> Result<Token, ParseError> {
        let line = self.line;
        let col = self.col;

        let opening = self.take_while(|c| c == '-');
        if opening != "---" {
            return Err(self.lexical(invalid_frontmatter("Opening ---", &opening)));
        }
        let trailing = self.take_while(|c| c != '\n');
        if !trailing.trim().is_empty() {
            return Err(self.lexical(invalid_frontmatter("Opening ---", trailing.trim())));
        }

        let mut body = String::new();
        loop {
            if self.peek() == Some('\n') {
                self.advance();
            }
            if self.is_at_end() {
                return Err(self.lexical(invalid_frontmatter("Closing ---", "EOF")));
            }
            let text = self.take_while(|c| c != '\n');
            if text.trim() == "---" {
                return Ok(Token::new(TokenKind::FrontMatter, body, line, col));
            }
            body.push_str(&text);
            body.push('\n');
        }
    }

    fn lex_header(&mut self) -> Token {
        let line = self.line;
        let col = self.col;

        self.take_while(|c| c == '#');
        let mut kind = TokenKind::Header;
        if self.peek() == Some('-') {
            kind = TokenKind::HeaderBreak;
            self.advance();
        }
        let name = self.take_while(|c| c != '\n');
        if self.peek() == Some('\n') {
            self.advance();
        }
        Token::new(kind, name.trim(), line, col)
    }

    /// Lex a single-line construct enclosed in `delim` on both sides.
    fn lex_delimited(&mut self, kind: TokenKind, delim: char) -> Result<Token, ParseError> {
        let line = self.line;
        let col = self.col;
        self.advance(); // opening delimiter

        let value = self.take_while(|c| c != delim && c != '\n');
        match self.peek() {
            Some(c) if c == delim => {
                self.advance();
                Ok(Token::new(kind, value, line, col))
            }
            other => {
                let got = match other {
                    Some('\n') => "\\n".to_string(),
                    Some(c) => c.to_string(),
                    None => "EOF".to_string(),
                };
                Err(self.lexical(unexpected_string(&delim.to_string(), &got)))
            }
        }
    }

    fn lex_multiline_backtick(&mut self) -> Result<Token, ParseError> {
        let line = self.line;
        let col = self.col;
        self.advance_by(3);
        self.consume_whitespace_and_newlines();

        let start = self.pos;
        while !self.starts_with("```") {
            if self.is_at_end() {
                return Err(self.lexical(unexpected_string("Closing ```", "EOF")));
            }
            self.advance();
        }
        let value: String = self.chars[start..self.pos].iter().collect();
        self.advance_by(3);
        Ok(Token::new(TokenKind::BacktickMultiline, value, line, col))
    }

    fn lexical(&self, message: String) -> ParseError {
        ParseError::lexical(message, self.line, self.col, self.surrounding_string())
            .with_source_name(self.name())
    }

    fn take(&mut self, kind: TokenKind, spelling: &str) -> Token {
        let token = Token::new(kind, spelling, self.line, self.col);
        self.advance_by(spelling.chars().count());
        token
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut s = String::new();
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            s.push(self.advance());
        }
        s
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        let mut i = self.pos;
        for ch in s.chars() {
            if self.chars.get(i) != Some(&ch) {
                return false;
            }
            i += 1;
        }
        true
    }

    fn advance(&mut self) -> char {
        let ch = self.chars[self.pos];
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        ch
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            if self.is_at_end() {
                break;
            }
            self.advance();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    /// Column 0: start of input or right after a newline.
    fn at_line_start(&self) -> bool {
        self.pos == 0 || self.chars[self.pos - 1] == '\n'
    }

    fn only_whitespace_since_newline(&self) -> bool {
        self.chars[..self.pos]
            .iter()
            .rev()
            .take_while(|&&c| c != '\n')
            .all(|c| c.is_whitespace())
    }

    fn only_whitespace_before(&self) -> bool {
        self.chars[..self.pos].iter().all(|c| c.is_whitespace())
    }
}

impl Iterator for Lexer {
    type Item = Result<Token, ParseError>;

    /// Yields tokens up to and including the first `Eof`, or the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.next_token();
        match &result {
            Ok(tok) if tok.kind == TokenKind::Eof => self.finished = true,
            Err(_) => self.finished = true,
            Ok(_) => {}
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lex_chords_bars_and_returns() {
        let mut lex = Lexer::new("Cmaj7 | !annotation!D Caug\nC\nE | F");

        let tok = lex.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::Chord);
        assert_eq!(tok.value, "Cmaj7");

        assert_eq!(lex.next_token().unwrap().kind, TokenKind::Bar);

        let tok = lex.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::Annotation);
        assert_eq!(tok.value, "annotation");

        let tok = lex.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::Chord);
        assert_eq!(tok.value, "D");

        let tok = lex.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::Chord);
        assert_eq!(tok.value, "Caug");

        assert_eq!(lex.next_token().unwrap().kind, TokenKind::Return);

        let tok = lex.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::Chord);
        assert_eq!(tok.value, "C");
    }

    #[test]
    fn lex_backtick() {
        let tok = Lexer::new("`backtick`").next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::Backtick);
        assert_eq!(tok.value, "backtick");
    }

    #[test]
    fn lex_backtick_unclosed() {
        let mut lex = Lexer::new("`backtick");
        let err = lex.next_token().unwrap_err();
        assert!(err.is_lexical());
        assert_eq!(err.message, "unexpected string Want: ` Got: EOF");
        assert_eq!(err.context, lex.surrounding_string());
    }

    #[test]
    fn lex_multiline_backtick() {
        let tok = Lexer::new("```\nmy\nbacktick\n```").next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::BacktickMultiline);
        assert_eq!(tok.value, "my\nbacktick\n");
    }

    #[test]
    fn lex_multiline_backtick_unclosed() {
        let err = Lexer::new("```backtick``").next_token().unwrap_err();
        assert!(err.is_lexical());
        assert!(err.message.contains("Closing ```"));
    }

    #[test]
    fn lex_annotated_chords() {
        assert_eq!(
            kinds("!annotation!Cmaj7 !second!D"),
            vec![
                TokenKind::Annotation,
                TokenKind::Chord,
                TokenKind::Annotation,
                TokenKind::Chord,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_annotation_unclosed() {
        let err = Lexer::new("!unclosed").next_token().unwrap_err();
        assert!(err.is_lexical());
        assert!(err.message.contains("Want: !"));
    }

    #[test]
    fn lex_bar_note() {
        let tok = Lexer::new("\"to coda\" A").next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::BarNote);
        assert_eq!(tok.value, "to coda");
    }

    #[test]
    fn lex_bar_note_unclosed() {
        let err = Lexer::new("\"to coda\nA").next_token().unwrap_err();
        assert!(err.message.ends_with("Got: \\n"));
    }

    #[test]
    fn lex_bar_spellings() {
        let values: Vec<String> = Lexer::new("||: A :|| || B |")
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.value)
            .collect();
        assert_eq!(values, vec!["||:", "A", ":||", "||", "B", "|", ""]);
    }

    #[test]
    fn lex_headers() {
        let mut lex = Lexer::new("# verse one \n#- bridge\nA");
        let tok = lex.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::Header);
        assert_eq!(tok.value, "verse one");
        let tok = lex.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::HeaderBreak);
        assert_eq!(tok.value, "bridge");
        assert_eq!(lex.next_token().unwrap().value, "A");
    }

    #[test]
    fn hash_mid_line_is_a_chord() {
        let toks = Lexer::new("A #1").tokenize().unwrap();
        assert_eq!(toks[1].kind, TokenKind::Chord);
        assert_eq!(toks[1].value, "#1");
    }

    #[test]
    fn lex_front_matter() {
        let toks = Lexer::new("---\ntitle: Blue\nL: 1/8\n---\nA").tokenize().unwrap();
        assert_eq!(toks[0].kind, TokenKind::FrontMatter);
        assert_eq!(toks[0].value, "title: Blue\nL: 1/8\n");
        assert_eq!(toks[1].kind, TokenKind::Return);
        assert_eq!(toks[2].value, "A");
    }

    #[test]
    fn front_matter_after_leading_blank_lines() {
        let toks = Lexer::new("\n\n---\nkey: C\n---\n").tokenize().unwrap();
        assert_eq!(toks[0].kind, TokenKind::Return);
        assert_eq!(toks[1].kind, TokenKind::FrontMatter);
    }

    #[test]
    fn front_matter_bad_fences() {
        let err = Lexer::new("----\n---\n").next_token().unwrap_err();
        assert_eq!(err.message, "invalid frontmatter Want: Opening --- Got: ----");

        let err = Lexer::new("---\ntitle: x\n").next_token().unwrap_err();
        assert_eq!(err.message, "invalid frontmatter Want: Closing --- Got: EOF");
    }

    #[test]
    fn dashes_mid_document_are_a_chord() {
        let toks = Lexer::new("A ---").tokenize().unwrap();
        assert_eq!(toks[1].kind, TokenKind::Chord);
        assert_eq!(toks[1].value, "---");
    }

    #[test]
    fn comment_on_own_line_takes_its_newline() {
        assert_eq!(
            kinds("// intro\nA"),
            vec![TokenKind::Chord, TokenKind::Eof]
        );
    }

    #[test]
    fn trailing_comment_keeps_return() {
        assert_eq!(
            kinds("A // push here\nB"),
            vec![
                TokenKind::Chord,
                TokenKind::Return,
                TokenKind::Chord,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn eof_is_sticky() {
        let mut lex = Lexer::new("A");
        lex.next_token().unwrap();
        assert_eq!(lex.next_token().unwrap().kind, TokenKind::Eof);
        assert_eq!(lex.next_token().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn lookahead_does_not_consume() {
        let mut lex = Lexer::new("A\nB");
        lex.next_token().unwrap();
        let peeked = lex.lookahead().unwrap();
        assert_eq!(peeked.kind, TokenKind::Return);
        assert_eq!(lex.line(), 1);
        assert_eq!(lex.next_token().unwrap(), peeked);
        assert_eq!(lex.line(), 2);
    }

    #[test]
    fn tokens_carry_positions() {
        let toks = Lexer::new("A | B\n  C").tokenize().unwrap();
        assert_eq!((toks[2].line, toks[2].col), (1, 5));
        assert_eq!((toks[4].line, toks[4].col), (2, 3));
    }

    #[test]
    fn iterator_stops_after_error() {
        let results: Vec<_> = Lexer::new("A `open").collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[test]
    fn surrounding_string_marks_cursor() {
        let mut lex = Lexer::new("A\nBC").with_name("song.nns");
        lex.next_token().unwrap();
        lex.next_token().unwrap();
        assert_eq!(
            lex.surrounding_string(),
            "in song.nns at pos 2 line 2 near:\nA\\nBC\n   ^\n"
        );
    }

    #[test]
    fn any_whitespace_separates_chords() {
        for src in ["A\u{a0}B", "A\x0cB", "A\x0bB", "A\u{2003}B"] {
            let toks = Lexer::new(src).tokenize().unwrap();
            let values: Vec<&str> = toks.iter().map(|t| t.value.as_str()).collect();
            assert_eq!(values, vec!["A", "B", ""], "lexing {src:?}");
            assert_eq!(toks[2].kind, TokenKind::Eof);
        }
    }

    #[test]
    fn unicode_whitespace_before_newline() {
        let toks = Lexer::new("A\u{a0}\n\u{2003}B").tokenize().unwrap();
        let kinds: Vec<TokenKind> = toks.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TokenKind::Chord, TokenKind::Return, TokenKind::Chord, TokenKind::Eof]
        );
    }

    #[test]
    fn errors_carry_source_name() {
        let err = Lexer::new("!open").with_name("x.nns").next_token().unwrap_err();
        assert_eq!(err.source_name.as_deref(), Some("x.nns"));
        let err = Lexer::new("!open").next_token().unwrap_err();
        assert_eq!(err.source_name, None);
    }
}
