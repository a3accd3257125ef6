//! Lead sheets: source text → tokens → [`Song`] → canonical text or JSON.

pub mod ast;
pub mod chord;
pub mod error;
pub mod front_matter;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod token;

pub use ast::*;
pub use chord::format_chord;
pub use error::{ErrorKind, ParseError};
pub use lexer::Lexer;
pub use parser::Parser;
pub use printer::print;
pub use token::{Token, TokenKind};

use crate::config::SheetConfig;

/// Parse lead-sheet source with default settings.
pub fn parse(source: &str) -> Result<Song, ParseError> {
    Parser::new(source).parse()
}

/// Parse source read from `name`. The name shows up in error context and
/// in each fenced block's `source_file`.
pub fn parse_with_name(name: &str, source: &str) -> Result<Song, ParseError> {
    Parser::new(source).with_name(name).parse()
}

pub fn parse_with_config(
    name: Option<&str>,
    source: &str,
    config: &SheetConfig,
) -> Result<Song, ParseError> {
    let mut parser = Parser::with_config(source, config);
    if let Some(name) = name {
        parser = parser.with_name(name);
    }
    parser.parse()
}

/// Front door for callers that just want a result.
pub struct Sheet;

impl Sheet {
    /// Parse and re-print in canonical form.
    pub fn format(source: &str) -> Result<String, ParseError> {
        let song = parse(source)?;
        Ok(print(&song))
    }
}
