//! nasheets: a parser and formatter for Nashville-number lead sheets.

pub mod config;
pub mod sheet;

pub use config::SheetConfig;
pub use sheet::{format_chord, parse, parse_with_name, print, ParseError, Sheet, Song};
