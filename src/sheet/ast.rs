//! Document model for a parsed lead sheet.
//!
//! Field names double as the JSON contract consumed by renderers, so they
//! must not be renamed.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use super::chord::format_chord;

/// Note length used for embedded notation when front matter has no `L`.
pub const DEFAULT_NOTE_LENGTH: &str = "1/16";

/// A complete lead sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub front_matter: BTreeMap<String, String>,
    pub sections: Vec<Section>,
}

/// A named (or implicit unnamed) group of lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub lines: Vec<Line>,
    /// Rendered as a hard section boundary (`#-` header).
    #[serde(rename = "break")]
    pub hard_break: bool,
}

/// Either a run of bars or a single fenced block of embedded notation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub bars: Vec<Bar>,
    pub multiline_backtick: Option<MultilineBacktick>,
}

/// One measure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub id: usize,
    pub chords: Vec<Chord>,
    pub backtick: Option<Backtick>,
    pub bar_note: String,
    pub repeat_start: bool,
    pub repeat_end: bool,
    pub double_bar_end: bool,
    pub lyrics: String,
    /// The preceding bar on the same line closed a repeat.
    #[serde(skip)]
    pub previous_was_repeat_end: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Chord {
    pub value: String,
    pub annotation: Annotation,
}

/// Marker attached to a chord, such as "push" or "fermata". May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub value: String,
}

/// Inline embedded notation, written between single backticks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backtick {
    pub id: usize,
    pub value: String,
    pub default_length: String,
}

/// A fenced block of embedded notation occupying its own line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultilineBacktick {
    pub id: usize,
    pub value: String,
    pub default_length: String,
    pub source_file: String,
}

impl Song {
    /// The `L` front matter key, or [`DEFAULT_NOTE_LENGTH`].
    pub fn default_length(&self) -> &str {
        match self.front_matter.get("L") {
            Some(l) if !l.is_empty() => l,
            _ => DEFAULT_NOTE_LENGTH,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.front_matter.get("title").map(String::as_str)
    }

    /// The song key formatted for display.
    pub fn key(&self) -> Option<String> {
        self.front_matter.get("key").map(|k| format_chord(k))
    }

    /// Every bar, in document order.
    pub fn bars(&self) -> impl Iterator<Item = &Bar> {
        self.sections
            .iter()
            .flat_map(|s| s.lines.iter())
            .flat_map(|l| l.bars.iter())
    }

    pub fn backticks(&self) -> Vec<&Backtick> {
        self.bars().filter_map(|b| b.backtick.as_ref()).collect()
    }

    pub fn multiline_backticks(&self) -> Vec<&MultilineBacktick> {
        self.sections
            .iter()
            .flat_map(|s| s.lines.iter())
            .filter_map(|l| l.multiline_backtick.as_ref())
            .collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Section {
    /// No lines and no name. A named section without lines is not empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.name.is_empty()
    }
}

impl Line {
    pub fn with_bars(bars: Vec<Bar>) -> Self {
        Self {
            bars,
            multiline_backtick: None,
        }
    }

    pub fn with_multiline(block: MultilineBacktick) -> Self {
        Self {
            bars: Vec::new(),
            multiline_backtick: Some(block),
        }
    }

    pub fn is_multiline(&self) -> bool {
        self.multiline_backtick.is_some()
    }
}

impl Bar {
    /// 1-based bar number for display.
    pub fn number(&self) -> usize {
        self.id + 1
    }

    pub fn is_empty(&self) -> bool {
        let empty_chords = match self.chords.as_slice() {
            [] => true,
            [only] => only.value.is_empty(),
            _ => false,
        };
        let empty_backtick = self.backtick.as_ref().map_or(true, |b| b.value.is_empty());
        empty_chords && empty_backtick && self.bar_note.is_empty()
    }
}

impl Chord {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            annotation: Annotation::default(),
        }
    }

    pub fn annotated(value: impl Into<String>, annotation: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            annotation: Annotation {
                value: annotation.into(),
            },
        }
    }

    /// The chord symbol formatted for display.
    pub fn pretty(&self) -> String {
        format_chord(&self.value)
    }
}

// Adds the read-only `pretty` field renderers expect next to the raw value.
impl Serialize for Chord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Chord", 3)?;
        state.serialize_field("value", &self.value)?;
        state.serialize_field("annotation", &self.annotation)?;
        state.serialize_field("pretty", &self.pretty())?;
        state.end()
    }
}

/// Human-readable outline, one bar per line.
impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Frontmatter:")?;
        for (k, v) in &self.front_matter {
            writeln!(f, "  {k}: {v}")?;
        }
        for section in &self.sections {
            let marker = if section.hard_break { " (break)" } else { "" };
            writeln!(f, "Section: {}{marker}", section.name)?;
            for line in &section.lines {
                if let Some(block) = &line.multiline_backtick {
                    writeln!(f, "  Multiline {}: {:?}", block.id, block.value)?;
                    continue;
                }
                for bar in &line.bars {
                    write!(f, "  Bar {}", bar.number())?;
                    if !bar.bar_note.is_empty() {
                        write!(f, " \"{}\"", bar.bar_note)?;
                    }
                    write!(f, ":")?;
                    if let Some(bt) = &bar.backtick {
                        write!(f, " `{}`", bt.value)?;
                    }
                    for chord in &bar.chords {
                        if chord.annotation.value.is_empty() {
                            write!(f, " {}", chord.value)?;
                        } else {
                            write!(f, " {} ({})", chord.value, chord.annotation.value)?;
                        }
                    }
                    writeln!(f)?;
                }
            }
        }
        Ok(())
    }
}
