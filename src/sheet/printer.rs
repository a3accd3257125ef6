//! Canonical text rendering of a [`Song`].
//!
//! The output is whitespace-normalized source that parses back to an
//! equal model.

use super::ast::{Bar, Line, Song};
use super::front_matter::print_front_matter;

pub fn print(song: &Song) -> String {
    let mut out = String::new();
    print_front_matter(&song.front_matter, &mut out);

    for (idx, section) in song.sections.iter().enumerate() {
        if needs_header(song, idx) {
            out.push('\n');
            out.push_str(if section.hard_break { "#- " } else { "# " });
            out.push_str(&section.name);
            out.push_str("\n\n");
        }
        for line in &section.lines {
            print_line(line, &mut out);
            out.push('\n');
        }
    }

    out
}

// The implicit leading section has no header of its own, unless leaving
// it out would let the parser drop it as empty.
fn needs_header(song: &Song, idx: usize) -> bool {
    let section = &song.sections[idx];
    idx > 0
        || !section.name.is_empty()
        || section.hard_break
        || (section.lines.is_empty() && song.sections.len() > 1)
}

fn print_line(line: &Line, out: &mut String) {
    if let Some(block) = &line.multiline_backtick {
        out.push_str("```\n");
        out.push_str(&block.value);
        out.push_str("```\n");
        return;
    }

    if starts_ambiguously(line) {
        out.push_str("| ");
    }
    for (idx, bar) in line.bars.iter().enumerate() {
        print_bar(bar, line.bars.get(idx + 1), out);
    }
}

fn print_bar(bar: &Bar, next: Option<&Bar>, out: &mut String) {
    if bar.repeat_start {
        out.push_str("||: ");
    }
    if !bar.bar_note.is_empty() {
        out.push('"');
        out.push_str(&bar.bar_note);
        out.push_str("\" ");
    }

    if let Some(bt) = &bar.backtick {
        out.push('`');
        out.push_str(&bt.value);
        out.push('`');
    } else {
        for (idx, chord) in bar.chords.iter().enumerate() {
            if idx > 0 {
                out.push(' ');
            }
            if !chord.annotation.value.is_empty() {
                out.push('!');
                out.push_str(&chord.annotation.value);
                out.push('!');
            }
            out.push_str(&chord.value);
        }
    }

    if bar.repeat_end {
        out.push_str(" :||");
    } else if bar.double_bar_end {
        out.push_str(" ||");
    } else if next.is_some_and(|n| !n.repeat_start) {
        out.push_str(" |");
    }
    if next.is_some() {
        out.push(' ');
    }
}

// A chord such as `#4` or `---` at column 0 would re-lex as a header or
// front matter fence.
fn starts_ambiguously(line: &Line) -> bool {
    let Some(first) = line.bars.first() else {
        return false;
    };
    if first.repeat_start || !first.bar_note.is_empty() || first.backtick.is_some() {
        return false;
    }
    first.chords.first().is_some_and(|c| {
        c.annotation.value.is_empty() && (c.value.starts_with('#') || c.value.starts_with("---"))
    })
}
