//! Chord symbol formatting, e.g. "F#min11" becomes "F♯<small>m</small>¹¹".
//!
//! Rule order is load-bearing:
//! 1. a leading "N.C" (no chord) passes through untouched
//! 2. `#` and `b` become ♯ and ♭
//! 3. quality names are replaced, longest alias first
//! 4. the symbol splits into root, extension run and optional slash bass;
//!    extension digits become superscripts
//! 5. markup spans wrap minor letters, parentheses, repeat signs and the
//!    diminished glyphs

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const NO_CHORD: &str = "N.C";

static QUALITIES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        ("maj7", "△7"),
        ("maj9", "△9"),
        ("maj", "△"),
        ("sus", "ˢᵘˢ"),
        ("aug", "+"),
        ("halfdim", "ø"),
        ("dim", "°"),
        ("min", "m"),
    ]
    .into_iter()
    .map(|(alias, glyph)| {
        let re = Regex::new(&format!("(?i){alias}")).expect("quality alias is a valid regex");
        (re, glyph)
    })
    .collect()
});

static ROOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[♯♭]?[0-9A-G]").expect("root pattern is a valid regex"));

static MARKUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%|m|\([^)]*\)|ø|°").expect("markup pattern is a valid regex"));

/// Format a single chord symbol for display.
pub fn format_chord(raw: &str) -> String {
    if raw.starts_with(NO_CHORD) {
        return raw.to_string();
    }

    let mut chord = raw.replace('#', "♯").replace('b', "♭");
    for (re, glyph) in QUALITIES.iter() {
        chord = re.replace_all(&chord, *glyph).into_owned();
    }

    let Some(root) = ROOT.find(&chord) else {
        return markup(&chord);
    };
    let rest = &chord[root.end()..];
    let (extension, bass) = match rest.find('/') {
        Some(i) => (&rest[..i], Some(&rest[i..])),
        None => (rest, None),
    };

    let mut out = String::from(root.as_str());
    out.push_str(&markup(&superscript(extension)));
    if let Some(bass) = bass {
        out.push_str("<span class=\"over\">");
        out.push_str(&markup(bass));
        out.push_str("</span>");
    }
    out
}

fn superscript(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '0' => '⁰',
            '1' => '¹',
            '2' => '²',
            '3' => '³',
            '4' => '⁴',
            '5' => '⁵',
            '6' => '⁶',
            '7' => '⁷',
            '8' => '⁸',
            '9' => '⁹',
            other => other,
        })
        .collect()
}

// Single pass, so inserted tags are never matched again.
fn markup(s: &str) -> String {
    MARKUP
        .replace_all(s, |caps: &Captures| {
            let m = &caps[0];
            match m {
                "%" => "<span class=\"small\">%</span>".to_string(),
                "m" => "<small>m</small>".to_string(),
                "ø" => "<sup>ø</sup>".to_string(),
                "°" => "<sup>o</sup>".to_string(),
                group => format!("<small>{group}</small>"),
            }
        })
        .into_owned()
}
