//! Flat `key: value` front matter.
//!
//! Only one level of keys is understood; nested YAML is out of scope.

use std::collections::BTreeMap;

/// Split a front matter body into key/value pairs. Later keys win.
pub fn parse_front_matter(body: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();

    for (idx, raw) in body.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            log::warn!("front matter line {} has no ':', ignoring: {line}", idx + 1);
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            log::warn!("front matter line {} has an empty key, ignoring", idx + 1);
            continue;
        }
        entries.insert(key.to_string(), unquote(value.trim()).to_string());
    }

    entries
}

/// Render front matter between `---` fences. Empty maps render nothing.
pub fn print_front_matter(entries: &BTreeMap<String, String>, out: &mut String) {
    if entries.is_empty() {
        return;
    }
    out.push_str("---\n");
    for (key, value) in entries {
        out.push_str(key);
        out.push_str(": ");
        if unquote(value) != value {
            out.push('"');
            out.push_str(value);
            out.push('"');
        } else {
            out.push_str(value);
        }
        out.push('\n');
    }
    out.push_str("---\n");
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
