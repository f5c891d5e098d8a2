//! Human-facing display formatting: title case with exceptions.

/// Words that stay lowercase unless they lead a part.
const LOWERCASE_CONNECTORS: &[&str] = &["of", "the", "and", "de", "da", "do", "dos", "das"];

/// Title-case a location string, part by part.
///
/// Parts are comma-separated; a part that is entirely 2–3 letters is
/// treated as a code and upper-cased ("md" → "MD"). Elsewhere the first
/// word of a part is always capitalized, connector words stay lowercase,
/// and apostrophe-/hyphen-segments capitalize independently
/// ("o'connor" → "O'Connor", "saint-denis" → "Saint-Denis").
///
/// Idempotent and panic-free on any input; empty input yields an empty
/// string.
pub fn format(text: &str) -> String {
    text.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(format_part)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_part(part: &str) -> String {
    if is_code(part) {
        return part.to_uppercase();
    }
    part.split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if i > 0 && LOWERCASE_CONNECTORS.contains(&lower.as_str()) {
                lower
            } else {
                capitalize_word(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_code(part: &str) -> bool {
    let len = part.chars().count();
    (2..=3).contains(&len) && part.chars().all(char::is_alphabetic)
}

fn capitalize_word(word: &str) -> String {
    word.split('\'')
        .map(|seg| {
            seg.split('-')
                .map(capitalize_segment)
                .collect::<Vec<_>>()
                .join("-")
        })
        .collect::<Vec<_>>()
        .join("'")
}

fn capitalize_segment(seg: &str) -> String {
    let mut chars = seg.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
