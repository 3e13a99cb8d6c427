/*!
 * Prompt formatting and response parsing for LLM-backed translation.
 *
 * A batch travels to the model as numbered entries:
 *
 * ```text
 * ENTRY_0:
 * Hello there
 *
 * ENTRY_1:
 * How are you?
 * ```
 *
 * and the reply is expected in the same shape.
 */

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Longest source entry sent to a model, in characters
pub const MAX_ENTRY_CHARS: usize = 2048;

// @const: Entry marker at the start of a reply line, tolerating bold/backticks
static ENTRY_MARKER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\s*`]*ENTRY_(\d+)[*`]*:[*`]*\s*(.*)$").unwrap()
});

/// Cut `text` down to `max_chars` characters on a char boundary
pub fn truncate_entry(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => {
            warn!("Truncating subtitle line of {} chars to {}", text.chars().count(), max_chars);
            text[..byte_index].to_string()
        }
        None => text.to_string(),
    }
}

/// Render a batch as numbered entries
pub fn build_batch_text(batch: &[String]) -> String {
    batch.iter()
        .enumerate()
        .map(|(index, text)| format!("ENTRY_{}:\n{}", index, text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Split a model reply back into entries.
///
/// Entries come back ordered by index. Indices outside `0..expected` are
/// dropped and missing ones are skipped, so a short reply yields a short
/// result rather than a padded one.
pub fn parse_batch_response(response: &str, expected: usize) -> Vec<String> {
    let mut entries: HashMap<usize, Vec<String>> = HashMap::new();
    let mut current: Option<usize> = None;

    for line in response.lines() {
        if let Some(caps) = ENTRY_MARKER_REGEX.captures(line) {
            current = caps[1].parse::<usize>().ok().filter(|index| *index < expected);
            if let Some(index) = current {
                let body = entries.entry(index).or_default();
                let inline = caps[2].trim();
                if !inline.is_empty() {
                    body.push(inline.to_string());
                }
            }
            continue;
        }

        if let Some(index) = current {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                entries.entry(index).or_default().push(trimmed.to_string());
            }
        }
    }

    (0..expected)
        .filter_map(|index| entries.remove(&index))
        .map(|parts| collapse_line_breaks(&parts.join("\n")))
        .collect()
}

/// Join the lines of a translation with single spaces so it fits one output line
pub fn collapse_line_breaks(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
