//! Noise filtering for captured tool output.

/// Marker that opens informational lines emitted by the typesetting engine.
const NOTE_MARKER: &str = "note:";

/// Strip blank lines and `note:` lines from raw tool output.
///
/// A line is dropped when it is empty after trimming, or when its content
/// starts with `note:` once leading whitespace is removed. The remaining lines
/// keep their original text and relative order and are joined with `\n`.
pub fn filter(raw: &str) -> String {
    raw.lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with(NOTE_MARKER)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
