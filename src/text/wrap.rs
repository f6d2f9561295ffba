use crate::text::{font::FontHandle, measure::TextMeasurer};

/// Greedy word wrap of `text` into lines no wider than `max_width` pixels.
///
/// Words are whitespace-separated and rejoined with single spaces. A word wider than
/// `max_width` on its own is emitted as its own overflowing line; words are never split.
/// Empty or all-whitespace input yields no lines.
pub fn wrap_text<M: TextMeasurer + ?Sized>(
    text: &str,
    font: &FontHandle,
    max_width: f32,
    measurer: &mut M,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }

        let candidate = format!("{line} {word}");
        if measurer.line_width(font, &candidate) <= max_width {
            line = candidate;
        } else {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
#[path = "../../tests/unit/text/wrap.rs"]
mod tests;
