//! Text measurement for node sizing.
//!
//! Headless rendering has no font engine to ask, so widths are estimated from
//! terminal cell widths. The estimate only needs to be deterministic and
//! roughly proportional; exact glyph metrics do not matter for layout
//! readability.

use unicode_width::UnicodeWidthStr;

pub trait TextMeasurer: Send + Sync {
    /// Estimated pixel width of `text` at `font_size`.
    fn text_width(&self, text: &str, font_size: f64) -> f64;
}

/// Platform-independent measurer: unicode cell count scaled by an average
/// sans-serif advance ratio.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeterministicTextMeasurer;

impl TextMeasurer for DeterministicTextMeasurer {
    fn text_width(&self, text: &str, font_size: f64) -> f64 {
        let cells = UnicodeWidthStr::width(text) as f64;
        cells * font_size * 0.6
    }
}

/// Splits `text` into lines no wider than `max_width`, breaking on spaces.
/// A single word wider than the limit stays on its own line.
pub fn wrap_text(
    measurer: &dyn TextMeasurer,
    text: &str,
    font_size: f64,
    max_width: f64,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if !current.is_empty() && measurer.text_width(&candidate, font_size) > max_width {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_scales_with_length() {
        let m = DeterministicTextMeasurer;
        assert!(m.text_width("long label here", 14.0) > m.text_width("x", 14.0));
    }

    #[test]
    fn wide_chars_count_double() {
        let m = DeterministicTextMeasurer;
        assert_eq!(m.text_width("漢", 10.0), m.text_width("ab", 10.0));
    }

    #[test]
    fn wrap_keeps_short_text_on_one_line() {
        let m = DeterministicTextMeasurer;
        assert_eq!(wrap_text(&m, "short", 14.0, 200.0), vec!["short"]);
    }

    #[test]
    fn wrap_breaks_on_spaces() {
        let m = DeterministicTextMeasurer;
        let lines = wrap_text(&m, "one two three four five six", 14.0, 60.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), "one two three four five six");
    }
}
