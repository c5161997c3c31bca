//! Word wrapping against rendered font widths
//!
//! Greedy fill: words accumulate on a line while the rendered width stays
//! within the limit. Breaks happen only at whitespace; a single word wider
//! than the limit gets its own line rather than being split.

use super::font;

/// Wrap `text` so every line fits `max_width` points at `font_size`.
pub fn wrap_text(text: &str, max_width: f64, font_size: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{line} {word}")
        };
        if font::string_width(&candidate, font_size) <= max_width {
            line = candidate;
        } else {
            if !line.is_empty() {
                lines.push(line);
            }
            line = word.to_string();
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::font::string_width;

    #[test]
    fn short_text_stays_on_one_line() {
        let lines = wrap_text("No Tumor", 200.0, 11.0);
        assert_eq!(lines, vec!["No Tumor"]);
    }

    #[test]
    fn breaks_exactly_at_word_boundary() {
        // Pick a width that fits the first two words but not the third.
        let two = string_width("alpha beta", 11.0);
        let three = string_width("alpha beta gamma", 11.0);
        let max = (two + three) / 2.0;
        let lines = wrap_text("alpha beta gamma delta", max, 11.0);
        assert_eq!(lines[0], "alpha beta");
        assert!(lines[1].starts_with("gamma"));
    }

    #[test]
    fn never_splits_mid_word() {
        let lines = wrap_text("pneumonoultramicroscopic tiny words", 30.0, 11.0);
        for line in &lines {
            assert!(!line.contains('-'));
        }
        // Overlong word stands alone on its own line.
        assert_eq!(lines[0], "pneumonoultramicroscopic");
    }

    #[test]
    fn every_line_fits_or_is_single_word() {
        let text = "Usually involves surgery to remove as much of the tumor as possible, followed by radiation therapy or chemotherapy depending on the tumor's grade.";
        let max = 180.0;
        for line in wrap_text(text, max, 11.0) {
            let fits = string_width(&line, 11.0) <= max;
            assert!(fits || !line.contains(' '));
        }
    }

    #[test]
    fn collapses_whitespace() {
        let lines = wrap_text("  a   b  ", 500.0, 11.0);
        assert_eq!(lines, vec!["a b"]);
    }
}
