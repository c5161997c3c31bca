//! Helvetica font metrics
//!
//! Width table from the Adobe AFM for the 14 standard PDF fonts, in
//! thousandths of the font size. The report only wraps regular-weight body
//! text, so a single table is enough; bytes outside ASCII fall back to the
//! average lowercase width.

/// Glyph widths for ASCII 0x20..=0x7E.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 0x20-0x2F
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0x30-0x3F
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 0x40-0x4F
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 0x50-0x5F
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 0x60-0x6F
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 0x70-0x7E
];

const DEFAULT_WIDTH: u16 = 556;

/// Width of one character in thousandths of the font size.
fn glyph_width(c: char) -> u16 {
    let code = c as u32;
    if (0x20..=0x7E).contains(&code) {
        HELVETICA_WIDTHS[(code - 0x20) as usize]
    } else {
        DEFAULT_WIDTH
    }
}

/// Rendered width of `text` in points at `font_size`.
pub fn string_width(text: &str, font_size: f64) -> f64 {
    let units: u32 = text.chars().map(|c| glyph_width(c) as u32).sum();
    units as f64 * font_size / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_share_width() {
        assert_eq!(string_width("0", 10.0), string_width("9", 10.0));
    }

    #[test]
    fn width_scales_with_font_size() {
        let w11 = string_width("Glioma", 11.0);
        let w22 = string_width("Glioma", 22.0);
        assert!((w22 - 2.0 * w11).abs() < 1e-9);
    }

    #[test]
    fn wide_and_narrow_glyphs_differ() {
        assert!(string_width("W", 12.0) > string_width("i", 12.0) * 3.0);
    }
}
