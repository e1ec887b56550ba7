//! Advance widths and vertical metrics for the standard PDF fonts we use.
//!
//! Widths are in 1/1000 em, taken from the Adobe AFM files. Only the
//! printable ASCII range is tabled; the handful of WinAnsi punctuation marks
//! the report itself emits (ellipsis, dashes, curly quotes) are special-cased
//! and everything else falls back to `default_width`.

/// Metrics for one standard font.
#[derive(Debug)]
pub struct StandardFontMetrics {
    /// Widths for U+0020..=U+007E.
    pub widths: &'static [u16; 95],
    pub default_width: u16,
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
}

impl StandardFontMetrics {
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.char_units(ch) as f64 / 1000.0 * font_size
    }

    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }

    /// Distance between consecutive baselines.
    pub fn line_height(&self, font_size: f64) -> f64 {
        (self.ascender as f64 - self.descender as f64 + self.line_gap as f64) / 1000.0 * font_size
    }

    /// Distance from the top of a line box to its baseline.
    pub fn ascent(&self, font_size: f64) -> f64 {
        self.ascender as f64 / 1000.0 * font_size
    }

    fn char_units(&self, ch: char) -> u16 {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) {
            return self.widths[(cp - 0x20) as usize];
        }
        let monospace = self.widths.iter().all(|w| *w == self.widths[0]);
        if monospace {
            return self.default_width;
        }
        match ch {
            '\u{2026}' | '\u{2014}' | '\u{2030}' => 1000,
            '\u{2013}' => 556,
            '\u{2018}' | '\u{2019}' => 222,
            '\u{201C}' | '\u{201D}' => 333,
            '\u{2022}' => 350,
            '\u{00A0}' => self.widths[0],
            _ => self.default_width,
        }
    }
}

#[rustfmt::skip]
static HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // p..~
];

#[rustfmt::skip]
static HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

static COURIER_WIDTHS: [u16; 95] = [600; 95];

pub static HELVETICA: StandardFontMetrics = StandardFontMetrics {
    widths: &HELVETICA_WIDTHS,
    default_width: 556,
    ascender: 718,
    descender: -207,
    line_gap: 231,
};

pub static HELVETICA_BOLD: StandardFontMetrics = StandardFontMetrics {
    widths: &HELVETICA_BOLD_WIDTHS,
    default_width: 556,
    ascender: 718,
    descender: -207,
    line_gap: 265,
};

pub static HELVETICA_OBLIQUE: StandardFontMetrics = StandardFontMetrics {
    widths: &HELVETICA_WIDTHS,
    default_width: 556,
    ascender: 718,
    descender: -207,
    line_gap: 231,
};

pub static COURIER: StandardFontMetrics = StandardFontMetrics {
    widths: &COURIER_WIDTHS,
    default_width: 600,
    ascender: 629,
    descender: -157,
    line_gap: 269,
};

pub static COURIER_BOLD: StandardFontMetrics = StandardFontMetrics {
    widths: &COURIER_WIDTHS,
    default_width: 600,
    ascender: 629,
    descender: -157,
    line_gap: 265,
};

pub static COURIER_OBLIQUE: StandardFontMetrics = StandardFontMetrics {
    widths: &COURIER_WIDTHS,
    default_width: 600,
    ascender: 629,
    descender: -157,
    line_gap: 269,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_space_width() {
        assert!((HELVETICA.char_width(' ', 12.0) - 3.336).abs() < 0.001);
    }

    #[test]
    fn helvetica_line_height() {
        assert!((HELVETICA.line_height(8.0) - 9.248).abs() < 1e-9);
    }

    #[test]
    fn courier_is_monospaced_everywhere() {
        assert_eq!(COURIER.char_width('i', 10.0), COURIER.char_width('W', 10.0));
        assert_eq!(COURIER.char_width('\u{2026}', 10.0), 6.0);
    }

    #[test]
    fn ellipsis_is_one_em_in_helvetica() {
        assert_eq!(HELVETICA.char_width('\u{2026}', 8.0), 8.0);
    }
}
