//! # Font Management
//!
//! The report only uses the standard PDF fonts (Helvetica and Courier, each
//! in regular, bold and oblique), which need no embedding. This module maps
//! a (family, face) pair to its PDF name and AFM metrics.

pub mod metrics;

pub use metrics::StandardFontMetrics;

use crate::style::{FontFace, FontFamily};

/// The standard PDF fonts the engine can draw with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    Courier,
    CourierBold,
    CourierOblique,
}

impl StandardFont {
    pub fn resolve(family: FontFamily, face: FontFace) -> Self {
        match (family, face) {
            (FontFamily::Helvetica, FontFace::Regular) => Self::Helvetica,
            (FontFamily::Helvetica, FontFace::Bold) => Self::HelveticaBold,
            (FontFamily::Helvetica, FontFace::Oblique) => Self::HelveticaOblique,
            (FontFamily::Courier, FontFace::Regular) => Self::Courier,
            (FontFamily::Courier, FontFace::Bold) => Self::CourierBold,
            (FontFamily::Courier, FontFace::Oblique) => Self::CourierOblique,
        }
    }

    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica => &metrics::HELVETICA,
            Self::HelveticaBold => &metrics::HELVETICA_BOLD,
            Self::HelveticaOblique => &metrics::HELVETICA_OBLIQUE,
            Self::Courier => &metrics::COURIER,
            Self::CourierBold => &metrics::COURIER_BOLD,
            Self::CourierOblique => &metrics::COURIER_OBLIQUE,
        }
    }
}

/// Line height of a family/face at a size, without needing a context.
pub fn line_height_for(family: FontFamily, face: FontFace, size: f64) -> f64 {
    StandardFont::resolve(family, face).metrics().line_height(size)
}

/// Font context shared by measurement and drawing on one canvas.
/// Every measurement uses the report's single family.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontContext {
    family: FontFamily,
}

impl FontContext {
    pub fn new(family: FontFamily) -> Self {
        Self { family }
    }

    pub fn resolve(&self, face: FontFace) -> StandardFont {
        StandardFont::resolve(self.family, face)
    }

    /// Get the advance width of a single character in points.
    pub fn char_width(&self, ch: char, face: FontFace, font_size: f64) -> f64 {
        self.resolve(face).metrics().char_width(ch, font_size)
    }

    /// Measure the width of a string on a single line, in points.
    pub fn measure_string(&self, text: &str, face: FontFace, font_size: f64) -> f64 {
        self.resolve(face).metrics().measure_string(text, font_size)
    }

    pub fn line_height(&self, face: FontFace, font_size: f64) -> f64 {
        self.resolve(face).metrics().line_height(font_size)
    }

    pub fn ascent(&self, face: FontFace, font_size: f64) -> f64 {
        self.resolve(face).metrics().ascent(font_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_context_bold_wider() {
        let ctx = FontContext::new(FontFamily::Helvetica);
        let regular = ctx.char_width('A', FontFace::Regular, 12.0);
        let bold = ctx.char_width('A', FontFace::Bold, 12.0);
        assert!(bold > regular, "Bold A should be wider than regular A");
    }

    #[test]
    fn test_font_context_measure_string() {
        let ctx = FontContext::new(FontFamily::Helvetica);
        let w = ctx.measure_string("Hello", FontFace::Regular, 12.0);
        assert!(w > 0.0);
    }

    #[test]
    fn test_courier_resolution() {
        let ctx = FontContext::new(FontFamily::Courier);
        assert_eq!(ctx.resolve(FontFace::Bold).pdf_name(), "Courier-Bold");
        let w = ctx.measure_string("abc", FontFace::Regular, 10.0);
        assert!((w - 18.0).abs() < 1e-9);
    }
}
