//! # Theme and Geometry
//!
//! Everything that controls how a report looks: page size and margins, the
//! reserved footer strip, colors, paddings, font sizes. These are plain
//! values handed to each component; there are no process-wide constants.

use serde::{Deserialize, Serialize};

use crate::error::DossierError;
use crate::font::line_height_for;
use crate::layout::min_content_width;

/// An RGB color with components in 0.0 - 1.0.
///
/// Serialized as a `#RRGGBB` (or `#RGB`) string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Parse `#RRGGBB` or `#RGB`. Returns `None` for anything else.
    pub fn parse_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let (r, g, b) = match hex.len() {
            3 => (
                u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?,
                u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?,
                u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?,
            ),
            6 => (
                u8::from_str_radix(&hex[0..2], 16).ok()?,
                u8::from_str_radix(&hex[2..4], 16).ok()?,
                u8::from_str_radix(&hex[4..6], 16).ok()?,
            ),
            _ => return None,
        };
        Some(Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        })
    }

    /// Like [`Color::parse_hex`] but for compile-time-known palette entries.
    fn hex(hex: &str) -> Self {
        Self::parse_hex(hex).unwrap_or(Color::BLACK)
    }

    pub fn to_hex(&self) -> String {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02X}{:02X}{:02X}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse_hex(&value).ok_or_else(|| format!("invalid color '{}'", value))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Edge values (top, right, bottom, left) used for page margins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Page shape for one report. Fixed for the lifetime of a generation.
///
/// Vertically a page is: top margin, page body, footer strip, bottom margin.
/// Body content never enters the footer strip; page-number stamps never
/// leave it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageGeometry {
    pub size: PageSize,
    pub margin: Edges,
    /// Height of the band below the body reserved for the footer stamp.
    pub footer_height: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            margin: Edges {
                top: 40.0,
                right: 30.0,
                bottom: 10.0,
                left: 30.0,
            },
            footer_height: 40.0,
        }
    }
}

impl PageGeometry {
    pub fn width(&self) -> f64 {
        self.size.dimensions().0
    }

    pub fn height(&self) -> f64 {
        self.size.dimensions().1
    }

    pub fn content_left(&self) -> f64 {
        self.margin.left
    }

    pub fn content_right(&self) -> f64 {
        self.width() - self.margin.right
    }

    pub fn content_width(&self) -> f64 {
        self.width() - self.margin.horizontal()
    }

    /// First drawable y of the page body.
    pub fn body_top(&self) -> f64 {
        self.margin.top
    }

    /// Last drawable y of the page body (top edge of the footer strip).
    pub fn body_bottom(&self) -> f64 {
        self.height() - self.margin.bottom - self.footer_height
    }

    pub fn body_height(&self) -> f64 {
        self.body_bottom() - self.body_top()
    }

    /// (top, bottom) of the reserved footer strip.
    pub fn footer_strip(&self) -> (f64, f64) {
        (self.body_bottom(), self.height() - self.margin.bottom)
    }
}

/// Font families available without embedding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    Helvetica,
    Courier,
}

/// Weight/slant variant within a family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFace {
    #[default]
    Regular,
    Bold,
    Oblique,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
}

/// How one run of text is drawn and measured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub face: FontFace,
    pub size: f64,
    pub color: Color,
    pub align: TextAlign,
}

impl TextStyle {
    pub fn new(face: FontFace, size: f64, color: Color) -> Self {
        Self {
            face,
            size,
            color,
            align: TextAlign::Left,
        }
    }

    pub fn centered(mut self) -> Self {
        self.align = TextAlign::Center;
        self
    }
}

/// A stroked outline or rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

/// Colors, spacing, and type sizes for the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Theme {
    pub font_family: FontFamily,

    // ── Palette ────────────────────────────────────────────────
    pub text: Color,
    pub subtle_text: Color,
    pub heading_text: Color,
    pub border: Color,
    pub header_background: Color,
    pub row_alternate: Color,
    pub footer_text: Color,

    // ── Type sizes ─────────────────────────────────────────────
    pub title_size: f64,
    pub identity_size: f64,
    pub section_title_size: f64,
    pub subsection_title_size: f64,
    pub body_size: f64,
    pub footer_size: f64,

    // ── Tables ─────────────────────────────────────────────────
    pub cell_padding_x: f64,
    pub cell_padding_y: f64,
    pub header_padding_y: f64,
    pub min_row_height: f64,
    pub min_header_height: f64,
    /// Kept free below the tallest possible row on an empty page.
    pub fresh_page_safety: f64,
    /// Gap between the table bottom limit and the page body bottom.
    pub table_bottom_gap: f64,
    pub table_spacing_after: f64,
    pub rule_width: f64,

    // ── Flow ───────────────────────────────────────────────────
    /// Gap between the flow bottom limit (used by `ensure_space`) and the body bottom.
    pub flow_bottom_gap: f64,
    /// Within this distance of the top margin, the cursor counts as "at top".
    pub top_tolerance: f64,
    /// A divider needs at least this much room below it.
    pub divider_min_room: f64,
    pub divider_spacing: f64,
    pub banner_height: f64,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            font_family: FontFamily::Helvetica,
            text: Color::hex("#172B4D"),
            subtle_text: Color::hex("#6B778C"),
            heading_text: Color::hex("#333333"),
            border: Color::hex("#DFE1E6"),
            header_background: Color::hex("#F4F5F7"),
            row_alternate: Color::hex("#FAFBFC"),
            footer_text: Color::hex("#999999"),
            title_size: 16.0,
            identity_size: 11.0,
            section_title_size: 12.0,
            subsection_title_size: 10.0,
            body_size: 8.0,
            footer_size: 8.0,
            cell_padding_x: 6.0,
            cell_padding_y: 4.0,
            header_padding_y: 6.0,
            min_row_height: 18.0,
            min_header_height: 20.0,
            fresh_page_safety: 2.0,
            table_bottom_gap: 20.0,
            table_spacing_after: 6.0,
            rule_width: 0.5,
            flow_bottom_gap: 10.0,
            top_tolerance: 2.0,
            divider_min_room: 24.0,
            divider_spacing: 4.0,
            banner_height: 24.0,
        }
    }
}

impl Theme {
    pub fn body_style(&self) -> TextStyle {
        TextStyle::new(FontFace::Regular, self.body_size, self.text)
    }

    pub fn header_cell_style(&self) -> TextStyle {
        TextStyle::new(FontFace::Bold, self.body_size, self.text)
    }

    pub fn border_stroke(&self) -> Stroke {
        Stroke {
            color: self.border,
            width: self.rule_width,
        }
    }

    /// Advance used by "move down N lines" at a given font size.
    pub fn line_advance(&self, size: f64, lines: f64) -> f64 {
        line_height_for(self.font_family, FontFace::Regular, size) * lines
    }
}

/// Everything a report generation is parameterized by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportConfig {
    pub geometry: PageGeometry,
    pub theme: Theme,
    /// Document title shown at the top of the first page.
    pub title: String,
    /// Author recorded in the PDF info dictionary.
    pub author: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::default(),
            theme: Theme::default(),
            title: "Data Rights Request \u{2014} Audit Report".to_string(),
            author: None,
        }
    }
}

impl ReportConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, DossierError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reject geometry and theme values that cannot produce a document.
    pub fn validate(&self) -> Result<(), DossierError> {
        let g = &self.geometry;
        let t = &self.theme;
        let (w, h) = g.size.dimensions();
        if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            return Err(DossierError::InvalidConfiguration(format!(
                "page size {}x{} must be positive",
                w, h
            )));
        }
        let min_width = min_content_width(t);
        if g.content_width() <= min_width {
            return Err(DossierError::InvalidConfiguration(format!(
                "content width {:.2} is too narrow for the report tables (needs more than {:.2})",
                g.content_width(),
                min_width
            )));
        }
        let table_body = g.body_height() - t.table_bottom_gap;
        if table_body <= t.min_header_height + t.min_row_height {
            return Err(DossierError::InvalidConfiguration(format!(
                "page body of {:.2}pt cannot hold a table header and one row",
                table_body
            )));
        }
        let sizes = [
            t.title_size,
            t.identity_size,
            t.section_title_size,
            t.subsection_title_size,
            t.body_size,
            t.footer_size,
        ];
        if sizes.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
            return Err(DossierError::InvalidConfiguration(
                "font sizes must be positive".to_string(),
            ));
        }
        let stamp_height = line_height_for(t.font_family, FontFace::Regular, t.footer_size);
        if g.footer_height < stamp_height {
            return Err(DossierError::InvalidConfiguration(format!(
                "footer strip of {:.2}pt is shorter than the {:.2}pt page stamp",
                g.footer_height, stamp_height
            )));
        }
        Ok(())
    }
}
