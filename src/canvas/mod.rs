//! # Document Canvas
//!
//! The drawing surface every layout component talks to. It owns page
//! creation, measures text, records drawing operations, and keeps all pages
//! buffered so a later pass can revisit them (footer stamping).
//!
//! Layout state is *not* hidden in here: the vertical position lives in an
//! explicit [`LayoutCursor`] passed alongside the canvas. That is what lets
//! the layout code run against a fake recording backend in tests.

use log::trace;

use crate::error::DossierError;
use crate::font::FontContext;
use crate::style::{Color, PageGeometry, Stroke, TextAlign, TextStyle};
use crate::text::TextLayout;

/// Where the next piece of content goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutCursor {
    pub page_index: usize,
    pub y: f64,
}

impl LayoutCursor {
    /// A cursor at the top of the body of the first page.
    pub fn start(geometry: &PageGeometry) -> Self {
        Self {
            page_index: 0,
            y: geometry.body_top(),
        }
    }
}

/// Opaque handle to a buffered page. Ordered by creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageHandle(usize);

impl PageHandle {
    /// Zero-based creation index.
    pub fn index(&self) -> usize {
        self.0
    }

    /// One-based page number for display.
    pub fn number(&self) -> usize {
        self.0 + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle; `y` grows downward from the page top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// The drawing primitives a report needs, plus page management.
pub trait DocumentCanvas {
    fn geometry(&self) -> &PageGeometry;

    /// Height of `text` wrapped at `width`. Deterministic and non-decreasing
    /// in text length for a fixed width and style.
    fn measure_height(&self, text: &str, width: f64, style: &TextStyle) -> Result<f64, DossierError>;

    fn draw_rect(&mut self, rect: Rect, fill: Option<Color>, stroke: Option<Stroke>);

    fn draw_line(&mut self, from: Point, to: Point, stroke: Stroke);

    /// Draw `text` wrapped at `width` with its first line box at `y`.
    /// Returns the height drawn.
    fn draw_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        width: f64,
        style: &TextStyle,
    ) -> Result<f64, DossierError>;

    /// Append a blank page, draw onto it from now on, and move the cursor to
    /// the top of its body. The only operation that changes page count.
    fn add_page(&mut self, cursor: &mut LayoutCursor);

    fn page_count(&self) -> usize;

    /// Every page created so far, in creation order.
    fn buffered_pages(&self) -> Vec<PageHandle> {
        (0..self.page_count()).map(PageHandle).collect()
    }

    /// Redirect drawing to an existing page. Never creates a page.
    fn switch_to_page(&mut self, page: PageHandle) -> Result<(), DossierError>;
}

/// Check the measurement inputs every canvas implementation must reject.
pub fn check_measurable(width: f64, style: &TextStyle) -> Result<(), DossierError> {
    if !(width.is_finite() && width > 0.0) {
        return Err(DossierError::Measurement(format!(
            "text width must be a positive number, got {}",
            width
        )));
    }
    if !(style.size.is_finite() && style.size > 0.0) {
        return Err(DossierError::Measurement(format!(
            "font size must be a positive number, got {}",
            style.size
        )));
    }
    Ok(())
}

/// One positioned line of a text operation. `y` is the top of the line box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// A recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Rect {
        rect: Rect,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Text {
        style: TextStyle,
        lines: Vec<TextLine>,
    },
}

impl DrawOp {
    /// Lowest y this operation touches.
    pub fn bottom(&self, font_context: &FontContext) -> f64 {
        match self {
            DrawOp::Rect { rect, .. } => rect.bottom(),
            DrawOp::Line { from, to, .. } => from.y.max(to.y),
            DrawOp::Text { style, lines } => lines
                .iter()
                .map(|l| l.y + font_context.line_height(style.face, style.size))
                .fold(f64::MIN, f64::max),
        }
    }
}

/// A buffered page: its recorded operations in drawing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// All text drawn on the page, one entry per line.
    pub fn text_lines(&self) -> impl Iterator<Item = &TextLine> {
        self.ops.iter().flat_map(|op| match op {
            DrawOp::Text { lines, .. } => &lines[..],
            _ => &[][..],
        })
    }
}

/// The production canvas: standard-font metrics, recorded pages, handed to
/// the PDF writer once layout and stamping are done.
#[derive(Debug, Clone)]
pub struct PageCanvas {
    geometry: PageGeometry,
    font_context: FontContext,
    text_layout: TextLayout,
    pages: Vec<Page>,
    current: usize,
}

impl PageCanvas {
    /// A canvas with its first page already open.
    pub fn new(geometry: PageGeometry, font_context: FontContext) -> Self {
        Self {
            geometry,
            font_context,
            text_layout: TextLayout::new(),
            pages: vec![Page::default()],
            current: 0,
        }
    }

    pub fn font_context(&self) -> &FontContext {
        &self.font_context
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn current_page(&self) -> PageHandle {
        PageHandle(self.current)
    }

    fn push(&mut self, op: DrawOp) {
        self.pages[self.current].ops.push(op);
    }
}

impl DocumentCanvas for PageCanvas {
    fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    fn measure_height(&self, text: &str, width: f64, style: &TextStyle) -> Result<f64, DossierError> {
        check_measurable(width, style)?;
        Ok(self
            .text_layout
            .measure_height(&self.font_context, text, width, style.face, style.size))
    }

    fn draw_rect(&mut self, rect: Rect, fill: Option<Color>, stroke: Option<Stroke>) {
        self.push(DrawOp::Rect { rect, fill, stroke });
    }

    fn draw_line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.push(DrawOp::Line { from, to, stroke });
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        width: f64,
        style: &TextStyle,
    ) -> Result<f64, DossierError> {
        check_measurable(width, style)?;
        let broken = self.text_layout.break_into_lines(
            &self.font_context,
            text,
            width,
            style.face,
            style.size,
        );
        let line_height = self.font_context.line_height(style.face, style.size);
        let lines: Vec<TextLine> = broken
            .into_iter()
            .enumerate()
            .map(|(i, line)| {
                let offset = match style.align {
                    TextAlign::Left => 0.0,
                    TextAlign::Center => ((width - line.width) / 2.0).max(0.0),
                };
                TextLine {
                    text: line.text,
                    x: x + offset,
                    y: y + i as f64 * line_height,
                }
            })
            .collect();
        let height = lines.len() as f64 * line_height;
        if !lines.is_empty() {
            self.push(DrawOp::Text {
                style: *style,
                lines,
            });
        }
        Ok(height)
    }

    fn add_page(&mut self, cursor: &mut LayoutCursor) {
        self.pages.push(Page::default());
        self.current = self.pages.len() - 1;
        cursor.page_index = self.current;
        cursor.y = self.geometry.body_top();
        trace!("opened page {}", self.current + 1);
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn switch_to_page(&mut self, page: PageHandle) -> Result<(), DossierError> {
        if page.0 >= self.pages.len() {
            return Err(DossierError::PageOutOfRange {
                index: page.0,
                count: self.pages.len(),
            });
        }
        self.current = page.0;
        Ok(())
    }
}
