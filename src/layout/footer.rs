//! # Footer Stamping
//!
//! "Page i of N" can only be drawn once N is known, so stamping is a second
//! pass over the buffered pages after all content has been laid out. The
//! stamp goes into the footer strip, which body layout never enters, so
//! nothing already on a page moves and no page is added.

use log::debug;

use crate::canvas::DocumentCanvas;
use crate::error::DossierError;
use crate::style::{FontFace, TextStyle, Theme};

pub struct FooterStamper<'a> {
    theme: &'a Theme,
}

impl<'a> FooterStamper<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }

    fn style(&self) -> TextStyle {
        TextStyle::new(FontFace::Regular, self.theme.footer_size, self.theme.footer_text).centered()
    }

    /// Stamp every buffered page, then leave drawing on the last page.
    /// Returns the number of pages stamped.
    pub fn stamp(&self, canvas: &mut dyn DocumentCanvas) -> Result<usize, DossierError> {
        let pages = canvas.buffered_pages();
        let total = pages.len();
        let geometry = *canvas.geometry();
        let style = self.style();
        let width = geometry.width();
        let (strip_top, strip_bottom) = geometry.footer_strip();

        for page in &pages {
            canvas.switch_to_page(*page)?;
            let label = format!("Page {} of {}", page.number(), total);
            let height = canvas.measure_height(&label, width, &style)?;
            // Sit on the bottom edge of the strip.
            let y = strip_top.max(strip_bottom - height);
            canvas.draw_text(&label, 0.0, y, width, &style)?;
        }

        if let Some(last) = pages.last() {
            canvas.switch_to_page(*last)?;
        }

        if canvas.page_count() != total {
            return Err(DossierError::PageCountChanged {
                before: total,
                after: canvas.page_count(),
            });
        }

        debug!("stamped {} pages", total);
        Ok(total)
    }
}
