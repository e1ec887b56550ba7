//! # Tables
//!
//! Header band, rows, per-row pagination with the header repeated on every
//! new page, zebra striping, and truncation of rows too tall for any page.
//!
//! Rows are never split across pages and never dropped. A row that does not
//! fit the rest of the current page moves to the next one; a row that would
//! not fit even an empty page is truncated first.

use log::debug;
use serde_json::Value;

use crate::canvas::{DocumentCanvas, LayoutCursor, Point, Rect};
use crate::error::DossierError;
use crate::layout::truncate::fit_row_to_height;
use crate::style::Theme;

/// Maps a raw cell value to display text.
pub type CellRenderer = fn(&Value) -> String;

/// A row: raw values keyed by column key.
pub type Row = serde_json::Map<String, Value>;

/// One table column.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub header: String,
    pub key: String,
    pub width: f64,
    pub render: Option<CellRenderer>,
}

impl ColumnSpec {
    pub fn new(header: &str, key: &str, width: f64) -> Self {
        Self {
            header: header.to_string(),
            key: key.to_string(),
            width,
            render: None,
        }
    }

    pub fn with_render(mut self, render: CellRenderer) -> Self {
        self.render = Some(render);
        self
    }

    /// Display text for this column's cell in `row`.
    pub fn cell_text(&self, row: &Row) -> String {
        let raw = row.get(&self.key).unwrap_or(&Value::Null);
        match self.render {
            Some(render) => render(raw),
            None => plain_text(raw),
        }
    }
}

/// Default cell rendering: strings verbatim, null as empty, anything else
/// in its JSON form.
pub fn plain_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TableOptions {
    pub zebra: bool,
}

/// What a table render decided, for callers and tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSummary {
    pub header_height: f64,
    pub row_heights: Vec<f64>,
    /// Indices of rows that were placed at the top of a new page.
    pub page_breaks: Vec<usize>,
    /// Indices of rows whose text was truncated.
    pub truncated_rows: Vec<usize>,
}

/// Scale widths down proportionally when their sum exceeds `available`.
/// Widths that already fit are returned unchanged.
pub fn normalize_widths(widths: &[f64], available: f64) -> Vec<f64> {
    let sum: f64 = widths.iter().sum();
    if sum <= available || sum <= 0.0 {
        return widths.to_vec();
    }
    let scale = available / sum;
    widths.iter().map(|w| w * scale).collect()
}

pub struct TableRenderer<'a> {
    theme: &'a Theme,
}

impl<'a> TableRenderer<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }

    /// Lowest y a table row may reach.
    pub fn bottom_limit(&self, canvas: &dyn DocumentCanvas) -> f64 {
        canvas.geometry().body_bottom() - self.theme.table_bottom_gap
    }

    /// Draw the table at the cursor, paginating as needed.
    pub fn render(
        &self,
        canvas: &mut dyn DocumentCanvas,
        cursor: &mut LayoutCursor,
        columns: &[ColumnSpec],
        rows: &[Row],
        options: TableOptions,
    ) -> Result<TableSummary, DossierError> {
        let theme = self.theme;
        let geometry = *canvas.geometry();
        let left = geometry.content_left();
        let table_width = geometry.content_width();
        let widths = normalize_widths(
            &columns.iter().map(|c| c.width).collect::<Vec<_>>(),
            table_width,
        );
        let text_widths: Vec<f64> = widths
            .iter()
            .map(|w| w - 2.0 * theme.cell_padding_x)
            .collect();
        let headers: Vec<&str> = columns.iter().map(|c| c.header.as_str()).collect();

        let header_style = theme.header_cell_style();
        let mut header_height: f64 = 0.0;
        for (label, &width) in headers.iter().zip(&text_widths) {
            header_height = header_height.max(canvas.measure_height(label, width, &header_style)?);
        }
        let header_height =
            (header_height + 2.0 * theme.header_padding_y).max(theme.min_header_height);

        self.draw_header(canvas, cursor, &headers, &widths, header_height)?;

        let bottom_limit = self.bottom_limit(canvas);
        let fresh_page_max =
            (bottom_limit - geometry.body_top()) - header_height - theme.fresh_page_safety;

        let cell_style = theme.body_style();
        let mut summary = TableSummary {
            header_height,
            ..Default::default()
        };

        for (idx, row) in rows.iter().enumerate() {
            let mut texts: Vec<String> = columns.iter().map(|c| c.cell_text(row)).collect();
            let mut row_height = self.row_height(canvas, &texts, &text_widths)?;

            if row_height > fresh_page_max {
                let target = fresh_page_max - 2.0 * theme.cell_padding_y;
                debug!(
                    "row {} is {:.2}pt, over the {:.2}pt fresh-page maximum; truncating",
                    idx, row_height, fresh_page_max
                );
                texts = fit_row_to_height(canvas, &text_widths, &texts, target, &cell_style)?;
                row_height = self.row_height(canvas, &texts, &text_widths)?;
                summary.truncated_rows.push(idx);
            }

            if cursor.y + row_height > bottom_limit {
                canvas.add_page(cursor);
                debug!("table continues on page {} at row {}", cursor.page_index + 1, idx);
                self.draw_header(canvas, cursor, &headers, &widths, header_height)?;
                summary.page_breaks.push(idx);
            }

            let y = cursor.y;
            if options.zebra && idx % 2 == 1 {
                canvas.draw_rect(
                    Rect::new(left, y, table_width, row_height),
                    Some(theme.row_alternate),
                    None,
                );
            }

            canvas.draw_line(
                Point::new(left, y + row_height),
                Point::new(left + table_width, y + row_height),
                theme.border_stroke(),
            );

            let mut x = left;
            for ((text, &width), &text_width) in texts.iter().zip(&widths).zip(&text_widths) {
                canvas.draw_text(
                    text,
                    x + theme.cell_padding_x,
                    y + theme.cell_padding_y,
                    text_width,
                    &cell_style,
                )?;
                x += width;
            }

            cursor.y += row_height;
            summary.row_heights.push(row_height);
        }

        Ok(summary)
    }

    fn row_height(
        &self,
        canvas: &dyn DocumentCanvas,
        texts: &[String],
        text_widths: &[f64],
    ) -> Result<f64, DossierError> {
        let style = self.theme.body_style();
        let mut tallest: f64 = 0.0;
        for (text, &width) in texts.iter().zip(text_widths) {
            tallest = tallest.max(canvas.measure_height(text, width, &style)?);
        }
        Ok((tallest + 2.0 * self.theme.cell_padding_y).max(self.theme.min_row_height))
    }

    fn draw_header(
        &self,
        canvas: &mut dyn DocumentCanvas,
        cursor: &mut LayoutCursor,
        headers: &[&str],
        widths: &[f64],
        height: f64,
    ) -> Result<(), DossierError> {
        let theme = self.theme;
        let geometry = *canvas.geometry();
        let band = Rect::new(geometry.content_left(), cursor.y, geometry.content_width(), height);
        canvas.draw_rect(band, Some(theme.header_background), None);
        canvas.draw_rect(band, None, Some(theme.border_stroke()));

        let style = theme.header_cell_style();
        let mut x = band.x;
        for (label, &width) in headers.iter().zip(widths) {
            canvas.draw_text(
                label,
                x + theme.cell_padding_x,
                cursor.y + theme.header_padding_y,
                width - 2.0 * theme.cell_padding_x,
                &style,
            )?;
            x += width;
        }
        cursor.y += height;
        Ok(())
    }
}
