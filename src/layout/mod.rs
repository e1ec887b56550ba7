//! # Report Layout
//!
//! Places the fixed sections of an audit report onto the canvas, top to
//! bottom, breaking pages as it goes. Tables are delegated to
//! [`table::TableRenderer`]; everything else (titles, banners, notes, meta
//! lines) is flowing text placed at the cursor.
//!
//! Every block that must not be orphaned at the bottom of a page asks
//! [`LayoutEngine::ensure_space`] first. That is the only place a flow-level
//! page break or a divider rule is introduced.

pub mod footer;
pub mod page_break;
pub mod table;
pub mod truncate;

use log::{debug, trace};
use serde_json::Value;

use crate::canvas::{DocumentCanvas, LayoutCursor, Point, Rect};
use crate::error::DossierError;
use crate::model::dates::{format_date, render_date};
use crate::model::{ActivityItem, CaseRecord, Comment};
use crate::style::{FontFace, Stroke, TextStyle, Theme};

use page_break::{decide_space, SpaceDecision, SpaceQuery};
use table::{ColumnSpec, Row, TableOptions, TableRenderer, TableSummary};
use truncate::fit_to_height;

// Room each block asks for before it is placed.
const SECTION_TITLE_ROOM: f64 = 28.0;
const SUBSECTION_TITLE_ROOM: f64 = 24.0;
const TABLE_ROOM: f64 = 28.0;
const BANNER_ROOM: f64 = 36.0;
const SUBTASK_ROOM: f64 = 120.0;
const META_ROOM: f64 = 20.0;

const BANNER_INSET_X: f64 = 8.0;
const BANNER_INSET_Y: f64 = 6.0;
const BANNER_GAP_AFTER: f64 = 2.0;
const HEADER_RULE_WIDTH: f64 = 1.0;

const DETAILS_FIELD_WIDTH: f64 = 130.0;
const COMMENT_AUTHOR_WIDTH: f64 = 120.0;
const COMMENT_CREATED_WIDTH: f64 = 90.0;

/// Narrowest content width at which every report table still leaves its
/// flexible column some room for text.
pub fn min_content_width(theme: &Theme) -> f64 {
    let fixed = (COMMENT_AUTHOR_WIDTH + COMMENT_CREATED_WIDTH).max(DETAILS_FIELD_WIDTH);
    fixed + 2.0 * theme.cell_padding_x
}

pub struct LayoutEngine<'a> {
    theme: &'a Theme,
    title: &'a str,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(theme: &'a Theme, title: &'a str) -> Self {
        Self { theme, title }
    }

    /// Lowest y a flowing block may be asked to reach.
    pub fn flow_bottom_limit(&self, canvas: &dyn DocumentCanvas) -> f64 {
        canvas.geometry().body_bottom() - self.theme.flow_bottom_gap
    }

    /// Make sure `needed` points remain on the current page, breaking to a
    /// new one if not. When `divider` is set and the block stays on this
    /// page, a thin rule separates it from the previous block.
    pub fn ensure_space(
        &self,
        canvas: &mut dyn DocumentCanvas,
        cursor: &mut LayoutCursor,
        needed: f64,
        divider: bool,
    ) -> SpaceDecision {
        let geometry = *canvas.geometry();
        let decision = decide_space(SpaceQuery {
            y: cursor.y,
            body_top: geometry.body_top(),
            bottom_limit: self.flow_bottom_limit(canvas),
            needed,
            wants_divider: divider,
            top_tolerance: self.theme.top_tolerance,
            divider_min_room: self.theme.divider_min_room,
        });

        match decision {
            SpaceDecision::NewPage => {
                trace!(
                    "{:.2}pt needed at y={:.2}; breaking to a new page",
                    needed,
                    cursor.y
                );
                canvas.add_page(cursor);
            }
            SpaceDecision::Divider => {
                canvas.draw_line(
                    Point::new(geometry.content_left(), cursor.y),
                    Point::new(geometry.content_right(), cursor.y),
                    self.theme.border_stroke(),
                );
                cursor.y += self.theme.divider_spacing;
            }
            SpaceDecision::Proceed => {}
        }
        decision
    }

    /// The whole report: header, parent sections, then one block per subtask.
    pub fn layout_report(
        &self,
        canvas: &mut dyn DocumentCanvas,
        cursor: &mut LayoutCursor,
        parent: &CaseRecord,
        subtasks: &[CaseRecord],
    ) -> Result<(), DossierError> {
        self.header_block(canvas, cursor, parent)?;

        self.section_title(canvas, cursor, "Parent Issue Details")?;
        self.details_table(canvas, cursor, parent)?;

        self.section_title(canvas, cursor, "Parent Issue Changelog")?;
        self.changelog_section(canvas, cursor, &parent.activity)?;

        self.section_title(canvas, cursor, "Parent Issue Comments")?;
        self.comments_section(canvas, cursor, &parent.comments)?;

        if !subtasks.is_empty() {
            self.section_title(canvas, cursor, "Related Tasks")?;
            for (i, task) in subtasks.iter().enumerate() {
                self.layout_subtask(canvas, cursor, task, i + 1)?;
            }
        }

        debug!(
            "laid out {} with {} subtasks over {} pages",
            parent.key,
            subtasks.len(),
            canvas.page_count()
        );
        Ok(())
    }

    /// Title, identity line, facts line and a full-width rule.
    pub fn header_block(
        &self,
        canvas: &mut dyn DocumentCanvas,
        cursor: &mut LayoutCursor,
        parent: &CaseRecord,
    ) -> Result<(), DossierError> {
        let t = self.theme;

        let title = TextStyle::new(FontFace::Bold, t.title_size, t.text).centered();
        self.flow_text(canvas, cursor, self.title, &title)?;
        self.move_down(cursor, t.title_size, 0.3);

        let identity = TextStyle::new(FontFace::Bold, t.identity_size, t.heading_text).centered();
        self.flow_text(canvas, cursor, &parent.identity(), &identity)?;
        self.move_down(cursor, t.identity_size, 0.2);

        let facts = format!(
            "Assignee: {} | Status: {} | Resolved: {} | Priority: {}",
            parent.assignee_name(),
            parent.status_label(),
            parent.resolved_label(),
            parent.priority_label()
        );
        let facts_style = TextStyle::new(FontFace::Regular, t.body_size, t.subtle_text).centered();
        self.flow_text(canvas, cursor, &facts, &facts_style)?;
        self.move_down(cursor, t.body_size, 0.6);

        let geometry = *canvas.geometry();
        canvas.draw_line(
            Point::new(geometry.content_left(), cursor.y),
            Point::new(geometry.content_right(), cursor.y),
            Stroke {
                color: t.border,
                width: HEADER_RULE_WIDTH,
            },
        );
        self.move_down(cursor, t.body_size, 0.8);
        Ok(())
    }

    pub fn section_title(
        &self,
        canvas: &mut dyn DocumentCanvas,
        cursor: &mut LayoutCursor,
        text: &str,
    ) -> Result<(), DossierError> {
        let t = self.theme;
        self.ensure_space(canvas, cursor, SECTION_TITLE_ROOM, true);
        let style = TextStyle::new(FontFace::Bold, t.section_title_size, t.text);
        self.flow_text(canvas, cursor, text, &style)?;
        self.move_down(cursor, t.section_title_size, 0.2);
        Ok(())
    }

    pub fn subsection_title(
        &self,
        canvas: &mut dyn DocumentCanvas,
        cursor: &mut LayoutCursor,
        text: &str,
    ) -> Result<(), DossierError> {
        let t = self.theme;
        self.ensure_space(canvas, cursor, SUBSECTION_TITLE_ROOM, true);
        let style = TextStyle::new(FontFace::Bold, t.subsection_title_size, t.heading_text);
        self.flow_text(canvas, cursor, text, &style)?;
        self.move_down(cursor, t.subsection_title_size, 0.1);
        Ok(())
    }

    /// Italic placeholder for a section with nothing in it.
    pub fn empty_note(
        &self,
        canvas: &mut dyn DocumentCanvas,
        cursor: &mut LayoutCursor,
        text: &str,
    ) -> Result<(), DossierError> {
        let t = self.theme;
        let style = TextStyle::new(FontFace::Oblique, t.body_size, t.subtle_text);
        self.flow_text(canvas, cursor, text, &style)?;
        self.move_down(cursor, t.body_size, 0.3);
        Ok(())
    }

    /// Field/Value table of the parent's own attributes.
    pub fn details_table(
        &self,
        canvas: &mut dyn DocumentCanvas,
        cursor: &mut LayoutCursor,
        issue: &CaseRecord,
    ) -> Result<TableSummary, DossierError> {
        let width = canvas.geometry().content_width();
        let columns = vec![
            ColumnSpec::new("Field", "field", DETAILS_FIELD_WIDTH),
            ColumnSpec::new("Value", "value", width - DETAILS_FIELD_WIDTH),
        ];

        let or_na = |s: &str| if s.is_empty() { "N/A".to_string() } else { s.to_string() };
        let details = [
            ("Key", or_na(&issue.key)),
            ("Summary", or_na(&issue.summary)),
            ("Type", issue.type_label().to_string()),
            ("Assignee", issue.assignee_name().to_string()),
            ("Status", issue.status_label().to_string()),
            ("Priority", issue.priority_label().to_string()),
            ("Closed Date", issue.resolved_label()),
        ];
        let rows: Vec<Row> = details
            .into_iter()
            .map(|(field, value)| {
                build_row([("field", Value::from(field)), ("value", Value::from(value))])
            })
            .collect();

        self.table(canvas, cursor, &columns, &rows)
    }

    /// The changelog table, or a note when there is no activity.
    pub fn changelog_section(
        &self,
        canvas: &mut dyn DocumentCanvas,
        cursor: &mut LayoutCursor,
        activity: &[ActivityItem],
    ) -> Result<(), DossierError> {
        if activity.is_empty() {
            return self.empty_note(canvas, cursor, "No changelog entries");
        }
        let columns = vec![
            ColumnSpec::new("Author", "author", 100.0),
            ColumnSpec::new("Field", "field", 100.0),
            ColumnSpec::new("From", "fromString", 170.0),
            ColumnSpec::new("To", "toString", 170.0),
            ColumnSpec::new("Date", "created", 90.0).with_render(render_date),
        ];
        let rows: Vec<Row> = activity
            .iter()
            .map(|a| {
                build_row([
                    ("author", Value::from(a.author.clone().unwrap_or_default())),
                    ("field", Value::from(a.field.clone())),
                    ("fromString", Value::from(a.from_value.clone())),
                    ("toString", Value::from(a.to_value.clone())),
                    ("created", optional(&a.created)),
                ])
            })
            .collect();
        self.table(canvas, cursor, &columns, &rows)?;
        Ok(())
    }

    /// The comments table, or a note when there are none.
    pub fn comments_section(
        &self,
        canvas: &mut dyn DocumentCanvas,
        cursor: &mut LayoutCursor,
        comments: &[Comment],
    ) -> Result<(), DossierError> {
        if comments.is_empty() {
            return self.empty_note(canvas, cursor, "No comments");
        }
        let width = canvas.geometry().content_width();
        let columns = vec![
            ColumnSpec::new("Author", "author", COMMENT_AUTHOR_WIDTH),
            ColumnSpec::new("Created", "created", COMMENT_CREATED_WIDTH).with_render(render_date),
            ColumnSpec::new(
                "Comment",
                "body",
                width - COMMENT_AUTHOR_WIDTH - COMMENT_CREATED_WIDTH,
            ),
        ];
        let rows: Vec<Row> = comments
            .iter()
            .map(|c| {
                let author = c
                    .author
                    .clone()
                    .filter(|a| !a.is_empty())
                    .unwrap_or_else(|| "Unknown".to_string());
                build_row([
                    ("author", Value::from(author)),
                    ("created", optional(&c.created)),
                    ("body", Value::from(c.body.clone())),
                ])
            })
            .collect();
        self.table(canvas, cursor, &columns, &rows)?;
        Ok(())
    }

    /// One subtask block: banner, meta line, changelog and comments.
    /// `index` is one-based.
    pub fn layout_subtask(
        &self,
        canvas: &mut dyn DocumentCanvas,
        cursor: &mut LayoutCursor,
        task: &CaseRecord,
        index: usize,
    ) -> Result<(), DossierError> {
        self.ensure_space(canvas, cursor, SUBTASK_ROOM, true);
        self.banner(canvas, cursor, &format!("Task {}: {}", index, task.identity()))?;
        self.meta_line(canvas, cursor, task)?;

        self.subsection_title(canvas, cursor, "Changelog")?;
        self.changelog_section(canvas, cursor, &task.activity)?;

        self.subsection_title(canvas, cursor, "Comments")?;
        self.comments_section(canvas, cursor, &task.comments)?;
        Ok(())
    }

    /// Filled band with a bold one-line label. Never split across pages.
    fn banner(
        &self,
        canvas: &mut dyn DocumentCanvas,
        cursor: &mut LayoutCursor,
        label: &str,
    ) -> Result<(), DossierError> {
        let t = self.theme;
        self.ensure_space(canvas, cursor, BANNER_ROOM, true);

        let geometry = *canvas.geometry();
        let y = cursor.y;
        let band = Rect::new(geometry.content_left(), y, geometry.content_width(), t.banner_height);
        canvas.draw_rect(band, Some(t.header_background), None);

        let style = TextStyle::new(FontFace::Bold, t.subsection_title_size, t.text);
        let text_width = band.width - 2.0 * BANNER_INSET_X;
        let label = fit_to_height(
            canvas,
            label,
            text_width,
            t.banner_height - 2.0 * BANNER_INSET_Y,
            &style,
        )?;
        canvas.draw_text(&label, band.x + BANNER_INSET_X, y + BANNER_INSET_Y, text_width, &style)?;

        cursor.y = y + t.banner_height + BANNER_GAP_AFTER;
        Ok(())
    }

    fn meta_line(
        &self,
        canvas: &mut dyn DocumentCanvas,
        cursor: &mut LayoutCursor,
        task: &CaseRecord,
    ) -> Result<(), DossierError> {
        let t = self.theme;
        self.ensure_space(canvas, cursor, META_ROOM, true);
        let meta = format!(
            "Status: {} | Assignee: {} | Closed: {}",
            task.status_label(),
            task.assignee_name(),
            format_date(task.resolution_date.as_deref())
        );
        let style = TextStyle::new(FontFace::Regular, t.body_size, t.subtle_text);
        self.flow_text(canvas, cursor, &meta, &style)?;
        self.move_down(cursor, t.body_size, 0.2);
        Ok(())
    }

    fn table(
        &self,
        canvas: &mut dyn DocumentCanvas,
        cursor: &mut LayoutCursor,
        columns: &[ColumnSpec],
        rows: &[Row],
    ) -> Result<TableSummary, DossierError> {
        self.ensure_space(canvas, cursor, TABLE_ROOM, true);
        let summary = TableRenderer::new(self.theme).render(
            canvas,
            cursor,
            columns,
            rows,
            TableOptions { zebra: true },
        )?;
        cursor.y += self.theme.table_spacing_after;
        Ok(summary)
    }

    /// Draw text across the content width at the cursor and advance past it.
    /// Text that would run into the footer strip starts a new page instead.
    fn flow_text(
        &self,
        canvas: &mut dyn DocumentCanvas,
        cursor: &mut LayoutCursor,
        text: &str,
        style: &TextStyle,
    ) -> Result<(), DossierError> {
        let geometry = *canvas.geometry();
        let width = geometry.content_width();
        let height = canvas.measure_height(text, width, style)?;
        if cursor.y + height > geometry.body_bottom() && cursor.y > geometry.body_top() {
            canvas.add_page(cursor);
        }
        let drawn = canvas.draw_text(text, geometry.content_left(), cursor.y, width, style)?;
        cursor.y += drawn;
        Ok(())
    }

    fn move_down(&self, cursor: &mut LayoutCursor, size: f64, lines: f64) {
        cursor.y += self.theme.line_advance(size, lines);
    }
}

fn build_row<const N: usize>(cells: [(&str, Value); N]) -> Row {
    cells
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn optional(value: &Option<String>) -> Value {
    value.clone().map(Value::from).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawOp, PageCanvas};
    use crate::font::FontContext;
    use crate::model::Assignee;
    use crate::style::{FontFamily, PageGeometry};

    fn canvas() -> PageCanvas {
        PageCanvas::new(PageGeometry::default(), FontContext::new(FontFamily::Helvetica))
    }

    fn record(key: &str) -> CaseRecord {
        CaseRecord {
            key: key.to_string(),
            summary: "Erase customer data".to_string(),
            assignee: Some(Assignee {
                name: Some("Dana Lee".to_string()),
                avatar_url: None,
            }),
            status: Some("Done".to_string()),
            ..Default::default()
        }
    }

    fn texts(c: &PageCanvas, page: usize) -> Vec<String> {
        c.pages()[page].text_lines().map(|l| l.text.clone()).collect()
    }

    fn lines_on(c: &PageCanvas, page: usize) -> Vec<(Point, Point)> {
        c.pages()[page]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Line { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn ensure_space_breaks_when_block_does_not_fit() {
        let theme = Theme::default();
        let engine = LayoutEngine::new(&theme, "Report");
        let mut c = canvas();
        let limit = engine.flow_bottom_limit(&c);
        let mut cursor = LayoutCursor { page_index: 0, y: limit - 100.0 };
        let decision = engine.ensure_space(&mut c, &mut cursor, 120.0, true);
        assert_eq!(decision, SpaceDecision::NewPage);
        assert_eq!(c.page_count(), 2);
        assert_eq!(cursor.y, c.geometry().body_top());
        assert!(c.pages()[1].ops.is_empty());
    }

    #[test]
    fn ensure_space_draws_divider_mid_page() {
        let theme = Theme::default();
        let engine = LayoutEngine::new(&theme, "Report");
        let mut c = canvas();
        let mut cursor = LayoutCursor { page_index: 0, y: 300.0 };
        assert_eq!(engine.ensure_space(&mut c, &mut cursor, 28.0, true), SpaceDecision::Divider);
        assert_eq!(cursor.y, 300.0 + theme.divider_spacing);
        assert_eq!(lines_on(&c, 0).len(), 1);
    }

    #[test]
    fn ensure_space_skips_divider_at_top() {
        let theme = Theme::default();
        let engine = LayoutEngine::new(&theme, "Report");
        let mut c = canvas();
        let mut cursor = LayoutCursor::start(c.geometry());
        assert_eq!(engine.ensure_space(&mut c, &mut cursor, 28.0, true), SpaceDecision::Proceed);
        assert!(c.pages()[0].ops.is_empty());
    }

    #[test]
    fn report_without_subtasks_has_all_parent_sections() {
        let theme = Theme::default();
        let engine = LayoutEngine::new(&theme, "Audit Report");
        let mut c = canvas();
        let mut cursor = LayoutCursor::start(c.geometry());
        engine.layout_report(&mut c, &mut cursor, &record("CWP-1"), &[]).unwrap();

        assert_eq!(c.page_count(), 1);
        let all = texts(&c, 0);
        for expected in [
            "Audit Report",
            "Parent Issue Details",
            "Parent Issue Changelog",
            "No changelog entries",
            "Parent Issue Comments",
            "No comments",
        ] {
            assert!(all.iter().any(|t| t == expected), "missing {:?}", expected);
        }
        assert!(!all.iter().any(|t| t == "Related Tasks"));
    }

    #[test]
    fn details_table_fills_placeholders() {
        let theme = Theme::default();
        let engine = LayoutEngine::new(&theme, "Report");
        let mut c = canvas();
        let mut cursor = LayoutCursor::start(c.geometry());
        let summary = engine
            .details_table(&mut c, &mut cursor, &CaseRecord { key: "K-1".into(), ..Default::default() })
            .unwrap();
        assert_eq!(summary.row_heights.len(), 7);
        let all = texts(&c, 0);
        for expected in ["K-1", "Unknown", "Unassigned", "None", "N/A"] {
            assert!(all.iter().any(|t| t == expected), "missing {:?}", expected);
        }
    }

    #[test]
    fn subtask_banner_moves_to_next_page_when_room_is_short() {
        let theme = Theme::default();
        let engine = LayoutEngine::new(&theme, "Report");
        let mut c = canvas();
        let limit = engine.flow_bottom_limit(&c);
        let mut cursor = LayoutCursor { page_index: 0, y: limit - 100.0 };
        engine.layout_subtask(&mut c, &mut cursor, &record("CWP-2"), 1).unwrap();

        assert!(texts(&c, 0).is_empty());
        let banner = c.pages()[1]
            .ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Rect { rect, fill: Some(_), .. } => Some(*rect),
                _ => None,
            })
            .unwrap();
        assert_eq!(banner.y, c.geometry().body_top());
        assert_eq!(banner.height, theme.banner_height);
        assert!(texts(&c, 1)[0].starts_with("Task 1: CWP-2"));
    }

    #[test]
    fn long_banner_label_stays_on_one_line() {
        let theme = Theme::default();
        let engine = LayoutEngine::new(&theme, "Report");
        let mut c = canvas();
        let mut cursor = LayoutCursor::start(c.geometry());
        let mut task = record("CWP-3");
        task.summary = "Remove every trace of the account from analytics exports ".repeat(8);
        engine.layout_subtask(&mut c, &mut cursor, &task, 3).unwrap();
        let labels: Vec<String> = texts(&c, 0)
            .into_iter()
            .filter(|t| t.starts_with("Task 3"))
            .collect();
        assert_eq!(labels.len(), 1);
        assert!(labels[0].ends_with(truncate::ELLIPSIS));
    }

    #[test]
    fn content_never_enters_footer_strip() {
        let theme = Theme::default();
        let engine = LayoutEngine::new(&theme, "Report");
        let mut c = canvas();
        let mut cursor = LayoutCursor::start(c.geometry());
        let mut parent = record("CWP-4");
        parent.comments = (0..80)
            .map(|i| Comment {
                author: Some("Ops".into()),
                created: Some("2024-01-05T10:00:00Z".into()),
                body: format!("Checked system {} and confirmed deletion.", i),
            })
            .collect();
        let subtasks: Vec<CaseRecord> = (0..6).map(|i| record(&format!("CWP-{}", 10 + i))).collect();
        engine.layout_report(&mut c, &mut cursor, &parent, &subtasks).unwrap();

        assert!(c.page_count() > 1);
        let body_bottom = c.geometry().body_bottom();
        let fc = *c.font_context();
        for page in c.pages() {
            for op in &page.ops {
                assert!(op.bottom(&fc) <= body_bottom + 1e-6, "{:?}", op);
            }
        }
    }

    #[test]
    fn no_divider_is_first_on_any_page() {
        let theme = Theme::default();
        let engine = LayoutEngine::new(&theme, "Report");
        let mut c = canvas();
        let mut cursor = LayoutCursor::start(c.geometry());
        let subtasks: Vec<CaseRecord> = (0..25).map(|i| record(&format!("CWP-{}", 100 + i))).collect();
        engine.layout_report(&mut c, &mut cursor, &record("CWP-99"), &subtasks).unwrap();
        assert!(c.page_count() > 2);
        for page in c.pages() {
            if let Some(first) = page.ops.first() {
                assert!(!matches!(first, DrawOp::Line { .. }), "page opens with a rule");
            }
        }
    }
}
