//! # Report Composition
//!
//! One generation call: validate the configuration, lay every section out on
//! a fresh canvas, stamp the page numbers, serialize. Nothing is shared
//! between calls, and a failure anywhere returns the error and no bytes.

use log::{debug, info};

use crate::canvas::{DocumentCanvas, LayoutCursor, PageCanvas};
use crate::error::DossierError;
use crate::font::FontContext;
use crate::layout::footer::FooterStamper;
use crate::layout::LayoutEngine;
use crate::model::CaseRecord;
use crate::pdf::{DocumentInfo, PdfWriter};
use crate::style::ReportConfig;

/// A finished report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportArtifact {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub size: usize,
}

/// The file name a report for `key` is saved under.
pub fn report_filename(key: &str) -> String {
    format!("{} - Audit Report.pdf", key)
}

#[derive(Debug, Clone, Default)]
pub struct ReportComposer {
    config: ReportConfig,
}

impl ReportComposer {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Lay out the report and stamp footers on any canvas.
    pub fn compose(
        &self,
        canvas: &mut dyn DocumentCanvas,
        cursor: &mut LayoutCursor,
        parent: &CaseRecord,
        subtasks: &[CaseRecord],
    ) -> Result<usize, DossierError> {
        let theme = &self.config.theme;
        LayoutEngine::new(theme, &self.config.title).layout_report(canvas, cursor, parent, subtasks)?;
        FooterStamper::new(theme).stamp(canvas)
    }

    /// Produce the PDF for `parent` and its `subtasks`.
    pub fn generate(
        &self,
        parent: &CaseRecord,
        subtasks: &[CaseRecord],
    ) -> Result<ReportArtifact, DossierError> {
        self.config.validate()?;

        let geometry = self.config.geometry;
        let font_context = FontContext::new(self.config.theme.font_family);
        let mut canvas = PageCanvas::new(geometry, font_context);
        let mut cursor = LayoutCursor::start(&geometry);

        let pages = self.compose(&mut canvas, &mut cursor, parent, subtasks)?;
        debug!("{} composed into {} pages", parent.key, pages);

        let info = DocumentInfo {
            title: Some(format!("{} \u{2014} {}", self.config.title, parent.key)),
            author: self.config.author.clone(),
            subject: Some(parent.summary.clone()).filter(|s| !s.is_empty()),
        };
        let bytes = PdfWriter::new(&geometry, &font_context).write(canvas.pages(), &info)?;

        let artifact = ReportArtifact {
            size: bytes.len(),
            bytes,
            filename: report_filename(&parent.key),
        };
        info!(
            "generated {} ({} bytes, {} pages)",
            artifact.filename, artifact.size, pages
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Comment;
    use crate::style::{PageGeometry, PageSize};

    fn parent() -> CaseRecord {
        CaseRecord {
            key: "CWP-904".to_string(),
            summary: "Erase customer data".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn filename_follows_key() {
        assert_eq!(report_filename("CWP-1"), "CWP-1 - Audit Report.pdf");
    }

    #[test]
    fn generates_pdf_bytes() {
        let artifact = ReportComposer::default().generate(&parent(), &[]).unwrap();
        assert!(artifact.bytes.starts_with(b"%PDF-1.7"));
        assert_eq!(artifact.size, artifact.bytes.len());
        assert_eq!(artifact.filename, "CWP-904 - Audit Report.pdf");
    }

    #[test]
    fn generation_is_deterministic() {
        let mut p = parent();
        p.comments = (0..40)
            .map(|i| Comment {
                author: Some("Ops".into()),
                created: None,
                body: format!("Follow-up {} on the erasure request.", i),
            })
            .collect();
        let subtasks = vec![parent(), parent()];
        let composer = ReportComposer::default();
        let a = composer.generate(&p, &subtasks).unwrap();
        let b = composer.generate(&p, &subtasks).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_configuration_aborts() {
        let config = ReportConfig {
            geometry: PageGeometry {
                footer_height: 2.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = ReportComposer::new(config).generate(&parent(), &[]).unwrap_err();
        assert!(matches!(err, DossierError::InvalidConfiguration(_)));
    }

    #[test]
    fn narrowest_valid_page_still_generates() {
        let mut config = ReportConfig::default();
        config.geometry.size = PageSize::Custom {
            width: 283.0,
            height: 841.89,
        };
        config.validate().unwrap();
        let mut p = parent();
        p.comments = vec![Comment {
            author: Some("Ops".into()),
            created: Some("2024-01-05T10:00:00.000+0000".into()),
            body: "Erasure confirmed by the data team.".into(),
        }];
        let artifact = ReportComposer::new(config).generate(&p, &[parent()]).unwrap();
        assert!(artifact.bytes.starts_with(b"%PDF-1.7"));
    }
}
