//! # Dossier
//!
//! A paginated audit-report engine.
//!
//! A case (one parent issue plus its subtasks, each with comments and a
//! field-change log) goes in; a fixed-page-size PDF comes out. Layout is
//! done against the page: every block checks the room left before it is
//! placed, tables repeat their header on each page they reach, rows too
//! tall for any page are truncated with an ellipsis, and "Page i of N" is
//! stamped into a reserved strip once N is known.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON)
//!       ↓
//!   [model]    — Case records, comments, activity
//!       ↓
//!   [layout]   — Sections, tables, truncation, page breaks, footers
//!       ↓
//!   [canvas]   — Measures text, records drawing per buffered page
//!       ↓
//!   [pdf]      — Serialize to PDF bytes
//! ```

pub mod canvas;
pub mod error;
pub mod font;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod report;
pub mod style;
pub mod text;

use error::DossierError;
use model::{CaseRecord, ReportRequest};
use report::{ReportArtifact, ReportComposer};

/// Generate the audit report for a parent issue and its subtasks with the
/// default configuration.
pub fn generate(parent: &CaseRecord, subtasks: &[CaseRecord]) -> Result<ReportArtifact, DossierError> {
    ReportComposer::default().generate(parent, subtasks)
}

/// Generate a report from a JSON request `{ "parent": .., "subtasks": [..] }`.
pub fn generate_json(json: &str) -> Result<ReportArtifact, DossierError> {
    let request = ReportRequest::from_json(json)?;
    generate(&request.parent, &request.subtasks)
}
