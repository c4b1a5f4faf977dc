//! Deterministic audit report generation.
//!
//! Turns an [`audit_types::AnalysisResult`] into a standalone PDF: a title,
//! the document metadata lines, and a findings table that flows across
//! pages. Built directly on lopdf so that the same result and date always
//! serialize to the same bytes.

pub mod error;
pub mod layout;
pub mod render;

pub use error::ReportError;
pub use layout::artifact_file_name;
pub use render::{generate, render_report, ReportArtifact, REPORT_TITLE};
