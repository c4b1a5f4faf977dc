//! Findings presentation: the expansion state and the serializable
//! render model for the results area.

use serde::{Deserialize, Serialize};

use audit_types::AnalysisResult;

/// Display lines the host clamps a collapsed row to
pub const PREVIEW_LINE_CLAMP: u32 = 3;

/// Content longer than this many characters offers the expand control
pub const SHOW_MORE_THRESHOLD: usize = 200;

/// Placeholder shown for findings without an article number
pub const ARTICLE_NUMBER_PLACEHOLDER: &str = "N/A";

/// Which finding is expanded. At most one row is expanded at a time; the
/// state is owned here rather than floating in the host page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindingsView {
    expanded: Option<usize>,
}

impl FindingsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expanded(&self) -> Option<usize> {
        self.expanded
    }

    /// Toggle one row open or closed.
    ///
    /// Expanding a row collapses any other, toggling the expanded row
    /// collapses it, and indexes at or past `row_count` are ignored so
    /// the expanded index always stays valid.
    pub fn toggle(&mut self, index: usize, row_count: usize) {
        if index >= row_count {
            return;
        }
        self.expanded = if self.expanded == Some(index) {
            None
        } else {
            Some(index)
        };
    }

    /// Collapse everything. Called whenever the underlying findings are
    /// replaced.
    pub fn reset(&mut self) {
        self.expanded = None;
    }
}

/// One renderable findings row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingRow {
    pub index: usize,
    pub article_number: String,
    pub content: String,
    pub expanded: bool,
    pub show_more: bool,
}

/// What the results area shows, as a tagged model for the host page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Listing {
    AwaitingUpload,
    Analyzing,
    Findings { rows: Vec<FindingRow> },
}

/// Render the results area as a pure function of the workflow state.
///
/// An in-flight submission always shows the progress state, even when an
/// older result is still held; otherwise the held result renders one row
/// per finding in service order.
pub fn render_listing(
    result: Option<&AnalysisResult>,
    in_flight: bool,
    view: &FindingsView,
) -> Listing {
    if in_flight {
        return Listing::Analyzing;
    }
    let Some(result) = result else {
        return Listing::AwaitingUpload;
    };
    let rows = result
        .details
        .iter()
        .enumerate()
        .map(|(index, finding)| FindingRow {
            index,
            article_number: finding
                .article_number
                .clone()
                .unwrap_or_else(|| ARTICLE_NUMBER_PLACEHOLDER.to_string()),
            content: finding.content.clone(),
            expanded: view.expanded() == Some(index),
            show_more: finding.content.chars().count() > SHOW_MORE_THRESHOLD,
        })
        .collect();
    Listing::Findings { rows }
}
