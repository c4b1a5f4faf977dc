use serde::{Deserialize, Serialize};

use crate::extract;

/// Score shown until the analysis service reports a computed one.
pub const SCORE_PENDING: &str = "Pending review";

/// One finding returned by the analysis service.
///
/// Every field except `content` is optional on the wire; older service
/// versions omit the table columns entirely. Findings are never edited
/// client-side, and their order within [`AnalysisResult::details`] is the
/// order the service returned them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleFinding {
    #[serde(default)]
    pub article_number: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub clause: Option<String>,
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Response envelope of the upload endpoint.
///
/// The service also sends `filename` and `id`; the client ignores them
/// (the submitted document's own name is authoritative). `article_count`
/// and `compliance_score` are structured fields the service is growing
/// into; both may be absent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub articles: Option<Vec<ArticleFinding>>,
    #[serde(default)]
    pub article_count: Option<u32>,
    #[serde(default)]
    pub compliance_score: Option<String>,
}

impl UploadResponse {
    /// Article count for this response.
    ///
    /// The structured `article_count` field wins when present. Otherwise
    /// the count is scavenged from the status message, which may fail and
    /// yield 0; see [`extract::extracted_count`].
    pub fn extracted_count(&self) -> u32 {
        match self.article_count {
            Some(count) => count,
            None => extract::extracted_count(&self.message),
        }
    }
}

/// The client-resident result of one analyzed document.
///
/// At most one of these is live in the UI at a time. A successful
/// submission replaces it wholesale; a failed one leaves it untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub file_name: String,
    pub compliance_score: String,
    pub special_count: u32,
    pub details: Vec<ArticleFinding>,
}

impl AnalysisResult {
    /// Build the result for one analyzed document from the service response.
    ///
    /// Missing response pieces degrade to defaults rather than failing: no
    /// articles means no findings, no score means the pending placeholder.
    pub fn from_response(file_name: String, response: UploadResponse) -> Self {
        let special_count = response.extracted_count();
        let UploadResponse {
            compliance_score,
            articles,
            ..
        } = response;
        AnalysisResult {
            file_name,
            compliance_score: compliance_score.unwrap_or_else(|| SCORE_PENDING.to_string()),
            special_count,
            details: articles.unwrap_or_default(),
        }
    }

    /// Headline numbers for the result card.
    pub fn summary(&self) -> ResultSummary {
        ResultSummary {
            file_name: self.file_name.clone(),
            compliance_score: self.compliance_score.clone(),
            special_count: self.special_count,
            finding_count: self.details.len(),
        }
    }
}

/// Headline view of an [`AnalysisResult`], serialized for the host page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub file_name: String,
    pub compliance_score: String,
    pub special_count: u32,
    pub finding_count: usize,
}
