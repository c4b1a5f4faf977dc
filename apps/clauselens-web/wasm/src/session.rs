//! Audit session management
//!
//! The one wasm export wiring the workflow together: document selection,
//! the single-flight submission, the findings view, and report export.
//! All state lives behind `RefCell` so every method takes `&self` and the
//! host page can keep querying the session while a submission is awaited.

use std::cell::RefCell;

use js_sys::{Object, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;

use audit_types::AnalysisResult;

use crate::results::{render_listing, FindingsView, PREVIEW_LINE_CLAMP};
use crate::upload::{failure_notice, send_multipart, SelectedDocument, UploadController};

/// One user's submit-review-export workflow, driven from the host page
#[wasm_bindgen]
pub struct AuditSession {
    controller: RefCell<UploadController>,
    result: RefCell<Option<AnalysisResult>>,
    view: RefCell<FindingsView>,
}

#[wasm_bindgen]
impl AuditSession {
    /// Create a session talking to `api_base`, or to the local
    /// development service when the host injects none
    #[wasm_bindgen(constructor)]
    pub fn new(api_base: Option<String>) -> Self {
        console_error_panic_hook::set_once();
        Self {
            controller: RefCell::new(UploadController::new(api_base)),
            result: RefCell::new(None),
            view: RefCell::new(FindingsView::new()),
        }
    }

    /// Replace the selected document.
    ///
    /// The current result, if any, stays on screen until the next
    /// successful submission replaces it; the result names its own
    /// source file, so it cannot be mistaken for the new pick.
    #[wasm_bindgen(js_name = selectDocument)]
    pub fn select_document(&self, name: String, bytes: Vec<u8>) {
        self.controller
            .borrow_mut()
            .select(SelectedDocument { name, bytes });
    }

    #[wasm_bindgen(js_name = canSubmit)]
    pub fn can_submit(&self) -> bool {
        self.controller.borrow().can_submit()
    }

    #[wasm_bindgen(js_name = isInFlight)]
    pub fn is_in_flight(&self) -> bool {
        self.controller.borrow().in_flight()
    }

    #[wasm_bindgen(js_name = hasResult)]
    pub fn has_result(&self) -> bool {
        self.result.borrow().is_some()
    }

    #[wasm_bindgen(js_name = documentName)]
    pub fn document_name(&self) -> Option<String> {
        self.controller.borrow().document_name().map(String::from)
    }

    /// Run one submission round trip.
    ///
    /// A refused attempt (no document, or one already in flight) resolves
    /// to `{ submitted: false }` without any side effect. A transport or
    /// response failure rejects with the user notice and leaves the
    /// previous result untouched. Success installs the new result and
    /// collapses the expansion state. Whatever the path, the in-flight
    /// flag is released last.
    pub async fn submit(&self) -> Result<JsValue, JsValue> {
        let begun = {
            let controller = self.controller.borrow();
            let url = controller.upload_url().to_string();
            controller
                .begin()
                .map(|(payload, guard)| (payload, guard, url))
        };
        let Some((payload, guard, url)) = begun else {
            web_sys::console::log_1(&"Submission refused: nothing to send or one in flight".into());
            return refusal_outcome();
        };

        match send_multipart(&url, &payload).await {
            Ok(response) => {
                let result = AnalysisResult::from_response(payload.file_name, response);
                web_sys::console::log_1(
                    &format!("Analysis complete: {} findings", result.details.len()).into(),
                );
                let outcome = accepted_outcome(&result);
                self.install_result(result);
                drop(guard);
                outcome
            }
            Err(error) => {
                let notice = failure_notice(&error);
                web_sys::console::error_1(&notice.as_str().into());
                drop(guard);
                Err(JsValue::from_str(&notice))
            }
        }
    }

    /// Toggle one finding open or closed; out-of-range indexes are
    /// ignored
    #[wasm_bindgen(js_name = toggleFinding)]
    pub fn toggle(&self, index: usize) {
        let row_count = self
            .result
            .borrow()
            .as_ref()
            .map(|result| result.details.len())
            .unwrap_or(0);
        self.view.borrow_mut().toggle(index, row_count);
    }

    #[wasm_bindgen(js_name = expandedIndex)]
    pub fn expanded_index(&self) -> Option<usize> {
        self.view.borrow().expanded()
    }

    /// Display lines the host should clamp a collapsed row to
    #[wasm_bindgen(js_name = previewLineClamp)]
    pub fn preview_line_clamp(&self) -> u32 {
        PREVIEW_LINE_CLAMP
    }

    /// The results area as JSON: awaiting, analyzing, or the finding rows
    #[wasm_bindgen(js_name = listingJson)]
    pub fn listing_json(&self) -> String {
        let result = self.result.borrow();
        let listing = render_listing(result.as_ref(), self.is_in_flight(), &self.view.borrow());
        serde_json::to_string(&listing).unwrap_or_default()
    }

    /// Headline numbers of the held result as JSON, or nothing
    #[wasm_bindgen(js_name = summaryJson)]
    pub fn summary_json(&self) -> Option<String> {
        self.result
            .borrow()
            .as_ref()
            .and_then(|result| serde_json::to_string(&result.summary()).ok())
    }

    /// Regenerate the audit report for the held result.
    ///
    /// Resolves to `null` when no result is held. Repeatable at will:
    /// export reads the result and touches neither the submission state
    /// nor the expansion state.
    #[wasm_bindgen(js_name = exportReport)]
    pub fn export_report(&self) -> Result<JsValue, JsValue> {
        let result = self.result.borrow();
        let Some(result) = result.as_ref() else {
            return Ok(JsValue::NULL);
        };
        let artifact =
            report_engine::generate(result).map_err(|e| JsValue::from_str(&e.to_string()))?;

        let out = Object::new();
        Reflect::set(&out, &"fileName".into(), &artifact.file_name.into())?;
        Reflect::set(&out, &"pageCount".into(), &artifact.page_count.into())?;
        Reflect::set(
            &out,
            &"bytes".into(),
            &Uint8Array::from(artifact.bytes.as_slice()),
        )?;
        Ok(out.into())
    }
}

impl AuditSession {
    /// Install a freshly parsed result and collapse the expansion state.
    /// The old result is dropped only here, on success.
    fn install_result(&self, result: AnalysisResult) {
        self.view.borrow_mut().reset();
        *self.result.borrow_mut() = Some(result);
    }
}

/// `{ submitted: false }` for a refused attempt
fn refusal_outcome() -> Result<JsValue, JsValue> {
    let outcome = Object::new();
    Reflect::set(&outcome, &"submitted".into(), &false.into())?;
    Ok(outcome.into())
}

/// `{ submitted: true, ... }` with the headline counts
fn accepted_outcome(result: &AnalysisResult) -> Result<JsValue, JsValue> {
    let outcome = Object::new();
    Reflect::set(&outcome, &"submitted".into(), &true.into())?;
    Reflect::set(
        &outcome,
        &"findingCount".into(),
        &(result.details.len() as u32).into(),
    )?;
    Reflect::set(&outcome, &"specialCount".into(), &result.special_count.into())?;
    Ok(outcome.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use audit_types::{ArticleFinding, UploadResponse};
    use pretty_assertions::assert_eq;

    fn parsed_result(file_name: &str, contents: &[&str]) -> AnalysisResult {
        let articles: Vec<ArticleFinding> = contents
            .iter()
            .map(|content| ArticleFinding {
                article_number: None,
                content: content.to_string(),
                clause: None,
                reference: None,
                status: None,
            })
            .collect();
        let response = UploadResponse {
            message: format!("File processed. {} articles extracted.", articles.len()),
            articles: Some(articles),
            article_count: None,
            compliance_score: None,
        };
        AnalysisResult::from_response(file_name.to_string(), response)
    }

    #[test]
    fn test_fresh_session_awaits_upload() {
        let session = AuditSession::new(None);
        assert!(!session.has_result());
        assert!(!session.can_submit());
        assert!(!session.is_in_flight());
        assert_eq!(session.listing_json(), r#"{"state":"awaiting_upload"}"#);
        assert_eq!(session.summary_json(), None);
    }

    #[test]
    fn test_selection_enables_submission() {
        let session = AuditSession::new(None);
        session.select_document("contract.pdf".to_string(), vec![1, 2, 3]);
        assert!(session.can_submit());
        assert_eq!(session.document_name(), Some("contract.pdf".to_string()));
        // Selecting alone produces no result
        assert!(!session.has_result());
    }

    #[test]
    fn test_install_replaces_result_and_collapses() {
        let session = AuditSession::new(None);
        session.install_result(parsed_result("first.pdf", &["a", "b", "c"]));
        session.toggle(2);
        assert_eq!(session.expanded_index(), Some(2));

        session.install_result(parsed_result("second.pdf", &["x"]));
        assert_eq!(session.expanded_index(), None);
        let summary = session.summary_json().unwrap();
        assert!(summary.contains("second.pdf"));
        assert!(!summary.contains("first.pdf"));
    }

    #[test]
    fn test_toggle_is_bounded_by_the_result() {
        let session = AuditSession::new(None);
        session.toggle(0);
        assert_eq!(session.expanded_index(), None);

        session.install_result(parsed_result("doc.pdf", &["a", "b"]));
        session.toggle(5);
        assert_eq!(session.expanded_index(), None);
        session.toggle(1);
        assert_eq!(session.expanded_index(), Some(1));
    }

    #[test]
    fn test_preview_clamp_reaches_the_host() {
        let session = AuditSession::new(None);
        assert_eq!(session.preview_line_clamp(), 3);
    }

    #[test]
    fn test_listing_renders_installed_findings() {
        let session = AuditSession::new(None);
        let long = "y".repeat(250);
        session.install_result(parsed_result("doc.pdf", &["short", &long]));

        let json = session.listing_json();
        assert!(json.contains(r#""state":"findings""#));
        assert!(json.contains(r#""article_number":"N/A""#));
        assert!(json.contains(r#""show_more":true"#));
        assert!(json.contains(r#""show_more":false"#));
    }

    #[test]
    fn test_summary_reports_counts() {
        let session = AuditSession::new(None);
        session.install_result(parsed_result("doc.pdf", &["a", "b", "c"]));
        let summary = session.summary_json().unwrap();
        assert!(summary.contains(r#""special_count":3"#));
        assert!(summary.contains(r#""finding_count":3"#));
    }
}
