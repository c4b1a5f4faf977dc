//! Upload lifecycle management
//!
//! Holds the selected document, gates the single in-flight submission,
//! and runs the multipart round trip to the analysis endpoint.
//!
//! ## Lifecycle
//! - SELECT: the user picks a document; it replaces the previous pick
//! - BEGIN: the one precondition gate; flips Idle to InFlight and hands
//!   out a payload clone plus the guard that restores Idle on drop
//! - SEND: exactly one POST per accepted begin, no retry, no timeout
//!
//! State transitions live in a shared `Cell` so the release guard owns a
//! handle instead of borrowing the controller across an await.

use std::cell::Cell;
use std::rc::Rc;

use js_sys::{Array, Uint8Array};
use thiserror::Error;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, FormData, Request, RequestInit, RequestMode, Response};

use audit_types::UploadResponse;

/// Base used when the host page injects no API location
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Path of the analysis endpoint, relative to the API base
pub const UPLOAD_PATH: &str = "/api/audit/upload";

/// The document picked by the user
///
/// Replaced wholesale on every selection and never mutated in place. A
/// selection made while a submission is in flight does not affect that
/// submission: the flight already owns its own payload clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Liveness of the one allowed submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    InFlight,
}

/// Snapshot of the selected document handed out by [`UploadController::begin`]
#[derive(Debug, Clone)]
pub struct UploadPayload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Restores the submission state to idle when dropped, so every exit
/// path of a submission releases the in-flight flag
#[derive(Debug)]
pub struct FlightGuard {
    flight: Rc<Cell<SubmissionState>>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.flight.set(SubmissionState::Idle);
    }
}

/// Drives the submit workflow for one session
#[derive(Debug)]
pub struct UploadController {
    endpoint: String,
    document: Option<SelectedDocument>,
    flight: Rc<Cell<SubmissionState>>,
}

impl UploadController {
    /// Build a controller against `api_base`, falling back to the local
    /// development service when the host injects none. Trailing slashes
    /// on the base are ignored.
    pub fn new(api_base: Option<String>) -> Self {
        let base = api_base
            .filter(|base| !base.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let endpoint = format!("{}{}", base.trim_end_matches('/'), UPLOAD_PATH);
        Self {
            endpoint,
            document: None,
            flight: Rc::new(Cell::new(SubmissionState::Idle)),
        }
    }

    /// Replace the held document. Never touches the in-flight flag or
    /// any already produced result.
    pub fn select(&mut self, document: SelectedDocument) {
        self.document = Some(document);
    }

    pub fn document_name(&self) -> Option<&str> {
        self.document.as_ref().map(|doc| doc.name.as_str())
    }

    pub fn upload_url(&self) -> &str {
        &self.endpoint
    }

    pub fn in_flight(&self) -> bool {
        self.flight.get() == SubmissionState::InFlight
    }

    /// A submission is allowed when a document is held and nothing is in
    /// flight
    pub fn can_submit(&self) -> bool {
        self.document.is_some() && !self.in_flight()
    }

    /// Gate one submission.
    ///
    /// Refuses with `None` when the preconditions do not hold, so a
    /// refused attempt has no observable effect. Otherwise flips to
    /// in-flight and hands out the payload snapshot plus the release
    /// guard. At most one `begin` can be live at a time.
    pub fn begin(&self) -> Option<(UploadPayload, FlightGuard)> {
        if !self.can_submit() {
            return None;
        }
        let document = self.document.as_ref()?;
        self.flight.set(SubmissionState::InFlight);
        Some((
            UploadPayload {
                file_name: document.name.clone(),
                bytes: document.bytes.clone(),
            },
            FlightGuard {
                flight: Rc::clone(&self.flight),
            },
        ))
    }
}

/// Submission failure, folded into one user-facing notice at the session
/// boundary
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Could not reach the analysis service: {0}")]
    Network(String),

    #[error("Analysis service rejected the upload with status {0}")]
    Status(u16),

    #[error("Analysis service sent an unreadable response: {0}")]
    Malformed(String),
}

/// Notice shown verbatim to the user when a submission fails
pub fn failure_notice(error: &UploadError) -> String {
    format!("The submission could not be completed. {}", error)
}

fn js_error(value: JsValue) -> UploadError {
    UploadError::Network(
        value
            .as_string()
            .unwrap_or_else(|| format!("{:?}", value)),
    )
}

/// POST the payload to the analysis endpoint and parse the JSON body.
///
/// The document bytes travel as the single "file" part of a multipart
/// form under the document's own file name; the browser supplies the
/// multipart boundary, so no Content-Type header is set here. Exactly
/// one network call happens per invocation.
pub async fn send_multipart(
    url: &str,
    payload: &UploadPayload,
) -> Result<UploadResponse, UploadError> {
    let form = build_form(payload).map_err(js_error)?;

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(form.as_ref());

    let request = Request::new_with_str_and_init(url, &opts).map_err(js_error)?;
    let window =
        web_sys::window().ok_or_else(|| UploadError::Network("No window".to_string()))?;

    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_error)?;
    let response: Response = response.dyn_into().map_err(js_error)?;

    if !response.ok() {
        return Err(UploadError::Status(response.status()));
    }

    let text = JsFuture::from(response.text().map_err(js_error)?)
        .await
        .map_err(js_error)?;
    let body = text.as_string().unwrap_or_default();
    serde_json::from_str(&body).map_err(|e| UploadError::Malformed(e.to_string()))
}

/// Wrap the payload bytes in a one-part multipart form
fn build_form(payload: &UploadPayload) -> Result<FormData, JsValue> {
    let parts = Array::new();
    parts.push(&Uint8Array::from(payload.bytes.as_slice()));
    let blob = Blob::new_with_u8_array_sequence(&parts)?;

    let form = FormData::new()?;
    form.append_with_blob_and_filename("file", &blob, &payload.file_name)?;
    Ok(form)
}
