// Export modules
pub mod results;
pub mod session;
pub mod upload;

// Re-export commonly used items
pub use results::{
    render_listing, FindingRow, FindingsView, Listing, ARTICLE_NUMBER_PLACEHOLDER,
    PREVIEW_LINE_CLAMP, SHOW_MORE_THRESHOLD,
};
pub use session::AuditSession;
pub use upload::{
    failure_notice, FlightGuard, SelectedDocument, SubmissionState, UploadController,
    UploadError, UploadPayload, DEFAULT_API_BASE, UPLOAD_PATH,
};
