use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to render report: {0}")]
    RenderError(String),
}
