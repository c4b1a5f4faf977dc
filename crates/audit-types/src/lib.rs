pub mod extract;
pub mod types;

pub use types::{AnalysisResult, ArticleFinding, ResultSummary, UploadResponse, SCORE_PENDING};
