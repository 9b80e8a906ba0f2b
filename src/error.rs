use thiserror::Error;

use crate::models::ValidationIssue;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("input has a header but no data rows")]
    NoDataRows,

    #[error("row {row}: field '{field}' is not numeric: '{value}'")]
    NumericCoercion {
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("validation failed with {} issue(s)", .0.len())]
    ValidationFailed(Vec<ValidationIssue>),

    #[error("prediction service: {0}")]
    Remote(String),
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        PipelineError::Remote(err.to_string())
    }
}
