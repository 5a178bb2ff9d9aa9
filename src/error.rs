use std::fmt;

use crate::models::FieldErrors;

/// Structural failures the engine reports to its caller. Degenerate
/// statistics and data-quality problems are never errors.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// The text held no non-blank line.
    EmptyInput,
    /// The header row names neither `student_id` nor `name`.
    MissingHeader,
    /// A row failed validation during a strict import. `line` is 1-based
    /// and counts non-blank lines, header included.
    InvalidRow { line: usize, errors: FieldErrors },
    Csv(String),
    Json(String),
    Config(String),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;

impl fmt::Display for AnalyticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyticsError::EmptyInput => write!(f, "no data: the CSV text is empty"),
            AnalyticsError::MissingHeader => {
                write!(f, "header row has neither a student_id nor a name column")
            }
            AnalyticsError::InvalidRow { line, errors } => {
                write!(f, "invalid row on line {line}: {errors}")
            }
            AnalyticsError::Csv(message) => write!(f, "csv error: {message}"),
            AnalyticsError::Json(message) => write!(f, "json error: {message}"),
            AnalyticsError::Config(message) => write!(f, "config error: {message}"),
        }
    }
}

impl std::error::Error for AnalyticsError {}

impl From<csv::Error> for AnalyticsError {
    fn from(error: csv::Error) -> Self {
        AnalyticsError::Csv(error.to_string())
    }
}

impl From<serde_json::Error> for AnalyticsError {
    fn from(error: serde_json::Error) -> Self {
        AnalyticsError::Json(error.to_string())
    }
}
